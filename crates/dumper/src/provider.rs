use thiserror::Error;

use super::options::RenderOptions;

/// Why a single type couldn't be turned into declaration text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RenderError {
	/// The type name couldn't be resolved by the metadata provider.
	#[error("type metadata unavailable")]
	NotFound,
	/// The type was resolved, but some part of it can't be rendered.
	#[error("unsupported type shape: {0}")]
	Unsupported(String),
}

/// Source of the names of every type known to the running process.
pub trait TypeMetadataProvider: Send + Sync + 'static {
	fn all_type_names(&self) -> Vec<String>;
}

/// Renders one type's members into human-readable declaration text.
///
/// Called from the blocking thread pool, implementations are free to block on introspection.
pub trait TypeRenderer: Send + Sync + 'static {
	fn render(&self, type_name: &str, options: &RenderOptions) -> Result<String, RenderError>;
}

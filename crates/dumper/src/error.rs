use dy_utils::error::FileIOError;

use thiserror::Error;

use super::provider::RenderError;

/// Failures of a single render unit, none of them abort the batch.
#[derive(Debug, Error)]
pub enum DumpError {
	#[error("type metadata unavailable <type='{0}'>")]
	MetadataUnavailable(String),
	#[error("failed to render <type='{type_name}'>: {reason}")]
	RenderFailure { type_name: String, reason: String },
	#[error("render unit failed to join <type='{0}'>")]
	RenderJoin(String),

	#[error(transparent)]
	FileIO(#[from] FileIOError),
}

impl DumpError {
	pub(crate) fn from_render(type_name: impl Into<String>, e: RenderError) -> Self {
		match e {
			RenderError::NotFound => Self::MetadataUnavailable(type_name.into()),
			RenderError::Unsupported(reason) => Self::RenderFailure {
				type_name: type_name.into(),
				reason,
			},
		}
	}
}

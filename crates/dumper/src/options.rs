use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

pub const DEFAULT_FILE_EXTENSION: &str = "h";

/// Options recognized by a header dump.
///
/// | key | default |
/// |---|---|
/// | `outputDirectory` | none, a timestamped directory under the dumper's base directory |
/// | `includeComments` | `true` |
/// | `includeInheritedMembers` | `false` |
/// | `fileExtension` | `"h"` |
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DumpOptions {
	/// Exact directory to write into, used as-is instead of a timestamped one.
	pub output_directory: Option<PathBuf>,
	pub include_comments: bool,
	pub include_inherited_members: bool,
	/// Output file suffix, without the leading dot.
	pub file_extension: String,
}

impl Default for DumpOptions {
	fn default() -> Self {
		Self {
			output_directory: None,
			include_comments: true,
			include_inherited_members: false,
			file_extension: DEFAULT_FILE_EXTENSION.to_string(),
		}
	}
}

/// The subset of [`DumpOptions`] that shapes the declaration text itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
	pub include_comments: bool,
	pub include_inherited_members: bool,
}

impl Default for RenderOptions {
	fn default() -> Self {
		DumpOptions::default().render_options()
	}
}

impl DumpOptions {
	/// Reads options out of a loosely typed dictionary.
	///
	/// Unknown keys are ignored and every malformed value falls back to its own default, a value
	/// that isn't an object gives the defaults for everything.
	#[must_use]
	pub fn from_json_value(value: &Value) -> Self {
		let mut options = Self::default();

		let Some(map) = value.as_object() else {
			if !value.is_null() {
				warn!(?value, "Dump options are not a dictionary, using defaults");
			}
			return options;
		};

		if let Some(raw) = map.get("outputDirectory") {
			match raw.as_str().map(str::trim) {
				Some(dir) if !dir.is_empty() => options.output_directory = Some(PathBuf::from(dir)),
				_ => warn!(?raw, "Ignoring malformed `outputDirectory` option"),
			}
		}

		if let Some(raw) = map.get("includeComments") {
			match raw.as_bool() {
				Some(flag) => options.include_comments = flag,
				None => warn!(?raw, "Ignoring malformed `includeComments` option"),
			}
		}

		if let Some(raw) = map.get("includeInheritedMembers") {
			match raw.as_bool() {
				Some(flag) => options.include_inherited_members = flag,
				None => warn!(?raw, "Ignoring malformed `includeInheritedMembers` option"),
			}
		}

		if let Some(raw) = map.get("fileExtension") {
			match raw.as_str().and_then(normalize_extension) {
				Some(ext) => options.file_extension = ext,
				None => warn!(?raw, "Ignoring malformed `fileExtension` option"),
			}
		}

		options
	}

	#[must_use]
	pub const fn render_options(&self) -> RenderOptions {
		RenderOptions {
			include_comments: self.include_comments,
			include_inherited_members: self.include_inherited_members,
		}
	}

	/// The configured extension, or the default one if it was set to something unusable.
	#[must_use]
	pub fn file_extension(&self) -> String {
		normalize_extension(&self.file_extension)
			.unwrap_or_else(|| DEFAULT_FILE_EXTENSION.to_string())
	}
}

fn normalize_extension(raw: &str) -> Option<String> {
	let ext = raw.trim().trim_start_matches('.');

	(!ext.is_empty() && !ext.contains(['/', '\\'])).then(|| ext.to_string())
}

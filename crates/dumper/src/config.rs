use std::{env, path::PathBuf};

use directories::UserDirs;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::namer::current_app_name;

/// Where and under which name a [`HeaderDumper`](crate::HeaderDumper) writes its dumps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DumperConfig {
	/// Leading part of every timestamped directory name.
	pub app_name: String,
	/// Timestamped directories are created in here, unless a dump overrides its output directory.
	pub base_directory: PathBuf,
}

impl Default for DumperConfig {
	fn default() -> Self {
		Self {
			app_name: current_app_name(),
			base_directory: default_base_directory(),
		}
	}
}

impl DumperConfig {
	#[must_use]
	pub fn new(app_name: impl Into<String>, base_directory: impl Into<PathBuf>) -> Self {
		Self {
			app_name: app_name.into(),
			base_directory: base_directory.into(),
		}
	}
}

fn default_base_directory() -> PathBuf {
	if let Some(documents) = UserDirs::new()
		.as_ref()
		.and_then(UserDirs::document_dir)
	{
		return documents.to_path_buf();
	}

	env::current_dir().unwrap_or_else(|e| {
		warn!(?e, "Failed to resolve current directory, dumping relative to it;");
		PathBuf::from(".")
	})
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_keeps_defaults() {
		let config = serde_json::from_str::<DumperConfig>(r#"{"appName": "Notes"}"#).unwrap();

		assert_eq!(config.app_name, "Notes");
		assert_eq!(config.base_directory, default_base_directory());
	}

	#[test]
	fn default_base_directory_is_never_empty() {
		assert!(!DumperConfig::default().base_directory.as_os_str().is_empty());
	}
}

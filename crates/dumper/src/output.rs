use std::{
	io,
	path::{Path, PathBuf},
};

use dy_utils::error::FileIOError;

use tokio::fs;
use tracing::{debug, trace};

const MAX_COLLISION_SUFFIX: usize = 1_000;

/// Creates the directory one dump writes into, before any unit runs.
///
/// An explicit override is used as-is and created idempotently. Otherwise `name` is created under
/// `base_directory` with an exclusive `create_dir`, a same-second collision with another dump gets
/// `_1`, `_2`... appended, so two dumps never share a directory.
pub(crate) async fn create_output_directory(
	base_directory: &Path,
	name: &str,
	override_directory: Option<&Path>,
) -> Result<PathBuf, FileIOError> {
	if let Some(directory) = override_directory {
		fs::create_dir_all(directory)
			.await
			.map_err(|e| FileIOError::from((directory, e, "Failed to create output directory")))?;

		return Ok(directory.to_path_buf());
	}

	fs::create_dir_all(base_directory).await.map_err(|e| {
		FileIOError::from((base_directory, e, "Failed to create output base directory"))
	})?;

	for attempt in 0..MAX_COLLISION_SUFFIX {
		let candidate = if attempt == 0 {
			base_directory.join(name)
		} else {
			base_directory.join(format!("{name}_{attempt}"))
		};

		match fs::create_dir(&candidate)
			.await
			.map_err(|e| FileIOError::from((&candidate, e, "Failed to create output directory")))
		{
			Ok(()) => {
				debug!(directory = %candidate.display(), "Created output directory");
				return Ok(candidate);
			}
			Err(e) if e.is_already_exists() => {
				trace!(directory = %candidate.display(), "Output directory already taken, trying next suffix");
			}
			Err(e) => return Err(e),
		}
	}

	Err(FileIOError::from((
		base_directory.join(name),
		io::Error::from(io::ErrorKind::AlreadyExists),
		"Ran out of suffixes for output directory",
	)))
}

/// `{type_name}.{extension}`, with path separators in the type name replaced by `_`.
pub(crate) fn declaration_file_name(type_name: &str, extension: &str) -> String {
	let stem = type_name
		.chars()
		.map(|c| match c {
			'/' | '\\' | '\0' => '_',
			c => c,
		})
		.collect::<String>();

	format!("{stem}.{extension}")
}

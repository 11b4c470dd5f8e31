use std::{fmt::Display, io, path::Path};

use thiserror::Error;

/// File I/O error that includes the path that caused the error
#[derive(Error, Debug)]
pub struct FileIOError {
	pub path: Box<Path>,
	#[source]
	pub source: io::Error,
	pub maybe_context: Option<&'static str>,
}

impl Display for FileIOError {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(
			f,
			"file I/O error{}: {}; path: '{}'",
			self.maybe_context
				.map(|ctx| format!(" ({ctx})"))
				.unwrap_or_default(),
			self.source,
			self.path.display()
		)
	}
}

impl<P: AsRef<Path>> From<(P, io::Error)> for FileIOError {
	fn from((path, source): (P, io::Error)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: None,
		}
	}
}

impl<P: AsRef<Path>> From<(P, io::Error, &'static str)> for FileIOError {
	fn from((path, source, context): (P, io::Error, &'static str)) -> Self {
		Self {
			path: path.as_ref().into(),
			source,
			maybe_context: Some(context),
		}
	}
}

impl FileIOError {
	/// Whether the underlying I/O failure was an "already exists" condition.
	#[must_use]
	pub fn is_already_exists(&self) -> bool {
		self.source.kind() == io::ErrorKind::AlreadyExists
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn display_includes_context_and_path() {
		let err = FileIOError::from((
			"/tmp/headers/Alpha.h",
			io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
			"failed to write declaration",
		));

		let rendered = err.to_string();
		assert!(rendered.starts_with("file I/O error (failed to write declaration): denied"));
		assert!(rendered.ends_with("path: '/tmp/headers/Alpha.h'"));
	}

	#[test]
	fn already_exists_is_detected() {
		let err = FileIOError::from(("/tmp", io::Error::from(io::ErrorKind::AlreadyExists)));

		assert!(err.is_already_exists());
		assert!(err.maybe_context.is_none());
	}
}

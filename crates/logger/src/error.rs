use dy_utils::error::FileIOError;

use thiserror::Error;
use tracing_subscriber::util::TryInitError;

#[derive(Debug, Error)]
pub enum LoggerError {
	#[error("a global tracing subscriber was already installed: {0}")]
	AlreadyInitialized(#[from] TryInitError),

	#[error(transparent)]
	FileIO(#[from] FileIOError),
}

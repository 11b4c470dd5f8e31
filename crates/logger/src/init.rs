use std::path::PathBuf;

use dy_utils::error::FileIOError;

use tracing::info;
use tracing_appender::{non_blocking::WorkerGuard, rolling};
use tracing_subscriber::{
	filter::LevelFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::{error::LoggerError, layer::RemoteLogLayer, remote::RemoteLogger};

const DEFAULT_DIRECTIVES: &str = "info";
const LOG_FILE_NAME: &str = "dydump.log";

#[cfg(debug_assertions)]
const CONSOLE_LOG_FILTER: LevelFilter = LevelFilter::DEBUG;

#[cfg(not(debug_assertions))]
const CONSOLE_LOG_FILTER: LevelFilter = LevelFilter::INFO;

/// How logs are emitted by [`init_logger`].
#[derive(Debug, Clone)]
pub struct LoggerConfig {
	/// Maximum level written to stderr.
	pub console_level: LevelFilter,
	/// Maximum level forwarded to the remote collector.
	pub remote_level: LevelFilter,
	/// Daily rolling log files are written here when set.
	pub log_directory: Option<PathBuf>,
	/// Collector `(host, port)` to connect to right away.
	pub remote_collector: Option<(String, u16)>,
}

impl Default for LoggerConfig {
	fn default() -> Self {
		Self {
			console_level: CONSOLE_LOG_FILTER,
			remote_level: LevelFilter::INFO,
			log_directory: None,
			remote_collector: None,
		}
	}
}

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` takes precedence over the default directives. The returned guard flushes the log file
/// writer when dropped, so it must be kept alive for as long as logs should reach the file.
pub fn init_logger(config: LoggerConfig) -> Result<Option<WorkerGuard>, LoggerError> {
	let LoggerConfig {
		console_level,
		remote_level,
		log_directory,
		remote_collector,
	} = config;

	let (file_layer, guard) = match log_directory {
		Some(log_directory) => {
			std::fs::create_dir_all(&log_directory).map_err(|e| {
				FileIOError::from((&log_directory, e, "Failed to create logs directory"))
			})?;

			let (non_blocking, guard) =
				tracing_appender::non_blocking(rolling::daily(&log_directory, LOG_FILE_NAME));

			(
				Some(
					fmt::layer()
						.with_writer(non_blocking)
						.with_ansi(false)
						.with_filter(LevelFilter::DEBUG),
				),
				Some(guard),
			)
		}
		None => (None, None),
	};

	tracing_subscriber::registry()
		.with(
			EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| EnvFilter::new(DEFAULT_DIRECTIVES)),
		)
		.with(
			fmt::layer()
				.with_writer(std::io::stderr)
				.with_filter(console_level),
		)
		.with(file_layer)
		.with(RemoteLogLayer::new(RemoteLogger::shared().clone()).with_filter(remote_level))
		.try_init()?;

	if let Some((host, port)) = remote_collector {
		info!(%host, %port, "Forwarding logs to remote collector");
		RemoteLogger::shared().start_logging(host, port);
	}

	Ok(guard)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn second_initialization_is_an_error() {
		let logs_dir = tempfile::tempdir().unwrap();

		let guard = init_logger(LoggerConfig {
			log_directory: Some(logs_dir.path().join("logs")),
			..Default::default()
		})
		.unwrap();

		assert!(guard.is_some());
		assert!(logs_dir.path().join("logs").is_dir());

		assert!(matches!(
			init_logger(LoggerConfig::default()),
			Err(LoggerError::AlreadyInitialized(_))
		));
	}
}

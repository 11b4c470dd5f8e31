//! Logging for dydump.
//!
//! Every `tracing` event is written synchronously to the console (and optionally a rolling log file),
//! and is also forwarded, fire-and-forget, to a remote log collector through the process-wide
//! [`RemoteLogger`].
//!
//! The remote side never reports failures back: when there is no collector connected or the
//! connection breaks, messages are silently dropped.

#![warn(
	clippy::all,
	clippy::pedantic,
	clippy::correctness,
	clippy::perf,
	clippy::style,
	clippy::suspicious,
	clippy::complexity,
	clippy::nursery,
	clippy::unwrap_used,
	unused_qualifications,
	rust_2018_idioms,
	trivial_casts,
	trivial_numeric_casts,
	unused_allocation,
	clippy::dbg_macro,
	deprecated
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod error;
mod init;
mod layer;
mod remote;

pub use error::LoggerError;
pub use init::{init_logger, LoggerConfig};
pub use layer::RemoteLogLayer;
pub use remote::{RemoteLogger, DEFAULT_COLLECTOR_PORT, LOG_LINE_PREFIX};

/// Connects the process-wide remote logger to a collector, replacing any active connection.
pub fn start_logging(host: impl Into<String>, port: u16) {
	RemoteLogger::shared().start_logging(host, port);
}

/// Disconnects the process-wide remote logger, later messages are dropped until it is started again.
pub fn stop_logging() {
	RemoteLogger::shared().stop_logging();
}

/// Queues a message on the process-wide remote logger, never blocks and never fails.
pub fn send_log(message: impl Into<String>) {
	RemoteLogger::shared().send_log(message);
}

use std::sync::Arc;

use dy_logger::{init_logger, LoggerConfig, DEFAULT_COLLECTOR_PORT};

use anyhow::{Context, Result};
use clap::Parser;
use tokio::{io, net::TcpListener, signal, sync::Mutex};
use tracing::info;

mod server;

/// Collects log lines sent by dydump's remote logger and prints them to stdout.
#[derive(Parser, Debug)]
#[command(name = "dy-log-server", version)]
struct Cli {
	/// Address to listen on
	#[arg(long, env = "DY_LOG_SERVER_HOST", default_value = "0.0.0.0")]
	host: String,

	/// Port to listen on
	#[arg(long, env = "DY_LOG_SERVER_PORT", default_value_t = DEFAULT_COLLECTOR_PORT)]
	port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
	let Cli { host, port } = Cli::parse();

	let _guard = init_logger(LoggerConfig::default()).context("Failed to initialize logger")?;

	let listener = TcpListener::bind((host.as_str(), port))
		.await
		.with_context(|| format!("Failed to listen on {host}:{port}"))?;

	info!(
		address = %listener.local_addr().context("Failed to read listening address")?,
		"Log server listening",
	);

	tokio::select! {
		res = server::serve(listener, Arc::new(Mutex::new(io::stdout()))) => {
			res.context("Stopped accepting connections")?;
		}
		res = signal::ctrl_c() => {
			res.context("Failed to listen for Ctrl-C")?;
			info!("Shutting down log server");
		}
	}

	Ok(())
}

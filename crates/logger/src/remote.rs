use std::{pin::pin, sync::LazyLock, thread, time::Duration};

use async_channel as chan;
use futures::StreamExt;
use tokio::{io::AsyncWriteExt, net::TcpStream, runtime, time::timeout};
use tracing::{debug, error, trace, warn};

/// Every line sent to the collector starts with this tag.
pub const LOG_LINE_PREFIX: &str = "[dydump]";

/// Port the collector listens on when none is given.
pub const DEFAULT_COLLECTOR_PORT: u16 = 5021;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// A collector that stops reading must not stall delivery for longer than this per line.
const WRITE_TIMEOUT: Duration = Duration::from_secs(2);

/// Commands beyond this many waiting ones are dropped.
const COMMAND_QUEUE_CAPACITY: usize = 4096;

static SHARED: LazyLock<RemoteLogger> = LazyLock::new(RemoteLogger::new);

#[derive(Debug)]
enum LogCommand {
	Connect { host: String, port: u16 },
	Disconnect,
	Message(String),
}

/// Fire-and-forget sink of text messages to a remote log collector.
///
/// Commands are queued on a bounded channel and applied in order by a dedicated delivery thread,
/// so callers never wait on the network. When the queue is full new commands are dropped. Cloning is cheap, all clones feed the same delivery thread,
/// which stops once every clone is dropped.
#[derive(Debug, Clone)]
pub struct RemoteLogger {
	commands_tx: chan::Sender<LogCommand>,
}

impl RemoteLogger {
	/// The process-wide logger, lazily started on first use and never torn down.
	pub fn shared() -> &'static Self {
		&SHARED
	}

	/// Creates an independent logger with its own delivery thread and no active connection.
	#[must_use]
	pub fn new() -> Self {
		let (commands_tx, commands_rx) = chan::bounded(COMMAND_QUEUE_CAPACITY);

		if let Err(e) = thread::Builder::new()
			.name("dy-remote-logger".to_string())
			.spawn(move || deliver_on_own_runtime(commands_rx))
		{
			// The receiver went down with the closure, so every enqueue will be silently dropped
			error!(?e, "Failed to spawn remote logger delivery thread;");
		}

		Self { commands_tx }
	}

	/// Connects to a collector, closing any connection that was already active.
	pub fn start_logging(&self, host: impl Into<String>, port: u16) {
		self.enqueue(LogCommand::Connect {
			host: host.into(),
			port,
		});
	}

	pub fn stop_logging(&self) {
		self.enqueue(LogCommand::Disconnect);
	}

	/// Queues the message and returns immediately, regardless of the connection state.
	pub fn send_log(&self, message: impl Into<String>) {
		self.enqueue(LogCommand::Message(message.into()));
	}

	fn enqueue(&self, command: LogCommand) {
		match self.commands_tx.try_send(command) {
			Ok(()) => {}
			Err(chan::TrySendError::Full(_)) => {
				trace!("Remote logger queue is full, dropping command");
			}
			Err(chan::TrySendError::Closed(_)) => {
				trace!("Remote logger delivery thread is gone, dropping command");
			}
		}
	}
}

impl Default for RemoteLogger {
	fn default() -> Self {
		Self::new()
	}
}

fn deliver_on_own_runtime(commands_rx: chan::Receiver<LogCommand>) {
	match runtime::Builder::new_current_thread().enable_all().build() {
		Ok(rt) => rt.block_on(deliver(commands_rx)),
		Err(e) => error!(?e, "Failed to build remote logger runtime;"),
	}
}

async fn deliver(commands_rx: chan::Receiver<LogCommand>) {
	let mut commands = pin!(commands_rx);
	let mut connection = None::<TcpStream>;

	while let Some(command) = commands.next().await {
		match command {
			LogCommand::Connect { host, port } => {
				disconnect(connection.take()).await;
				connection = connect(&host, port).await;
			}

			LogCommand::Disconnect => disconnect(connection.take()).await,

			LogCommand::Message(message) => {
				if let Some(stream) = connection.as_mut() {
					if let Err(e) = stream.write_all(format_line(&message).as_bytes()).await {
						warn!(?e, "Lost connection to remote log collector, dropping messages;");
						connection = None;
					}
				}
			}
		}
	}

	disconnect(connection).await;
	trace!("All remote logger handles dropped, delivery stopped");
}

async fn connect(host: &str, port: u16) -> Option<TcpStream> {
	match timeout(CONNECT_TIMEOUT, TcpStream::connect((host, port))).await {
		Ok(Ok(stream)) => {
			debug!(%host, %port, "Connected to remote log collector");
			Some(stream)
		}
		Ok(Err(e)) => {
			warn!(%host, %port, ?e, "Failed to connect to remote log collector;");
			None
		}
		Err(_) => {
			warn!(%host, %port, "Timed out connecting to remote log collector");
			None
		}
	}
}

/// Returns `false` when the connection must be dropped.
async fn write_line(stream: &mut TcpStream, message: &str) -> bool {
	match timeout(WRITE_TIMEOUT, stream.write_all(format_line(message).as_bytes())).await {
		Ok(Ok(())) => true,
		Ok(Err(e)) => {
			warn!(?e, "Lost connection to remote log collector, dropping messages;");
			false
		}
		Err(_) => {
			warn!("Remote log collector stopped reading, dropping its connection");
			false
		}
	}
}

async fn disconnect(connection: Option<TcpStream>) {
	if let Some(mut stream) = connection {
		if let Err(e) = stream.shutdown().await {
			trace!(?e, "Remote log collector connection was already broken;");
		}
	}
}

fn format_line(message: &str) -> String {
	format!("{LOG_LINE_PREFIX} {}\n", message.trim_end_matches('\n'))
}

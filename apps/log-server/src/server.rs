use std::{net::SocketAddr, str, sync::Arc};

use tokio::{
	io::{self, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt},
	net::TcpListener,
	spawn,
	sync::Mutex,
};
use tracing::{debug, info, warn};

const READ_BUFFER_SIZE: usize = 4096;

/// Decodes a byte stream read in arbitrary chunks, a character split across two reads is kept
/// whole and only truly invalid bytes become U+FFFD.
#[derive(Debug, Default)]
struct Utf8Decoder {
	pending: Vec<u8>,
}

impl Utf8Decoder {
	fn decode(&mut self, chunk: &[u8]) -> String {
		self.pending.extend_from_slice(chunk);

		let mut text = String::with_capacity(self.pending.len());
		let mut rest = self.pending.as_slice();

		loop {
			match str::from_utf8(rest) {
				Ok(valid) => {
					text.push_str(valid);
					rest = &[];
					break;
				}
				Err(e) => {
					let (valid, after) = rest.split_at(e.valid_up_to());
					text.push_str(&String::from_utf8_lossy(valid));

					match e.error_len() {
						Some(invalid_len) => {
							text.push(char::REPLACEMENT_CHARACTER);
							rest = &after[invalid_len..];
						}
						// Incomplete character at the end, wait for the next chunk
						None => {
							rest = after;
							break;
						}
					}
				}
			}
		}

		self.pending = rest.to_vec();

		text
	}

	/// Whatever is left once the stream ended can only be an incomplete character.
	fn finish(&mut self) -> Option<String> {
		(!self.pending.is_empty()).then(|| {
			let text = String::from_utf8_lossy(&self.pending).into_owned();
			self.pending.clear();
			text
		})
	}
}

/// Accepts clients until the listener fails, each one is handled on its own task.
///
/// Whatever a client sends is written to `output` as soon as it arrives.
pub async fn serve<W>(listener: TcpListener, output: Arc<Mutex<W>>) -> io::Result<()>
where
	W: AsyncWrite + Unpin + Send + 'static,
{
	loop {
		let (stream, address) = listener.accept().await?;
		info!(%address, "Client connected");

		spawn(handle_client(stream, address, Arc::clone(&output)));
	}
}

async fn handle_client<R, W>(mut stream: R, address: SocketAddr, output: Arc<Mutex<W>>)
where
	R: AsyncRead + Unpin,
	W: AsyncWrite + Unpin,
{
	let mut buffer = vec![0; READ_BUFFER_SIZE];
	let mut decoder = Utf8Decoder::default();

	loop {
		match stream.read(&mut buffer).await {
			Ok(0) => {
				if let Some(text) = decoder.finish() {
					let mut output = output.lock().await;
					if let Err(e) = write_flushed(&mut *output, text.as_bytes()).await {
						warn!(%address, ?e, "Failed to write client output;");
					}
				}

				info!(%address, "Client disconnected");
				break;
			}
			Ok(read) => {
				let text = decoder.decode(&buffer[..read]);
				if text.is_empty() {
					continue;
				}

				let mut output = output.lock().await;
				if let Err(e) = write_flushed(&mut *output, text.as_bytes()).await {
					warn!(%address, ?e, "Failed to write client output, closing connection;");
					break;
				}
			}
			Err(e) => {
				warn!(%address, ?e, "Failed to read from client, closing connection;");
				break;
			}
		}
	}

	debug!(%address, "Client handler done");
}

async fn write_flushed<W: AsyncWrite + Unpin>(output: &mut W, bytes: &[u8]) -> io::Result<()> {
	output.write_all(bytes).await?;
	output.flush().await
}

use dy_task_system::{ExecStatus, Interrupter, IntoAnyTaskOutput, Task, TaskId, TaskOutput};

use std::time::Duration;

use async_channel as chan;
use async_trait::async_trait;
use thiserror::Error;
use tokio::{sync::oneshot, time::sleep};
use tracing::info;

#[derive(Debug, Error)]
pub enum SampleError {
	#[error("Sample error")]
	SampleError,
}

#[derive(Debug)]
pub struct ReadyTask {
	id: TaskId,
}

impl Default for ReadyTask {
	fn default() -> Self {
		Self {
			id: TaskId::new_v4(),
		}
	}
}

#[async_trait]
impl Task<SampleError> for ReadyTask {
	fn id(&self) -> TaskId {
		self.id
	}

	async fn run(&mut self, _interrupter: &Interrupter) -> Result<ExecStatus, SampleError> {
		Ok(ExecStatus::Done(TaskOutput::Empty))
	}
}

#[derive(Debug)]
pub struct EchoTask {
	id: TaskId,
	value: u64,
}

impl EchoTask {
	pub fn new(value: u64) -> Self {
		Self {
			id: TaskId::new_v4(),
			value,
		}
	}
}

#[async_trait]
impl Task<SampleError> for EchoTask {
	fn id(&self) -> TaskId {
		self.id
	}

	async fn run(&mut self, _interrupter: &Interrupter) -> Result<ExecStatus, SampleError> {
		Ok(ExecStatus::Done(self.value.into_output()))
	}
}

#[derive(Debug)]
pub struct BogusTask {
	id: TaskId,
}

impl Default for BogusTask {
	fn default() -> Self {
		Self {
			id: TaskId::new_v4(),
		}
	}
}

#[async_trait]
impl Task<SampleError> for BogusTask {
	fn id(&self) -> TaskId {
		self.id
	}

	async fn run(&mut self, _interrupter: &Interrupter) -> Result<ExecStatus, SampleError> {
		Err(SampleError::SampleError)
	}
}

#[derive(Debug)]
pub struct PanicTask {
	id: TaskId,
}

impl Default for PanicTask {
	fn default() -> Self {
		Self {
			id: TaskId::new_v4(),
		}
	}
}

#[async_trait]
impl Task<SampleError> for PanicTask {
	fn id(&self) -> TaskId {
		self.id
	}

	async fn run(&mut self, _interrupter: &Interrupter) -> Result<ExecStatus, SampleError> {
		panic!("PanicTask always panics");
	}
}

/// Keeps a worker busy until its signal arrives.
#[derive(Debug)]
pub struct WaitSignalTask {
	id: TaskId,
	signal_rx: chan::Receiver<()>,
}

impl WaitSignalTask {
	pub fn new() -> (Self, chan::Sender<()>) {
		let (signal_tx, signal_rx) = chan::bounded(1);
		(
			Self {
				id: TaskId::new_v4(),
				signal_rx,
			},
			signal_tx,
		)
	}
}

#[async_trait]
impl Task<SampleError> for WaitSignalTask {
	fn id(&self) -> TaskId {
		self.id
	}

	async fn run(&mut self, _interrupter: &Interrupter) -> Result<ExecStatus, SampleError> {
		self.signal_rx
			.recv()
			.await
			.expect("signal channel closed before signaling");

		Ok(ExecStatus::Done(TaskOutput::Empty))
	}
}

/// Spins until it gets canceled, reporting back once it started running.
#[derive(Debug)]
pub struct CancelAwareTask {
	id: TaskId,
	began_tx: Option<oneshot::Sender<()>>,
}

impl CancelAwareTask {
	pub fn new() -> (Self, oneshot::Receiver<()>) {
		let (began_tx, began_rx) = oneshot::channel();
		(
			Self {
				id: TaskId::new_v4(),
				began_tx: Some(began_tx),
			},
			began_rx,
		)
	}
}

#[async_trait]
impl Task<SampleError> for CancelAwareTask {
	fn id(&self) -> TaskId {
		self.id
	}

	async fn run(&mut self, interrupter: &Interrupter) -> Result<ExecStatus, SampleError> {
		if let Some(began_tx) = self.began_tx.take() {
			began_tx.send(()).expect("began_rx dropped");
		}

		loop {
			if interrupter.is_canceled() {
				info!("Canceling CancelAwareTask <id='{}'>", self.id);
				return Ok(ExecStatus::Canceled);
			}

			sleep(Duration::from_millis(5)).await;
		}
	}
}

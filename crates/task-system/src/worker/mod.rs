use std::sync::{atomic::AtomicBool, Arc};

use async_channel as chan;
use tokio::{spawn, task::JoinHandle};
use tracing::{error, info, instrument, trace, Instrument};

use super::{error::RunError, task::TaskWorkState};

mod run;

use run::run;

pub type WorkerId = usize;

#[derive(Debug)]
pub struct Worker {
	pub id: WorkerId,
	handle: JoinHandle<()>,
}

impl Worker {
	#[instrument(name = "task_system_worker", skip(tasks_rx, is_shutting_down))]
	pub fn spawn<E: RunError>(
		id: WorkerId,
		tasks_rx: chan::Receiver<TaskWorkState<E>>,
		is_shutting_down: Arc<AtomicBool>,
	) -> Self {
		let handle = spawn(
			async move {
				trace!("Worker message processing task starting...");
				while let Err(e) = spawn(
					run(id, tasks_rx.clone(), Arc::clone(&is_shutting_down)).in_current_span(),
				)
				.await
				{
					if e.is_panic() {
						error!(?e, "Worker critically failed and will restart;");
					} else {
						trace!("Worker was cancelled and will exit...");
						break;
					}
				}

				info!("Worker gracefully shutdown");
			}
			.in_current_span(),
		);

		Self { id, handle }
	}

	#[instrument(skip(self), fields(worker_id = self.id))]
	pub async fn shutdown(self) {
		if let Err(e) = self.handle.await {
			if e.is_panic() {
				error!("Worker {} critically failed: {e:#?}", self.id);
			}
		}
	}
}

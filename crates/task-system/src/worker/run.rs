use std::{
	panic::AssertUnwindSafe,
	pin::pin,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use async_channel as chan;
use futures::{FutureExt, StreamExt};
use tracing::{error, instrument, trace};

use super::{
	super::{
		error::{RunError, SystemError},
		task::{ExecStatus, Interrupter, TaskStatus, TaskWorkState},
	},
	WorkerId,
};

/// Pulls tasks from the shared queue until it is closed and drained.
///
/// Once the system starts shutting down, any task still in the queue is given back to its
/// dispatcher instead of being run.
pub(super) async fn run<E: RunError>(
	worker_id: WorkerId,
	tasks_rx: chan::Receiver<TaskWorkState<E>>,
	is_shutting_down: Arc<AtomicBool>,
) {
	let mut tasks_stream = pin!(tasks_rx);

	while let Some(work_state) = tasks_stream.next().await {
		if is_shutting_down.load(Ordering::Acquire) {
			give_back_on_shutdown(work_state);
		} else {
			run_single_task(worker_id, work_state).await;
		}
	}

	trace!(%worker_id, "Tasks queue closed, worker run loop is exiting");
}

fn give_back_on_shutdown<E: RunError>(
	TaskWorkState {
		task,
		worktable,
		done_tx,
	}: TaskWorkState<E>,
) {
	let task_id = task.id();
	trace!(%task_id, "Giving back task due to shutdown");

	worktable.set_finished();

	if done_tx.send(Ok(TaskStatus::Shutdown(task))).is_err() {
		trace!(%task_id, "Task handle was dropped before receiving its shutdown status");
	}
}

#[instrument(skip(work_state), fields(task_id = %work_state.id()))]
async fn run_single_task<E: RunError>(worker_id: WorkerId, work_state: TaskWorkState<E>) {
	let TaskWorkState {
		mut task,
		worktable,
		done_tx,
	} = work_state;

	let task_id = task.id();

	let status = if worktable.has_canceled() {
		trace!("Task was canceled before it started running");
		Ok(TaskStatus::Canceled)
	} else {
		worktable.set_started();

		let interrupter = Interrupter::new(Arc::clone(&worktable));

		match AssertUnwindSafe(task.run(&interrupter)).catch_unwind().await {
			Ok(Ok(ExecStatus::Done(out))) => {
				trace!("Task done");
				Ok(TaskStatus::Done((task_id, out)))
			}
			Ok(Ok(ExecStatus::Canceled)) => {
				trace!("Task canceled itself");
				Ok(TaskStatus::Canceled)
			}
			Ok(Err(e)) => {
				trace!(?e, "Task failed");
				Ok(TaskStatus::Error(e))
			}
			Err(_) => {
				error!(%worker_id, "Task panicked while running");
				Err(SystemError::TaskPanicked(task_id))
			}
		}
	};

	worktable.set_finished();

	if done_tx.send(status).is_err() {
		trace!("Task handle was dropped before receiving the task status");
	}
}

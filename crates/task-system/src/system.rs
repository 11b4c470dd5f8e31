use std::{
	mem,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use async_channel as chan;
use futures_concurrency::future::Join;
use tokio::sync::Mutex;
use tracing::{error, trace, warn};

use super::{
	error::{DispatcherShutdownError, RunError},
	task::{IntoTask, Task, TaskHandle, TaskWorkState},
	worker::Worker,
};

const QUEUE_SLOTS_PER_WORKER: usize = 8;

/// The task system is the main entry point for dispatching tasks to a pool of workers.
///
/// The amount of workers follows the available parallelism of the machine and can't be configured.
#[derive(Debug)]
pub struct System<E: RunError> {
	workers: Mutex<Vec<Worker>>,
	workers_count: usize,
	dispatcher: Dispatcher<E>,
}

impl<E: RunError> System<E> {
	/// Spawns the workers on the current tokio runtime.
	///
	/// # Panics
	///
	/// Panics if called outside of a tokio runtime.
	#[must_use]
	pub fn new() -> Self {
		let workers_count = std::thread::available_parallelism().map_or_else(
			|e| {
				error!("Failed to get available parallelism in the task system: {e:#?}");
				1
			},
			|non_zero| non_zero.get(),
		);

		let (tasks_tx, tasks_rx) = chan::bounded(workers_count * QUEUE_SLOTS_PER_WORKER);
		let is_shutting_down = Arc::new(AtomicBool::new(false));

		let workers = (0..workers_count)
			.map(|id| Worker::spawn(id, tasks_rx.clone(), Arc::clone(&is_shutting_down)))
			.collect::<Vec<_>>();

		trace!(%workers_count, "Task system started");

		Self {
			workers: Mutex::new(workers),
			workers_count,
			dispatcher: Dispatcher {
				tasks_tx,
				is_shutting_down,
			},
		}
	}

	/// Returns the number of workers in the system.
	#[must_use]
	pub const fn workers_count(&self) -> usize {
		self.workers_count
	}

	/// Dispatches a task to the system, the task will be enqueued and executed by the first free worker.
	pub async fn dispatch(
		&self,
		into_task: impl IntoTask<E>,
	) -> Result<TaskHandle<E>, DispatcherShutdownError<E>> {
		self.dispatcher.dispatch(into_task).await
	}

	/// Dispatches many tasks to the system, in the order they were given.
	pub async fn dispatch_many<T, I>(
		&self,
		into_tasks: I,
	) -> Result<Vec<TaskHandle<E>>, DispatcherShutdownError<E>>
	where
		T: IntoTask<E>,
		I: IntoIterator<Item = T>,
		I::IntoIter: Send,
	{
		self.dispatcher.dispatch_many(into_tasks).await
	}

	/// Returns a dispatcher that can be used to remotely dispatch tasks to the system.
	#[must_use]
	pub fn get_dispatcher(&self) -> Dispatcher<E> {
		self.dispatcher.clone()
	}

	/// Shuts down the system, tasks still in the queue are given back as [`TaskStatus::Shutdown`],
	/// running tasks are awaited.
	///
	/// [`TaskStatus::Shutdown`]: crate::TaskStatus::Shutdown
	pub async fn shutdown(&self) {
		if self.dispatcher.is_shutting_down.swap(true, Ordering::AcqRel) {
			warn!("Trying to shutdown the tasks system that was already shutdown");
			return;
		}

		self.dispatcher.tasks_tx.close();

		let workers = mem::take(&mut *self.workers.lock().await);

		workers
			.into_iter()
			.map(Worker::shutdown)
			.collect::<Vec<_>>()
			.join()
			.await;

		trace!("Task system shutdown");
	}
}

impl<E: RunError> Default for System<E> {
	fn default() -> Self {
		Self::new()
	}
}

impl<E: RunError> Drop for System<E> {
	fn drop(&mut self) {
		if !self.dispatcher.is_shutting_down.swap(true, Ordering::AcqRel) {
			trace!("Task system dropped without shutdown, closing its queue");
			self.dispatcher.tasks_tx.close();
		}
	}
}

/// A remote dispatcher of tasks, cheap to clone and share with anyone who needs to dispatch tasks.
#[derive(Debug)]
pub struct Dispatcher<E: RunError> {
	tasks_tx: chan::Sender<TaskWorkState<E>>,
	is_shutting_down: Arc<AtomicBool>,
}

impl<E: RunError> Clone for Dispatcher<E> {
	fn clone(&self) -> Self {
		Self {
			tasks_tx: self.tasks_tx.clone(),
			is_shutting_down: Arc::clone(&self.is_shutting_down),
		}
	}
}

impl<E: RunError> Dispatcher<E> {
	/// Dispatches a task to the system, the task will be enqueued and executed by the first free worker.
	pub async fn dispatch(
		&self,
		into_task: impl IntoTask<E>,
	) -> Result<TaskHandle<E>, DispatcherShutdownError<E>> {
		self.dispatch_boxed(into_task.into_task())
			.await
			.map_err(|task| DispatcherShutdownError(vec![task]))
	}

	/// Dispatches many tasks to the system, in the order they were given.
	///
	/// If the system shuts down midway, every task that couldn't be enqueued is returned in the error.
	pub async fn dispatch_many<T, I>(
		&self,
		into_tasks: I,
	) -> Result<Vec<TaskHandle<E>>, DispatcherShutdownError<E>>
	where
		T: IntoTask<E>,
		I: IntoIterator<Item = T>,
		I::IntoIter: Send,
	{
		let mut tasks = into_tasks.into_iter().map(IntoTask::into_task);
		let mut handles = Vec::with_capacity(tasks.size_hint().0);

		while let Some(task) = tasks.next() {
			match self.dispatch_boxed(task).await {
				Ok(handle) => handles.push(handle),
				Err(rejected) => {
					return Err(DispatcherShutdownError(
						std::iter::once(rejected).chain(tasks).collect(),
					));
				}
			}
		}

		Ok(handles)
	}

	async fn dispatch_boxed(&self, task: Box<dyn Task<E>>) -> Result<TaskHandle<E>, Box<dyn Task<E>>> {
		if self.is_shutting_down.load(Ordering::Acquire) {
			warn!("Dispatcher is shutting down, rejecting task");
			return Err(task);
		}

		let (work_state, handle) = TaskWorkState::new(task);

		self.tasks_tx
			.send(work_state)
			.await
			.map_err(|chan::SendError(work_state)| work_state.task)?;

		Ok(handle)
	}
}

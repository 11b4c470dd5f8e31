use std::{
	fmt,
	future::Future,
	pin::Pin,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
	task::{Context, Poll},
};

use async_trait::async_trait;
use downcast_rs::{impl_downcast, Downcast};
use tokio::sync::oneshot;
use tracing::{instrument, trace};
use uuid::Uuid;

use super::error::{RunError, SystemError};

/// A unique identifier for a task using the [`uuid`](https://docs.rs/uuid) crate.
pub type TaskId = Uuid;

/// A trait that represents any kind of output that a task can return.
///
/// The user will downcast it to the concrete type that the task returns. Most of the time,
/// tasks will not return anything, so it isn't a costly abstraction, as only a heap allocation
/// is needed when the user wants to return a [`Box<dyn AnyTaskOutput>`].
pub trait AnyTaskOutput: Send + Downcast + 'static {}

impl fmt::Debug for Box<dyn AnyTaskOutput> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<AnyTaskOutput>")
	}
}

impl_downcast!(AnyTaskOutput);

/// Blanket implementation for all types that implements `Send + 'static`
impl<T: Send + 'static> AnyTaskOutput for T {}

/// A helper trait to convert any type that implements [`AnyTaskOutput`] into a [`TaskOutput`], boxing it.
pub trait IntoAnyTaskOutput {
	fn into_output(self) -> TaskOutput;
}

/// Blanket implementation for all types that implements [`AnyTaskOutput`]
impl<T: AnyTaskOutput + 'static> IntoAnyTaskOutput for T {
	fn into_output(self) -> TaskOutput {
		TaskOutput::Out(Box::new(self))
	}
}

/// An enum representing whether a task returned anything or not.
#[derive(Debug)]
pub enum TaskOutput {
	Out(Box<dyn AnyTaskOutput>),
	Empty,
}

impl From<()> for TaskOutput {
	fn from((): ()) -> Self {
		Self::Empty
	}
}

/// An enum representing all possible outcomes for a task.
#[derive(Debug)]
pub enum TaskStatus<E: RunError> {
	/// The task has finished successfully and maybe has some output for the user.
	Done((TaskId, TaskOutput)),
	/// Task was gracefully cancelled, either before it started or by its own decision while running.
	Canceled,
	/// The task system was shutdown before this task could start, so we give it back to the user.
	Shutdown(Box<dyn Task<E>>),
	/// Task had an error so we return it back and the user can handle it appropriately.
	Error(E),
}

/// Represents whether the current [`Task::run`] method on a task finished successfully or was
/// interrupted.
#[derive(Debug)]
pub enum ExecStatus {
	Done(TaskOutput),
	Canceled,
}

/// A helper trait to convert any type that implements [`Task<E>`] into a [`Box<dyn Task<E>>`], boxing it.
pub trait IntoTask<E>: Send {
	fn into_task(self) -> Box<dyn Task<E>>;
}

/// Blanket implementation for all types that implements [`Task<E>`] and `'static`
impl<T: Task<E> + 'static, E: RunError> IntoTask<E> for T {
	fn into_task(self) -> Box<dyn Task<E>> {
		Box::new(self)
	}
}

/// The main trait that represents a task that can be dispatched to the task system.
///
/// All tasks in the task system must return the same generic error type, so we can have a unified
/// error handling.
///
/// We're currently using the [`async_trait`](https://docs.rs/async-trait) crate to allow dyn async traits,
/// due to a limitation in the Rust language.
#[async_trait]
pub trait Task<E: RunError>: Downcast + Send + Sync + 'static {
	/// An unique identifier for the task, it will be used to identify the task on the system and also to the user.
	fn id(&self) -> TaskId;

	/// This method represent the work that should be done by the worker, it will be called by the
	/// worker when it pulls this task from the queue.
	///
	/// The [`interrupter`](Interrupter) can be checked at any safe point to know if the user requested
	/// a cancellation, returning [`ExecStatus::Canceled`] in that case.
	async fn run(&mut self, interrupter: &Interrupter) -> Result<ExecStatus, E>;
}

impl_downcast!(Task<E> where E: RunError);

impl<E: RunError> fmt::Debug for Box<dyn Task<E>> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "<Task>")
	}
}

/// A helper object handed to running tasks, to check if the user requested a cancel so the task `run`
/// implementation can decide the appropriated moment to stop.
#[derive(Debug)]
pub struct Interrupter {
	worktable: Arc<TaskWorktable>,
}

impl Interrupter {
	pub(crate) const fn new(worktable: Arc<TaskWorktable>) -> Self {
		Self { worktable }
	}

	/// Non-blocking check for a cancel request.
	#[must_use]
	pub fn is_canceled(&self) -> bool {
		let canceled = self.worktable.has_canceled();
		if canceled {
			trace!("Interrupter observed a cancel request");
		}

		canceled
	}
}

/// A handle returned when a task is dispatched to the task system, it can be used to cancel or to wait
/// until the task gets completed.
#[derive(Debug)]
pub struct TaskHandle<E: RunError> {
	pub(crate) done_rx: oneshot::Receiver<Result<TaskStatus<E>, SystemError>>,
	pub(crate) worktable: Arc<TaskWorktable>,
	pub(crate) task_id: TaskId,
}

impl<E: RunError> Future for TaskHandle<E> {
	type Output = Result<TaskStatus<E>, SystemError>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let task_id = self.task_id;

		Pin::new(&mut self.done_rx)
			.poll(cx)
			.map(|res| res.unwrap_or(Err(SystemError::TaskJoin(task_id))))
	}
}

impl<E: RunError> TaskHandle<E> {
	/// Get the unique identifier of the task
	#[must_use]
	pub const fn task_id(&self) -> TaskId {
		self.task_id
	}

	/// Gracefully cancel the task. A task that didn't start yet will never run, a running task will
	/// see the request through its [`Interrupter`].
	#[instrument(skip(self), fields(task_id = %self.task_id))]
	pub fn cancel(&self) {
		if self.worktable.is_done() {
			trace!("Task is already done, will not cancel");
			return;
		}

		trace!("Received cancel command task");
		self.worktable.has_canceled.store(true, Ordering::Release);
	}

	/// Verify if a worker is currently running the task
	#[must_use]
	pub fn is_running(&self) -> bool {
		self.worktable.is_running()
	}

	/// Verify if the task was already completed
	#[must_use]
	pub fn is_done(&self) -> bool {
		self.worktable.is_done()
	}
}

#[derive(Debug, Default)]
pub(crate) struct TaskWorktable {
	is_running: AtomicBool,
	is_done: AtomicBool,
	has_canceled: AtomicBool,
}

impl TaskWorktable {
	pub fn set_started(&self) {
		self.is_running.store(true, Ordering::Relaxed);
	}

	pub fn set_finished(&self) {
		self.is_done.store(true, Ordering::Release);
		self.is_running.store(false, Ordering::Relaxed);
	}

	pub fn is_done(&self) -> bool {
		self.is_done.load(Ordering::Acquire)
	}

	pub fn is_running(&self) -> bool {
		self.is_running.load(Ordering::Acquire)
	}

	pub fn has_canceled(&self) -> bool {
		self.has_canceled.load(Ordering::Acquire)
	}
}

#[derive(Debug)]
pub(crate) struct TaskWorkState<E: RunError> {
	pub(crate) task: Box<dyn Task<E>>,
	pub(crate) worktable: Arc<TaskWorktable>,
	pub(crate) done_tx: oneshot::Sender<Result<TaskStatus<E>, SystemError>>,
}

impl<E: RunError> TaskWorkState<E> {
	pub fn new(task: Box<dyn Task<E>>) -> (Self, TaskHandle<E>) {
		let (done_tx, done_rx) = oneshot::channel();
		let worktable = Arc::new(TaskWorktable::default());
		let task_id = task.id();

		(
			Self {
				task,
				worktable: Arc::clone(&worktable),
				done_tx,
			},
			TaskHandle {
				done_rx,
				worktable,
				task_id,
			},
		)
	}

	#[inline]
	pub fn id(&self) -> TaskId {
		self.task.id()
	}
}

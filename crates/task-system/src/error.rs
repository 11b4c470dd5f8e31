use std::{error::Error, fmt};

use thiserror::Error;

use super::task::{Task, TaskId};

/// Task system's error type definition, representing when internal errors occurs.
#[derive(Debug, Error)]
pub enum SystemError {
	#[error("task panicked while running <id='{0}'>")]
	TaskPanicked(TaskId),
	#[error("task status channel closed before a status was sent <id='{0}'>")]
	TaskJoin(TaskId),
}

/// Trait for errors that can be returned by tasks, we use this trait as a bound for the task system generic
/// error type.
///
/// With this trait, we can have a unified error type through all the tasks in the system.
pub trait RunError: Error + fmt::Debug + Send + Sync + 'static {}

/// We provide a blanket implementation for all types that also implements
/// [`std::error::Error`](https://doc.rust-lang.org/std/error/trait.Error.html) and
/// [`std::fmt::Debug`](https://doc.rust-lang.org/std/fmt/trait.Debug.html).
impl<T: Error + fmt::Debug + Send + Sync + 'static> RunError for T {}

/// Returned when trying to dispatch tasks to a task system that was already shutdown. The tasks that
/// couldn't be dispatched are given back so the caller can decide what to do with them.
#[derive(Debug, Error)]
#[error("task system is shutdown, dispatcher can't dispatch new tasks")]
pub struct DispatcherShutdownError<E: RunError>(pub Vec<Box<dyn Task<E>>>);

//!
//! # Task System
//!
//! A bounded pool of workers that execute tasks concurrently.
//!
//! Bring your own unified error type and dispatch some tasks, the system will handle enqueueing,
//! parallel execution, and error handling for you:
//! - One worker per available CPU core, all pulling from the same bounded queue;
//! - Cooperative cancellation through each task's [`TaskHandle`] and [`Interrupter`];
//! - Panicking tasks are reported back to their dispatcher without taking a worker down;
//! - When the system is shutdown, tasks that didn't start yet are given back to their dispatchers.
//!
//! ## Basic example
//!
//! ```
//! use dy_task_system::{ExecStatus, Interrupter, Task, TaskId, TaskOutput, TaskStatus, TaskSystem};
//! use async_trait::async_trait;
//! use thiserror::Error;
//!
//! #[derive(Debug, Error)]
//! pub enum SampleError {
//!     #[error("Sample error")]
//!     SampleError,
//! }
//!
//! #[derive(Debug)]
//! pub struct ReadyTask {
//!     id: TaskId,
//! }
//!
//! #[async_trait]
//! impl Task<SampleError> for ReadyTask {
//!     fn id(&self) -> TaskId {
//!         self.id
//!     }
//!
//!     async fn run(&mut self, _interrupter: &Interrupter) -> Result<ExecStatus, SampleError> {
//!         Ok(ExecStatus::Done(TaskOutput::Empty))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let system = TaskSystem::new();
//!
//!     let handle = system
//!         .dispatch(ReadyTask { id: TaskId::new_v4() })
//!         .await
//!         .unwrap();
//!
//!     assert!(matches!(
//!         handle.await,
//!         Ok(TaskStatus::Done((_, TaskOutput::Empty)))
//!     ));
//!
//!     system.shutdown().await;
//! }
//! ```

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
	clippy::unnecessary_cast,
	clippy::cast_lossless,
	clippy::cast_possible_truncation,
	clippy::cast_possible_wrap,
	clippy::cast_precision_loss,
	clippy::cast_sign_loss,
	clippy::dbg_macro,
	clippy::deprecated_cfg_attr,
	clippy::separated_literal_suffix,
	deprecated
)]
#![forbid(deprecated_in_future)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod error;
mod system;
mod task;
mod worker;

pub use error::{DispatcherShutdownError, RunError, SystemError as TaskSystemError};
pub use system::{Dispatcher as TaskDispatcher, System as TaskSystem};
pub use task::{
	AnyTaskOutput, ExecStatus, Interrupter, IntoAnyTaskOutput, IntoTask, Task, TaskHandle, TaskId,
	TaskOutput, TaskStatus,
};
pub use worker::WorkerId;

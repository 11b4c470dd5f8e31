use std::{
	fmt,
	path::PathBuf,
	sync::{
		atomic::{AtomicBool, Ordering},
		Arc,
	},
};

use serde::Serialize;

pub type ProgressCallback = Box<dyn Fn(ProgressEvent) + Send + Sync>;
pub type CancelPredicate = Arc<dyn Fn() -> bool + Send + Sync>;
pub type CompletionCallback = Box<dyn FnOnce(DumpResult) + Send>;

/// Emitted once per settled unit, whatever its outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
	/// Units settled so far, never decreases within a dump.
	pub completed: usize,
	/// Units requested, fixed when the dump starts.
	pub total: usize,
	pub current_name: String,
}

/// Terminal state of a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DumpState {
	Completed,
	Cancelled,
}

/// Delivered exactly once per dump, through the completion callback and as the dump's return value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DumpResult {
	pub cancelled: bool,
	pub dumped: usize,
	pub skipped: usize,
	pub errors: usize,
	pub total: usize,
	/// Where the declarations were written, `None` when the directory couldn't be created.
	pub output_directory: Option<PathBuf>,
}

impl DumpResult {
	pub(crate) const fn new(total: usize, output_directory: PathBuf) -> Self {
		Self {
			cancelled: false,
			dumped: 0,
			skipped: 0,
			errors: 0,
			total,
			output_directory: Some(output_directory),
		}
	}

	/// Every requested unit counted as an error, nothing was attempted.
	pub(crate) const fn aborted(total: usize) -> Self {
		Self {
			cancelled: false,
			dumped: 0,
			skipped: 0,
			errors: total,
			total,
			output_directory: None,
		}
	}

	#[must_use]
	pub const fn settled(&self) -> usize {
		self.dumped + self.skipped + self.errors
	}

	#[must_use]
	pub const fn state(&self) -> DumpState {
		if self.cancelled {
			DumpState::Cancelled
		} else {
			DumpState::Completed
		}
	}
}

/// Optional callbacks attached to a dump.
#[derive(Default)]
pub struct DumpHooks {
	pub(crate) on_progress: Option<ProgressCallback>,
	pub(crate) is_cancelled: Option<CancelPredicate>,
	pub(crate) on_complete: Option<CompletionCallback>,
}

impl fmt::Debug for DumpHooks {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("DumpHooks")
			.field("on_progress", &self.on_progress.is_some())
			.field("is_cancelled", &self.is_cancelled.is_some())
			.field("on_complete", &self.on_complete.is_some())
			.finish()
	}
}

impl DumpHooks {
	#[must_use]
	pub fn new() -> Self {
		Self::default()
	}

	/// Called after every unit settles, from the task driving the dump.
	#[must_use]
	pub fn on_progress(mut self, on_progress: impl Fn(ProgressEvent) + Send + Sync + 'static) -> Self {
		self.on_progress = Some(Box::new(on_progress));
		self
	}

	/// Polled by each unit right before it starts, concurrently from many workers.
	#[must_use]
	pub fn cancel_when(mut self, is_cancelled: impl Fn() -> bool + Send + Sync + 'static) -> Self {
		self.is_cancelled = Some(Arc::new(is_cancelled));
		self
	}

	/// Shorthand for [`DumpHooks::cancel_when`] reading a shared flag.
	#[must_use]
	pub fn cancel_flag(self, flag: Arc<AtomicBool>) -> Self {
		self.cancel_when(move || flag.load(Ordering::Acquire))
	}

	#[must_use]
	pub fn on_complete(mut self, on_complete: impl FnOnce(DumpResult) + Send + 'static) -> Self {
		self.on_complete = Some(Box::new(on_complete));
		self
	}
}

/// Cancellation state shared by every unit of one dump.
pub(crate) struct Cancellation {
	predicate: Option<CancelPredicate>,
	observed: AtomicBool,
}

impl Cancellation {
	pub fn new(predicate: Option<CancelPredicate>) -> Self {
		Self {
			predicate,
			observed: AtomicBool::new(false),
		}
	}

	/// Sticky: once the predicate answered `true` it isn't polled anymore.
	pub fn poll(&self) -> bool {
		if self.was_observed() {
			return true;
		}

		let cancelled = self.predicate.as_ref().is_some_and(|is_cancelled| is_cancelled());
		if cancelled {
			self.observed.store(true, Ordering::Release);
		}

		cancelled
	}

	pub fn was_observed(&self) -> bool {
		self.observed.load(Ordering::Acquire)
	}
}

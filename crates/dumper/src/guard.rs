use std::sync::atomic::{AtomicBool, Ordering};

/// Gates the full-catalog dump, only `dump_all` consults it.
///
/// Starts released at process start, is never reset.
pub(crate) static FULL_DUMP_GUARD: DumpGuard = DumpGuard::new();

/// One-shot permission flag, only exposed through an atomic check-and-set.
#[derive(Debug, Default)]
pub struct DumpGuard {
	acquired: AtomicBool,
}

impl DumpGuard {
	#[must_use]
	pub const fn new() -> Self {
		Self {
			acquired: AtomicBool::new(false),
		}
	}

	/// Returns `true` only for the very first call, every later call (from any thread) gets `false`.
	pub fn try_acquire(&self) -> bool {
		self.acquired
			.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
			.is_ok()
	}
}

use std::sync::Arc;

use dy_task_system::{
	DispatcherShutdownError, TaskDispatcher, TaskOutput, TaskStatus, TaskSystem, TaskSystemError,
};

use async_channel as chan;
use futures_concurrency::future::Join;
use tokio::{spawn, task::JoinHandle};
use tracing::{debug, error, info, instrument, trace, warn};

use super::{
	catalog::TypeCatalog,
	config::DumperConfig,
	error::DumpError,
	guard::{DumpGuard, FULL_DUMP_GUARD},
	namer::generate_name,
	options::DumpOptions,
	output::create_output_directory,
	progress::{Cancellation, CompletionCallback, DumpHooks, DumpResult, ProgressEvent},
	provider::{TypeMetadataProvider, TypeRenderer},
	tasks::{RenderTask, RenderUnit, RenderedType},
};

/// How a single render unit settled, exactly one counter is bumped for each.
#[derive(Debug)]
enum UnitOutcome {
	Dumped,
	Skipped,
	Failed(String),
}

impl From<Result<TaskStatus<DumpError>, TaskSystemError>> for UnitOutcome {
	fn from(status: Result<TaskStatus<DumpError>, TaskSystemError>) -> Self {
		match status {
			Ok(TaskStatus::Done((task_id, out))) => {
				if let TaskOutput::Out(out) = out {
					if let Ok(rendered) = out.downcast::<RenderedType>() {
						trace!(
							%task_id,
							path = %rendered.path.display(),
							bytes = rendered.bytes,
							"Render unit done",
						);
					}
				}
				Self::Dumped
			}
			Ok(TaskStatus::Canceled) => Self::Skipped,
			Ok(TaskStatus::Shutdown(_)) => {
				Self::Failed("task system shut down before the type was rendered".to_string())
			}
			Ok(TaskStatus::Error(e)) => Self::Failed(e.to_string()),
			Err(e) => Self::Failed(e.to_string()),
		}
	}
}

/// Renders the running process' types into one declaration file per type.
///
/// Every dump gets its own output directory and runs its render units on a shared pool of workers,
/// sized after the machine's available parallelism.
pub struct HeaderDumper {
	config: DumperConfig,
	provider: Arc<dyn TypeMetadataProvider>,
	renderer: Arc<dyn TypeRenderer>,
	system: TaskSystem<DumpError>,
}

impl HeaderDumper {
	/// Starts the worker pool on the current tokio runtime.
	///
	/// # Panics
	///
	/// Panics if called outside of a tokio runtime.
	#[must_use]
	pub fn new(
		config: DumperConfig,
		provider: Arc<dyn TypeMetadataProvider>,
		renderer: Arc<dyn TypeRenderer>,
	) -> Self {
		let system = TaskSystem::new();

		debug!(
			app_name = %config.app_name,
			base_directory = %config.base_directory.display(),
			workers_count = system.workers_count(),
			"Header dumper started",
		);

		Self {
			config,
			provider,
			renderer,
			system,
		}
	}

	/// A dumper backed by a single catalog acting as both provider and renderer.
	#[must_use]
	pub fn with_catalog(config: DumperConfig, catalog: TypeCatalog) -> Self {
		let catalog = Arc::new(catalog);
		let provider: Arc<dyn TypeMetadataProvider> = Arc::<TypeCatalog>::clone(&catalog);

		Self::new(config, provider, catalog)
	}

	#[must_use]
	pub const fn config(&self) -> &DumperConfig {
		&self.config
	}

	/// `{app_name}_headers_{YYYY-MM-dd_HH-mm-ss}` for the current local time.
	#[must_use]
	pub fn output_directory_name(&self) -> String {
		generate_name(&self.config.app_name, &chrono::Local::now())
	}

	/// Dumps every type the provider knows about, with default options.
	///
	/// Only the first call in the process lifetime does anything, every later call returns `None`
	/// without touching the filesystem.
	pub async fn dump_all(&self) -> Option<DumpResult> {
		self.dump_all_guarded(&FULL_DUMP_GUARD).await
	}

	pub(crate) async fn dump_all_guarded(&self, guard: &DumpGuard) -> Option<DumpResult> {
		if !guard.try_acquire() {
			info!("Full catalog dump already ran in this process, skipping");
			return None;
		}

		let names = self.provider.all_type_names();

		Some(
			self.dump_explicit(names, &DumpOptions::default(), DumpHooks::default())
				.await,
		)
	}

	/// Spawns [`HeaderDumper::dump_all`] on the current runtime.
	pub fn dump_all_detached(self: &Arc<Self>) -> JoinHandle<Option<DumpResult>> {
		let this = Arc::clone(self);

		spawn(async move { this.dump_all().await })
	}

	/// Dumps the given types, in order, into a fresh output directory.
	///
	/// Never fails as a whole: failures of single types are counted as errors, and if the output
	/// directory can't be created every requested type is. The result is also handed to the
	/// completion hook, exactly once.
	#[instrument(skip_all, fields(total = tracing::field::Empty))]
	pub async fn dump_explicit<I, S>(
		&self,
		names: I,
		options: &DumpOptions,
		hooks: DumpHooks,
	) -> DumpResult
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let names = names.into_iter().map(Into::into).collect::<Vec<String>>();
		let total = names.len();
		tracing::Span::current().record("total", total);

		let DumpHooks {
			on_progress,
			is_cancelled,
			on_complete,
		} = hooks;

		let output_directory = match create_output_directory(
			&self.config.base_directory,
			&self.output_directory_name(),
			options.output_directory.as_deref(),
		)
		.await
		{
			Ok(output_directory) => output_directory,
			Err(e) => {
				error!(?e, "Failed to create output directory, aborting dump;");
				return complete(DumpResult::aborted(total), on_complete);
			}
		};

		info!(
			output_directory = %output_directory.display(),
			"Dumping {total} types",
		);

		let unit = Arc::new(RenderUnit {
			renderer: Arc::clone(&self.renderer),
			output_directory: output_directory.clone(),
			file_extension: options.file_extension(),
			render_options: options.render_options(),
			cancellation: Cancellation::new(is_cancelled),
		});

		let (outcomes_tx, outcomes_rx) = chan::unbounded();

		let dispatch = dispatch_units(
			self.system.get_dispatcher(),
			names,
			Arc::clone(&unit),
			outcomes_tx,
		);

		let collect = async {
			let mut result = DumpResult::new(total, output_directory);
			let mut completed = 0;

			while completed < total {
				let Ok((type_name, outcome)) = outcomes_rx.recv().await else {
					break;
				};

				completed += 1;

				match outcome {
					UnitOutcome::Dumped => result.dumped += 1,
					UnitOutcome::Skipped => result.skipped += 1,
					UnitOutcome::Failed(reason) => {
						error!(%type_name, %reason, "Failed to dump type;");
						result.errors += 1;
					}
				}

				if let Some(on_progress) = &on_progress {
					on_progress(ProgressEvent {
						completed,
						total,
						current_name: type_name,
					});
				}
			}

			if completed < total {
				warn!(
					missing = total - completed,
					"Render units vanished without reporting, counting them as errors",
				);
				result.errors += total - completed;
			}

			result
		};

		let ((), mut result) = (dispatch, collect).join().await;

		result.cancelled = unit.cancellation.was_observed();

		info!(
			cancelled = result.cancelled,
			dumped = result.dumped,
			skipped = result.skipped,
			errors = result.errors,
			"Dump finished",
		);

		complete(result, on_complete)
	}

	/// Fire-and-forget [`HeaderDumper::dump_explicit`], without any hooks.
	pub fn dump_explicit_detached(
		self: &Arc<Self>,
		names: Vec<String>,
		options: DumpOptions,
	) -> JoinHandle<DumpResult> {
		let this = Arc::clone(self);

		spawn(async move {
			this.dump_explicit(names, &options, DumpHooks::default())
				.await
		})
	}

	/// Stops the workers, units still queued by a running dump are counted as errors.
	pub async fn shutdown(&self) {
		self.system.shutdown().await;
	}
}

/// Enqueues one unit per name, a unit is only skipped here once cancellation was observed.
///
/// Each dispatched unit gets a waiter forwarding its status, so the queue's backpressure never
/// holds back outcomes of units already running.
async fn dispatch_units(
	dispatcher: TaskDispatcher<DumpError>,
	names: Vec<String>,
	unit: Arc<RenderUnit>,
	outcomes_tx: chan::Sender<(String, UnitOutcome)>,
) {
	for type_name in names {
		if unit.cancellation.was_observed() {
			trace!(%type_name, "Dump was cancelled, not dispatching type");
			send_outcome(&outcomes_tx, type_name, UnitOutcome::Skipped).await;
			continue;
		}

		match dispatcher
			.dispatch(RenderTask::new(type_name.clone(), Arc::clone(&unit)))
			.await
		{
			Ok(handle) => {
				let outcomes_tx = outcomes_tx.clone();

				spawn(async move {
					let outcome = UnitOutcome::from(handle.await);
					send_outcome(&outcomes_tx, type_name, outcome).await;
				});
			}

			Err(DispatcherShutdownError(tasks)) => {
				for task in tasks {
					let type_name = task
						.downcast::<RenderTask>()
						.map_or_else(|_| type_name.clone(), |task| task.type_name().to_string());

					send_outcome(
						&outcomes_tx,
						type_name,
						UnitOutcome::Failed("task system is shutting down".to_string()),
					)
					.await;
				}
			}
		}
	}
}

async fn send_outcome(
	outcomes_tx: &chan::Sender<(String, UnitOutcome)>,
	type_name: String,
	outcome: UnitOutcome,
) {
	if outcomes_tx.send((type_name, outcome)).await.is_err() {
		trace!("Dump collector is gone, dropping unit outcome");
	}
}

fn complete(result: DumpResult, on_complete: Option<CompletionCallback>) -> DumpResult {
	if let Some(on_complete) = on_complete {
		on_complete(result.clone());
	}

	result
}

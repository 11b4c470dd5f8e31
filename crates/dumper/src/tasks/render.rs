use std::{path::PathBuf, sync::Arc};

use dy_task_system::{ExecStatus, Interrupter, IntoAnyTaskOutput, Task, TaskId};
use dy_utils::error::FileIOError;

use async_trait::async_trait;
use tokio::{fs, task::spawn_blocking};
use tracing::{error, trace};

use super::super::{
	error::DumpError,
	options::RenderOptions,
	output::declaration_file_name,
	progress::Cancellation,
	provider::TypeRenderer,
};

/// State shared by every unit of one dump.
pub(crate) struct RenderUnit {
	pub renderer: Arc<dyn TypeRenderer>,
	pub output_directory: PathBuf,
	pub file_extension: String,
	pub render_options: RenderOptions,
	pub cancellation: Cancellation,
}

/// Output of a unit that wrote its declaration file.
#[derive(Debug)]
pub(crate) struct RenderedType {
	pub path: PathBuf,
	pub bytes: usize,
}

/// Renders one type and writes it to `{type_name}.{ext}`.
pub(crate) struct RenderTask {
	id: TaskId,
	type_name: String,
	unit: Arc<RenderUnit>,
}

impl RenderTask {
	pub fn new(type_name: String, unit: Arc<RenderUnit>) -> Self {
		Self {
			id: TaskId::new_v4(),
			type_name,
			unit,
		}
	}

	pub fn type_name(&self) -> &str {
		&self.type_name
	}
}

#[async_trait]
impl Task<DumpError> for RenderTask {
	fn id(&self) -> TaskId {
		self.id
	}

	async fn run(&mut self, interrupter: &Interrupter) -> Result<ExecStatus, DumpError> {
		let Self {
			id,
			type_name,
			unit,
		} = self;

		if interrupter.is_canceled() || unit.cancellation.poll() {
			trace!(task_id = %id, %type_name, "Dump was cancelled, skipping type");
			return Ok(ExecStatus::Canceled);
		}

		let declaration = spawn_blocking({
			let renderer = Arc::clone(&unit.renderer);
			let type_name = type_name.clone();
			let options = unit.render_options;

			move || renderer.render(&type_name, &options)
		})
		.await
		.map_err(|e| {
			error!(task_id = %id, %type_name, ?e, "Render unit failed to join;");
			DumpError::RenderJoin(type_name.clone())
		})?
		.map_err(|e| DumpError::from_render(type_name.as_str(), e))?;

		let path = unit
			.output_directory
			.join(declaration_file_name(type_name, &unit.file_extension));

		fs::write(&path, declaration.as_bytes())
			.await
			.map_err(|e| FileIOError::from((&path, e, "Failed to write declaration file")))?;

		trace!(task_id = %id, %type_name, path = %path.display(), "Wrote declaration");

		Ok(ExecStatus::Done(
			RenderedType {
				path,
				bytes: declaration.len(),
			}
			.into_output(),
		))
	}
}

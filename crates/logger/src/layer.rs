use std::fmt::{self, Write};

use tracing::{
	field::{Field, Visit},
	Event, Subscriber,
};
use tracing_subscriber::{layer::Context, Layer};

use super::remote::RemoteLogger;

/// A [`Layer`] forwarding every event, rendered as a single text line, to a [`RemoteLogger`].
///
/// Events emitted by this crate are skipped, a broken collector connection must not feed itself.
#[derive(Debug, Clone)]
pub struct RemoteLogLayer {
	logger: RemoteLogger,
}

impl RemoteLogLayer {
	#[must_use]
	pub const fn new(logger: RemoteLogger) -> Self {
		Self { logger }
	}
}

impl<S: Subscriber> Layer<S> for RemoteLogLayer {
	fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
		let metadata = event.metadata();

		if metadata.target().starts_with(env!("CARGO_CRATE_NAME")) {
			return;
		}

		let mut visitor = LineVisitor::default();
		event.record(&mut visitor);

		self.logger.send_log(format!(
			"{} {}: {}",
			metadata.level(),
			metadata.target(),
			visitor.finish()
		));
	}
}

#[derive(Default)]
struct LineVisitor {
	message: String,
	fields: String,
}

impl LineVisitor {
	fn finish(self) -> String {
		if self.fields.is_empty() {
			self.message
		} else if self.message.is_empty() {
			self.fields.trim_start().to_string()
		} else {
			format!("{}{}", self.message, self.fields)
		}
	}
}

impl Visit for LineVisitor {
	fn record_str(&mut self, field: &Field, value: &str) {
		if field.name() == "message" {
			self.message.push_str(value);
		} else {
			let _ = write!(self.fields, " {}={value}", field.name());
		}
	}

	fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
		if field.name() == "message" {
			let _ = write!(self.message, "{value:?}");
		} else {
			let _ = write!(self.fields, " {}={value:?}", field.name());
		}
	}
}

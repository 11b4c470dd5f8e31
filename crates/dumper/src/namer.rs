use std::{env, fmt::Display, path::Path};

use chrono::{DateTime, Local, TimeZone};

const DIRECTORY_NAME_INFIX: &str = "_headers_";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";
const FALLBACK_APP_NAME: &str = "App";

/// Builds `{app_name}_headers_{YYYY-MM-dd_HH-mm-ss}` from the wall clock time of `now`'s time zone,
/// dumps pass the local time.
///
/// The app name is used verbatim, even when empty. Two calls within the same second give the same
/// name, collisions are resolved when the directory gets created.
#[must_use]
pub fn generate_name<Tz>(app_name: &str, now: &DateTime<Tz>) -> String
where
	Tz: TimeZone,
	Tz::Offset: Display,
{
	format!(
		"{app_name}{DIRECTORY_NAME_INFIX}{}",
		now.format(TIMESTAMP_FORMAT)
	)
}

/// [`generate_name`] for the running executable at the current time.
#[must_use]
pub fn generate_timestamped_directory_name() -> String {
	generate_name(&current_app_name(), &Local::now())
}

/// File stem of the running executable, or `"App"` when it can't be determined.
#[must_use]
pub fn current_app_name() -> String {
	env::current_exe()
		.ok()
		.as_deref()
		.and_then(Path::file_stem)
		.and_then(|stem| stem.to_str())
		.filter(|stem| !stem.is_empty())
		.map_or_else(|| FALLBACK_APP_NAME.to_string(), ToString::to_string)
}

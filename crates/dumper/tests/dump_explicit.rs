use std::{
	fs,
	sync::{
		atomic::{AtomicBool, AtomicUsize, Ordering},
		Arc,
	},
};

use dy_dumper::{DumpHooks, DumpOptions, DumpResult, DumpState};

use tracing_test::traced_test;

mod common;

use common::{dumper_in, entries, recording_hooks, APP_NAME};

#[tokio::test]
#[traced_test]
async fn resolvable_types_are_all_dumped() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());
	let (hooks, events, done_rx) = recording_hooks();

	let result = dumper
		.dump_explicit(["Alpha", "Beta"], &DumpOptions::default(), hooks)
		.await;

	assert_eq!(done_rx.await.unwrap(), result);
	assert_eq!(
		(result.cancelled, result.dumped, result.skipped, result.errors),
		(false, 2, 0, 0)
	);
	assert_eq!(result.state(), DumpState::Completed);

	let output_directory = result.output_directory.unwrap();
	assert_eq!(output_directory.parent(), Some(base.path()));
	assert!(output_directory
		.file_name()
		.unwrap()
		.to_str()
		.unwrap()
		.starts_with(&format!("{APP_NAME}_headers_")));

	for name in ["Alpha", "Beta"] {
		let declaration = fs::read_to_string(output_directory.join(format!("{name}.h"))).unwrap();
		assert!(declaration.contains(&format!("@interface {name}")));
	}

	let events = events.lock().unwrap();
	assert_eq!(events.len(), 2);
	assert!(events.iter().all(|event| event.total == 2));

	dumper.shutdown().await;
}

#[tokio::test]
#[traced_test]
async fn unresolvable_type_is_an_error_without_file() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());
	let (hooks, events, done_rx) = recording_hooks();

	let result = dumper
		.dump_explicit(["Ghost"], &DumpOptions::default(), hooks)
		.await;

	assert_eq!(
		(result.cancelled, result.dumped, result.skipped, result.errors),
		(false, 0, 0, 1)
	);
	assert_eq!(done_rx.await.unwrap(), result);

	let output_directory = result.output_directory.unwrap();
	assert!(!output_directory.join("Ghost.h").exists());
	assert!(entries(&output_directory).is_empty());

	// Progress is still reported for failed units
	assert_eq!(events.lock().unwrap()[0].current_name, "Ghost");
	assert!(logs_contain("Failed to dump type"));
	assert!(logs_contain("Ghost"));

	dumper.shutdown().await;
}

#[tokio::test]
async fn render_failure_does_not_abort_the_batch() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());

	let result = dumper
		.dump_explicit(
			["Alpha", "Broken", "Ghost", "Gamma"],
			&DumpOptions::default(),
			DumpHooks::default(),
		)
		.await;

	assert_eq!((result.dumped, result.skipped, result.errors), (2, 0, 2));
	assert_eq!(result.settled(), result.total);

	let output_directory = result.output_directory.unwrap();
	assert_eq!(
		entries(&output_directory),
		vec![output_directory.join("Alpha.h"), output_directory.join("Gamma.h")]
	);

	dumper.shutdown().await;
}

#[tokio::test]
async fn cancellation_after_first_poll_skips_the_rest() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());
	let polls = Arc::new(AtomicUsize::new(0));

	let result = dumper
		.dump_explicit(
			["Alpha", "Beta", "Gamma"],
			&DumpOptions::default(),
			DumpHooks::new().cancel_when({
				let polls = Arc::clone(&polls);
				move || polls.fetch_add(1, Ordering::SeqCst) >= 1
			}),
		)
		.await;

	assert!(result.cancelled);
	assert_eq!(result.state(), DumpState::Cancelled);
	assert_eq!((result.dumped, result.skipped, result.errors), (1, 2, 0));
	assert_eq!(entries(&result.output_directory.unwrap()).len(), 1);

	dumper.shutdown().await;
}

#[tokio::test]
async fn cancelled_before_start_skips_everything() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());
	let names = ["Alpha", "Beta", "Gamma", "Ghost", "Broken"];

	let result = dumper
		.dump_explicit(
			names,
			&DumpOptions::default(),
			DumpHooks::new().cancel_flag(Arc::new(AtomicBool::new(true))),
		)
		.await;

	assert_eq!(
		result,
		DumpResult {
			cancelled: true,
			dumped: 0,
			skipped: names.len(),
			errors: 0,
			total: names.len(),
			output_directory: result.output_directory.clone(),
		}
	);
	assert!(entries(&result.output_directory.unwrap()).is_empty());

	dumper.shutdown().await;
}

#[tokio::test]
async fn empty_request_still_creates_the_directory() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());
	let (hooks, events, done_rx) = recording_hooks();

	let result = dumper
		.dump_explicit(Vec::<String>::new(), &DumpOptions::default(), hooks)
		.await;

	assert_eq!(
		(result.cancelled, result.dumped, result.skipped, result.errors),
		(false, 0, 0, 0)
	);
	assert_eq!(done_rx.await.unwrap(), result);
	assert!(events.lock().unwrap().is_empty());
	assert!(result.output_directory.unwrap().is_dir());

	dumper.shutdown().await;
}

#[tokio::test]
async fn progress_is_monotonic_and_covers_every_name() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());
	let (hooks, events, _done_rx) = recording_hooks();

	let names = (0..64)
		.map(|i| match i % 4 {
			0 => "Alpha".to_string(),
			1 => "Beta".to_string(),
			2 => "Gamma".to_string(),
			_ => format!("Ghost{i}"),
		})
		.collect::<Vec<_>>();

	let result = dumper
		.dump_explicit(names.clone(), &DumpOptions::default(), hooks)
		.await;

	assert_eq!((result.dumped, result.errors), (48, 16));

	let events = events.lock().unwrap();
	assert_eq!(events.len(), names.len());
	for (idx, event) in events.iter().enumerate() {
		assert_eq!(event.completed, idx + 1);
		assert_eq!(event.total, names.len());
	}

	let mut reported = events
		.iter()
		.map(|event| event.current_name.clone())
		.collect::<Vec<_>>();
	let mut expected = names;
	reported.sort();
	expected.sort();
	assert_eq!(reported, expected);

	dumper.shutdown().await;
}

#[tokio::test]
async fn options_shape_the_output() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());
	let custom = base.path().join("custom").join("headers");

	let options = DumpOptions::from_json_value(&serde_json::json!({
		"outputDirectory": custom.to_str().unwrap(),
		"includeComments": false,
		"includeInheritedMembers": true,
		"fileExtension": "txt",
		"somethingElse": 1,
	}));

	let result = dumper
		.dump_explicit(["Beta"], &options, DumpHooks::default())
		.await;

	assert_eq!(result.dumped, 1);
	assert_eq!(result.output_directory.as_deref(), Some(custom.as_path()));

	let declaration = fs::read_to_string(custom.join("Beta.txt")).unwrap();
	assert!(!declaration.contains("Second of its kind."));
	assert!(declaration.contains("NSString *title;"));

	// Nothing was created under the timestamped name
	assert_eq!(entries(base.path()), vec![base.path().join("custom")]);

	dumper.shutdown().await;
}

#[tokio::test]
async fn consecutive_dumps_never_share_a_directory() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());

	let first = dumper
		.dump_explicit(["Alpha"], &DumpOptions::default(), DumpHooks::default())
		.await;
	let second = dumper
		.dump_explicit(["Alpha"], &DumpOptions::default(), DumpHooks::default())
		.await;

	assert_ne!(first.output_directory, second.output_directory);
	assert_eq!(entries(base.path()).len(), 2);

	dumper.shutdown().await;
}

#[tokio::test]
#[traced_test]
async fn unusable_output_directory_fails_every_unit() {
	let base = tempfile::tempdir().unwrap();
	let occupied = base.path().join("occupied");
	fs::write(&occupied, b"not a directory").unwrap();

	let dumper = dumper_in(&occupied);
	let (hooks, events, done_rx) = recording_hooks();

	let result = dumper
		.dump_explicit(["Alpha", "Beta", "Ghost"], &DumpOptions::default(), hooks)
		.await;

	assert_eq!(
		result,
		DumpResult {
			cancelled: false,
			dumped: 0,
			skipped: 0,
			errors: 3,
			total: 3,
			output_directory: None,
		}
	);
	assert_eq!(done_rx.await.unwrap(), result);
	assert!(events.lock().unwrap().is_empty());
	assert!(logs_contain("Failed to create output directory"));

	dumper.shutdown().await;
}

#[tokio::test]
async fn detached_dump_runs_to_completion() {
	let base = tempfile::tempdir().unwrap();
	let dumper = Arc::new(dumper_in(base.path()));

	let result = dumper
		.dump_explicit_detached(
			vec!["Alpha".to_string(), "Gamma".to_string()],
			DumpOptions::default(),
		)
		.await
		.unwrap();

	assert_eq!(result.dumped, 2);

	dumper.shutdown().await;
}

#[tokio::test]
async fn shutdown_dumper_counts_units_as_errors() {
	let base = tempfile::tempdir().unwrap();
	let dumper = dumper_in(base.path());

	dumper.shutdown().await;

	let result = dumper
		.dump_explicit(["Alpha", "Beta"], &DumpOptions::default(), DumpHooks::default())
		.await;

	assert_eq!((result.dumped, result.skipped, result.errors), (0, 0, 2));
	assert_eq!(result.settled(), result.total);
}

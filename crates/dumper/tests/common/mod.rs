#![allow(dead_code)]

use std::{
	fs,
	path::{Path, PathBuf},
	sync::{Arc, Mutex},
};

use dy_dumper::{
	DumpHooks, DumpResult, DumperConfig, HeaderDumper, MethodDescriptor, ProgressEvent,
	PropertyDescriptor, TypeCatalog, TypeDescriptor,
};

use tokio::sync::oneshot;

pub const APP_NAME: &str = "Notes";

/// `Alpha`, `Beta` and `Gamma` render fine, `Broken` describes a method it can't render.
pub fn sample_catalog() -> TypeCatalog {
	TypeCatalog::from_iter([
		TypeDescriptor {
			name: "Alpha".to_string(),
			superclass: Some("NSObject".to_string()),
			doc_comment: Some("First of its kind.".to_string()),
			properties: vec![PropertyDescriptor {
				name: "title".to_string(),
				type_name: "NSString *".to_string(),
				attributes: vec!["nonatomic".to_string(), "copy".to_string()],
				doc_comment: None,
			}],
			..Default::default()
		},
		TypeDescriptor {
			name: "Beta".to_string(),
			superclass: Some("Alpha".to_string()),
			doc_comment: Some("Second of its kind.".to_string()),
			methods: vec![MethodDescriptor {
				selector: "refresh".to_string(),
				..Default::default()
			}],
			..Default::default()
		},
		TypeDescriptor {
			name: "Gamma".to_string(),
			..Default::default()
		},
		TypeDescriptor {
			name: "Broken".to_string(),
			methods: vec![MethodDescriptor {
				selector: "take:".to_string(),
				..Default::default()
			}],
			..Default::default()
		},
	])
}

pub fn dumper_in(base_directory: &Path) -> HeaderDumper {
	HeaderDumper::with_catalog(
		DumperConfig::new(APP_NAME, base_directory),
		sample_catalog(),
	)
}

/// Hooks recording every progress event, plus a receiver for the completion result.
pub fn recording_hooks() -> (
	DumpHooks,
	Arc<Mutex<Vec<ProgressEvent>>>,
	oneshot::Receiver<DumpResult>,
) {
	let events = Arc::new(Mutex::new(Vec::new()));
	let (done_tx, done_rx) = oneshot::channel();

	let hooks = DumpHooks::new()
		.on_progress({
			let events = Arc::clone(&events);
			move |event| events.lock().unwrap().push(event)
		})
		.on_complete(move |result| {
			done_tx.send(result).unwrap();
		});

	(hooks, events, done_rx)
}

/// Every entry directly under `directory`.
pub fn entries(directory: &Path) -> Vec<PathBuf> {
	let mut entries = fs::read_dir(directory)
		.unwrap()
		.map(|entry| entry.unwrap().path())
		.collect::<Vec<_>>();
	entries.sort();
	entries
}

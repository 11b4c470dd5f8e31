//!
//! # Header Dumper
//!
//! Turns the type metadata of a running process into human-readable interface declarations, one
//! file per type, written into a fresh timestamped directory per dump.
//!
//! - [`HeaderDumper::dump_all`] dumps every known type, at most once per process lifetime;
//! - [`HeaderDumper::dump_explicit`] dumps a given list of types, as many times as wanted, with
//!   live progress, cooperative cancellation and a completion hook ([`DumpHooks`]);
//! - Single type failures are counted, never abort the batch.
//!
//! The metadata itself comes from a [`TypeMetadataProvider`] and is rendered by a [`TypeRenderer`],
//! [`TypeCatalog`] is an in-memory implementation of both.
//!
//! ## Example
//!
//! ```no_run
//! use dy_dumper::{DumpHooks, DumpOptions, DumperConfig, HeaderDumper, TypeCatalog};
//!
//! #[tokio::main]
//! async fn main() {
//!     let catalog = TypeCatalog::from_json(r#"[{ "name": "Alpha" }, { "name": "Beta" }]"#).unwrap();
//!     let dumper = HeaderDumper::with_catalog(DumperConfig::default(), catalog);
//!
//!     let result = dumper
//!         .dump_explicit(
//!             ["Alpha", "Beta"],
//!             &DumpOptions::default(),
//!             DumpHooks::new().on_progress(|event| println!("{}/{}", event.completed, event.total)),
//!         )
//!         .await;
//!
//!     assert_eq!(result.dumped, 2);
//!
//!     dumper.shutdown().await;
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
	clippy::dbg_macro,
	deprecated
)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

mod catalog;
mod config;
mod dumper;
mod error;
mod guard;
mod namer;
mod options;
mod output;
mod progress;
mod provider;
mod tasks;

pub use catalog::{MethodDescriptor, PropertyDescriptor, TypeCatalog, TypeDescriptor};
pub use config::DumperConfig;
pub use dumper::HeaderDumper;
pub use error::DumpError;
pub use guard::DumpGuard;
pub use namer::{current_app_name, generate_name, generate_timestamped_directory_name};
pub use options::{DumpOptions, RenderOptions, DEFAULT_FILE_EXTENSION};
pub use progress::{
	CancelPredicate, CompletionCallback, DumpHooks, DumpResult, DumpState, ProgressCallback,
	ProgressEvent,
};
pub use provider::{RenderError, TypeMetadataProvider, TypeRenderer};

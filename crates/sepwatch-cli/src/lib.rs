//! sepwatch CLI - separation conflict detection over snapshot files.
//!
//! The `sepwatch` binary loads a CSV of aircraft reports, runs the
//! conflict tracker from `sepwatch-core`, and writes:
//! - conflict intervals sorted by start time
//! - per-aircraft conflict counts

pub mod config;
pub mod loader;
pub mod output;
pub mod pipeline;
pub mod progress;

pub use config::{Args, Config};
pub use loader::{load_snapshots, load_snapshots_from_path, CsvSchema, LoadError};
pub use pipeline::{analyze, write_report, Report};

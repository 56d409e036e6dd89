// THEORY:
// This file is the main entry point for the `vas_architect` library crate.
// The public API is the `VasArchitect` pipeline and its data structures
// (`ArchitectConfig`, `RunSummary`, `WatchZone`). The grouping algorithms live in
// `core_modules` and are public for tools that want a single stage on its own.

pub mod archive;
pub mod config;
pub mod core_modules;
pub mod descriptor;
pub mod discovery;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod script;

pub use crate::config::{ArchitectConfig, DistanceMetric, GroupingConfig};
pub use crate::error::{Result, RunError};
pub use crate::pipeline::{RunSummary, VasArchitect};

//! High-level operations.
//!
//! This module contains the implementation of the manifest-parser commands.

pub mod check;
pub mod graph;

pub use check::{check, format_json, format_report, CheckReport, ManifestCheck};
pub use graph::{graph, load_manifests, GraphOptions, GraphReport};

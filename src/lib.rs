//! manifest-parser - dependency graphs of redpesk application manifests
//!
//! This crate loads `manifest.yml` files, checks them, and draws the APIs
//! and bindings their targets provide and require as a PlantUML diagram.

pub mod core;
pub mod graph;
pub mod ops;
pub mod render;
pub mod util;

/// Manifest fixtures for unit tests.
#[cfg(test)]
pub mod test_support;

pub use core::{manifest::Manifest, validation::validate};
pub use graph::{EmitSummary, GraphError};
pub use ops::{GraphOptions, GraphReport};
pub use render::{PlantUml, Renderer};

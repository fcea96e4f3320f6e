//! Core data structures.
//!
//! - Manifests, targets, APIs and bindings as read from `manifest.yml`
//! - Structural validation of loaded manifests

pub mod manifest;
pub mod validation;

pub use manifest::{Api, Binding, Content, Manifest, ManifestError, Target};
pub use validation::{validate, ValidationError, ValidationIssue};

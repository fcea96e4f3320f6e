//! Dependency graph of a manifest set, written as a PlantUML description.
//!
//! - `ident`: diagram identifiers and collision tracking
//! - `declare`: packages, components, interfaces and artifacts
//! - `require`: requirement edges and local binding resolution
//! - `emit`: document layout and the two passes

mod declare;
pub mod emit;
pub mod errors;
pub mod ident;
pub mod require;

pub use emit::{emit, emit_to_string, EmitError, EmitSummary};
pub use errors::GraphError;
pub use ident::{IdCollision, IdKind, IdRegistry};
pub use require::{resolve_binding, BindingResolution, Edge, EdgeKind};

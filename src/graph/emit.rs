//! PlantUML description writer.
//!
//! PlantUML creates a node the first time it is mentioned, even inside an
//! edge. All declarations are therefore written before any requirement edge:
//! one declaring pass over every manifest, then one resolving pass.

use std::io::{self, Write};
use std::path::PathBuf;

use thiserror::Error;

use crate::core::manifest::Manifest;
use crate::graph::ident::{IdCollision, IdRegistry};
use crate::util::diagnostic::Reporter;

/// One level of nesting in the description.
pub(crate) const INDENT: &str = "    ";

const STYLE: &str = "\
skinparam defaultTextAlignment center
skinparam packageStyle frame
skinparam componentStyle rectangle
skinparam artifact {
    BackgroundColor #FFF8DC
    BorderColor #8B7355
}
skinparam interface {
    BackgroundColor #E0F0E0
    BorderColor #2E8B57
}
skinparam arrow {
    Color #555555
}
";

const DECLARED_HEADER: &str = "' ##### DECLARED RESOURCES #####";
const REQUIRED_HEADER: &str = "' ##### REQUIRED RESOURCES #####";

/// Failure while writing a description.
#[derive(Debug, Error)]
pub enum EmitError {
    #[error("failed to write diagram description")]
    Io(#[from] io::Error),

    #[error("{}: {source}", .path.display())]
    Collision {
        path: PathBuf,
        #[source]
        source: IdCollision,
    },

    #[error("{}: manifest `{id}` is already part of the graph", .path.display())]
    DuplicatePackage { path: PathBuf, id: String },
}

/// What ended up in the description.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmitSummary {
    pub packages: usize,
    pub components: usize,
    pub interfaces: usize,
    pub artifacts: usize,
    /// Requirement edges written
    pub edges: usize,
    /// Local binding requirements that could not be resolved
    pub skipped: usize,
}

/// Shared state of one emission.
pub(crate) struct Emitter<'a, W: Write + ?Sized> {
    pub(crate) out: &'a mut W,
    pub(crate) registry: IdRegistry,
    pub(crate) reporter: &'a mut dyn Reporter,
    pub(crate) summary: EmitSummary,
}

impl<'a, W: Write + ?Sized> Emitter<'a, W> {
    pub(crate) fn new(out: &'a mut W, reporter: &'a mut dyn Reporter) -> Self {
        Emitter {
            out,
            registry: IdRegistry::new(),
            reporter,
            summary: EmitSummary::default(),
        }
    }

    /// Source comment preceding each manifest section.
    pub(crate) fn trace(&mut self, manifest: &Manifest) -> io::Result<()> {
        writeln!(self.out, "'{}", manifest.path.display())
    }

    fn run(mut self, manifests: &[Manifest], diagram_name: &str) -> Result<EmitSummary, EmitError> {
        writeln!(self.out, "@startuml {}", diagram_name)?;
        writeln!(self.out)?;
        write!(self.out, "{}", STYLE)?;
        writeln!(self.out)?;

        writeln!(self.out, "{}", DECLARED_HEADER)?;
        writeln!(self.out)?;
        for manifest in manifests {
            self.declare(manifest)?;
            writeln!(self.out)?;
        }

        writeln!(self.out, "{}", REQUIRED_HEADER)?;
        writeln!(self.out)?;
        for manifest in manifests {
            self.require(manifest)?;
            writeln!(self.out)?;
        }

        writeln!(self.out, "@enduml")?;
        self.out.flush()?;

        tracing::debug!(
            "Emitted {} package(s), {} edge(s), {} skipped",
            self.summary.packages,
            self.summary.edges,
            self.summary.skipped
        );
        Ok(self.summary)
    }
}

/// Write the description of `manifests` to `out`.
///
/// Manifests are written in the given order, so identical input produces
/// identical output.
pub fn emit<W: Write + ?Sized>(
    out: &mut W,
    manifests: &[Manifest],
    diagram_name: &str,
    reporter: &mut dyn Reporter,
) -> Result<EmitSummary, EmitError> {
    Emitter::new(out, reporter).run(manifests, diagram_name)
}

/// Render the description to a string.
pub fn emit_to_string(
    manifests: &[Manifest],
    diagram_name: &str,
    reporter: &mut dyn Reporter,
) -> Result<(String, EmitSummary), EmitError> {
    let mut buf = Vec::new();
    let summary = emit(&mut buf, manifests, diagram_name, reporter)?;
    // Every write above is UTF-8 text
    Ok((String::from_utf8_lossy(&buf).into_owned(), summary))
}

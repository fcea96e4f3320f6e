//! Second pass: requirement edges.
//!
//! Extern bindings point straight at the artifact derived from their name.
//! Any other required binding must be matched by exactly one provided
//! binding of the same manifest whose value is the required name; when that
//! fails the edge is left out and a warning is reported.

use std::fmt;
use std::io::Write;

use crate::core::manifest::{Binding, Manifest};
use crate::graph::emit::{EmitError, Emitter};
use crate::graph::ident::{artifact_id, interface_id, package_id, target_key};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Arrow style of a requirement edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// `-->`, towards something outside the manifest or an API
    Requires,
    /// `..>`, towards a binding of the same manifest
    Uses,
}

/// A directed requirement edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EdgeKind::Requires => write!(f, "{} --> {} : requires", self.from, self.to),
            EdgeKind::Uses => write!(f, "{} ..> {} : uses", self.from, self.to),
        }
    }
}

/// How a required binding was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingResolution<'a> {
    /// Provided outside the manifest set
    Extern,
    /// The single provided binding of the manifest matching the requirement
    Local(&'a Binding),
    /// Zero or several provided bindings match
    Unresolved { matches: usize },
}

/// Resolve a required binding against the manifest that requires it.
pub fn resolve_binding<'a>(manifest: &'a Manifest, required: &Binding) -> BindingResolution<'a> {
    if required.is_extern() {
        return BindingResolution::Extern;
    }

    match manifest.provided_bindings_with_value(&required.name).as_slice() {
        [found] => BindingResolution::Local(*found),
        candidates => BindingResolution::Unresolved {
            matches: candidates.len(),
        },
    }
}

impl<W: Write + ?Sized> Emitter<'_, W> {
    /// Write every requirement edge of `manifest`.
    pub(crate) fn require(&mut self, manifest: &Manifest) -> Result<(), EmitError> {
        self.trace(manifest)?;

        let packid = package_id(&manifest.id);
        for target in &manifest.targets {
            let from = target_key(&packid, &target.name);

            for binding in &target.required_bindings {
                let edge = match resolve_binding(manifest, binding) {
                    BindingResolution::Extern => Edge {
                        from: from.clone(),
                        to: artifact_id(&binding.name),
                        kind: EdgeKind::Requires,
                    },
                    BindingResolution::Local(found) => Edge {
                        from: from.clone(),
                        to: artifact_id(&found.name),
                        kind: EdgeKind::Uses,
                    },
                    BindingResolution::Unresolved { matches } => {
                        self.unresolved(manifest, &target.name, binding, matches);
                        continue;
                    }
                };
                self.edge(&edge)?;
            }

            for api in &target.required_apis {
                self.edge(&Edge {
                    from: from.clone(),
                    to: interface_id(&api.name),
                    kind: EdgeKind::Requires,
                })?;
            }
        }

        Ok(())
    }

    fn edge(&mut self, edge: &Edge) -> Result<(), EmitError> {
        writeln!(self.out, "{}", edge)?;
        self.summary.edges += 1;
        Ok(())
    }

    fn unresolved(&mut self, manifest: &Manifest, target: &str, binding: &Binding, matches: usize) {
        self.summary.skipped += 1;
        self.reporter.report(
            Diagnostic::warning(format!(
                "local binding `{}` required by target `{}` cannot be resolved, edge skipped",
                binding.name, target
            ))
            .with_location(&manifest.path)
            .with_context(format!(
                "{} provided binding(s) have value `{}`, expected exactly one",
                matches, binding.name
            ))
            .with_suggestion(suggestions::LOCAL_BINDING),
        );
    }
}

//! First pass: packages, components, interfaces and artifacts.

use std::io::Write;

use crate::core::manifest::{Binding, Manifest, Target};
use crate::graph::emit::{EmitError, Emitter, INDENT};
use crate::graph::ident::{target_key, IdKind, Registration};
use crate::util::diagnostic::Diagnostic;

impl<W: Write + ?Sized> Emitter<'_, W> {
    /// Declare every resource `manifest` provides.
    pub(crate) fn declare(&mut self, manifest: &Manifest) -> Result<(), EmitError> {
        self.trace(manifest)?;

        let packid = match self.register(manifest, IdKind::Package, &manifest.id)? {
            (id, Registration::New) => id,
            (_, Registration::Repeated) => {
                return Err(EmitError::DuplicatePackage {
                    path: manifest.path.clone(),
                    id: manifest.id.clone(),
                })
            }
        };
        self.summary.packages += 1;

        writeln!(self.out, "package \"{}\" as {} {{", manifest.id, packid)?;
        for target in &manifest.targets {
            self.declare_target(manifest, &packid, target)?;
        }
        for binding in &manifest.provided_bindings {
            self.declare_binding(manifest, binding)?;
        }
        writeln!(self.out, "}}")?;

        Ok(())
    }

    fn declare_target(
        &mut self,
        manifest: &Manifest,
        packid: &str,
        target: &Target,
    ) -> Result<(), EmitError> {
        writeln!(
            self.out,
            "{}component \"{}\" as {} {{",
            INDENT,
            component_label(target),
            target_key(packid, &target.name)
        )?;
        self.summary.components += 1;

        for api in &target.provided_apis {
            match self.register(manifest, IdKind::Interface, &api.name)? {
                (itfid, Registration::New) => {
                    writeln!(self.out, "{0}{0}() \"{1}\" as {2}", INDENT, api.name, itfid)?;
                    self.summary.interfaces += 1;
                }
                (_, Registration::Repeated) => self.already_declared(manifest, IdKind::Interface, &api.name),
            }
        }

        writeln!(self.out, "{}}}", INDENT)?;
        Ok(())
    }

    fn declare_binding(&mut self, manifest: &Manifest, binding: &Binding) -> Result<(), EmitError> {
        let artid = match self.register(manifest, IdKind::Artifact, &binding.name)? {
            (id, Registration::New) => id,
            (_, Registration::Repeated) => {
                self.already_declared(manifest, IdKind::Artifact, &binding.name);
                return Ok(());
            }
        };

        writeln!(self.out, "{}artifact {} [", INDENT, artid)?;
        writeln!(self.out, "{0}{0}name = **{1}**", INDENT, binding.name)?;
        writeln!(self.out, "{0}{0}value = \"\"{1}\"\"", INDENT, binding.value)?;
        writeln!(self.out, "{}]", INDENT)?;
        self.summary.artifacts += 1;

        Ok(())
    }

    fn register(
        &mut self,
        manifest: &Manifest,
        kind: IdKind,
        raw: &str,
    ) -> Result<(String, Registration), EmitError> {
        self.registry
            .register(kind, raw, &manifest.id)
            .map_err(|source| EmitError::Collision {
                path: manifest.path.clone(),
                source,
            })
    }

    fn already_declared(&mut self, manifest: &Manifest, kind: IdKind, name: &str) {
        self.reporter.report(
            Diagnostic::warning(format!("{} `{}` is already declared, skipping", kind, name))
                .with_location(&manifest.path)
                .with_context(format!("`{}` is provided more than once in the graph", name)),
        );
    }
}

/// `**name**`, followed by the content type and source when known.
fn component_label(target: &Target) -> String {
    let mut label = format!("**{}**", target.name);
    if let Some(ref content) = target.content {
        label.push_str(&format!("\\ntype = {}\\nsrc = {}", content.kind, content.src));
    }
    label
}

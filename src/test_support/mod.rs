//! Test fixtures for manifests.
//!
//! Only compiled for unit tests. [`ManifestFixture`] builds a [`Manifest`]
//! in memory or writes the equivalent `manifest.yml` to disk.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use crate::core::manifest::{Api, Binding, Content, Manifest, Target};

/// Builder for test manifests.
#[derive(Debug, Clone)]
pub struct ManifestFixture {
    manifest: Manifest,
}

impl ManifestFixture {
    /// A valid, target-less manifest with the given id.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        ManifestFixture {
            manifest: Manifest {
                path: PathBuf::from(format!("fixtures/{}/manifest.yml", id)),
                format_version: Some(1),
                version: Some("1.0.0".to_string()),
                name: Some(id.clone()),
                description: None,
                license: Some("MIT".to_string()),
                author: None,
                id,
                targets: Vec::new(),
                provided_bindings: Vec::new(),
            },
        }
    }

    /// Override the source path.
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.manifest.path = path.into();
        self
    }

    /// Add a native target named `name`.
    pub fn target(mut self, name: &str) -> Self {
        self.manifest.targets.push(Target {
            name: name.to_string(),
            content: Some(Content {
                kind: "application/vnd.agl.native".to_string(),
                src: format!("bin/{}", name),
            }),
            ..Default::default()
        });
        self
    }

    pub fn provides_api(mut self, target: &str, api: &str) -> Self {
        self.target_mut(target).provided_apis.push(Api::new(api));
        self
    }

    pub fn requires_api(mut self, target: &str, api: &str) -> Self {
        self.target_mut(target).required_apis.push(Api::new(api));
        self
    }

    pub fn requires_binding(mut self, target: &str, name: &str, value: &str) -> Self {
        self.target_mut(target)
            .required_bindings
            .push(Binding::new(name, value));
        self
    }

    pub fn provides_binding(mut self, name: &str, value: &str) -> Self {
        self.manifest.provided_bindings.push(Binding::new(name, value));
        self
    }

    pub fn build(self) -> Manifest {
        self.manifest
    }

    /// Render the manifest as `manifest.yml` content.
    pub fn to_yaml(&self) -> String {
        let m = &self.manifest;
        let mut out = String::new();
        if let Some(v) = m.format_version {
            let _ = writeln!(out, "rp-manifest: {}", v);
        }
        let _ = writeln!(out, "id: \"{}\"", m.id);
        if let Some(ref v) = m.version {
            let _ = writeln!(out, "version: \"{}\"", v);
        }
        if let Some(ref v) = m.license {
            let _ = writeln!(out, "license: \"{}\"", v);
        }
        out.push_str(if m.targets.is_empty() { "targets: []\n" } else { "targets:\n" });
        for t in &m.targets {
            let _ = writeln!(out, "  - target: \"{}\"", t.name);
            if let Some(ref c) = t.content {
                let _ = writeln!(out, "    content:\n      type: \"{}\"\n      src: \"{}\"", c.kind, c.src);
            }
            write_apis(&mut out, "provided-api", &t.provided_apis);
            write_apis(&mut out, "required-api", &t.required_apis);
            write_bindings(&mut out, "    ", "required-binding", &t.required_bindings);
        }
        write_bindings(&mut out, "", "provided-binding", &m.provided_bindings);
        out
    }

    /// Write `manifest.yml` under `dir/<id>/` and return its path.
    pub fn write_to(&self, dir: &Path) -> PathBuf {
        let manifest_dir = dir.join(&self.manifest.id);
        std::fs::create_dir_all(&manifest_dir).unwrap();
        let path = manifest_dir.join("manifest.yml");
        std::fs::write(&path, self.to_yaml()).unwrap();
        path
    }

    fn target_mut(&mut self, name: &str) -> &mut Target {
        self.manifest
            .targets
            .iter_mut()
            .find(|t| t.name == name)
            .unwrap_or_else(|| panic!("fixture has no target `{}`", name))
    }
}

fn write_apis(out: &mut String, key: &str, apis: &[Api]) {
    if apis.is_empty() {
        return;
    }
    let _ = writeln!(out, "    {}:", key);
    for api in apis {
        let _ = writeln!(out, "      - name: \"{}\"", api.name);
    }
}

fn write_bindings(out: &mut String, indent: &str, key: &str, bindings: &[Binding]) {
    if bindings.is_empty() {
        return;
    }
    let _ = writeln!(out, "{}{}:", indent, key);
    for b in bindings {
        let _ = writeln!(out, "{}  - name: \"{}\"\n{}    value: \"{}\"", indent, b.name, indent, b.value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yaml_round_trips_through_loader() {
        let fixture = ManifestFixture::new("shop")
            .target("main")
            .provides_api("main", "cart")
            .requires_api("main", "payments")
            .requires_binding("main", "db", "local")
            .provides_binding("sqlite", "db");

        let parsed = Manifest::parse(&fixture.to_yaml(), &fixture.manifest.path).unwrap();
        let mut expected = fixture.build();
        expected.name = None;
        assert_eq!(parsed, expected);
    }
}

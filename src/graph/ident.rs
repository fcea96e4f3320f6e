//! Diagram identifiers derived from manifest names.
//!
//! PlantUML identifiers cannot contain `-`, `/` or `.`, so raw names are
//! sanitized and given a per-kind suffix. Sanitizing is lossy (`a.b` and
//! `a-b` both become `a_b`), which is why declarations go through an
//! [`IdRegistry`].

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;

/// Namespace an identifier lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdKind {
    /// A manifest, drawn as a package
    Package,
    /// An API, drawn as an interface
    Interface,
    /// A binding, drawn as an artifact
    Artifact,
}

impl IdKind {
    pub fn suffix(&self) -> &'static str {
        match self {
            IdKind::Package => "_manifest",
            IdKind::Interface => "_api",
            IdKind::Artifact => "_binding",
        }
    }

    /// Derive the identifier of `raw` in this namespace.
    pub fn derive(&self, raw: &str) -> String {
        match self {
            IdKind::Package => package_id(raw),
            IdKind::Interface => interface_id(raw),
            IdKind::Artifact => artifact_id(raw),
        }
    }
}

impl fmt::Display for IdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IdKind::Package => write!(f, "manifest"),
            IdKind::Interface => write!(f, "API"),
            IdKind::Artifact => write!(f, "binding"),
        }
    }
}

/// `my-application` -> `my_application_manifest`
pub fn package_id(manifest_id: &str) -> String {
    let mut id = manifest_id.replace('-', "_");
    id.push_str(IdKind::Package.suffix());
    id
}

/// `my-api` -> `my_api_api`
pub fn interface_id(api_name: &str) -> String {
    let mut id = api_name.replace('-', "_");
    id.push_str(IdKind::Interface.suffix());
    id
}

/// `lib/my-binding.so` -> `lib_my_binding_so_binding`
pub fn artifact_id(binding_name: &str) -> String {
    let mut id = binding_name.replace(['-', '/', '.'], "_");
    id.push_str(IdKind::Artifact.suffix());
    id
}

/// Qualified key of a target: `<package id>.<target name>`.
pub fn target_key(package_id: &str, target: &str) -> String {
    format!("{}.{}", package_id, target)
}

/// Two declarations want the same identifier.
///
/// Either two different raw names sanitize identically, or a binding name is
/// provided by two manifests. Bindings are scoped to the manifest that
/// provides them, so the second case cannot be drawn as one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} `{incoming}` of `{incoming_owner}` collides with {kind} `{existing}` of `{existing_owner}` (both become `{id}`)")]
pub struct IdCollision {
    pub kind: IdKind,
    pub id: String,
    pub existing: String,
    pub existing_owner: String,
    pub incoming: String,
    pub incoming_owner: String,
}

/// Outcome of registering a raw name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registration {
    /// First time this identifier is seen.
    New,
    /// The same raw name was registered before.
    Repeated,
}

#[derive(Debug)]
struct Entry {
    raw: String,
    owner: String,
}

/// Tracks derived identifier -> originating raw name and owning manifest,
/// per namespace.
#[derive(Debug, Default)]
pub struct IdRegistry {
    names: HashMap<(IdKind, String), Entry>,
}

impl IdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive and record the identifier for `raw`, declared by manifest `owner`.
    ///
    /// Fails when a different raw name already owns the same identifier, or
    /// when another manifest already provides the same binding.
    pub fn register(
        &mut self,
        kind: IdKind,
        raw: &str,
        owner: &str,
    ) -> Result<(String, Registration), IdCollision> {
        let id = kind.derive(raw);
        match self.names.get(&(kind, id.clone())) {
            Some(entry) if entry.raw == raw && (kind != IdKind::Artifact || entry.owner == owner) => {
                Ok((id, Registration::Repeated))
            }
            Some(entry) => Err(IdCollision {
                kind,
                id,
                existing: entry.raw.clone(),
                existing_owner: entry.owner.clone(),
                incoming: raw.to_string(),
                incoming_owner: owner.to_string(),
            }),
            None => {
                self.names.insert(
                    (kind, id.clone()),
                    Entry {
                        raw: raw.to_string(),
                        owner: owner.to_string(),
                    },
                );
                Ok((id, Registration::New))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derivations() {
        assert_eq!(package_id("my-application"), "my_application_manifest");
        assert_eq!(interface_id("my-api"), "my_api_api");
        assert_eq!(artifact_id("my-binding"), "my_binding_binding");
        assert_eq!(artifact_id("lib/afb-helpers.so"), "lib_afb_helpers_so_binding");
        assert_eq!(target_key("app_manifest", "main"), "app_manifest.main");
    }

    #[test]
    fn test_only_artifacts_strip_slashes_and_dots() {
        assert_eq!(package_id("a.b/c"), "a.b/c_manifest");
        assert_eq!(interface_id("a.b"), "a.b_api");
    }

    #[test]
    fn test_derivation_is_deterministic() {
        for name in ["", "x", "a-b-c", "lib/x.so", "already_clean"] {
            for kind in [IdKind::Package, IdKind::Interface, IdKind::Artifact] {
                assert_eq!(kind.derive(name), kind.derive(name));
            }
        }
    }

    #[test]
    fn test_kinds_never_collide() {
        let ids: Vec<String> = [IdKind::Package, IdKind::Interface, IdKind::Artifact]
            .iter()
            .map(|k| k.derive("same"))
            .collect();
        assert_eq!(ids, vec!["same_manifest", "same_api", "same_binding"]);
    }

    #[test]
    fn test_registry_repeated_name() {
        let mut registry = IdRegistry::new();
        assert_eq!(
            registry.register(IdKind::Artifact, "net", "app").unwrap(),
            ("net_binding".to_string(), Registration::New)
        );
        assert_eq!(
            registry.register(IdKind::Artifact, "net", "app").unwrap(),
            ("net_binding".to_string(), Registration::Repeated)
        );
    }

    #[test]
    fn test_registry_binding_is_scoped_to_its_manifest() {
        let mut registry = IdRegistry::new();
        registry.register(IdKind::Artifact, "sqlite", "a").unwrap();

        let err = registry.register(IdKind::Artifact, "sqlite", "b").unwrap_err();
        assert_eq!(err.id, "sqlite_binding");
        assert_eq!(err.existing_owner, "a");
        assert_eq!(err.incoming_owner, "b");
    }

    #[test]
    fn test_registry_api_may_be_repeated_across_manifests() {
        let mut registry = IdRegistry::new();
        registry.register(IdKind::Interface, "hello", "a").unwrap();
        let (_, reg) = registry.register(IdKind::Interface, "hello", "b").unwrap();
        assert_eq!(reg, Registration::Repeated);
    }

    #[test]
    fn test_registry_detects_collision() {
        let mut registry = IdRegistry::new();
        registry.register(IdKind::Artifact, "a.b", "app").unwrap();

        let err = registry.register(IdKind::Artifact, "a-b", "app").unwrap_err();
        assert_eq!(err.id, "a_b_binding");
        assert_eq!(err.existing, "a.b");
        assert_eq!(err.incoming, "a-b");
        assert!(err.to_string().contains("both become `a_b_binding`)"));
    }

    #[test]
    fn test_registry_namespaces_are_separate() {
        let mut registry = IdRegistry::new();
        registry.register(IdKind::Interface, "db", "app").unwrap();
        let (_, reg) = registry.register(IdKind::Artifact, "db", "app").unwrap();
        assert_eq!(reg, Registration::New);
        let (_, reg) = registry.register(IdKind::Package, "db", "db").unwrap();
        assert_eq!(reg, Registration::New);
    }
}

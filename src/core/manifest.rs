//! `manifest.yml` parsing and data model.
//!
//! A manifest describes one application: its identity, the targets it
//! ships, and the APIs and bindings those targets provide or require.
//! Loading is deliberately lenient: anything that parses as YAML with the
//! right shape loads, and semantic rules are left to
//! [`validation`](crate::core::validation).

use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// Required-binding value meaning "provided outside the manifest set".
pub const EXTERN_BINDING: &str = "extern";

/// Conventional required-binding value for same-manifest bindings.
pub const LOCAL_BINDING: &str = "local";

/// Failure to turn a path into a [`Manifest`].
#[derive(Debug, Error)]
pub enum ManifestError {
    #[error("{} could not be read (check path and permission)", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is empty", .path.display())]
    Empty { path: PathBuf },

    #[error("{} does not look like a valid manifest", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

impl ManifestError {
    pub fn path(&self) -> &Path {
        match self {
            ManifestError::Read { path, .. }
            | ManifestError::Empty { path }
            | ManifestError::Parse { path, .. } => path,
        }
    }

    /// Extra hint for YAML features people commonly trip over.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ManifestError::Read { .. } => None,
            ManifestError::Empty { .. } => Some("a manifest needs at least `rp-manifest`, `id` and `targets`"),
            ManifestError::Parse { source, .. } => {
                let msg = source.to_string();
                if msg.contains('@') || msg.contains('`') {
                    Some("`@` and `` ` `` are reserved YAML characters, quote values using them")
                } else {
                    Some("only complete YAML files are supported, not templates (i.e. CMake's configure_file)")
                }
            }
        }
    }
}

/// A loaded application manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifest {
    /// Path the manifest was loaded from
    pub path: PathBuf,

    /// Manifest format version (`rp-manifest`)
    pub format_version: Option<u64>,

    /// Application identifier
    pub id: String,

    /// Application version
    pub version: Option<String>,

    /// Human-readable name
    pub name: Option<String>,

    pub description: Option<String>,

    pub license: Option<String>,

    pub author: Option<String>,

    /// Runnable units, in declaration order
    pub targets: Vec<Target>,

    /// Bindings provided at manifest level, in declaration order
    pub provided_bindings: Vec<Binding>,
}

/// A runnable unit inside a manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Target {
    /// Target name, unique within its manifest
    #[serde(rename = "target", default, deserialize_with = "scalar_string")]
    pub name: String,

    /// What the target runs; display only
    #[serde(default)]
    pub content: Option<Content>,

    #[serde(default, rename = "provided-api", deserialize_with = "nullable")]
    pub provided_apis: Vec<Api>,

    #[serde(default, rename = "required-api", deserialize_with = "nullable")]
    pub required_apis: Vec<Api>,

    #[serde(default, rename = "required-binding", deserialize_with = "nullable")]
    pub required_bindings: Vec<Binding>,
}

/// Content descriptor of a target.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Content {
    /// MIME-like content type (e.g. `application/vnd.agl.native`)
    #[serde(rename = "type", default, deserialize_with = "scalar_string")]
    pub kind: String,

    /// Entry point, relative to the package
    #[serde(default, deserialize_with = "scalar_string")]
    pub src: String,
}

/// A named API, provided or required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Api {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,

    /// Transport hint (`ws`, `dbus`, ...); not used when matching
    #[serde(default, deserialize_with = "optional_scalar_string")]
    pub value: Option<String>,
}

/// A named binding, provided or required.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Binding {
    #[serde(default, deserialize_with = "scalar_string")]
    pub name: String,

    /// Free-form for provided bindings; `extern` or local marker for required ones
    #[serde(default, deserialize_with = "scalar_string")]
    pub value: String,
}

impl Api {
    pub fn new(name: impl Into<String>) -> Self {
        Api {
            name: name.into(),
            value: None,
        }
    }
}

impl Binding {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Binding {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Whether a required binding is supplied outside the manifest set.
    pub fn is_extern(&self) -> bool {
        self.value == EXTERN_BINDING
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} = {}", self.name, self.value)
    }
}

/// Raw manifest as deserialized from YAML.
#[derive(Debug, Deserialize)]
struct RawManifest {
    #[serde(default, rename = "rp-manifest", deserialize_with = "format_version")]
    rp_manifest: Option<u64>,

    #[serde(default, deserialize_with = "scalar_string")]
    id: String,

    #[serde(default, deserialize_with = "optional_scalar_string")]
    version: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar_string")]
    name: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar_string")]
    description: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar_string")]
    license: Option<String>,

    #[serde(default, deserialize_with = "optional_scalar_string")]
    author: Option<String>,

    #[serde(default, deserialize_with = "nullable")]
    targets: Vec<Target>,

    #[serde(default, rename = "provided-binding", deserialize_with = "nullable")]
    provided_binding: Vec<Binding>,
}

impl Manifest {
    /// Load a manifest from a file path.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let manifest = Self::parse(&content, path)?;
        tracing::debug!("Manifest loaded from {}", path.display());
        Ok(manifest)
    }

    /// Parse manifest content; `path` is only recorded for traceability.
    pub fn parse(content: &str, path: &Path) -> Result<Self, ManifestError> {
        if is_blank(content) {
            return Err(ManifestError::Empty {
                path: path.to_path_buf(),
            });
        }

        let raw: RawManifest =
            serde_yaml::from_str(content).map_err(|source| ManifestError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Manifest {
            path: path.to_path_buf(),
            format_version: raw.rp_manifest,
            id: raw.id,
            version: raw.version,
            name: raw.name,
            description: raw.description,
            license: raw.license,
            author: raw.author,
            targets: raw.targets,
            provided_bindings: raw.provided_binding,
        })
    }

    /// Get a target by name.
    pub fn target(&self, name: &str) -> Option<&Target> {
        self.targets.iter().find(|t| t.name == name)
    }

    /// Provided bindings whose value equals `value`.
    pub fn provided_bindings_with_value(&self, value: &str) -> Vec<&Binding> {
        self.provided_bindings.iter().filter(|b| b.value == value).collect()
    }
}

/// Only whitespace, comments or document markers.
fn is_blank(content: &str) -> bool {
    content.lines().map(str::trim).all(|line| {
        line.is_empty() || line.starts_with('#') || line == "---" || line == "..."
    })
}

/// `rp-manifest: 1` and `rp-manifest: "1"` both read as version 1.
fn format_version<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    match optional_scalar_string(deserializer)? {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            D::Error::custom(format!("expected an integer format version, found `{}`", raw))
        }),
    }
}

/// An empty key (`provided-api:`) reads as an empty list.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accept any YAML scalar where a string is expected (`version: 1.0`).
fn scalar_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(optional_scalar_string(deserializer)?.unwrap_or_default())
}

fn optional_scalar_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;
    use serde_yaml::Value;

    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::Bool(b) => Ok(Some(b.to_string())),
        other => Err(D::Error::custom(format!(
            "expected a scalar value, found {}",
            describe(&other)
        ))),
    }
}

fn describe(value: &serde_yaml::Value) -> &'static str {
    use serde_yaml::Value;
    match value {
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
        _ => "a scalar",
    }
}

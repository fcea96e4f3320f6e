//! Structural validation of loaded manifests.
//!
//! Validation is split into three stages, each collecting every issue it
//! finds rather than stopping at the first one:
//! 1. Header validation - format version, id, version
//! 2. Target validation - names, content, APIs and required bindings
//! 3. Binding validation - manifest-level provided bindings

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::core::manifest::{Api, Binding, Manifest, Target};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Manifest format version this tool understands.
pub const SUPPORTED_FORMAT_VERSION: u64 = 1;

static ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9][a-z0-9._-]*$").expect("manifest id pattern is valid")
});

/// A single rule violation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationIssue {
    #[error("missing `rp-manifest` format version")]
    MissingFormatVersion,

    #[error("unsupported `rp-manifest` format version {found} (expected {expected})")]
    UnsupportedFormatVersion { found: u64, expected: u64 },

    #[error("missing `id`")]
    MissingId,

    #[error("invalid `id` `{id}` (lowercase letters, digits, `.`, `_` and `-` only)")]
    InvalidId { id: String },

    #[error("missing `version`")]
    MissingVersion,

    #[error("no `targets` declared")]
    NoTargets,

    #[error("target #{index} has no `target` name")]
    UnnamedTarget { index: usize },

    #[error("target `{target}` is declared more than once")]
    DuplicateTarget { target: String },

    #[error("target `{target}` has no `content`")]
    MissingContent { target: String },

    #[error("target `{target}` content is missing `{field}`")]
    IncompleteContent { target: String, field: &'static str },

    #[error("target `{target}` has a {list} entry without a name")]
    UnnamedApi { target: String, list: &'static str },

    #[error("{owner} has a {list} entry without a name")]
    UnnamedBinding { owner: String, list: &'static str },

    #[error("{owner} binding `{binding}` has no value")]
    MissingBindingValue { owner: String, binding: String },

    #[error("provided binding `{binding}` is declared more than once")]
    DuplicateProvidedBinding { binding: String },
}

/// All the issues found in one manifest.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{} is not a valid manifest ({} issue(s))", .path.display(), .issues.len())]
pub struct ValidationError {
    pub path: PathBuf,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationError {
    /// One diagnostic per issue, located at the manifest path.
    pub fn to_diagnostics(&self) -> Vec<Diagnostic> {
        self.issues
            .iter()
            .map(|issue| Diagnostic::error(issue.to_string()).with_location(&self.path))
            .collect()
    }

    /// Summary diagnostic for the whole manifest.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let mut diag = Diagnostic::error("manifest validation failed").with_location(&self.path);
        for issue in &self.issues {
            diag = diag.with_context(issue.to_string());
        }
        diag.with_suggestion(suggestions::RUN_CHECK)
            .with_suggestion(suggestions::SKIP_CHECK)
    }
}

/// Validate a manifest, collecting every issue.
pub fn validate(manifest: &Manifest) -> Result<(), ValidationError> {
    let mut issues = Vec::new();

    validate_header(manifest, &mut issues);
    validate_targets(&manifest.targets, &mut issues);
    validate_provided_bindings(&manifest.provided_bindings, &mut issues);

    if issues.is_empty() {
        tracing::debug!("{} is valid", manifest.path.display());
        Ok(())
    } else {
        Err(ValidationError {
            path: manifest.path.clone(),
            issues,
        })
    }
}

/// Stage 1: format version, id and version.
fn validate_header(manifest: &Manifest, issues: &mut Vec<ValidationIssue>) {
    match manifest.format_version {
        None => issues.push(ValidationIssue::MissingFormatVersion),
        Some(found) if found != SUPPORTED_FORMAT_VERSION => {
            issues.push(ValidationIssue::UnsupportedFormatVersion {
                found,
                expected: SUPPORTED_FORMAT_VERSION,
            })
        }
        Some(_) => {}
    }

    if manifest.id.is_empty() {
        issues.push(ValidationIssue::MissingId);
    } else if !ID_PATTERN.is_match(&manifest.id) {
        issues.push(ValidationIssue::InvalidId {
            id: manifest.id.clone(),
        });
    }

    if manifest.version.as_deref().map_or(true, str::is_empty) {
        issues.push(ValidationIssue::MissingVersion);
    }
}

/// Stage 2: every target and what it provides or requires.
fn validate_targets(targets: &[Target], issues: &mut Vec<ValidationIssue>) {
    if targets.is_empty() {
        issues.push(ValidationIssue::NoTargets);
        return;
    }

    let mut seen = HashSet::new();
    for (index, target) in targets.iter().enumerate() {
        if target.name.is_empty() {
            issues.push(ValidationIssue::UnnamedTarget { index });
            continue;
        }
        if !seen.insert(target.name.as_str()) {
            issues.push(ValidationIssue::DuplicateTarget {
                target: target.name.clone(),
            });
        }

        match target.content {
            None => issues.push(ValidationIssue::MissingContent {
                target: target.name.clone(),
            }),
            Some(ref content) => {
                if content.src.is_empty() {
                    issues.push(ValidationIssue::IncompleteContent {
                        target: target.name.clone(),
                        field: "src",
                    });
                }
                if content.kind.is_empty() {
                    issues.push(ValidationIssue::IncompleteContent {
                        target: target.name.clone(),
                        field: "type",
                    });
                }
            }
        }

        validate_apis(&target.name, "provided-api", &target.provided_apis, issues);
        validate_apis(&target.name, "required-api", &target.required_apis, issues);

        let owner = format!("target `{}`", target.name);
        validate_bindings(&owner, "required-binding", &target.required_bindings, issues);
    }
}

fn validate_apis(target: &str, list: &'static str, apis: &[Api], issues: &mut Vec<ValidationIssue>) {
    if apis.iter().any(|api| api.name.is_empty()) {
        issues.push(ValidationIssue::UnnamedApi {
            target: target.to_string(),
            list,
        });
    }
}

fn validate_bindings(
    owner: &str,
    list: &'static str,
    bindings: &[Binding],
    issues: &mut Vec<ValidationIssue>,
) {
    for binding in bindings {
        if binding.name.is_empty() {
            issues.push(ValidationIssue::UnnamedBinding {
                owner: owner.to_string(),
                list,
            });
        } else if binding.value.is_empty() {
            issues.push(ValidationIssue::MissingBindingValue {
                owner: owner.to_string(),
                binding: binding.name.clone(),
            });
        }
    }
}

/// Stage 3: manifest-level provided bindings.
fn validate_provided_bindings(bindings: &[Binding], issues: &mut Vec<ValidationIssue>) {
    validate_bindings("manifest", "provided-binding", bindings, issues);

    let mut seen = HashSet::new();
    for binding in bindings.iter().filter(|b| !b.name.is_empty()) {
        if !seen.insert(binding.name.as_str()) {
            issues.push(ValidationIssue::DuplicateProvidedBinding {
                binding: binding.name.clone(),
            });
        }
    }
}

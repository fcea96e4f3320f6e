//! Manifest checks.
//!
//! Every path is loaded and validated, and every problem found is recorded
//! in the report. Unlike graph generation, a failing manifest does not stop
//! the others from being checked.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use crate::core::manifest::Manifest;
use crate::core::validation::validate;
use crate::graph::GraphError;
use crate::util::diagnostic::Diagnostic;

/// Outcome for one manifest.
#[derive(Debug, Clone, Serialize)]
pub struct ManifestCheck {
    pub path: PathBuf,

    /// Manifest id, when the file could be loaded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub valid: bool,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<Diagnostic>,
}

/// Outcome for a whole check run.
#[derive(Debug, Clone, Default)]
pub struct CheckReport {
    pub manifests: Vec<ManifestCheck>,
}

impl CheckReport {
    pub fn all_valid(&self) -> bool {
        self.manifests.iter().all(|m| m.valid)
    }

    pub fn invalid_count(&self) -> usize {
        self.manifests.iter().filter(|m| !m.valid).count()
    }
}

/// Check every manifest in `paths`.
pub fn check(paths: &[PathBuf]) -> CheckReport {
    let mut report = CheckReport::default();

    for path in paths {
        let result = check_one(path);
        tracing::debug!(
            "Checked {}: {} problem(s)",
            path.display(),
            result.diagnostics.len()
        );
        report.manifests.push(result);
    }

    report
}

fn check_one(path: &Path) -> ManifestCheck {
    let manifest = match Manifest::load(path) {
        Ok(manifest) => manifest,
        Err(e) => {
            return ManifestCheck {
                path: path.to_path_buf(),
                id: None,
                valid: false,
                diagnostics: vec![GraphError::from(e).to_diagnostic()],
            }
        }
    };

    let diagnostics = match validate(&manifest) {
        Ok(()) => Vec::new(),
        Err(e) => e.to_diagnostics(),
    };

    ManifestCheck {
        path: path.to_path_buf(),
        id: Some(manifest.id),
        valid: diagnostics.is_empty(),
        diagnostics,
    }
}

/// Human-readable report.
pub fn format_report(report: &CheckReport) -> String {
    let mut output = String::new();

    for manifest in &report.manifests {
        let status = if manifest.valid { "[OK]" } else { "[!!]" };
        let _ = writeln!(output, "{} {}", status, manifest.path.display());
        for diag in &manifest.diagnostics {
            for ctx in std::iter::once(&diag.message).chain(&diag.context) {
                let _ = writeln!(output, "     {}", ctx);
            }
        }
    }

    if report.all_valid() {
        let _ = writeln!(output, "All manifests are valid");
    } else {
        let _ = writeln!(
            output,
            "{} of {} manifest(s) are invalid",
            report.invalid_count(),
            report.manifests.len()
        );
    }

    output
}

/// One JSON object per manifest, one per line.
pub fn format_json(report: &CheckReport) -> Result<String> {
    let mut output = String::new();
    for manifest in &report.manifests {
        output.push_str(&serde_json::to_string(manifest)?);
        output.push('\n');
    }
    Ok(output)
}

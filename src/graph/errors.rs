//! Graph build error types and diagnostics.

use std::path::PathBuf;

use miette::Diagnostic as MietteDiagnostic;
use thiserror::Error;

use crate::core::manifest::ManifestError;
use crate::core::validation::ValidationError;
use crate::graph::emit::EmitError;
use crate::graph::ident::IdCollision;
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while building or rendering a graph.
#[derive(Debug, Error, MietteDiagnostic)]
pub enum GraphError {
    #[error("failed to load manifest")]
    #[diagnostic(code(manifest_parser::graph::load))]
    Load(#[from] ManifestError),

    #[error("{} manifest(s) failed validation", .failures.len())]
    #[diagnostic(
        code(manifest_parser::graph::validation),
        help("Run `manifest-parser check` for details or pass `--no-check`")
    )]
    Validation { failures: Vec<ValidationError> },

    #[error("manifest id `{id}` appears more than once (again in {})", .second.display())]
    #[diagnostic(code(manifest_parser::graph::duplicate_manifest))]
    DuplicateManifest {
        id: String,
        first: PathBuf,
        second: PathBuf,
    },

    #[error("{} has no `id` and cannot be drawn", .path.display())]
    #[diagnostic(
        code(manifest_parser::graph::missing_id),
        help("Give the manifest an `id`")
    )]
    MissingId { path: PathBuf },

    #[error("identifier collision in {}", .path.display())]
    #[diagnostic(
        code(manifest_parser::graph::identifier_collision),
        help("Rename one of the resources so their diagram identifiers differ")
    )]
    IdentifierCollision {
        path: PathBuf,
        #[source]
        source: IdCollision,
    },

    #[error("a file or directory already exists at {}", .path.display())]
    #[diagnostic(
        code(manifest_parser::graph::output_collision),
        help("Pass `--overwrite` to replace it")
    )]
    OutputCollision { path: PathBuf },

    #[error("renderer `{program}` not found")]
    #[diagnostic(
        code(manifest_parser::render::unavailable),
        help("Install PlantUML or point `--renderer` at the executable to use")
    )]
    RenderUnavailable { program: String },

    #[error("renderer failed: `{command}` exited with {}", exit_status(.code.as_ref()))]
    #[diagnostic(code(manifest_parser::render::execution))]
    RenderExecution {
        command: String,
        code: Option<i32>,
        stderr: String,
    },

    #[error("I/O error on {}", .path.display())]
    #[diagnostic(code(manifest_parser::graph::io))]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn exit_status(code: Option<&i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "no status (terminated by signal)".to_string(),
    }
}

impl GraphError {
    /// Attach the description path to an emission failure.
    pub fn from_emit(err: EmitError, description: PathBuf) -> Self {
        match err {
            EmitError::Io(source) => GraphError::Io {
                path: description,
                source,
            },
            EmitError::Collision { path, source } => GraphError::IdentifierCollision { path, source },
            EmitError::DuplicatePackage { path, id } => GraphError::DuplicateManifest {
                id,
                first: PathBuf::new(),
                second: path,
            },
        }
    }

    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        match self {
            GraphError::Load(err) => {
                let mut diag = Diagnostic::error(err.to_string())
                    .with_location(err.path())
                    .with_context(error_chain(err));
                if let Some(hint) = err.hint() {
                    diag = diag.with_suggestion(hint);
                }
                diag
            }

            GraphError::Validation { failures } => {
                let mut diag = Diagnostic::error(self.to_string());
                for failure in failures {
                    diag = diag.with_context(format!(
                        "{}: {} issue(s)",
                        failure.path.display(),
                        failure.issues.len()
                    ));
                }
                diag.with_suggestion(suggestions::RUN_CHECK)
                    .with_suggestion(suggestions::SKIP_CHECK)
            }

            GraphError::DuplicateManifest { id, first, second } => {
                let mut diag = Diagnostic::error(format!("manifest `{}` is listed twice", id))
                    .with_location(second);
                if !first.as_os_str().is_empty() {
                    diag = diag.with_context(format!("first loaded from {}", first.display()));
                }
                diag.with_suggestion("Pass each manifest only once")
            }

            GraphError::MissingId { path } => Diagnostic::error(self.to_string())
                .with_location(path)
                .with_context("packages are named after the manifest id")
                .with_suggestion("Add an `id` to the manifest"),

            GraphError::IdentifierCollision { path, source } => {
                let suggestion = if source.existing == source.incoming {
                    format!(
                        "Rename {} `{}` in manifest `{}` or `{}`",
                        source.kind, source.incoming, source.incoming_owner, source.existing_owner
                    )
                } else {
                    format!(
                        "Rename {} `{}` or `{}`",
                        source.kind, source.existing, source.incoming
                    )
                };
                Diagnostic::error(format!("identifier `{}` is ambiguous", source.id))
                    .with_location(path)
                    .with_context(source.to_string())
                    .with_suggestion(suggestion)
            }

            GraphError::OutputCollision { path } => {
                Diagnostic::error(format!("{} already exists", path.display()))
                    .with_location(path)
                    .with_suggestion(suggestions::OVERWRITE)
            }

            GraphError::RenderUnavailable { program } => {
                Diagnostic::error(format!("renderer `{}` not found in PATH", program))
                    .with_context("the diagram description could not be rendered")
                    .with_suggestion(suggestions::INSTALL_PLANTUML)
                    .with_suggestion("Pass `--no-render` to only write the description")
            }

            GraphError::RenderExecution {
                command,
                code,
                stderr,
            } => {
                let mut diag = Diagnostic::error("renderer failed to render the diagram")
                    .with_context(format!("`{}` exited with {}", command, exit_status(code.as_ref())));
                for line in stderr.lines().filter(|l| !l.trim().is_empty()).take(5) {
                    diag = diag.with_context(line.to_string());
                }
                diag.with_suggestion("Pass `--keep-puml` and inspect the description")
            }

            GraphError::Io { path, source } => Diagnostic::error(format!("I/O error: {}", source))
                .with_location(path),
        }
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut chain = Vec::new();
    let mut current = err.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    if chain.is_empty() {
        err.to_string()
    } else {
        chain.join(": ")
    }
}

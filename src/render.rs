//! External diagram renderers.
//!
//! The description is written by [`crate::graph`]; turning it into an image
//! is left to an external program that writes `<base>.<format>` next to it.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::graph::GraphError;
use crate::util::config::{DEFAULT_FORMAT, DEFAULT_RENDERER};
use crate::util::process::{find_executable, ProcessBuilder};

/// Turns a description file into an image.
pub trait Renderer {
    /// Program name, for messages.
    fn name(&self) -> &str;

    /// Image the renderer produces for the output base `base`.
    fn output_path(&self, base: &Path) -> PathBuf;

    /// Render `description`, waiting for completion.
    fn render(&self, description: &Path) -> Result<(), GraphError>;
}

/// The `plantuml` command line renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlantUml {
    /// Executable name or path
    pub program: String,
    /// Image format, passed as `-t<format>`
    pub format: String,
}

impl Default for PlantUml {
    fn default() -> Self {
        PlantUml {
            program: DEFAULT_RENDERER.to_string(),
            format: DEFAULT_FORMAT.to_string(),
        }
    }
}

impl PlantUml {
    pub fn new(program: impl Into<String>, format: impl Into<String>) -> Self {
        PlantUml {
            program: program.into(),
            format: format.into(),
        }
    }

    fn command(&self, executable: &Path, description: &Path) -> ProcessBuilder {
        ProcessBuilder::new(executable)
            .arg(format!("-t{}", self.format))
            .arg(description)
    }
}

impl Renderer for PlantUml {
    fn name(&self) -> &str {
        &self.program
    }

    fn output_path(&self, base: &Path) -> PathBuf {
        with_extension_appended(base, &self.format)
    }

    fn render(&self, description: &Path) -> Result<(), GraphError> {
        let unavailable = || GraphError::RenderUnavailable {
            program: self.program.clone(),
        };

        let executable = find_executable(&self.program).ok_or_else(unavailable)?;
        let cmd = self.command(&executable, description);

        let output = cmd.exec().map_err(|e| {
            tracing::debug!("{:#}", e);
            unavailable()
        })?;

        if !output.status.success() {
            return Err(GraphError::RenderExecution {
                command: cmd.display_command(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        tracing::info!("Rendered {}", description.display());
        Ok(())
    }
}

/// `out/graph` + `svg` -> `out/graph.svg`, keeping any dot already in the base.
pub fn with_extension_appended(base: &Path, extension: &str) -> PathBuf {
    let mut name = OsString::from(base.as_os_str());
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

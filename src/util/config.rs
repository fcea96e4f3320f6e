//! Configuration file support.
//!
//! Two configuration file locations are read:
//! - Global: `~/.manifest-parser/config.toml` - User-wide defaults
//! - Project: `.manifest-parser/config.toml` - Directory-specific overrides
//!
//! Project config takes precedence over global config, and command-line
//! flags take precedence over both.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Name of the directory holding configuration files.
pub const CONFIG_DIR_NAME: &str = ".manifest-parser";

/// Renderer used when nothing else is configured.
pub const DEFAULT_RENDERER: &str = "plantuml";

/// Image format requested from the renderer by default.
pub const DEFAULT_FORMAT: &str = "svg";

/// Output base name used when nothing else is configured.
pub const DEFAULT_OUTPUT: &str = "graph";

/// Tool configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Renderer settings
    pub render: RenderConfig,

    /// Graph settings
    pub graph: GraphConfig,
}

/// External renderer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Renderer executable name or path (e.g. /opt/plantuml/bin/plantuml)
    pub program: Option<String>,

    /// Image format passed as `-t<format>` (svg, png, ...)
    pub format: Option<String>,
}

/// Defaults for the `graph` subcommand.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Output base name (extension is appended)
    pub output: Option<String>,

    /// Always keep the PlantUML description file
    pub keep_description: bool,
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.render.program.is_some() {
            self.render.program = other.render.program;
        }
        if other.render.format.is_some() {
            self.render.format = other.render.format;
        }
        if other.graph.output.is_some() {
            self.graph.output = other.graph.output;
        }
        if other.graph.keep_description {
            self.graph.keep_description = true;
        }
    }

    /// Renderer executable, falling back to `plantuml`.
    pub fn renderer_program(&self) -> &str {
        self.render.program.as_deref().unwrap_or(DEFAULT_RENDERER)
    }

    /// Renderer image format, falling back to `svg`.
    pub fn render_format(&self) -> &str {
        self.render.format.as_deref().unwrap_or(DEFAULT_FORMAT)
    }

    /// Output base name, falling back to `graph`.
    pub fn output(&self) -> &str {
        self.graph.output.as_deref().unwrap_or(DEFAULT_OUTPUT)
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.manifest-parser/config.toml)
/// 2. Global config (~/.manifest-parser/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global config directory (~/.manifest-parser).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(CONFIG_DIR_NAME))
}

/// Get the global config path (~/.manifest-parser/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.manifest-parser/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(CONFIG_DIR_NAME).join("config.toml")
}

//! CLI definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

/// manifest-parser - check redpesk manifests and draw their dependency graph
#[derive(Parser)]
#[command(name = "manifest-parser")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level
    #[arg(short, long, value_enum, default_value_t = LogLevel::Info, global = true)]
    pub log: LogLevel,

    /// Enable verbose output (same as `--log debug`)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that manifests are valid
    Check(CheckArgs),

    /// Generate the dependency graph of a set of manifests
    Graph(GraphArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    #[value(alias = "critical")]
    Error,
    #[value(alias = "warning")]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MessageFormat {
    /// One line per manifest, followed by its problems
    Human,
    /// One JSON object per manifest
    Json,
}

#[derive(Args)]
pub struct CheckArgs {
    /// Output format
    #[arg(long, value_enum, default_value_t = MessageFormat::Human)]
    pub message_format: MessageFormat,

    /// Manifest files to check
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct GraphArgs {
    /// Output base name, `.puml` and the image extension are appended
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Keep the PlantUML description after rendering
    #[arg(short, long = "keep-puml")]
    pub keep_puml: bool,

    /// Replace existing output files
    #[arg(short = 'w', long)]
    pub overwrite: bool,

    /// Do not validate manifests before drawing them
    #[arg(short = 'c', long)]
    pub no_check: bool,

    /// Only write the PlantUML description
    #[arg(long)]
    pub no_render: bool,

    /// Renderer executable (defaults to `plantuml`)
    #[arg(long, env = "MANIFEST_PARSER_RENDERER")]
    pub renderer: Option<String>,

    /// Manifest files to draw, in order
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: Shell,
}

//! manifest-parser CLI - check redpesk manifests and draw their dependencies

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands, LogLevel};

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    // Parse CLI
    let cli = Cli::parse();

    // Set up logging, RUST_LOG wins over --log
    let level = if cli.verbose { LogLevel::Debug } else { cli.log };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("manifest_parser={}", level.as_str())));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    // Execute command
    match cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Graph(args) => commands::graph::execute(args),
        Commands::Completions(args) => commands::completions::execute(args),
    }
}

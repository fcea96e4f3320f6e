//! `manifest-parser graph` command

use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::cli::GraphArgs;
use manifest_parser::ops::{graph, GraphOptions};
use manifest_parser::render::PlantUml;
use manifest_parser::util::config::{global_config_path, load_config, project_config_path};
use manifest_parser::util::diagnostic::emit;
use manifest_parser::util::TracingReporter;

pub fn execute(args: GraphArgs) -> Result<()> {
    let cwd = std::env::current_dir().context("failed to get current directory")?;

    // Load configuration (global + project)
    let config = load_config(global_config_path().as_deref(), &project_config_path(&cwd));

    // Renderer: CLI/env > config > plantuml
    let program = args
        .renderer
        .unwrap_or_else(|| config.renderer_program().to_string());
    let renderer = PlantUml::new(program, config.render_format());

    let opts = GraphOptions {
        output: args
            .output
            .unwrap_or_else(|| PathBuf::from(config.output())),
        paths: args.paths,
        keep_description: args.keep_puml || config.graph.keep_description,
        overwrite: args.overwrite,
        skip_validation: args.no_check,
        render: !args.no_render,
    };

    let mut reporter = TracingReporter::new();
    let report = match graph(&opts, &renderer, &mut reporter) {
        Ok(report) => report,
        Err(err) => {
            emit(&err.to_diagnostic(), std::io::stderr().is_terminal());
            std::process::exit(1);
        }
    };

    if report.description_kept {
        eprintln!("    Wrote {}", report.description.display());
    }
    if let Some(ref image) = report.image {
        eprintln!("    Rendered {}", image.display());
    }
    if reporter.warnings() > 0 {
        eprintln!("    {} warning(s) emitted", reporter.warnings());
    }

    Ok(())
}

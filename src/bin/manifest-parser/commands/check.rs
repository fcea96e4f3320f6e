//! `manifest-parser check` command

use anyhow::Result;

use crate::cli::{CheckArgs, MessageFormat};
use manifest_parser::ops::{check, format_json, format_report};

pub fn execute(args: CheckArgs) -> Result<()> {
    let report = check(&args.paths);

    match args.message_format {
        MessageFormat::Human => print!("{}", format_report(&report)),
        MessageFormat::Json => print!("{}", format_json(&report)?),
    }

    if !report.all_valid() {
        std::process::exit(1);
    }

    Ok(())
}

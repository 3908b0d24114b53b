//! Summarize a log file: per-level counts, distinct errors, last timestamp.

use anyhow::{Context, Result};
use clap::Parser;
use dirsort::output::OutputFormatter;
use dirsort::{LogTally, init_tracing};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "logtally", version, about = "Count log levels and list distinct errors.")]
struct Args {
    /// Log file to summarize.
    file: PathBuf,

    /// Print the summary as JSON.
    #[arg(long)]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing("warn");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            OutputFormatter::error(&format!("Error: {e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let tally = LogTally::from_path(&args.file)?;
    tracing::debug!(lines = tally.total_lines, "log read");

    if args.json {
        let json = tally.to_json().context("could not serialize summary")?;
        OutputFormatter::plain(&json);
    } else {
        OutputFormatter::log_tally(&tally);
    }
    Ok(())
}

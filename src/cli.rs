//! Command-line interface for the `dirsort` binary.
//!
//! Parses arguments with clap and drives the organize, dry-run and undo
//! flows, leaving the printing to [`OutputFormatter`].

use anyhow::{Context, Result};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::FilterConfig;
use crate::organizer::Organizer;
use crate::output::OutputFormatter;
use crate::undo::UndoManager;

/// Sort the files of a directory into per-category subdirectories by extension.
#[derive(Debug, Parser)]
#[command(name = "dirsort", version, about)]
pub struct Cli {
    /// Target directory.
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Print the current working directory.
    #[arg(long)]
    pub show_cwd: bool,

    /// Show what would be moved without touching any file.
    #[arg(long, conflicts_with = "undo")]
    pub dry_run: bool,

    /// Revert the last organize run in the target directory.
    #[arg(long)]
    pub undo: bool,

    /// Filter configuration file (TOML).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log each move.
    #[arg(short, long)]
    pub verbose: bool,
}

/// What to do with the target directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrganizeCommand {
    Organize {
        /// Plan only, change nothing.
        dry_run: bool,
    },
    Undo,
}

impl Cli {
    pub fn organize_command(&self) -> OrganizeCommand {
        if self.undo {
            OrganizeCommand::Undo
        } else {
            OrganizeCommand::Organize {
                dry_run: self.dry_run,
            }
        }
    }
}

/// Runs the parsed command line.
pub fn run(cli: &Cli) -> Result<()> {
    if cli.show_cwd {
        let cwd = std::env::current_dir().context("could not determine working directory")?;
        OutputFormatter::plain(&cwd.display().to_string());
    }

    run_cli_with_config(cli.organize_command(), &cli.path, cli.config.as_deref())
}

/// Runs `command` against `dir_path`, loading filters from `config_path` or
/// the default lookup locations.
///
/// # Examples
///
/// ```no_run
/// use dirsort::cli::{run_cli_with_config, OrganizeCommand};
/// use std::path::Path;
///
/// run_cli_with_config(OrganizeCommand::Organize { dry_run: true }, Path::new("Downloads"), None)?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn run_cli_with_config(
    command: OrganizeCommand,
    dir_path: &Path,
    config_path: Option<&Path>,
) -> Result<()> {
    let target = std::path::absolute(dir_path)
        .with_context(|| format!("invalid target path {}", dir_path.display()))?;

    match command {
        OrganizeCommand::Organize { dry_run } => {
            let config = FilterConfig::load(config_path).context("error loading configuration")?;
            let organizer = Organizer::with_config(config).context("error compiling filters")?;

            if dry_run {
                dry_run_directory(&organizer, &target)
            } else {
                organize_directory(&organizer, &target)
            }
        }
        OrganizeCommand::Undo => undo_organization(&target),
    }
}

fn organize_directory(organizer: &Organizer, target: &Path) -> Result<()> {
    OutputFormatter::info(&format!("Target path is {}", target.display()));

    let files = organizer.scan(target)?;
    let pb = OutputFormatter::create_progress_bar(files.len() as u64);
    let result = organizer.organize_files(target, files, |moved| {
        pb.set_message(moved.category.clone());
        pb.inc(1);
    });
    pb.finish_and_clear();

    let report = result?;
    info!(moved = report.moves.len(), "organize run finished");
    OutputFormatter::summary(&report.summary);

    if !report.moves.is_empty() {
        OutputFormatter::plain(&format!(
            "\nHistory saved. Use 'dirsort {} --undo' to revert changes.",
            target.display()
        ));
    }
    Ok(())
}

fn dry_run_directory(organizer: &Organizer, target: &Path) -> Result<()> {
    OutputFormatter::dry_run_notice(&format!("Analyzing contents of: {}", target.display()));

    let plan = organizer.plan(target)?;
    OutputFormatter::plan(&plan);
    Ok(())
}

fn undo_organization(target: &Path) -> Result<()> {
    OutputFormatter::info("Undoing previous organization...");

    let report = UndoManager::undo(target)?;
    OutputFormatter::undo_report(&report);
    Ok(())
}

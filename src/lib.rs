//! dirsort - sort a directory's files into category subdirectories
//!
//! The library classifies files by extension, moves them without ever
//! overwriting an existing file, records each run so it can be undone, and
//! offers a small log tally used by the `logtally` binary.

pub mod category;
pub mod cli;
pub mod config;
pub mod error;
pub mod history;
pub mod log_tally;
pub mod mover;
pub mod organizer;
pub mod output;
pub mod undo;

pub use category::{CategoryRule, CategoryTable, UNKNOWN_CATEGORY};
pub use config::{CompiledFilters, ConfigError, FilterConfig};
pub use error::{OrganizeError, OrganizeResult};
pub use history::{History, MovedFile};
pub use log_tally::{LogTally, LogTallyError};
pub use mover::move_without_overwrite;
pub use organizer::{OrganizePlan, OrganizeReport, Organizer, PlannedMove, ScanSummary};
pub use undo::{UndoManager, UndoReport};

pub use cli::{Cli, OrganizeCommand, run, run_cli_with_config};

use tracing_subscriber::EnvFilter;

/// Installs the stderr log subscriber used by both binaries. `RUST_LOG`
/// overrides `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

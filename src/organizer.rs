//! The organize pass: scan a directory, classify its files and move them into
//! per-category subdirectories.
//!
//! Only the immediate entries of the target are considered. Subdirectories are
//! left untouched, so running the organizer twice in a row moves nothing the
//! second time.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::category::CategoryTable;
use crate::config::{CompiledFilters, FilterConfig, LOCAL_CONFIG_NAME};
use crate::error::{OrganizeError, OrganizeResult};
use crate::history::{HISTORY_FILE_NAME, History, MovedFile, is_recordable};
use crate::mover::{free_destination, move_without_overwrite};

/// Per-category file counts for one run, in the order categories were first
/// seen.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanSummary {
    total_files: usize,
    categories: Vec<(String, usize)>,
}

impl ScanSummary {
    /// Counts one file towards `category` and towards the total.
    pub fn record(&mut self, category: &str) {
        self.total_files += 1;
        match self.categories.iter_mut().find(|(name, _)| name == category) {
            Some((_, count)) => *count += 1,
            None => self.categories.push((category.to_string(), 1)),
        }
    }

    pub fn total_files(&self) -> usize {
        self.total_files
    }

    /// Count for a single category, zero when it received no file.
    pub fn count(&self, category: &str) -> usize {
        self.categories
            .iter()
            .find(|(name, _)| name == category)
            .map_or(0, |(_, count)| *count)
    }

    pub fn categories(&self) -> impl Iterator<Item = (&str, usize)> {
        self.categories
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
    }

    pub fn is_empty(&self) -> bool {
        self.total_files == 0
    }
}

/// Outcome of a completed organize run.
#[derive(Debug, Clone, Default)]
pub struct OrganizeReport {
    pub summary: ScanSummary,
    pub moves: Vec<MovedFile>,
}

/// A move the organizer would perform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedMove {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub category: String,
}

/// Result of a dry run: what would move where, and the counts it would produce.
#[derive(Debug, Clone, Default)]
pub struct OrganizePlan {
    pub moves: Vec<PlannedMove>,
    pub summary: ScanSummary,
}

/// Sorts the files of a directory into category subdirectories.
#[derive(Debug, Default)]
pub struct Organizer {
    table: CategoryTable,
    filters: CompiledFilters,
}

impl Organizer {
    pub fn new(table: CategoryTable, filters: CompiledFilters) -> Self {
        Self { table, filters }
    }

    /// Builds an organizer with the default category table and the filters of
    /// `config`.
    pub fn with_config(config: FilterConfig) -> OrganizeResult<Self> {
        Ok(Self::new(CategoryTable::default(), config.compile()?))
    }

    pub fn table(&self) -> &CategoryTable {
        &self.table
    }

    /// Lists the regular files of `target` that the organizer would move,
    /// sorted by name.
    ///
    /// The history file and a local `.dirsortrc.toml` are never listed.
    ///
    /// Fails with [`OrganizeError::DirectoryNotFound`] before reading anything
    /// if `target` is missing or not a directory.
    pub fn scan(&self, target: &Path) -> OrganizeResult<Vec<PathBuf>> {
        if !target.is_dir() {
            return Err(OrganizeError::DirectoryNotFound {
                path: target.to_path_buf(),
            });
        }

        let read_dir_failed = |source| OrganizeError::ReadDirFailed {
            path: target.to_path_buf(),
            source,
        };

        let mut files = Vec::new();
        for entry in fs::read_dir(target).map_err(read_dir_failed)? {
            let path = entry.map_err(read_dir_failed)?.path();

            let own_file = path
                .file_name()
                .is_some_and(|n| n == HISTORY_FILE_NAME || n == LOCAL_CONFIG_NAME);
            if !path.is_file() || own_file {
                continue;
            }
            if !is_recordable(&path) {
                warn!(path = %path.display(), "name cannot be recorded for undo, skipping");
                continue;
            }
            if !self.filters.should_include(&path) {
                debug!(path = %path.display(), "excluded by filters");
                continue;
            }
            files.push(path);
        }

        files.sort();
        Ok(files)
    }

    /// Computes what [`Organizer::organize`] would do without touching the
    /// filesystem.
    pub fn plan(&self, target: &Path) -> OrganizeResult<OrganizePlan> {
        let files = self.scan(target)?;

        let mut plan = OrganizePlan::default();
        let mut reserved = HashSet::new();
        for source in files {
            let category = self.table.classify(&source).to_string();
            let file_name = source.file_name().unwrap_or_default();

            let destination = free_destination(&target.join(&category), file_name, &reserved);
            reserved.insert(destination.clone());

            plan.summary.record(&category);
            plan.moves.push(PlannedMove {
                source,
                destination,
                category,
            });
        }

        Ok(plan)
    }

    /// Organizes `target` and records the run for undo.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::Organizer;
    /// use std::path::Path;
    ///
    /// let report = Organizer::default().organize(Path::new("Downloads"))?;
    /// println!("organized {} files", report.summary.total_files());
    /// # Ok::<(), dirsort::OrganizeError>(())
    /// ```
    pub fn organize(&self, target: &Path) -> OrganizeResult<OrganizeReport> {
        let files = self.scan(target)?;
        self.organize_files(target, files, |_| {})
    }

    /// Moves previously scanned `files` of `target` into their category
    /// directories, calling `on_move` after each successful move.
    ///
    /// Category directories are created on first use. The first failing move
    /// aborts the run; files moved before it stay moved and are still written
    /// to the history.
    pub fn organize_files<F>(
        &self,
        target: &Path,
        files: Vec<PathBuf>,
        mut on_move: F,
    ) -> OrganizeResult<OrganizeReport>
    where
        F: FnMut(&MovedFile),
    {
        info!(dir = %target.display(), files = files.len(), "organizing directory");

        let mut report = OrganizeReport::default();
        for file in files {
            let category = self.table.classify(&file).to_string();
            let moved = Self::ensure_dir(&target.join(&category))
                .and_then(|category_dir| move_without_overwrite(&file, &category_dir));

            match moved {
                Ok(new_path) => {
                    report.summary.record(&category);
                    let record = MovedFile {
                        original_path: file,
                        new_path,
                        category,
                    };
                    on_move(&record);
                    report.moves.push(record);
                }
                Err(e) => {
                    if let Err(save_err) = Self::save_history(target, &report.moves) {
                        warn!(error = %save_err, "could not record partial run");
                    }
                    return Err(e);
                }
            }
        }

        Self::save_history(target, &report.moves)?;
        Ok(report)
    }

    fn ensure_dir(dir: &Path) -> OrganizeResult<PathBuf> {
        if !dir.is_dir() {
            info!(dir = %dir.display(), "creating category folder");
            fs::create_dir_all(dir).map_err(|source| OrganizeError::DirectoryCreationFailed {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Ok(dir.to_path_buf())
    }

    /// Runs that moved nothing keep the previous history so undo still works.
    fn save_history(target: &Path, moves: &[MovedFile]) -> OrganizeResult<()> {
        if moves.is_empty() {
            return Ok(());
        }
        History::new(target.to_path_buf(), moves.to_vec()).save(target)
    }
}

//! Reverting the last organize run.
//!
//! Moves recorded in the directory's history are replayed backwards, so the
//! last file moved is the first one restored.
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{OrganizeError, OrganizeResult};
use crate::history::{History, MovedFile};

/// What an undo run achieved.
#[derive(Debug, Default)]
pub struct UndoReport {
    /// Files moved back to their original location.
    pub restored_files: usize,
    /// Files that could not be moved back, with the reason.
    pub failed_restores: Vec<(PathBuf, String)>,
    /// Files no longer at their recorded location.
    pub skipped_files: Vec<(PathBuf, String)>,
    /// Occupants of an original location that were renamed out of the way.
    pub backups: Vec<PathBuf>,
}

impl UndoReport {
    /// Number of history entries handled, whatever their outcome.
    pub fn total_processed(&self) -> usize {
        self.restored_files + self.failed_restores.len() + self.skipped_files.len()
    }

    /// `true` when every recorded file was restored. Only then is the history
    /// deleted.
    pub fn is_complete_success(&self) -> bool {
        self.failed_restores.is_empty() && self.skipped_files.is_empty()
    }
}

enum RestoreError {
    Missing(PathBuf, String),
    Failed(PathBuf, String),
}

/// Reverts organize runs using the history saved in the target directory.
pub struct UndoManager;

impl UndoManager {
    /// Undoes the most recent organize run in `base_path`.
    ///
    /// * a file missing from its recorded location is skipped
    /// * a file already sitting at the original location is renamed to
    ///   `<name>.bak.<timestamp>` before the restore
    /// * other I/O errors are reported as failures
    ///
    /// The history is deleted only when every file came back, and category
    /// directories left empty are removed.
    ///
    /// # Arguments
    ///
    /// * `base_path` - The directory that was organized
    ///
    /// # Errors
    ///
    /// * [`OrganizeError::DirectoryNotFound`] if `base_path` is not a directory
    /// * [`OrganizeError::NoHistory`] if there is no run to undo
    /// * [`OrganizeError::InvalidHistory`] or
    ///   [`OrganizeError::HistoryReadFailed`] if the history cannot be loaded
    ///
    /// Failures on individual files are not errors; they are listed in the
    /// returned [`UndoReport`].
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use dirsort::undo::UndoManager;
    /// use std::path::Path;
    ///
    /// let report = UndoManager::undo(Path::new("Downloads"))?;
    /// println!("Restored {} files", report.restored_files);
    /// # Ok::<(), dirsort::OrganizeError>(())
    /// ```
    pub fn undo(base_path: &Path) -> OrganizeResult<UndoReport> {
        if !base_path.is_dir() {
            return Err(OrganizeError::DirectoryNotFound {
                path: base_path.to_path_buf(),
            });
        }

        let history = History::load(base_path)?.ok_or_else(|| OrganizeError::NoHistory {
            path: base_path.to_path_buf(),
        })?;

        let mut report = UndoReport::default();
        for record in history.moves.iter().rev() {
            match Self::restore_file(record) {
                Ok(backup) => {
                    report.restored_files += 1;
                    report.backups.extend(backup);
                }
                Err(RestoreError::Missing(path, reason)) => {
                    report.skipped_files.push((path, reason))
                }
                Err(RestoreError::Failed(path, reason)) => {
                    report.failed_restores.push((path, reason))
                }
            }
        }

        Self::remove_empty_category_dirs(&history.moves);

        if report.is_complete_success() {
            History::delete(base_path)?;
        }

        Ok(report)
    }

    /// Moves one file back, returning the backup path if the original location
    /// had to be cleared first.
    fn restore_file(record: &MovedFile) -> Result<Option<PathBuf>, RestoreError> {
        if !record.new_path.is_file() {
            return Err(RestoreError::Missing(
                record.new_path.clone(),
                "file not found at recorded location".to_string(),
            ));
        }

        let mut backup = None;
        if record.original_path.exists() {
            let backup_path = Self::generate_backup_path(&record.original_path);
            fs::rename(&record.original_path, &backup_path).map_err(|e| {
                RestoreError::Failed(
                    record.original_path.clone(),
                    format!("could not back up conflicting file: {e}"),
                )
            })?;
            warn!(backup = %backup_path.display(), "original location was occupied");
            backup = Some(backup_path);
        }

        fs::rename(&record.new_path, &record.original_path).map_err(|e| {
            RestoreError::Failed(record.new_path.clone(), format!("failed to restore: {e}"))
        })?;

        debug!(to = %record.original_path.display(), "restored file");
        Ok(backup)
    }

    /// `file.txt` becomes `file.txt.bak.20251109-143052`.
    fn generate_backup_path(original_path: &Path) -> PathBuf {
        let timestamp = chrono::Local::now().format("%Y%m%d-%H%M%S");
        let mut filename = original_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        filename.push(format!(".bak.{timestamp}"));

        original_path.with_file_name(filename)
    }

    fn remove_empty_category_dirs(moves: &[MovedFile]) {
        let mut dirs: Vec<&Path> = moves.iter().filter_map(|m| m.new_path.parent()).collect();
        dirs.sort();
        dirs.dedup();

        for dir in dirs {
            let is_empty = fs::read_dir(dir).is_ok_and(|mut entries| entries.next().is_none());
            if is_empty && fs::remove_dir(dir).is_ok() {
                debug!(dir = %dir.display(), "removed empty category folder");
            }
        }
    }
}

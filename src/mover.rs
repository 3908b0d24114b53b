//! Collision-safe file moves.
//!
//! [`move_without_overwrite`] never replaces an existing file: when the
//! destination name is taken it tries `<stem>_1<ext>`, `<stem>_2<ext>`, ...
//! and uses the first free name. The search is purely name-based, so two files
//! with identical content are never treated as duplicates.
//!
//! Names are handled as [`OsStr`], so a name that is not valid UTF-8 keeps its
//! exact bytes through the rename.

use std::collections::HashSet;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{OrganizeError, OrganizeResult};

/// Splits a file name into stem and suffix, with the suffix keeping its dot.
///
/// Only the last dot counts, and a leading dot (hidden files) or a trailing
/// dot does not start a suffix.
///
/// ```
/// use dirsort::mover::split_file_name;
///
/// assert_eq!(split_file_name("archive.tar.gz"), ("archive.tar", ".gz"));
/// assert_eq!(split_file_name(".bashrc"), (".bashrc", ""));
/// assert_eq!(split_file_name("README"), ("README", ""));
/// ```
pub fn split_file_name(file_name: &str) -> (&str, &str) {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx < file_name.len() - 1 => file_name.split_at(idx),
        _ => (file_name, ""),
    }
}

/// Builds the `n`-th alternative for `file_name`: `_n` goes between the stem
/// and the suffix, following the rules of [`split_file_name`].
///
/// ```
/// use dirsort::mover::numbered_name;
/// use std::ffi::OsStr;
///
/// assert_eq!(numbered_name(OsStr::new("backup.tar.gz"), 1), "backup.tar_1.gz");
/// assert_eq!(numbered_name(OsStr::new(".env"), 2), ".env_2");
/// assert_eq!(numbered_name(OsStr::new("notes."), 3), "notes._3");
/// ```
pub fn numbered_name(file_name: &OsStr, n: u64) -> OsString {
    let as_path = Path::new(file_name);
    let (stem, extension) = match (as_path.file_stem(), as_path.extension()) {
        (Some(stem), Some(ext)) if !ext.is_empty() => (stem, Some(ext)),
        _ => (file_name, None),
    };

    let mut candidate = stem.to_os_string();
    candidate.push(format!("_{n}"));
    if let Some(ext) = extension {
        candidate.push(".");
        candidate.push(ext);
    }
    candidate
}

/// Finds the first name for `file_name` inside `dest_dir` that is neither on
/// disk nor in `reserved`.
///
/// # Arguments
///
/// * `dest_dir` - Directory the file is headed for
/// * `file_name` - Name the file currently has
/// * `reserved` - Destinations already promised to other files of the same run
pub fn free_destination(
    dest_dir: &Path,
    file_name: impl AsRef<OsStr>,
    reserved: &HashSet<PathBuf>,
) -> PathBuf {
    let file_name = file_name.as_ref();
    let is_taken = |candidate: &Path| candidate.exists() || reserved.contains(candidate);

    let candidate = dest_dir.join(file_name);
    if !is_taken(&candidate) {
        return candidate;
    }

    let mut counter: u64 = 1;
    loop {
        let candidate = dest_dir.join(numbered_name(file_name, counter));
        if !is_taken(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Moves `src` into the existing directory `dest_dir` without overwriting
/// anything, returning the path the file ended up at.
///
/// # Errors
///
/// * [`OrganizeError::DestinationNotFound`] if `dest_dir` is not a directory
/// * [`OrganizeError::SourceNotFound`] if `src` is not a regular file
/// * [`OrganizeError::MoveFailed`] if the filesystem move fails
///
/// # Examples
///
/// ```no_run
/// use dirsort::mover::move_without_overwrite;
/// use std::path::Path;
///
/// let new_path = move_without_overwrite(Path::new("source.txt"), Path::new("target_dir"))?;
/// println!("File moved to: {}", new_path.display());
/// # Ok::<(), dirsort::OrganizeError>(())
/// ```
pub fn move_without_overwrite(src: &Path, dest_dir: &Path) -> OrganizeResult<PathBuf> {
    if !dest_dir.is_dir() {
        return Err(OrganizeError::DestinationNotFound {
            path: dest_dir.to_path_buf(),
        });
    }

    let file_name = match src.file_name() {
        Some(name) if src.is_file() => name,
        _ => {
            return Err(OrganizeError::SourceNotFound {
                path: src.to_path_buf(),
            });
        }
    };

    let destination = free_destination(dest_dir, file_name, &HashSet::new());
    move_file(src, &destination).map_err(|source| OrganizeError::MoveFailed {
        from: src.to_path_buf(),
        to: destination.clone(),
        source,
    })?;

    debug!(from = %src.display(), to = %destination.display(), "moved file");
    Ok(destination)
}

/// Renames `from` to `to`, copying and removing when the two paths live on
/// different filesystems.
fn move_file(from: &Path, to: &Path) -> io::Result<()> {
    match fs::rename(from, to) {
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            debug!(from = %from.display(), "rename crosses devices, copying instead");
            copy_then_remove(from, to)
        }
        result => result,
    }
}

/// Copies `from` to `to` and removes `from`. On failure the file is left only
/// at `from`.
fn copy_then_remove(from: &Path, to: &Path) -> io::Result<()> {
    fs::copy(from, to)?;
    if let Err(e) = fs::remove_file(from) {
        if let Err(cleanup) = fs::remove_file(to) {
            warn!(copy = %to.display(), error = %cleanup, "could not remove copy");
        }
        return Err(e);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup() -> (TempDir, PathBuf, PathBuf) {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let src_dir = temp_dir.path().join("incoming");
        let dest_dir = temp_dir.path().join("Documents");
        fs::create_dir(&src_dir).unwrap();
        fs::create_dir(&dest_dir).unwrap();
        (temp_dir, src_dir, dest_dir)
    }

    #[test]
    fn test_split_file_name() {
        assert_eq!(split_file_name("a.txt"), ("a", ".txt"));
        assert_eq!(split_file_name("a..txt"), ("a.", ".txt"));
        assert_eq!(split_file_name("..txt"), (".", ".txt"));
        assert_eq!(split_file_name("trailing."), ("trailing.", ""));
        assert_eq!(split_file_name(".hidden"), (".hidden", ""));
    }

    #[test]
    fn test_move_into_empty_destination_keeps_name() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("a.txt");
        fs::write(&src, "first").unwrap();

        let moved = move_without_overwrite(&src, &dest_dir).unwrap();

        assert_eq!(moved, dest_dir.join("a.txt"));
        assert!(!src.exists());
        assert_eq!(fs::read_to_string(moved).unwrap(), "first");
    }

    #[test]
    fn test_collision_names_are_sequential() {
        let (_tmp, src_dir, dest_dir) = setup();
        fs::write(dest_dir.join("a.txt"), "existing").unwrap();

        let src = src_dir.join("a.txt");
        fs::write(&src, "second").unwrap();
        let moved = move_without_overwrite(&src, &dest_dir).unwrap();
        assert_eq!(moved, dest_dir.join("a_1.txt"));

        fs::write(&src, "third").unwrap();
        let moved = move_without_overwrite(&src, &dest_dir).unwrap();
        assert_eq!(moved, dest_dir.join("a_2.txt"));

        assert_eq!(fs::read_to_string(dest_dir.join("a.txt")).unwrap(), "existing");
        assert_eq!(fs::read_to_string(dest_dir.join("a_1.txt")).unwrap(), "second");
        assert_eq!(fs::read_to_string(dest_dir.join("a_2.txt")).unwrap(), "third");
    }

    #[test]
    fn test_identical_content_is_not_deduplicated() {
        let (_tmp, src_dir, dest_dir) = setup();
        fs::write(dest_dir.join("same.txt"), "payload").unwrap();
        let src = src_dir.join("same.txt");
        fs::write(&src, "payload").unwrap();

        let moved = move_without_overwrite(&src, &dest_dir).unwrap();

        assert_eq!(moved, dest_dir.join("same_1.txt"));
        assert!(dest_dir.join("same.txt").exists());
    }

    #[test]
    fn test_collision_without_suffix() {
        let (_tmp, src_dir, dest_dir) = setup();
        fs::write(dest_dir.join("README"), "").unwrap();
        fs::write(dest_dir.join(".bashrc"), "").unwrap();

        let readme = src_dir.join("README");
        let bashrc = src_dir.join(".bashrc");
        fs::write(&readme, "").unwrap();
        fs::write(&bashrc, "").unwrap();

        assert_eq!(
            move_without_overwrite(&readme, &dest_dir).unwrap(),
            dest_dir.join("README_1")
        );
        assert_eq!(
            move_without_overwrite(&bashrc, &dest_dir).unwrap(),
            dest_dir.join(".bashrc_1")
        );
    }

    #[test]
    fn test_collision_keeps_only_last_suffix() {
        let (_tmp, src_dir, dest_dir) = setup();
        fs::write(dest_dir.join("backup.tar.gz"), "").unwrap();
        let src = src_dir.join("backup.tar.gz");
        fs::write(&src, "").unwrap();

        let moved = move_without_overwrite(&src, &dest_dir).unwrap();
        assert_eq!(moved, dest_dir.join("backup.tar_1.gz"));
    }

    #[test]
    fn test_missing_destination_fails() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("a.txt");
        fs::write(&src, "").unwrap();

        let result = move_without_overwrite(&src, &dest_dir.join("missing"));

        assert!(matches!(
            result,
            Err(OrganizeError::DestinationNotFound { .. })
        ));
        assert!(src.exists());
    }

    #[test]
    fn test_missing_source_fails() {
        let (_tmp, src_dir, dest_dir) = setup();

        let result = move_without_overwrite(&src_dir.join("ghost.txt"), &dest_dir);
        assert!(matches!(result, Err(OrganizeError::SourceNotFound { .. })));

        let result = move_without_overwrite(&src_dir, &dest_dir);
        assert!(matches!(result, Err(OrganizeError::SourceNotFound { .. })));
    }

    #[test]
    fn test_free_destination_respects_reserved_names() {
        let (_tmp, _src_dir, dest_dir) = setup();
        fs::write(dest_dir.join("a.txt"), "").unwrap();

        let mut reserved = HashSet::new();
        reserved.insert(dest_dir.join("a_1.txt"));

        assert_eq!(
            free_destination(&dest_dir, "a.txt", &reserved),
            dest_dir.join("a_2.txt")
        );
        assert_eq!(
            free_destination(&dest_dir, "b.txt", &reserved),
            dest_dir.join("b.txt")
        );
    }

    #[test]
    fn test_numbered_name_matches_split_rules() {
        for name in ["a.txt", "a..txt", "..txt", "trailing.", ".hidden", "README"] {
            let (stem, suffix) = split_file_name(name);
            assert_eq!(
                numbered_name(OsStr::new(name), 7),
                OsString::from(format!("{stem}_7{suffix}")),
                "name: {name}"
            );
        }
    }

    #[test]
    fn test_copy_then_remove_moves_content() {
        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("a.txt");
        let dest = dest_dir.join("a.txt");
        fs::write(&src, "payload").unwrap();

        copy_then_remove(&src, &dest).unwrap();

        assert!(!src.exists());
        assert_eq!(fs::read_to_string(&dest).unwrap(), "payload");
    }

    #[cfg(unix)]
    #[test]
    fn test_copy_then_remove_never_leaves_two_copies() {
        use std::os::unix::fs::PermissionsExt;

        let (_tmp, src_dir, dest_dir) = setup();
        let src = src_dir.join("a.txt");
        let dest = dest_dir.join("a.txt");
        fs::write(&src, "payload").unwrap();
        // removing from a read-only directory fails, except for root
        fs::set_permissions(&src_dir, fs::Permissions::from_mode(0o555)).unwrap();

        let result = copy_then_remove(&src, &dest);
        fs::set_permissions(&src_dir, fs::Permissions::from_mode(0o755)).unwrap();

        match result {
            Ok(()) => {
                assert!(!src.exists());
                assert!(dest.exists());
            }
            Err(_) => {
                assert!(src.exists());
                assert!(!dest.exists(), "copy must be removed when the source stays");
            }
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_non_utf8_name_keeps_its_bytes() {
        use std::os::unix::ffi::OsStrExt;

        let (_tmp, src_dir, dest_dir) = setup();
        let name = OsStr::from_bytes(b"caf\xe9.txt");
        let src = src_dir.join(name);
        if fs::write(&src, "new").is_err() {
            // filesystem refuses non-UTF-8 names
            return;
        }
        fs::write(dest_dir.join(name), "old").unwrap();

        let moved = move_without_overwrite(&src, &dest_dir).unwrap();

        assert_eq!(moved, dest_dir.join(OsStr::from_bytes(b"caf\xe9_1.txt")));
        assert_eq!(fs::read_to_string(&moved).unwrap(), "new");
        assert_eq!(fs::read_to_string(dest_dir.join(name)).unwrap(), "old");
    }
}

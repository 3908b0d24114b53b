//! Per-directory record of the last organize run, used by undo.
//!
//! The record lives next to the organized files as `.dirsort_history.json`:
//!
//! ```json
//! {
//!   "timestamp": "2025-11-09T14:30:52.123456+00:00",
//!   "base_path": "/home/me/Downloads",
//!   "moves": [
//!     {
//!       "original_path": "/home/me/Downloads/a.txt",
//!       "new_path": "/home/me/Downloads/Documents/a_1.txt",
//!       "category": "Documents"
//!     }
//!   ]
//! }
//! ```
//!
//! Paths are stored as JSON strings. On Unix a path that is not valid UTF-8
//! is stored as its raw bytes instead, an array of numbers, so undo can put
//! the file back under its exact name.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{OrganizeError, OrganizeResult};

/// File name of the history record inside an organized directory.
pub const HISTORY_FILE_NAME: &str = ".dirsort_history.json";

/// One file moved during an organize run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MovedFile {
    #[serde(with = "stored_path")]
    pub original_path: PathBuf,
    #[serde(with = "stored_path")]
    pub new_path: PathBuf,
    pub category: String,
}

/// All moves performed by one organize run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct History {
    /// RFC 3339 timestamp of the run.
    pub timestamp: String,
    #[serde(with = "stored_path")]
    pub base_path: PathBuf,
    pub moves: Vec<MovedFile>,
}

/// Whether `path` survives a save and load of the history unchanged.
///
/// Always true on Unix. Elsewhere the path has to be valid UTF-8.
pub fn is_recordable(path: &Path) -> bool {
    cfg!(unix) || path.to_str().is_some()
}

impl History {
    pub fn new(base_path: PathBuf, moves: Vec<MovedFile>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            base_path,
            moves,
        }
    }

    pub fn file_path(base_path: &Path) -> PathBuf {
        base_path.join(HISTORY_FILE_NAME)
    }

    /// Writes the record into `base_path`, replacing any earlier one.
    pub fn save(&self, base_path: &Path) -> OrganizeResult<()> {
        let json = serde_json::to_string_pretty(self).map_err(|e| {
            OrganizeError::HistoryWriteFailed {
                source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
            }
        })?;

        fs::write(Self::file_path(base_path), json)
            .map_err(|source| OrganizeError::HistoryWriteFailed { source })
    }

    /// Loads the record for `base_path`; `Ok(None)` when there is none.
    pub fn load(base_path: &Path) -> OrganizeResult<Option<Self>> {
        let history_path = Self::file_path(base_path);
        if !history_path.exists() {
            return Ok(None);
        }

        let json = fs::read_to_string(&history_path)
            .map_err(|source| OrganizeError::HistoryReadFailed { source })?;

        serde_json::from_str(&json)
            .map(Some)
            .map_err(|e| OrganizeError::InvalidHistory {
                reason: e.to_string(),
            })
    }

    pub fn delete(base_path: &Path) -> OrganizeResult<()> {
        let history_path = Self::file_path(base_path);
        if history_path.exists() {
            fs::remove_file(&history_path)
                .map_err(|source| OrganizeError::HistoryWriteFailed { source })?;
        }
        Ok(())
    }
}

/// Serde adapter for paths: a string when the path is UTF-8, raw bytes
/// otherwise.
mod stored_path {
    use serde::de::Deserializer;
    use serde::ser::{Error, Serializer};
    use serde::{Deserialize, Serialize};
    use std::path::{Path, PathBuf};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Text(String),
        Bytes(Vec<u8>),
    }

    pub fn serialize<S: Serializer>(path: &Path, serializer: S) -> Result<S::Ok, S::Error> {
        if let Some(text) = path.to_str() {
            return serializer.serialize_str(text);
        }
        match raw_bytes(path) {
            Some(bytes) => Stored::Bytes(bytes).serialize(serializer),
            None => Err(S::Error::custom(format!(
                "path is not valid UTF-8: {}",
                path.display()
            ))),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<PathBuf, D::Error> {
        Ok(match Stored::deserialize(deserializer)? {
            Stored::Text(text) => PathBuf::from(text),
            Stored::Bytes(bytes) => from_raw_bytes(bytes),
        })
    }

    #[cfg(unix)]
    fn raw_bytes(path: &Path) -> Option<Vec<u8>> {
        use std::os::unix::ffi::OsStrExt;
        Some(path.as_os_str().as_bytes().to_vec())
    }

    #[cfg(not(unix))]
    fn raw_bytes(_path: &Path) -> Option<Vec<u8>> {
        None
    }

    #[cfg(unix)]
    fn from_raw_bytes(bytes: Vec<u8>) -> PathBuf {
        use std::ffi::OsString;
        use std::os::unix::ffi::OsStringExt;
        PathBuf::from(OsString::from_vec(bytes))
    }

    #[cfg(not(unix))]
    fn from_raw_bytes(bytes: Vec<u8>) -> PathBuf {
        PathBuf::from(String::from_utf8_lossy(&bytes).into_owned())
    }
}

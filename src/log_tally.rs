//! Level counts and error summary for a single log file.
//!
//! Lines are expected in the common Python `logging` layout:
//!
//! ```text
//! 2024-01-15 10:23:45,123 app.server INFO - Listening on :8080
//! ```
//!
//! whitespace separated, with the level as the fourth field and the message
//! starting at the sixth.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

const LEVEL_FIELD: usize = 3;
const MESSAGE_FIELD: usize = 5;

/// Levels reported even when a log contains none of them.
pub const STANDARD_LEVELS: [&str; 3] = ["INFO", "WARNING", "ERROR"];

#[derive(Debug, Error)]
pub enum LogTallyError {
    #[error("log file not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("failed to read log {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Summary of one log file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogTally {
    pub total_lines: usize,
    pub counts: BTreeMap<String, usize>,
    pub unique_errors: BTreeSet<String>,
    pub last_log_time: Option<String>,
    /// Lines too short to carry a level. Kept out of the JSON report.
    #[serde(skip)]
    pub malformed_lines: usize,
}

impl Default for LogTally {
    fn default() -> Self {
        Self {
            total_lines: 0,
            counts: STANDARD_LEVELS
                .iter()
                .map(|level| (level.to_string(), 0))
                .collect(),
            unique_errors: BTreeSet::new(),
            last_log_time: None,
            malformed_lines: 0,
        }
    }
}

impl LogTally {
    pub fn from_path(path: &Path) -> Result<Self, LogTallyError> {
        if !path.is_file() {
            return Err(LogTallyError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let file = File::open(path).map_err(|source| LogTallyError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_reader(BufReader::new(file)).map_err(|source| LogTallyError::Read {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_reader<R: BufRead>(reader: R) -> std::io::Result<Self> {
        let mut tally = Self::default();
        for line in reader.lines() {
            tally.add_line(&line?);
        }
        Ok(tally)
    }

    /// Folds one line into the tally. Blank lines are ignored.
    pub fn add_line(&mut self, line: &str) {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.is_empty() {
            return;
        }

        self.total_lines += 1;
        if fields.len() <= LEVEL_FIELD {
            self.malformed_lines += 1;
            return;
        }

        let level = fields[LEVEL_FIELD];
        *self.counts.entry(level.to_string()).or_default() += 1;

        if level.contains("ERROR") {
            let message = fields.get(MESSAGE_FIELD..).unwrap_or_default().join(" ");
            self.unique_errors.insert(message);
        }

        let time = fields[1].split(',').next().unwrap_or_default();
        self.last_log_time = Some(format!("{} {}", fields[0], time));
    }

    pub fn count(&self, level: &str) -> usize {
        self.counts.get(level).copied().unwrap_or(0)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
2024-01-15 10:23:45,123 app.server INFO - Listening on :8080
2024-01-15 10:23:46,001 app.db WARNING - Slow query took 2.3s
2024-01-15 10:23:47,500 app.db ERROR - Connection refused
2024-01-15 10:23:48,020 app.db ERROR - Connection refused

2024-01-15 10:24:01,999 app.auth ERROR - Invalid token for user 42
2024-01-15 10:24:05,000 app.server DEBUG - heartbeat
";

    fn sample() -> LogTally {
        LogTally::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    #[test]
    fn test_counts_levels() {
        let tally = sample();

        assert_eq!(tally.total_lines, 6);
        assert_eq!(tally.count("INFO"), 1);
        assert_eq!(tally.count("WARNING"), 1);
        assert_eq!(tally.count("ERROR"), 3);
        assert_eq!(tally.count("DEBUG"), 1);
        assert_eq!(tally.malformed_lines, 0);
    }

    #[test]
    fn test_unique_errors_are_sorted_and_deduplicated() {
        let errors: Vec<_> = sample().unique_errors.into_iter().collect();
        assert_eq!(
            errors,
            ["Connection refused", "Invalid token for user 42"]
        );
    }

    #[test]
    fn test_last_log_time_drops_millis() {
        assert_eq!(
            sample().last_log_time.as_deref(),
            Some("2024-01-15 10:24:05")
        );
    }

    #[test]
    fn test_empty_log_reports_standard_levels() {
        let tally = LogTally::from_reader("".as_bytes()).unwrap();

        assert_eq!(tally.total_lines, 0);
        for level in STANDARD_LEVELS {
            assert_eq!(tally.counts.get(level), Some(&0));
        }
        assert!(tally.last_log_time.is_none());
    }

    #[test]
    fn test_short_lines_are_malformed() {
        let tally = LogTally::from_reader("garbage line\n2024-01-15 10:00:00 svc ERROR\n".as_bytes())
            .unwrap();

        assert_eq!(tally.total_lines, 2);
        assert_eq!(tally.malformed_lines, 1);
        assert_eq!(tally.count("ERROR"), 1);
        assert!(tally.unique_errors.contains(""));
        assert_eq!(tally.last_log_time.as_deref(), Some("2024-01-15 10:00:00"));
    }

    #[test]
    fn test_json_shape() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();

        assert_eq!(json["total_lines"], 6);
        assert_eq!(json["counts"]["ERROR"], 3);
        assert_eq!(json["unique_errors"][0], "Connection refused");
        assert_eq!(json["last_log_time"], "2024-01-15 10:24:05");
        assert!(json.get("malformed_lines").is_none());
    }

    #[test]
    fn test_missing_file() {
        let result = LogTally::from_path(Path::new("/no/such/server.log"));
        assert!(matches!(result, Err(LogTallyError::NotFound { .. })));
    }
}

//! File filtering configuration.
//!
//! Filters decide which top-level files the organizer leaves alone. They are
//! read from a TOML file:
//!
//! ```toml
//! [filters]
//! skip_hidden = false
//!
//! [filters.exclude]
//! filenames = ["Thumbs.db", "desktop.ini"]
//! patterns = ["*.part", "~*"]
//! extensions = [".crdownload"]
//! regex = []
//! ```
//!
//! With no configuration file every regular file is organized.

use glob::Pattern;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory configuration file looked up in the working directory.
pub const LOCAL_CONFIG_NAME: &str = ".dirsortrc.toml";

/// Errors raised while loading or compiling a configuration.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {}", .0.display())]
    ConfigNotFound(PathBuf),
    #[error("invalid configuration: {0}")]
    ConfigInvalid(String),
    #[error("invalid glob pattern '{0}'")]
    InvalidGlobPattern(String),
    #[error("invalid regex pattern '{pattern}': {reason}")]
    InvalidRegexPattern { pattern: String, reason: String },
    #[error("failed to read configuration: {0}")]
    IoError(String),
}

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterConfig {
    #[serde(default)]
    pub filters: FilterRules,
}

/// The `[filters]` table.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FilterRules {
    /// Leave dot-files in place.
    #[serde(default)]
    pub skip_hidden: bool,

    #[serde(default)]
    pub exclude: ExcludeRules,
}

/// Rules that keep a file out of the organize pass.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExcludeRules {
    /// Exact file names.
    #[serde(default)]
    pub filenames: Vec<String>,

    /// Glob patterns matched against the file name.
    #[serde(default)]
    pub patterns: Vec<String>,

    /// Suffixes including the leading dot, compared case-sensitively like the
    /// category table.
    #[serde(default)]
    pub extensions: Vec<String>,

    /// Regular expressions searched for anywhere in the file name.
    #[serde(default)]
    pub regex: Vec<String>,
}

impl FilterConfig {
    /// Loads the configuration.
    ///
    /// Lookup order:
    /// 1. `config_path`, when given (a missing file is an error)
    /// 2. `.dirsortrc.toml` in the current directory
    /// 3. `~/.config/dirsort/config.toml`
    /// 4. built-in defaults
    ///
    /// # Arguments
    ///
    /// * `config_path` - Explicit configuration file, usually from `--config`
    ///
    /// # Errors
    ///
    /// * [`ConfigError::ConfigNotFound`] if `config_path` does not exist
    /// * [`ConfigError::ConfigInvalid`] if the chosen file is not valid TOML
    ///   for this schema
    /// * [`ConfigError::IoError`] if the chosen file cannot be read
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::FilterConfig;
    /// use std::path::Path;
    ///
    /// let config = FilterConfig::load(Some(Path::new("dirsort.toml")))?;
    /// let filters = config.compile()?;
    /// # Ok::<(), dirsort::ConfigError>(())
    /// ```
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let local_config = PathBuf::from(LOCAL_CONFIG_NAME);
        if local_config.is_file() {
            return Self::load_from_file(&local_config);
        }

        if let Ok(home) = std::env::var("HOME") {
            let home_config = PathBuf::from(home)
                .join(".config")
                .join("dirsort")
                .join("config.toml");
            if home_config.is_file() {
                return Self::load_from_file(&home_config);
            }
        }

        Ok(Self::default())
    }

    /// Loads configuration from a specific file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ConfigNotFound`] for a missing file,
    /// [`ConfigError::IoError`] when it cannot be read and
    /// [`ConfigError::ConfigInvalid`] when it does not parse.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::ConfigNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses a configuration document. Missing tables and keys take their
    /// defaults.
    ///
    /// # Example
    ///
    /// ```
    /// use dirsort::FilterConfig;
    ///
    /// let config = FilterConfig::from_toml("[filters]\nskip_hidden = true").unwrap();
    /// assert!(config.filters.skip_hidden);
    /// assert!(config.filters.exclude.patterns.is_empty());
    /// ```
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ConfigInvalid(e.to_string()))
    }

    /// Compiles the rules into matchers, validating every pattern.
    ///
    /// # Errors
    ///
    /// * [`ConfigError::InvalidGlobPattern`] for a malformed glob
    /// * [`ConfigError::InvalidRegexPattern`] for a malformed regex
    pub fn compile(self) -> Result<CompiledFilters, ConfigError> {
        CompiledFilters::new(self.filters)
    }
}

/// Pre-compiled filter rules, built by [`FilterConfig::compile`]. The default
/// value includes every file.
#[derive(Debug, Default)]
pub struct CompiledFilters {
    skip_hidden: bool,
    exclude_filenames: HashSet<String>,
    exclude_extensions: HashSet<String>,
    exclude_patterns: Vec<Pattern>,
    exclude_regexes: Vec<Regex>,
}

impl CompiledFilters {
    fn new(rules: FilterRules) -> Result<Self, ConfigError> {
        let exclude_patterns = rules
            .exclude
            .patterns
            .iter()
            .map(|pattern| {
                Pattern::new(pattern).map_err(|_| ConfigError::InvalidGlobPattern(pattern.clone()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let exclude_regexes = rules
            .exclude
            .regex
            .iter()
            .map(|pattern| {
                Regex::new(pattern).map_err(|e| ConfigError::InvalidRegexPattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            skip_hidden: rules.skip_hidden,
            exclude_filenames: rules.exclude.filenames.into_iter().collect(),
            exclude_extensions: rules.exclude.extensions.into_iter().collect(),
            exclude_patterns,
            exclude_regexes,
        })
    }

    /// Returns `true` when the file should be organized.
    ///
    /// Only the file name is inspected; the rest of the path is ignored.
    ///
    /// # Example
    ///
    /// ```
    /// use dirsort::FilterConfig;
    /// use std::path::Path;
    ///
    /// let filters = FilterConfig::from_toml("[filters.exclude]\npatterns = [\"*.part\"]")
    ///     .unwrap()
    ///     .compile()
    ///     .unwrap();
    /// assert!(!filters.should_include(Path::new("movie.mp4.part")));
    /// assert!(filters.should_include(Path::new("movie.mp4")));
    /// ```
    pub fn should_include(&self, file_path: &Path) -> bool {
        let Some(file_name) = file_path.file_name().map(|n| n.to_string_lossy()) else {
            return false;
        };

        if self.skip_hidden && file_name.starts_with('.') {
            return false;
        }

        if self.exclude_filenames.contains(file_name.as_ref()) {
            return false;
        }

        let (_, suffix) = crate::mover::split_file_name(&file_name);
        if !suffix.is_empty() && self.exclude_extensions.contains(suffix) {
            return false;
        }

        if self
            .exclude_patterns
            .iter()
            .any(|pattern| pattern.matches(&file_name))
        {
            return false;
        }

        !self
            .exclude_regexes
            .iter()
            .any(|regex| regex.is_match(&file_name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(exclude: ExcludeRules, skip_hidden: bool) -> CompiledFilters {
        FilterConfig {
            filters: FilterRules {
                skip_hidden,
                exclude,
            },
        }
        .compile()
        .unwrap()
    }

    #[test]
    fn test_default_config_includes_everything() {
        let compiled = FilterConfig::default().compile().unwrap();

        assert!(compiled.should_include(Path::new("photo.png")));
        assert!(compiled.should_include(Path::new(".bashrc")));
        assert!(compiled.should_include(Path::new("README")));
    }

    #[test]
    fn test_skip_hidden() {
        let compiled = compile(ExcludeRules::default(), true);

        assert!(!compiled.should_include(Path::new(".DS_Store")));
        assert!(compiled.should_include(Path::new("notes.txt")));
    }

    #[test]
    fn test_exclude_exact_filename() {
        let compiled = compile(
            ExcludeRules {
                filenames: vec!["Thumbs.db".to_string()],
                ..Default::default()
            },
            false,
        );

        assert!(!compiled.should_include(Path::new("Thumbs.db")));
        assert!(compiled.should_include(Path::new("thumbs.db")));
    }

    #[test]
    fn test_exclude_extensions_are_case_sensitive() {
        let compiled = compile(
            ExcludeRules {
                extensions: vec![".part".to_string()],
                ..Default::default()
            },
            false,
        );

        assert!(!compiled.should_include(Path::new("movie.mp4.part")));
        assert!(compiled.should_include(Path::new("movie.PART")));
        assert!(compiled.should_include(Path::new("movie.mp4")));
    }

    #[test]
    fn test_exclude_glob_matches_file_name() {
        let compiled = compile(
            ExcludeRules {
                patterns: vec!["~*".to_string(), "[0-9]*.tmp".to_string()],
                ..Default::default()
            },
            false,
        );

        assert!(!compiled.should_include(Path::new("/some/dir/~lock.docx")));
        assert!(!compiled.should_include(Path::new("1cache.tmp")));
        assert!(compiled.should_include(Path::new("cache.tmp")));
    }

    #[test]
    fn test_exclude_regex() {
        let compiled = compile(
            ExcludeRules {
                regex: vec![r"^draft_.*\.txt$".to_string()],
                ..Default::default()
            },
            false,
        );

        assert!(!compiled.should_include(Path::new("draft_letter.txt")));
        assert!(compiled.should_include(Path::new("letter.txt")));
    }

    #[test]
    fn test_invalid_patterns_are_rejected() {
        let bad_glob = FilterConfig {
            filters: FilterRules {
                exclude: ExcludeRules {
                    patterns: vec!["[invalid".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        assert!(matches!(
            bad_glob.compile(),
            Err(ConfigError::InvalidGlobPattern(_))
        ));

        let bad_regex = FilterConfig {
            filters: FilterRules {
                exclude: ExcludeRules {
                    regex: vec!["[invalid(".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            },
        };
        assert!(matches!(
            bad_regex.compile(),
            Err(ConfigError::InvalidRegexPattern { .. })
        ));
    }

    #[test]
    fn test_parse_toml() {
        let config = FilterConfig::from_toml(
            r#"
            [filters]
            skip_hidden = true

            [filters.exclude]
            filenames = ["Thumbs.db"]
            patterns = ["*.part"]
            "#,
        )
        .unwrap();

        assert!(config.filters.skip_hidden);
        assert_eq!(config.filters.exclude.filenames, vec!["Thumbs.db"]);
        assert_eq!(config.filters.exclude.patterns, vec!["*.part"]);
        assert!(config.filters.exclude.regex.is_empty());
    }

    #[test]
    fn test_empty_toml_is_default() {
        let config = FilterConfig::from_toml("").unwrap();
        assert!(!config.filters.skip_hidden);
    }

    #[test]
    fn test_invalid_toml() {
        let result = FilterConfig::from_toml("[filters\nskip_hidden = ");
        assert!(matches!(result, Err(ConfigError::ConfigInvalid(_))));
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = FilterConfig::load(Some(Path::new("/definitely/not/here.toml")));
        assert!(matches!(result, Err(ConfigError::ConfigNotFound(_))));
    }
}

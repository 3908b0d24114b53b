//! Extension-based categorization.
//!
//! A [`CategoryTable`] is an ordered list of [`CategoryRule`]s. Classification
//! compares a file's suffix (the last `.xxx` of its name, dot included)
//! case-sensitively against each rule in order; the first rule listing the
//! suffix wins and anything else falls through to [`UNKNOWN_CATEGORY`].
//!
//! # Examples
//!
//! ```
//! use dirsort::category::CategoryTable;
//! use std::path::Path;
//!
//! let table = CategoryTable::default();
//! assert_eq!(table.classify(Path::new("holiday.jpg")), "Images");
//! assert_eq!(table.classify(Path::new("notes.txt")), "Documents");
//! assert_eq!(table.classify(Path::new("HOLIDAY.JPG")), "Unknown");
//! ```

use std::path::Path;

use crate::mover::split_file_name;

/// Category used for files no rule recognizes.
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A named bucket of extensions routed to a common subdirectory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryRule {
    name: String,
    extensions: Vec<String>,
}

impl CategoryRule {
    /// Creates a rule. Extensions include the leading dot, e.g. `".png"`.
    pub fn new<I, S>(name: impl Into<String>, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            extensions: extensions.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Exact, case-sensitive suffix match.
    pub fn matches(&self, suffix: &str) -> bool {
        self.extensions.iter().any(|ext| ext == suffix)
    }
}

/// Ordered, immutable set of category rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl CategoryTable {
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[CategoryRule] {
        &self.rules
    }

    /// Returns the category for a suffix such as `".pdf"`, or `None` when no
    /// rule lists it. Files without a suffix never match.
    pub fn category_for_suffix(&self, suffix: &str) -> Option<&str> {
        if suffix.is_empty() {
            return None;
        }
        self.rules
            .iter()
            .find(|rule| rule.matches(suffix))
            .map(CategoryRule::name)
    }

    /// Returns the category directory name for a file path.
    pub fn classify(&self, path: &Path) -> &str {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default();
        let (_, suffix) = split_file_name(&file_name);

        self.category_for_suffix(suffix).unwrap_or(UNKNOWN_CATEGORY)
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::new(vec![
            CategoryRule::new("Images", [".jpg", ".jpeg", ".png", ".gif"]),
            CategoryRule::new("Documents", [".pdf", ".docx", ".txt"]),
            CategoryRule::new("Music", [".mp3", ".wav"]),
            CategoryRule::new("Logs", [".log"]),
        ])
    }
}

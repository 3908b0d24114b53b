//! Terminal output.
//!
//! Everything the binaries print goes through [`OutputFormatter`], keeping
//! styling in one place. Reports are computed by the library and only
//! rendered here.

use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use crate::log_tally::LogTally;
use crate::organizer::{OrganizePlan, ScanSummary};
use crate::undo::UndoReport;

/// Label of the total row, matching the category rows in the summary.
pub const TOTAL_LABEL: &str = "Total Files";

/// Prints everything the binaries show, with consistent styling:
/// - success messages (green with ✓)
/// - error messages (red with ✗, on stderr)
/// - warnings (yellow with ⚠)
/// - info messages (cyan)
/// - the progress bar and the run, plan, undo and log reports
pub struct OutputFormatter;

impl OutputFormatter {
    /// Prints a success message in green with a checkmark.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::success("Dry run complete.");
    /// ```
    pub fn success(message: &str) {
        println!("{} {}", "✓".green(), message);
    }

    /// Prints an error message in red with an X mark, on stderr.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::error("directory not found: ./missing");
    /// ```
    pub fn error(message: &str) {
        eprintln!("{} {}", "✗".red(), message);
    }

    /// Prints a warning message in yellow with a warning symbol.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::warning("Skipped: 2");
    /// ```
    pub fn warning(message: &str) {
        println!("{} {}", "⚠".yellow(), message);
    }

    /// Prints an info message in cyan.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::info("Target path is /home/user/Downloads");
    /// ```
    pub fn info(message: &str) {
        println!("{}", message.cyan());
    }

    /// Prints a message without styling.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::plain("/home/user");
    /// ```
    pub fn plain(message: &str) {
        println!("{}", message);
    }

    /// Prints a bold header preceded by a blank line.
    ///
    /// # Arguments
    ///
    /// * `header` - The header text
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::header("Unique Errors:");
    /// ```
    pub fn header(header: &str) {
        println!("\n{}", header.bold());
    }

    /// Prints a yellow message tagged `[DRY RUN]`.
    ///
    /// # Arguments
    ///
    /// * `message` - The message to display
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// OutputFormatter::dry_run_notice("Analyzing contents of: Downloads");
    /// ```
    pub fn dry_run_notice(message: &str) {
        println!("{}", format!("[DRY RUN] {}", message).yellow());
    }

    /// Progress bar for the move pass. Hidden automatically when stdout is not
    /// a terminal.
    ///
    /// # Arguments
    ///
    /// * `total` - Number of files that will be moved
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// let pb = OutputFormatter::create_progress_bar(10);
    /// pb.inc(1);
    /// pb.finish_and_clear();
    /// ```
    pub fn create_progress_bar(total: u64) -> ProgressBar {
        let pb = ProgressBar::new(total);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█▓░");
        pb.set_style(style);
        pb
    }

    /// Renders the summary lines: the total first, then one line per category
    /// in the order the categories were first filled.
    pub fn summary_lines(summary: &ScanSummary) -> Vec<String> {
        std::iter::once(format!("- {}: {}", TOTAL_LABEL, summary.total_files()))
            .chain(
                summary
                    .categories()
                    .map(|(category, count)| format!("- {category}: {count}")),
            )
            .collect()
    }

    /// Prints the summary of an organize run under a separator line.
    ///
    /// An empty run prints `No files to organize.` instead of the counts.
    ///
    /// # Arguments
    ///
    /// * `summary` - Counts returned by the organizer
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use dirsort::Organizer;
    /// use std::path::Path;
    ///
    /// let report = Organizer::default().organize(Path::new("Downloads"))?;
    /// OutputFormatter::summary(&report.summary);
    /// # Ok::<(), dirsort::OrganizeError>(())
    /// ```
    pub fn summary(summary: &ScanSummary) {
        println!("\n{}", "-".repeat(30));
        println!("{}", "Organized files summary:".bold());
        if summary.is_empty() {
            println!("No files to organize.");
            return;
        }
        for line in Self::summary_lines(summary) {
            println!("{line}");
        }
    }

    /// Prints a dry-run plan, one `name → Category/destination` line per file,
    /// followed by the summary the run would produce.
    ///
    /// # Arguments
    ///
    /// * `plan` - Plan computed by [`Organizer::plan`](crate::Organizer::plan)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use dirsort::Organizer;
    /// use std::path::Path;
    ///
    /// let plan = Organizer::default().plan(Path::new("Downloads"))?;
    /// OutputFormatter::plan(&plan);
    /// # Ok::<(), dirsort::OrganizeError>(())
    /// ```
    pub fn plan(plan: &OrganizePlan) {
        if plan.moves.is_empty() {
            Self::dry_run_notice("No files found to organize.");
            return;
        }

        Self::dry_run_notice("Files would be organized as follows:");
        for planned in &plan.moves {
            let name = planned
                .source
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            let destination = planned
                .destination
                .file_name()
                .map(|n| n.to_string_lossy())
                .unwrap_or_default();
            println!(
                " - {} {} {}/{}",
                name,
                "→".cyan(),
                planned.category,
                destination
            );
        }
        Self::summary(&plan.summary);
        Self::success("Dry run complete. No files were modified.");
    }

    /// Prints the outcome of an undo run: restored count, backups, skipped and
    /// failed files.
    ///
    /// # Arguments
    ///
    /// * `report` - Report returned by [`UndoManager::undo`](crate::UndoManager::undo)
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use dirsort::UndoManager;
    /// use std::path::Path;
    ///
    /// let report = UndoManager::undo(Path::new("Downloads"))?;
    /// OutputFormatter::undo_report(&report);
    /// # Ok::<(), dirsort::OrganizeError>(())
    /// ```
    pub fn undo_report(report: &UndoReport) {
        Self::success(&format!("Restored: {}", report.restored_files));

        for backup in &report.backups {
            Self::warning(&format!(
                "Existing file moved aside to {}",
                backup.display()
            ));
        }

        if !report.skipped_files.is_empty() {
            Self::warning(&format!("Skipped: {}", report.skipped_files.len()));
            for (path, reason) in &report.skipped_files {
                println!("    - {}: {}", path.display(), reason);
            }
        }

        if !report.failed_restores.is_empty() {
            Self::error(&format!("Failed: {}", report.failed_restores.len()));
            for (path, reason) in &report.failed_restores {
                eprintln!("    - {}: {}", path.display(), reason);
            }
        }

        if !report.is_complete_success() {
            Self::warning("History was kept; fix the issues above and run undo again.");
        }
    }

    /// Prints a log tally: total lines, per-level counts, unique errors and
    /// the last timestamp.
    ///
    /// # Arguments
    ///
    /// * `tally` - Tally of a log file
    ///
    /// # Example
    ///
    /// ```no_run
    /// use dirsort::output::OutputFormatter;
    /// use dirsort::LogTally;
    /// use std::path::Path;
    ///
    /// let tally = LogTally::from_path(Path::new("server.log"))?;
    /// OutputFormatter::log_tally(&tally);
    /// # Ok::<(), dirsort::LogTallyError>(())
    /// ```
    pub fn log_tally(tally: &LogTally) {
        Self::header("Log Summary");
        println!("{}", "-".repeat(11));
        println!("Total lines: {}", tally.total_lines);
        for (level, count) in &tally.counts {
            let count = count.to_string();
            let count = match level.as_str() {
                "ERROR" | "CRITICAL" => count.red(),
                "WARNING" => count.yellow(),
                _ => count.normal(),
            };
            println!("{level}: {count}");
        }
        if tally.malformed_lines > 0 {
            Self::warning(&format!(
                "{} line(s) skipped: no level field",
                tally.malformed_lines
            ));
        }

        Self::header("Unique Errors:");
        for error in &tally.unique_errors {
            println!("- {}", error.red());
        }

        if let Some(time) = &tally.last_log_time {
            println!("\nLast log entry: {time}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lines_start_with_total() {
        let mut summary = ScanSummary::default();
        summary.record("Images");
        summary.record("Unknown");
        summary.record("Images");

        assert_eq!(
            OutputFormatter::summary_lines(&summary),
            ["- Total Files: 3", "- Images: 2", "- Unknown: 1"]
        );
    }

    #[test]
    fn test_summary_lines_for_empty_run() {
        assert_eq!(
            OutputFormatter::summary_lines(&ScanSummary::default()),
            ["- Total Files: 0"]
        );
    }
}

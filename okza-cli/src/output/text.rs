//! Text output formatting with progress bars and colors.

use okza_core::{Item, Job, SearchHistoryEntry};
use okza_fetch::{PollProgress, ResultSet};

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

// Progress bar characters
const BAR_FULL: char = '█';
const BAR_EMPTY: char = '░';

/// Widest title shown in the results table.
const TITLE_WIDTH: usize = 60;

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
    bar_width: usize,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self {
            use_colors,
            bar_width: 20,
        }
    }

    /// Formats one polling observation as a progress line.
    pub fn format_progress(&self, progress: &PollProgress) -> String {
        let percent = progress.percent();
        let status = if progress.ready {
            self.green("ready")
        } else {
            self.dim("waiting")
        };

        format!(
            "{} {:>3}%  attempt {}/{}  {} items  {}",
            self.progress_bar(percent),
            percent,
            progress.attempt,
            progress.max_attempts,
            progress.items_count,
            status
        )
    }

    /// Formats a progress bar for a 0-100 percentage.
    pub fn progress_bar(&self, percent: u8) -> String {
        let percent = usize::from(percent.min(100));
        let filled = (percent * self.bar_width + 50) / 100;
        let empty = self.bar_width.saturating_sub(filled);

        let bar = format!(
            "{}{}",
            BAR_FULL.to_string().repeat(filled),
            BAR_EMPTY.to_string().repeat(empty)
        );

        if percent >= 100 { self.green(&bar) } else { self.cyan(&bar) }
    }

    /// Formats the submitted job.
    pub fn format_job(&self, job: &Job) -> String {
        format!(
            "{} {}  {}",
            self.bold("Job"),
            self.cyan(job.id.as_str()),
            self.dim(&format!("\"{}\" ({}, {})", job.keyword, job.location, job.language))
        )
    }

    /// Formats ranked results as a table.
    pub fn format_results(&self, keyword: &str, results: &ResultSet) -> String {
        let mut lines = Vec::new();

        lines.push(format!(
            "{} for \"{}\" ({} items, cheapest first)",
            self.bold("Results"),
            keyword,
            results.len()
        ));
        lines.push("─".repeat(72));

        if results.is_empty() {
            lines.push(self.dim("No items."));
        } else {
            lines.push(self.bold(&format!(
                "{:>4}  {:>10}  {:<4}  {}",
                "#", "Price", "Cur", "Title"
            )));
            for (rank, item) in results.items.iter().enumerate() {
                lines.push(self.format_item(rank + 1, item));
            }
        }

        if results.unpriced > 0 {
            lines.push(String::new());
            lines.push(self.yellow(&format!(
                "{} item(s) had no usable price and were ranked by policy.",
                results.unpriced
            )));
        }
        if let Some(err) = &results.extraction_error {
            lines.push(self.yellow(&format!("Warning: {err}")));
        }

        lines.join("\n")
    }

    fn format_item(&self, rank: usize, item: &Item) -> String {
        let price = if item.price_known {
            self.green(&format!("{:>10.2}", item.price))
        } else {
            self.dim(&format!("{:>10}", "-"))
        };

        let mut line = format!(
            "{rank:>4}  {price}  {:<4}  {}",
            item.currency,
            truncate(&item.title, TITLE_WIDTH)
        );
        if !item.seller.is_empty() {
            line.push_str(&self.dim(&format!("  [{}]", item.seller)));
        }
        if !item.url.is_empty() {
            line.push_str(&format!("\n{:>24}{}", "", self.dim(&item.url)));
        }
        line
    }

    /// Formats history entries, newest first.
    pub fn format_history(&self, entries: &[SearchHistoryEntry]) -> String {
        let mut lines = vec![self.bold("Recent searches"), "─".repeat(40)];

        if entries.is_empty() {
            lines.push(self.dim("No searches recorded yet."));
        }
        for entry in entries {
            let when = if entry.has_known_timestamp() {
                entry.formatted_timestamp()
            } else {
                "unknown time".to_string()
            };
            lines.push(format!("{}  {}", self.dim(&format!("{when:<19}")), entry.keyword));
        }

        lines.join("\n")
    }

    /// Formats a timeout notice.
    pub fn format_timeout(&self, job: &Job, attempts: u32, items_count: u64) -> String {
        format!(
            "{} job {} not ready after {} attempts ({} items so far). Try `okza status {}` later.",
            self.yellow("Timed out:"),
            job.id,
            attempts,
            items_count,
            job.id
        )
    }

    /// Formats a cancellation notice.
    pub fn format_cancelled(&self, attempts: u32) -> String {
        self.yellow(&format!("Cancelled after {attempts} attempt(s)."))
    }

    /// Formats a non-fatal warning.
    pub fn format_warning(&self, message: &str) -> String {
        format!("{} {}", self.yellow("Warning:"), message)
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn green(&self, text: &str) -> String {
        self.paint(GREEN, text)
    }

    fn yellow(&self, text: &str) -> String {
        self.paint(YELLOW, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}

/// Shortens `text` to `max` characters, marking the cut with an ellipsis.
fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('…');
    out
}

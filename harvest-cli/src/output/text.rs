//! Text output formatting with colors.

use std::path::Path;

use harvest_providers::ProviderDescriptor;

use crate::harvest::HarvestReport;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// A harvested URL is printed as-is.
    pub fn format_url(url: &str) -> &str {
        url
    }

    /// Header for the providers table.
    pub fn format_providers_header(&self) -> String {
        self.bold(&format!("{:<12} {:<22} {:<20} {}", "NAME", "ARCHIVE", "ALIASES", "HOMEPAGE"))
    }

    /// One row of the providers table.
    pub fn format_provider_line(&self, desc: &ProviderDescriptor) -> String {
        let aliases = if desc.aliases.is_empty() {
            "-".to_string()
        } else {
            desc.aliases.join(",")
        };

        format!(
            "{} {:<22} {:<20} {}",
            self.colorize(&format!("{:<12}", desc.name), GREEN),
            desc.display_name,
            aliases,
            self.dim(desc.homepage)
        )
    }

    /// Shows the config path and whether the file is there.
    pub fn format_config_path(&self, path: &Path) -> String {
        let state = if path.exists() {
            self.colorize("exists", GREEN)
        } else {
            self.colorize("not created, using defaults", YELLOW)
        };
        format!("{} ({state})", path.display())
    }

    /// One-line summary printed to stderr after a run.
    pub fn format_report(&self, report: &HarvestReport) -> String {
        let mut line = format!(
            "{} unique URLs from {} domain(s)",
            self.bold(&report.urls_written.to_string()),
            report.domains
        );
        if report.duplicates > 0 {
            line.push_str(&format!(", {} duplicates", report.duplicates));
        }
        if report.blacklisted > 0 {
            line.push_str(&format!(", {} blacklisted", report.blacklisted));
        }
        if !report.failures.is_empty() {
            line.push_str(&format!(
                ", {}",
                self.colorize(&format!("{} provider failure(s)", report.failures.len()), YELLOW)
            ));
        }
        if report.cancelled {
            line.push_str(&format!(" {}", self.dim("(interrupted)")));
        } else if report.output_closed {
            line.push_str(&format!(" {}", self.dim("(output closed)")));
        }
        line
    }

    fn bold(&self, text: &str) -> String {
        self.colorize(text, BOLD)
    }

    fn dim(&self, text: &str) -> String {
        self.colorize(text, DIM)
    }

    fn colorize(&self, text: &str, color: &str) -> String {
        if self.use_colors {
            format!("{color}{text}{RESET}")
        } else {
            text.to_string()
        }
    }
}

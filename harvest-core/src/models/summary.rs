//! Fetch summary returned by providers.

use serde::{Deserialize, Serialize};

/// Accounting for one provider run against one domain.
///
/// Returned on success only; a failed run reports through its error. URLs
/// already sent before a failure stay on the channel either way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchSummary {
    /// Page count reported by the archive.
    pub pages_discovered: u32,
    /// Pages actually requested.
    pub pages_visited: u32,
    /// URLs pushed onto the output channel.
    pub urls_sent: u64,
    /// Pages that decoded to an empty result.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub empty_pages: Vec<u32>,
    /// Whether the run stopped early on cancellation or a closed output.
    pub cancelled: bool,
}

impl FetchSummary {
    /// Creates a summary for a run that discovered `pages` pages.
    pub fn new(pages_discovered: u32) -> Self {
        Self {
            pages_discovered,
            ..Self::default()
        }
    }

    /// Returns true if every discovered page was visited.
    pub fn is_complete(&self) -> bool {
        !self.cancelled && self.pages_visited == self.pages_discovered
    }
}

//! Extension blacklist applied to harvested URLs.

use std::collections::HashSet;

use url::Url;

/// Set of lowercase file extensions whose URLs are dropped.
#[derive(Debug, Clone, Default)]
pub struct Blacklist {
    extensions: HashSet<String>,
}

impl Blacklist {
    /// Builds a blacklist from extensions such as `png` or `.jpg`.
    pub fn new<S: AsRef<str>>(extensions: &[S]) -> Self {
        let extensions = extensions
            .iter()
            .map(|e| e.as_ref().trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        Self { extensions }
    }

    /// Returns true when nothing is blacklisted.
    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }

    /// Returns true if the URL's path ends in a blacklisted extension.
    ///
    /// Unparseable URLs fall back to the text before any `?` or `#`.
    pub fn blocks(&self, raw: &str) -> bool {
        if self.is_empty() {
            return false;
        }

        let path = match Url::parse(raw) {
            Ok(url) => url.path().to_string(),
            Err(_) => raw.split(['?', '#']).next().unwrap_or_default().to_string(),
        };

        let Some(file) = path.rsplit('/').next() else {
            return false;
        };
        match file.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => {
                self.extensions.contains(&ext.to_ascii_lowercase())
            }
            _ => false,
        }
    }
}

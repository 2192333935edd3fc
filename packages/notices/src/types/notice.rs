//! Notice types - the normalized record produced by the parser.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder for a card without a second info block.
pub const NO_DATE: &str = "No Date Found";

/// Placeholder for a card without any info block.
pub const NO_TITLE: &str = "No Title Found";

/// Placeholder when the modal description cannot be resolved.
pub const NO_DESCRIPTION: &str = "No Description Found";

/// A single announcement scraped from the portal.
///
/// Every field always has a value: markup that is missing or malformed
/// degrades to the `NO_*` placeholders instead of failing the parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Date text exactly as the portal renders it
    pub date: String,

    /// Title text
    pub title: String,

    /// Description from the linked modal block (may span lines)
    pub description: String,

    /// Absolute download URLs, first occurrence order, no duplicates
    #[serde(default)]
    pub download_links: Vec<String>,

    /// When the batch containing this notice was fetched
    pub fetched_at: DateTime<Utc>,
}

impl Notice {
    /// Create a notice with every text field set to its placeholder.
    pub fn placeholder(fetched_at: DateTime<Utc>) -> Self {
        Self {
            date: NO_DATE.to_string(),
            title: NO_TITLE.to_string(),
            description: NO_DESCRIPTION.to_string(),
            download_links: Vec::new(),
            fetched_at,
        }
    }

    /// Create a notice with the given title and date.
    pub fn new(title: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            date: date.into(),
            ..Self::placeholder(Utc::now())
        }
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a download link unless it is already present.
    pub fn with_download_link(mut self, link: impl Into<String>) -> Self {
        self.push_download_link(link.into());
        self
    }

    /// Set the fetched timestamp.
    pub fn with_fetched_at(mut self, fetched_at: DateTime<Utc>) -> Self {
        self.fetched_at = fetched_at;
        self
    }

    /// Append a link, keeping the first occurrence of duplicates.
    pub(crate) fn push_download_link(&mut self, link: String) {
        if !self.download_links.contains(&link) {
            self.download_links.push(link);
        }
    }

    /// Identity of this notice for deduplication.
    pub fn key(&self) -> NoticeKey {
        NoticeKey {
            date: self.date.clone(),
            title: self.title.clone(),
        }
    }

    /// `fetched_at` in the form written to storage (`2024-05-01T08:00:00.000000Z`).
    pub fn fetched_at_rfc3339(&self) -> String {
        self.fetched_at.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    pub fn has_description(&self) -> bool {
        self.description != NO_DESCRIPTION
    }
}

/// Uniqueness key of a stored notice.
///
/// Exact, case- and whitespace-sensitive comparison of date and title. Two
/// different notices that share both collapse into one; a title that differs
/// only by trailing whitespace counts as a new notice.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NoticeKey {
    pub date: String,
    pub title: String,
}

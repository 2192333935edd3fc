//! Typed errors for the notices library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can tell a
//! transport failure apart from a storage failure and treat them differently.

use thiserror::Error;

/// Errors that can occur anywhere in the notices library.
#[derive(Debug, Error)]
pub enum NoticeError {
    /// Fetching the portal fragment failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// Persisting notices failed
    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

/// Errors raised by a [`NoticeFetcher`](crate::traits::fetcher::NoticeFetcher).
#[derive(Debug, Error)]
pub enum FetchError {
    /// No session cookie was configured
    #[error("missing session cookie")]
    MissingCookie,

    /// HTTP request failed before a response arrived
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Portal answered with a non-success status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },
}

/// Errors raised by a [`NoticeStore`](crate::traits::store::NoticeStore).
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database operation failed
    #[cfg(feature = "sqlite")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem operation failed (creating the database directory)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Download links could not be encoded to JSON
    #[error("JSON encode error: {0}")]
    Encode(#[from] serde_json::Error),

    /// A stored row could not be turned back into a notice
    #[error("invalid stored row: {reason}")]
    Decode { reason: String },
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, NoticeError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for storage operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

//! Notice extraction for the sweedu.in parent portal
//!
//! Fetches the announcement tab the portal's mobile app renders over AJAX,
//! turns each notice card into a [`Notice`], and stores notices in SQLite
//! keyed on `(date, title)` so repeated runs only add what is new.
//!
//! # Usage
//!
//! ```rust,ignore
//! use notices::{ingest, PortalConfig, PortalFetcher, SqliteNoticeStore};
//!
//! let fetcher = PortalFetcher::new(PortalConfig::new().with_cookie(cookie))?;
//! let store = SqliteNoticeStore::open("/tmp/notices.db").await?;
//!
//! let outcome = ingest(&fetcher, Some(&store)).await?;
//! println!("{} notices, {} new", outcome.notices.len(), outcome.persist.inserted());
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Fetcher and store abstractions
//! - [`types`] - Notice and portal configuration types
//! - [`pipeline`] - Parsing, ingest orchestration, diagnostics
//! - [`stores`] - Storage implementations (MemoryNoticeStore, SqliteNoticeStore)
//! - [`fetchers`] - Fetcher implementations (PortalFetcher, MockFetcher)
//! - [`testing`] - HTML fixtures

pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{FetchError, NoticeError, StoreError};
pub use traits::{
    fetcher::{FetchMethod, FetchedPage, NoticeFetcher},
    store::NoticeStore,
};
pub use types::{
    config::PortalConfig,
    notice::{Notice, NoticeKey, NO_DATE, NO_DESCRIPTION, NO_TITLE},
};

// Re-export pipeline components
pub use pipeline::{
    // Parsing
    parse_notices, parse_notices_at, NoticeParser,
    // Ingest
    fetch_notices, ingest, persist_notices, IngestOutcome, PersistOutcome,
    // Diagnostics
    run_probe, LoginDetection, ProbeAttempt, ProbeMethods, ProbeOptions, ProbeReport,
};

#[cfg(feature = "sqlite")]
pub use pipeline::{ingest_into, persist_at};

// Re-export stores
pub use stores::MemoryNoticeStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteNoticeStore;

// Re-export fetchers
pub use fetchers::{MockFetcher, PortalFetcher};

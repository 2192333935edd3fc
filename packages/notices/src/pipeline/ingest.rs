//! Fetch → parse → persist.
//!
//! Transport failures abort the run. Storage failures never do: the parsed
//! notices are always returned, with the storage error downgraded to a
//! warning in [`PersistOutcome::Failed`].

#[cfg(feature = "sqlite")]
use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{FetchResult, StoreResult};
use crate::pipeline::parse::parse_notices;
#[cfg(feature = "sqlite")]
use crate::stores::SqliteNoticeStore;
use crate::traits::fetcher::NoticeFetcher;
use crate::traits::store::NoticeStore;
use crate::types::notice::Notice;

/// What happened to the persistence step of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PersistOutcome {
    /// Persistence was not requested (or there was nothing to save)
    Skipped,
    /// Notices were saved; `inserted` counts rows new in this run
    Saved { inserted: usize },
    /// Storage failed; the notices are still valid
    Failed { error: String },
}

impl PersistOutcome {
    /// Rows inserted in this run (0 unless saved).
    pub fn inserted(&self) -> usize {
        match self {
            PersistOutcome::Saved { inserted } => *inserted,
            _ => 0,
        }
    }

    /// The storage error, if persistence failed.
    pub fn warning(&self) -> Option<&str> {
        match self {
            PersistOutcome::Failed { error } => Some(error),
            _ => None,
        }
    }
}

impl From<StoreResult<usize>> for PersistOutcome {
    fn from(result: StoreResult<usize>) -> Self {
        match result {
            Ok(inserted) => PersistOutcome::Saved { inserted },
            Err(e) => {
                warn!(error = %e, "Failed to persist notices");
                PersistOutcome::Failed {
                    error: e.to_string(),
                }
            }
        }
    }
}

/// Result of one fetch-and-parse run.
#[derive(Debug, Clone, Serialize)]
pub struct IngestOutcome {
    pub notices: Vec<Notice>,
    pub persist: PersistOutcome,
}

/// Fetch the notice fragment and parse it.
pub async fn fetch_notices<F>(fetcher: &F) -> FetchResult<Vec<Notice>>
where
    F: NoticeFetcher + ?Sized,
{
    let html = fetcher.fetch_html().await?;
    let notices = parse_notices(&html, fetcher.base_url());

    info!(notices = notices.len(), bytes = html.len(), "Fetched notices");
    Ok(notices)
}

/// Ensure the schema and save `notices`, catching any storage error.
pub async fn persist_notices<S>(store: &S, notices: &[Notice]) -> PersistOutcome
where
    S: NoticeStore + ?Sized,
{
    let result: StoreResult<usize> = async {
        store.ensure_schema().await?;
        store.save(notices).await
    }
    .await;

    result.into()
}

/// Fetch, parse and (when a store is given) persist the notices.
///
/// An empty fetch is not persisted.
pub async fn ingest<F, S>(fetcher: &F, store: Option<&S>) -> FetchResult<IngestOutcome>
where
    F: NoticeFetcher + ?Sized,
    S: NoticeStore + ?Sized,
{
    let notices = fetch_notices(fetcher).await?;

    let persist = match store {
        Some(store) if !notices.is_empty() => persist_notices(store, &notices).await,
        _ => PersistOutcome::Skipped,
    };

    Ok(IngestOutcome { notices, persist })
}

/// Open the SQLite database at `path` for one save and close it again.
///
/// Failing to open the file is reported like any other storage failure.
#[cfg(feature = "sqlite")]
pub async fn persist_at(path: &Path, notices: &[Notice]) -> PersistOutcome {
    match SqliteNoticeStore::open(path).await {
        Ok(store) => {
            let outcome = persist_notices(&store, notices).await;
            store.close().await;
            outcome
        }
        Err(e) => Err(e).into(),
    }
}

/// [`ingest`] against a database file opened only when there is something
/// to save.
#[cfg(feature = "sqlite")]
pub async fn ingest_into<F>(fetcher: &F, db_path: Option<&Path>) -> FetchResult<IngestOutcome>
where
    F: NoticeFetcher + ?Sized,
{
    let notices = fetch_notices(fetcher).await?;

    let persist = match db_path {
        Some(path) if !notices.is_empty() => persist_at(path, &notices).await,
        _ => PersistOutcome::Skipped,
    };

    Ok(IngestOutcome { notices, persist })
}

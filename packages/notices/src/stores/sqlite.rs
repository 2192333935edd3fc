//! SQLite storage implementation.
//!
//! A file-based storage backend using SQLite. The table layout matches the
//! one earlier deployments wrote to, so existing `notices.db` files keep
//! working:
//!
//! ```sql
//! CREATE TABLE notices (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     date TEXT, title TEXT, description TEXT,
//!     download_links_json TEXT, fetched_at TEXT,
//!     UNIQUE(date, title)
//! )
//! ```

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};
use crate::traits::store::NoticeStore;
use crate::types::notice::{Notice, NO_DATE, NO_DESCRIPTION, NO_TITLE};

const INSERT_NOTICE: &str = r#"
    INSERT OR IGNORE INTO notices (date, title, description, download_links_json, fetched_at)
    VALUES (?, ?, ?, ?, ?)
"#;

/// SQLite-based notice store.
pub struct SqliteNoticeStore {
    pool: SqlitePool,
}

impl SqliteNoticeStore {
    /// Open (creating if needed) the database file at `path` and ensure the
    /// schema exists. Missing parent directories are created.
    pub async fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        // One writer per request; the UNIQUE constraint handles racing requests.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        debug!(path = %path.display(), "Opened notice database");

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Create an in-memory SQLite store (for testing).
    pub async fn in_memory() -> StoreResult<Self> {
        // A single connection that never expires, otherwise the database
        // disappears with it.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None::<Duration>)
            .max_lifetime(None::<Duration>)
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    /// Release the connection pool.
    pub async fn close(self) {
        self.pool.close().await;
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl NoticeStore for SqliteNoticeStore {
    async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS notices (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT,
                title TEXT,
                description TEXT,
                download_links_json TEXT,
                fetched_at TEXT,
                UNIQUE(date, title)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn save(&self, notices: &[Notice]) -> StoreResult<usize> {
        let mut tx = self.pool.begin().await?;
        let mut inserted = 0usize;

        for notice in notices {
            let links = serde_json::to_string(&notice.download_links)?;
            let result = sqlx::query(INSERT_NOTICE)
                .bind(&notice.date)
                .bind(&notice.title)
                .bind(&notice.description)
                .bind(links)
                .bind(notice.fetched_at_rfc3339())
                .execute(&mut *tx)
                .await?;

            inserted += result.rows_affected() as usize;
        }

        tx.commit().await?;

        info!(
            received = notices.len(),
            inserted = inserted,
            "Saved notices"
        );
        Ok(inserted)
    }

    async fn count(&self) -> StoreResult<usize> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM notices")
            .fetch_one(&self.pool)
            .await?;
        Ok(count as usize)
    }

    async fn list(&self) -> StoreResult<Vec<Notice>> {
        let rows = sqlx::query_as::<_, NoticeRow>(
            r#"
            SELECT date, title, description, download_links_json, fetched_at
            FROM notices
            ORDER BY id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(NoticeRow::into_notice).collect()
    }
}

// Columns are nullable in the legacy schema.
#[derive(Debug, FromRow)]
struct NoticeRow {
    date: Option<String>,
    title: Option<String>,
    description: Option<String>,
    download_links_json: Option<String>,
    fetched_at: Option<String>,
}

impl NoticeRow {
    fn into_notice(self) -> StoreResult<Notice> {
        let fetched_at = match self.fetched_at.as_deref() {
            Some(raw) => DateTime::parse_from_rfc3339(raw)
                .map_err(|e| StoreError::Decode {
                    reason: format!("invalid fetched_at {raw:?}: {e}"),
                })?
                .with_timezone(&Utc),
            None => {
                return Err(StoreError::Decode {
                    reason: "missing fetched_at".to_string(),
                })
            }
        };

        let download_links = match self.download_links_json.as_deref() {
            Some(raw) => serde_json::from_str(raw).map_err(|e| StoreError::Decode {
                reason: format!("invalid download_links_json: {e}"),
            })?,
            None => Vec::new(),
        };

        Ok(Notice {
            date: self.date.unwrap_or_else(|| NO_DATE.to_string()),
            title: self.title.unwrap_or_else(|| NO_TITLE.to_string()),
            description: self
                .description
                .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
            download_links,
            fetched_at,
        })
    }
}

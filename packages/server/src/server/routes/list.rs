//! `GET /api/notices`

use axum::{
    extract::{Extension, Query},
    Json,
};
use notices::{fetch_notices, persist_at, Notice, PersistOutcome};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::server::app::AppState;
use crate::server::routes::ApiError;

const NO_NOTICES: &str = "No notices found (maybe an expired cookie or login required).";
const PERSIST_FAILED: &str = "Failed to persist to DB";

#[derive(Debug, Default, Deserialize)]
pub struct NoticesQuery {
    pub persist: Option<String>,
}

/// `1`, `true` and `yes` (any case) turn persistence on.
pub fn persist_requested(raw: Option<&str>) -> bool {
    matches!(
        raw.map(str::to_ascii_lowercase).as_deref(),
        Some("1" | "true" | "yes")
    )
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum NoticesResponse {
    Listed {
        notices_count: usize,
        /// Rows new in this request; the field name predates the exact count
        #[serde(rename = "inserted_rows_estimate")]
        inserted_rows: usize,
        notices: Vec<Notice>,
    },
    Empty {
        notices: Vec<Notice>,
        message: &'static str,
    },
    PersistFailed {
        notices: Vec<Notice>,
        warning: &'static str,
        db_error: String,
    },
}

/// Fetch the current notices, optionally recording them.
///
/// A storage failure still answers `200` with the notices and a warning.
pub async fn notices_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<NoticesQuery>,
) -> Result<Json<NoticesResponse>, ApiError> {
    let fetcher = state.fetcher()?;
    if !fetcher.has_cookie() {
        return Err(ApiError::missing_cookie());
    }

    let notices = fetch_notices(fetcher.as_ref()).await?;
    if notices.is_empty() {
        info!("Portal returned no notices");
        return Ok(Json(NoticesResponse::Empty {
            notices,
            message: NO_NOTICES,
        }));
    }

    let persist = if persist_requested(query.persist.as_deref()) {
        persist_at(&state.db_path, &notices).await
    } else {
        PersistOutcome::Skipped
    };

    let response = match persist {
        PersistOutcome::Failed { error } => NoticesResponse::PersistFailed {
            notices,
            warning: PERSIST_FAILED,
            db_error: error,
        },
        outcome => NoticesResponse::Listed {
            notices_count: notices.len(),
            inserted_rows: outcome.inserted(),
            notices,
        },
    };

    Ok(Json(response))
}

//! `GET /api/notices_debug`
//!
//! Shows what the portal actually sends back, for working out why
//! `/api/notices` comes back empty.

use axum::{
    extract::{Extension, Query},
    Json,
};
use notices::pipeline::diagnose::DEFAULT_SNIPPET_CHARS;
use notices::{run_probe, ProbeMethods, ProbeOptions, ProbeReport};
use serde::Deserialize;

use crate::server::app::AppState;
use crate::server::routes::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ProbeQuery {
    pub method: Option<String>,
    pub snippet_chars: Option<String>,
}

impl ProbeQuery {
    pub fn options(&self) -> Result<ProbeOptions, ApiError> {
        let methods = self
            .method
            .as_deref()
            .map(ProbeMethods::from_param)
            .unwrap_or(ProbeMethods::Both);

        let snippet_chars = match self.snippet_chars.as_deref() {
            None => DEFAULT_SNIPPET_CHARS,
            Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                ApiError::bad_request("snippet_chars must be a non-negative integer")
            })?,
        };

        Ok(ProbeOptions {
            methods,
            snippet_chars,
        })
    }
}

pub async fn notices_debug_handler(
    Extension(state): Extension<AppState>,
    Query(query): Query<ProbeQuery>,
) -> Result<Json<ProbeReport>, ApiError> {
    let fetcher = state.fetcher()?;
    if !fetcher.has_cookie() {
        return Err(ApiError::missing_cookie());
    }

    let options = query.options()?;
    Ok(Json(run_probe(fetcher.as_ref(), options).await))
}

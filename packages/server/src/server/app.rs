//! Application setup and server configuration.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{extract::Extension, routing::get, Router};
use notices::error::FetchResult;
use notices::{NoticeFetcher, PortalFetcher};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::server::routes::{health_handler, notices_debug_handler, notices_handler};

/// Builds the fetcher for one request.
pub type FetcherFactory = Arc<dyn Fn() -> FetchResult<Box<dyn NoticeFetcher>> + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// A fresh fetcher per request keeps portal-set cookies from leaking
    /// between requests.
    pub fetchers: FetcherFactory,
    pub db_path: PathBuf,
}

impl AppState {
    /// State backed by the live portal.
    ///
    /// The portal URLs are validated here so a bad deployment fails at
    /// startup rather than on the first request.
    pub fn from_config(config: &Config) -> Result<Self> {
        let portal = config.portal_config();
        PortalFetcher::new(portal.clone()).context("Invalid portal configuration")?;

        let fetchers: FetcherFactory =
            Arc::new(move || -> FetchResult<Box<dyn NoticeFetcher>> {
                Ok(Box::new(PortalFetcher::new(portal.clone())?))
            });

        Ok(Self {
            fetchers,
            db_path: config.db_path.clone(),
        })
    }

    /// State that hands out clones of `fetcher` (for testing).
    pub fn with_fetcher<F>(fetcher: F, db_path: impl Into<PathBuf>) -> Self
    where
        F: NoticeFetcher + Clone + 'static,
    {
        Self {
            fetchers: Arc::new(move || -> FetchResult<Box<dyn NoticeFetcher>> {
                Ok(Box::new(fetcher.clone()))
            }),
            db_path: db_path.into(),
        }
    }

    pub fn fetcher(&self) -> FetchResult<Box<dyn NoticeFetcher>> {
        (self.fetchers)()
    }
}

/// Build the Axum application router
pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/api/notices", get(notices_handler))
        .route("/api/notices_debug", get(notices_debug_handler))
        .route("/health", get(health_handler))
        .layer(Extension(state))
        .layer(TraceLayer::new_for_http())
}

//! Mock fetcher for testing.
//!
//! Provides a configurable mock implementation of the NoticeFetcher trait.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchMethod, FetchedPage, NoticeFetcher};
use crate::types::config::DEFAULT_BASE_URL;

/// Canned outcome for one method.
#[derive(Clone)]
enum Canned {
    Page(FetchedPage),
    Error(String),
}

/// Mock fetcher for testing.
///
/// Allows configuring canned responses per request method.
///
/// # Example
///
/// ```rust
/// use notices::fetchers::MockFetcher;
/// use notices::FetchMethod;
///
/// let mock = MockFetcher::new().with_html(FetchMethod::Get, "<div class=\"post_notice\"></div>");
/// ```
#[derive(Clone)]
pub struct MockFetcher {
    responses: Arc<RwLock<HashMap<FetchMethod, Canned>>>,
    prime_error: Arc<RwLock<Option<String>>>,
    calls: Arc<RwLock<Vec<MockFetchCall>>>,
    base_url: Url,
    has_cookie: bool,
}

/// Record of a call made to the mock fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockFetchCall {
    Prime,
    Request(FetchMethod),
}

impl Default for MockFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl MockFetcher {
    /// Create a mock with a cookie configured and no canned responses.
    pub fn new() -> Self {
        Self {
            responses: Arc::new(RwLock::new(HashMap::new())),
            prime_error: Arc::new(RwLock::new(None)),
            calls: Arc::new(RwLock::new(Vec::new())),
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
            has_cookie: true,
        }
    }

    /// Respond to `method` with a 200 page carrying `html`.
    pub fn with_html(self, method: FetchMethod, html: impl Into<String>) -> Self {
        self.with_page(method, FetchedPage::ok(DEFAULT_BASE_URL, html))
    }

    /// Respond to `method` with the given page.
    pub fn with_page(self, method: FetchMethod, page: FetchedPage) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(method, Canned::Page(page));
        self
    }

    /// Fail `method` with a transport error.
    pub fn with_error(self, method: FetchMethod, message: impl Into<String>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(method, Canned::Error(message.into()));
        self
    }

    /// Fail the priming request.
    pub fn with_prime_error(self, message: impl Into<String>) -> Self {
        *self.prime_error.write().unwrap() = Some(message.into());
        self
    }

    /// Behave as if no cookie were configured.
    pub fn without_cookie(mut self) -> Self {
        self.has_cookie = false;
        self
    }

    /// Override the link resolution base.
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = base_url;
        self
    }

    /// All calls made so far.
    pub fn calls(&self) -> Vec<MockFetchCall> {
        self.calls.read().unwrap().clone()
    }

    /// Number of requests sent to the notice endpoint.
    pub fn request_count(&self) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, MockFetchCall::Request(_)))
            .count()
    }
}

fn transport_error(message: &str) -> FetchError {
    FetchError::Http(Box::new(std::io::Error::new(
        std::io::ErrorKind::Other,
        message.to_string(),
    )))
}

#[async_trait]
impl NoticeFetcher for MockFetcher {
    async fn request(&self, method: FetchMethod) -> FetchResult<FetchedPage> {
        self.calls
            .write()
            .unwrap()
            .push(MockFetchCall::Request(method));

        let canned = self.responses.read().unwrap().get(&method).cloned();
        match canned {
            Some(Canned::Page(page)) => Ok(page),
            Some(Canned::Error(message)) => Err(transport_error(&message)),
            None => Ok(FetchedPage::ok(DEFAULT_BASE_URL, "")),
        }
    }

    async fn prime(&self) -> FetchResult<()> {
        self.calls.write().unwrap().push(MockFetchCall::Prime);

        match self.prime_error.read().unwrap().as_deref() {
            Some(message) => Err(transport_error(message)),
            None => Ok(()),
        }
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn has_cookie(&self) -> bool {
        self.has_cookie
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_responses_per_method() {
        let mock = MockFetcher::new()
            .with_html(FetchMethod::Get, "<p>get</p>")
            .with_error(FetchMethod::Post, "connection reset");

        assert_eq!(mock.request(FetchMethod::Get).await.unwrap().body, "<p>get</p>");
        assert!(mock.request(FetchMethod::Post).await.is_err());
        assert_eq!(
            mock.calls(),
            vec![
                MockFetchCall::Request(FetchMethod::Get),
                MockFetchCall::Request(FetchMethod::Post)
            ]
        );
    }

    #[tokio::test]
    async fn test_fetch_html_requires_cookie() {
        let mock = MockFetcher::new()
            .with_html(FetchMethod::Get, "<p>x</p>")
            .without_cookie();

        let err = mock.fetch_html().await.unwrap_err();
        assert!(matches!(err, FetchError::MissingCookie));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_fetch_html_rejects_error_status() {
        let page = FetchedPage::ok(DEFAULT_BASE_URL, "login").with_status(401, Some("Unauthorized"));
        let mock = MockFetcher::new().with_page(FetchMethod::Get, page);

        let err = mock.fetch_html().await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 401, .. }));
    }
}

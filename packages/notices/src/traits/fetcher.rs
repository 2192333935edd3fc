//! Fetcher trait for retrieving the notice fragment.
//!
//! Fetchers own everything about the transport (session cookie, headers,
//! timeouts). The rest of the library only sees HTML text and the base URL
//! that relative links resolve against.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{FetchError, FetchResult};

/// HTTP method used against the notice endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    /// Parameters in the query string (what the portal's app does)
    Get,
    /// Same parameters as a form body
    Post,
}

impl FetchMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            FetchMethod::Get => "get",
            FetchMethod::Post => "post",
        }
    }
}

impl std::fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A response from the portal, kept regardless of status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchedPage {
    /// Final URL after redirects
    pub url: String,

    /// HTTP status code
    pub status: u16,

    /// Canonical reason phrase, if the status has one
    pub reason: Option<String>,

    /// Response body
    pub body: String,

    /// Names of cookies the portal has set on this session (never values)
    #[serde(default)]
    pub cookie_names: Vec<String>,
}

impl FetchedPage {
    /// Create a 200 page with the given body.
    pub fn ok(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            reason: Some("OK".to_string()),
            body: body.into(),
            cookie_names: Vec::new(),
        }
    }

    /// Set the status code and reason.
    pub fn with_status(mut self, status: u16, reason: Option<&str>) -> Self {
        self.status = status;
        self.reason = reason.map(str::to_string);
        self
    }

    /// Set the session cookie names.
    pub fn with_cookie_names(mut self, names: Vec<String>) -> Self {
        self.cookie_names = names;
        self
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body of a successful response, or a status error.
    pub fn into_body(self) -> FetchResult<String> {
        if self.is_success() {
            Ok(self.body)
        } else {
            Err(FetchError::Status {
                status: self.status,
                url: self.url,
            })
        }
    }
}

/// Source of the raw notice fragment.
#[async_trait]
pub trait NoticeFetcher: Send + Sync {
    /// Send one request to the notice endpoint and return the response as-is.
    async fn request(&self, method: FetchMethod) -> FetchResult<FetchedPage>;

    /// Load the announcement page so the portal can attach session cookies.
    async fn prime(&self) -> FetchResult<()>;

    /// Base URL for resolving relative download links.
    fn base_url(&self) -> &Url;

    /// Whether a session cookie is configured at all.
    fn has_cookie(&self) -> bool;

    /// Fetch the notice fragment with GET; non-2xx statuses are errors.
    async fn fetch_html(&self) -> FetchResult<String> {
        if !self.has_cookie() {
            return Err(FetchError::MissingCookie);
        }
        self.request(FetchMethod::Get).await?.into_body()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_body_rejects_error_status() {
        let page = FetchedPage::ok("https://sweedu.in/x", "denied").with_status(403, Some("Forbidden"));
        let err = page.into_body().unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 403, .. }));
    }

    #[test]
    fn test_into_body_accepts_success() {
        let page = FetchedPage::ok("https://sweedu.in/x", "<div></div>");
        assert_eq!(page.into_body().unwrap(), "<div></div>");
    }

    #[test]
    fn test_method_serializes_lowercase() {
        assert_eq!(serde_json::to_value(FetchMethod::Post).unwrap(), "post");
        assert_eq!(FetchMethod::Get.to_string(), "get");
    }
}

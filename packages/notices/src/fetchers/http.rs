//! HTTP fetcher for the parent portal.
//!
//! Mimics the portal's own mobile web app: an XHR-style request carrying the
//! parent's session cookie, sent to the AJAX endpoint that renders the notice
//! tab as an HTML fragment.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{self, HeaderMap, HeaderValue};
use tracing::{debug, warn};
use url::Url;

use crate::error::{FetchError, FetchResult};
use crate::traits::fetcher::{FetchMethod, FetchedPage, NoticeFetcher};
use crate::types::config::PortalConfig;

/// Fetcher that talks to the real portal.
///
/// Cookies the portal sets (for example while priming the session) are kept
/// in a jar and sent alongside the configured cookie on later requests.
///
/// # Example
///
/// ```rust,ignore
/// use notices::{PortalConfig, PortalFetcher, NoticeFetcher};
///
/// let fetcher = PortalFetcher::new(PortalConfig::new().with_cookie(cookie))?;
/// let html = fetcher.fetch_html().await?;
/// ```
pub struct PortalFetcher {
    client: reqwest::Client,
    jar: Arc<Jar>,
    config: PortalConfig,
    api_url: Url,
    announce_url: Url,
    base_url: Url,
}

impl PortalFetcher {
    /// Create a fetcher, validating the configured URLs.
    pub fn new(config: PortalConfig) -> FetchResult<Self> {
        let api_url = parse_url(&config.api_url)?;
        let announce_url = parse_url(&config.announce_url)?;
        let base_url = parse_url(&config.base_url)?;

        let jar = Arc::new(Jar::default());
        // The jar also records Set-Cookie from redirect hops, which the
        // final response alone would miss.
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .cookie_provider(jar.clone())
            .build()
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        Ok(Self {
            client,
            jar,
            config,
            api_url,
            announce_url,
            base_url,
        })
    }

    /// The configuration this fetcher was built from.
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    fn headers(&self, url: &Url) -> FetchResult<HeaderMap> {
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            header::ACCEPT_LANGUAGE,
            HeaderValue::from_static("en-US,en;q=0.9"),
        );
        headers.insert(header::CONNECTION, HeaderValue::from_static("close"));
        headers.insert(
            "x-requested-with",
            HeaderValue::from_static("XMLHttpRequest"),
        );
        headers.insert(header::REFERER, header_value(&self.config.announce_url)?);
        headers.insert(header::ORIGIN, header_value(&self.config.origin)?);

        if let Some(cookie) = self.cookie_header(url) {
            headers.insert(header::COOKIE, header_value(&cookie)?);
        }

        Ok(headers)
    }

    /// Configured cookie merged with whatever the portal has set so far.
    ///
    /// reqwest skips its own jar once a `Cookie` header is present, so both
    /// sources are joined here.
    fn cookie_header(&self, url: &Url) -> Option<String> {
        let session = self
            .jar
            .cookies(url)
            .and_then(|v| v.to_str().ok().map(str::to_string));

        match (self.config.cookie.as_deref(), session) {
            (Some(configured), Some(session)) => Some(format!("{configured}; {session}")),
            (Some(configured), None) => Some(configured.to_string()),
            (None, session) => session,
        }
    }

    /// Names of the cookies the portal has set on this session.
    pub fn session_cookie_names(&self) -> Vec<String> {
        let mut names = BTreeSet::new();
        for url in [&self.api_url, &self.announce_url] {
            if let Some(value) = self.jar.cookies(url) {
                if let Ok(value) = value.to_str() {
                    names.extend(cookie_names(value));
                }
            }
        }
        names.into_iter().collect()
    }
}

#[async_trait]
impl NoticeFetcher for PortalFetcher {
    async fn request(&self, method: FetchMethod) -> FetchResult<FetchedPage> {
        let headers = self.headers(&self.api_url)?;
        let builder = match method {
            FetchMethod::Get => self
                .client
                .get(self.api_url.clone())
                .query(&self.config.params),
            FetchMethod::Post => self
                .client
                .post(self.api_url.clone())
                .form(&self.config.params),
        };

        debug!(url = %self.api_url, method = %method, "Requesting notice fragment");
        let response = builder
            .headers(headers)
            .timeout(self.config.request_timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.api_url, method = %method, error = %e, "Notice request failed");
                FetchError::Http(Box::new(e))
            })?;

        let status = response.status();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Http(Box::new(e)))?;

        debug!(
            url = %url,
            status = status.as_u16(),
            bytes = body.len(),
            "Notice fragment received"
        );

        Ok(FetchedPage {
            url,
            status: status.as_u16(),
            reason: status.canonical_reason().map(str::to_string),
            body,
            cookie_names: self.session_cookie_names(),
        })
    }

    async fn prime(&self) -> FetchResult<()> {
        let headers = self.headers(&self.announce_url)?;

        debug!(url = %self.announce_url, "Priming portal session");
        let response = self
            .client
            .get(self.announce_url.clone())
            .headers(headers)
            .timeout(self.config.prime_timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %self.announce_url, error = %e, "Priming request failed");
                FetchError::Http(Box::new(e))
            })?;

        debug!(status = response.status().as_u16(), "Portal session primed");
        Ok(())
    }

    fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn has_cookie(&self) -> bool {
        self.config.has_cookie()
    }
}

fn parse_url(raw: &str) -> FetchResult<Url> {
    Url::parse(raw).map_err(|_| FetchError::InvalidUrl {
        url: raw.to_string(),
    })
}

fn header_value(raw: &str) -> FetchResult<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|e| FetchError::Http(Box::new(e)))
}

/// Cookie names from a `Cookie` header value (`a=1; b=2`).
fn cookie_names(header: &str) -> impl Iterator<Item = String> + '_ {
    header
        .split(';')
        .filter_map(|pair| pair.split_once('=').map(|(name, _)| name.trim()))
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

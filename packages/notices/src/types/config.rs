//! Configuration types for reaching the parent portal.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// AJAX endpoint that renders the notice fragment.
pub const DEFAULT_API_URL: &str = "https://sweedu.in/app/webparentsapp/action_layer.php";

/// Page the fragment is normally loaded from; used as `Referer` and for priming.
pub const DEFAULT_ANNOUNCE_URL: &str = "https://sweedu.in/app/webparentsapp/announcement.php";

/// Base that relative download hrefs are resolved against.
pub const DEFAULT_BASE_URL: &str = "https://sweedu.in/";

/// Origin header sent by diagnostic requests.
pub const DEFAULT_ORIGIN: &str = "https://sweedu.in";

/// The portal only serves the fragment to its mobile web app.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 19_0 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) Mobile/15E148";

/// Connection settings for the portal endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortalConfig {
    /// Endpoint returning the notice fragment
    pub api_url: String,

    /// Announcement page (Referer, session priming)
    pub announce_url: String,

    /// Base URL for resolving relative download links
    pub base_url: String,

    /// Value of the `Origin` header on diagnostic requests
    pub origin: String,

    /// Raw `Cookie` header value of a logged-in parent session
    #[serde(skip_serializing)]
    pub cookie: Option<String>,

    pub user_agent: String,

    /// Query (GET) or form (POST) parameters selecting the notice tab
    pub params: Vec<(String, String)>,

    /// Timeout for the notice request
    #[serde(with = "duration_secs")]
    pub request_timeout: Duration,

    /// Timeout for the priming request
    #[serde(with = "duration_secs")]
    pub prime_timeout: Duration,
}

impl Default for PortalConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            announce_url: DEFAULT_ANNOUNCE_URL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            origin: DEFAULT_ORIGIN.to_string(),
            cookie: None,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            params: default_params(),
            request_timeout: Duration::from_secs(20),
            prime_timeout: Duration::from_secs(15),
        }
    }
}

impl PortalConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session cookie. Empty values count as unset.
    pub fn with_cookie(mut self, cookie: impl Into<String>) -> Self {
        let cookie = cookie.into();
        self.cookie = if cookie.trim().is_empty() {
            None
        } else {
            Some(cookie)
        };
        self
    }

    /// Override the notice endpoint.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    /// Override the announcement page.
    pub fn with_announce_url(mut self, url: impl Into<String>) -> Self {
        self.announce_url = url.into();
        self
    }

    /// Override the link resolution base.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the notice request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn has_cookie(&self) -> bool {
        self.cookie.is_some()
    }
}

fn default_params() -> Vec<(String, String)> {
    [
        ("action", "get_stu_annoucement_notice"),
        ("tabname", "notice"),
        ("search_type", ""),
        ("sdate", ""),
        ("edate", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use notices::types::config::{DEFAULT_ANNOUNCE_URL, DEFAULT_API_URL, DEFAULT_BASE_URL};
use notices::PortalConfig;

/// Where notices are stored when `DB_PATH` is unset.
pub const DEFAULT_DB_PATH: &str = "/tmp/notices.db";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// Portal session cookie; requests are refused without it
    pub cookie: Option<String>,
    pub db_path: PathBuf,
    pub port: u16,
    pub api_url: String,
    pub base_url: String,
    pub announce_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            cookie: lookup("COOKIE").filter(|c| !c.trim().is_empty()),
            db_path: lookup("DB_PATH")
                .unwrap_or_else(|| DEFAULT_DB_PATH.to_string())
                .into(),
            port: lookup("PORT")
                .unwrap_or_else(|| "5000".to_string())
                .parse()
                .context("PORT must be a valid number")?,
            api_url: lookup("NOTICES_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string()),
            base_url: lookup("NOTICES_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            announce_url: lookup("NOTICES_ANNOUNCE_URL")
                .unwrap_or_else(|| DEFAULT_ANNOUNCE_URL.to_string()),
        })
    }

    /// Portal settings for building a fetcher.
    pub fn portal_config(&self) -> PortalConfig {
        let config = PortalConfig::new()
            .with_api_url(&self.api_url)
            .with_base_url(&self.base_url)
            .with_announce_url(&self.announce_url);

        match &self.cookie {
            Some(cookie) => config.with_cookie(cookie),
            None => config,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.cookie, None);
        assert_eq!(config.db_path, PathBuf::from(DEFAULT_DB_PATH));
        assert_eq!(config.port, 5000);
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(!config.portal_config().has_cookie());
    }

    #[test]
    fn test_overrides() {
        let config = config_from(&[
            ("COOKIE", "PHPSESSID=abc"),
            ("DB_PATH", "/var/lib/notices/notices.db"),
            ("PORT", "8080"),
            ("NOTICES_BASE_URL", "https://portal.example.org/"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, PathBuf::from("/var/lib/notices/notices.db"));

        let portal = config.portal_config();
        assert!(portal.has_cookie());
        assert_eq!(portal.base_url, "https://portal.example.org/");
    }

    #[test]
    fn test_blank_cookie_is_missing() {
        let config = config_from(&[("COOKIE", "   ")]).unwrap();
        assert_eq!(config.cookie, None);
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }
}

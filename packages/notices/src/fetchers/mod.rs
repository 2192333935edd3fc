//! Fetcher implementations.
//!
//! Available fetchers:
//! - `PortalFetcher` - Authenticated requests against the live portal
//! - `MockFetcher` - Canned responses for testing

pub mod http;
pub mod mock;

pub use http::PortalFetcher;
pub use mock::{MockFetchCall, MockFetcher};

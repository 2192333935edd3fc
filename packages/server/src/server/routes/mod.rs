// HTTP routes
pub mod health;
pub mod list;
pub mod probe;

pub use health::*;
pub use list::*;
pub use probe::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use notices::FetchError;
use serde::Serialize;

const MISSING_COOKIE: &str =
    "Missing COOKIE environment variable. Set COOKIE in the deployment environment.";

/// JSON error body with its status code.
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub status: StatusCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn bad_request(error: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error: error.into(),
            details: None,
        }
    }

    pub fn missing_cookie() -> Self {
        Self::bad_request(MISSING_COOKIE)
    }
}

impl From<FetchError> for ApiError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::MissingCookie => Self::missing_cookie(),
            other => Self {
                status: StatusCode::BAD_GATEWAY,
                error: "Failed to fetch notices".to_string(),
                details: Some(other.to_string()),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

//! HTTP error handling and response types.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use log::error;
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::error::NemesisError;
use crate::scraper::ScrapeError;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

/// Application error type for HTTP handlers.
#[derive(Debug)]
pub enum AppError {
    /// Invalid request (missing or empty parameter)
    BadRequest(String),
    /// Remote statistics page could not be fetched
    Upstream(ScrapeError),
    /// Repository error
    Repository(RepositoryError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, ApiError::new("BAD_REQUEST", msg)),
            AppError::Upstream(e) => {
                error!("upstream failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("UPSTREAM_ERROR", "upstream fetch failed")
                        .with_details(e.to_string()),
                )
            }
            AppError::Repository(e) => {
                error!("repository failure: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ApiError::new("REPOSITORY_ERROR", e.to_string()),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

impl From<NemesisError> for AppError {
    fn from(err: NemesisError) -> Self {
        match err {
            e @ NemesisError::InvalidArgument(_) => AppError::BadRequest(e.to_string()),
            NemesisError::UpstreamFetch(e) => AppError::Upstream(e),
            NemesisError::Persistence(e) => AppError::Repository(e),
        }
    }
}

impl From<RepositoryError> for AppError {
    fn from(err: RepositoryError) -> Self {
        AppError::Repository(err)
    }
}

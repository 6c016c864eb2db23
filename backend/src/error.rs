//! Crate-level error taxonomy shared by the refresh pipeline and read paths.

use thiserror::Error;

use crate::db::repository::RepositoryError;
use crate::scraper::ScrapeError;

#[derive(Debug, Error)]
pub enum NemesisError {
    /// A required identifier was missing or empty.
    #[error("missing parameter: {0}")]
    InvalidArgument(String),

    /// Remote source unreachable, returned a non-success status, or served
    /// markup that is not text.
    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[from] ScrapeError),

    #[error("persistence failure: {0}")]
    Persistence(#[from] RepositoryError),
}

pub type NemesisResult<T> = Result<T, NemesisError>;

/// Reject an empty (or whitespace-only) world identifier.
pub fn require_world(world: &str) -> NemesisResult<&str> {
    if world.trim().is_empty() {
        Err(NemesisError::InvalidArgument("world".to_string()))
    } else {
        Ok(world)
    }
}

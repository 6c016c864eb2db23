//! Data Transfer Objects for the HTTP API.
//!
//! Response bodies for bosses and history reuse the `api` types directly since
//! they already derive Serialize/Deserialize.

use serde::{Deserialize, Serialize};

pub use crate::api::{BossView, BossesResponse, Observation};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `connected`, `disconnected` or the health-check error
    pub database: String,
}

/// `?world=` query parameter. Absent and empty are both rejected downstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WorldQuery {
    #[serde(default)]
    pub world: Option<String>,
}

impl WorldQuery {
    pub fn world(&self) -> &str {
        self.world.as_deref().unwrap_or_default()
    }
}

/// Query parameters for the boss history endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryQuery {
    #[serde(default)]
    pub world: Option<String>,
    /// Kept as text so that a malformed value falls back to the default
    /// instead of rejecting the request.
    #[serde(default)]
    pub limit: Option<String>,
}

impl HistoryQuery {
    pub fn world(&self) -> &str {
        self.world.as_deref().unwrap_or_default()
    }

    /// Parsed limit; `0` (meaning "default") when missing or malformed.
    pub fn limit(&self) -> i64 {
        self.limit
            .as_deref()
            .and_then(|l| l.trim().parse().ok())
            .unwrap_or(0)
    }
}

/// Response body for an on-demand refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub ok: bool,
    pub world: String,
    pub stored: usize,
    pub checksum: String,
}

impl From<crate::services::RefreshSummary> for RefreshResponse {
    fn from(summary: crate::services::RefreshSummary) -> Self {
        Self {
            ok: true,
            world: summary.world,
            stored: summary.stored,
            checksum: summary.checksum,
        }
    }
}

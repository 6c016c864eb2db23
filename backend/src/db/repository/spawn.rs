//! Spawn-chance repository trait.

use async_trait::async_trait;

use super::error::RepositoryResult;
use crate::api::Observation;

/// Row bound applied to [`SpawnRepository::get_recent`] when the caller passes
/// a non-positive limit.
pub const DEFAULT_RECENT_LIMIT: i64 = 25;

/// Resolve a caller-supplied limit to the bound actually applied.
pub fn effective_limit(limit: i64) -> usize {
    if limit <= 0 {
        DEFAULT_RECENT_LIMIT as usize
    } else {
        limit as usize
    }
}

/// Repository trait for spawn observations.
///
/// Readers may run while an upsert is in flight; they observe either the
/// pre- or post-upsert value of a row, never a partially written one. The last
/// committed write for a key wins.
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait SpawnRepository: Send + Sync {
    /// Check if the store is reachable.
    ///
    /// # Returns
    /// - `Ok(true)` if healthy
    /// - `Ok(false)` if unhealthy but no error occurred
    /// - `Err(RepositoryError)` if the check itself failed
    async fn health_check(&self) -> RepositoryResult<bool>;

    /// Replace the stored row for every `(world, observation.name)` pair.
    ///
    /// The batch is all-or-nothing. An empty batch is a no-op; an empty
    /// `world` is rejected with a validation error.
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of rows written
    async fn upsert_observations(
        &self,
        world: &str,
        observations: &[Observation],
    ) -> RepositoryResult<usize>;

    /// All observations stored for `world`, ordered by name ascending.
    async fn get_observations(&self, world: &str) -> RepositoryResult<Vec<Observation>>;

    /// Distinct worlds with at least one stored observation, ascending.
    async fn list_worlds(&self) -> RepositoryResult<Vec<String>>;

    /// Observations for one boss ordered by `updated_at` descending.
    ///
    /// `limit <= 0` means [`DEFAULT_RECENT_LIMIT`]. Because the store keeps a
    /// single row per `(world, name)`, at most one entry is returned.
    async fn get_recent(
        &self,
        world: &str,
        name: &str,
        limit: i64,
    ) -> RepositoryResult<Vec<Observation>>;
}

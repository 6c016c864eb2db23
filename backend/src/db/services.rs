//! High-level store operations.
//!
//! Thin, backend-agnostic functions over [`SpawnRepository`] that validate
//! their arguments before any store access. Handlers and services should call
//! these instead of the trait methods directly.

use log::debug;

use super::repository::SpawnRepository;
use crate::api::Observation;
use crate::error::{require_world, NemesisError, NemesisResult};

// ==================== Health ====================

/// Check if the store is reachable.
pub async fn health_check(repo: &dyn SpawnRepository) -> NemesisResult<bool> {
    Ok(repo.health_check().await?)
}

// ==================== Writes ====================

/// Replace the stored observation for every (world, name) pair in the batch.
///
/// Empty batches are a no-op. Returns the number of rows written.
pub async fn store_observations(
    repo: &dyn SpawnRepository,
    world: &str,
    observations: &[Observation],
) -> NemesisResult<usize> {
    let world = require_world(world)?;
    if observations.is_empty() {
        debug!("store: {} - empty batch, nothing to write", world);
        return Ok(0);
    }
    Ok(repo.upsert_observations(world, observations).await?)
}

// ==================== Reads ====================

/// Distinct worlds with at least one stored observation, ascending.
pub async fn list_worlds(repo: &dyn SpawnRepository) -> NemesisResult<Vec<String>> {
    Ok(repo.list_worlds().await?)
}

/// Current observations for a world, ordered by name.
pub async fn get_observations(
    repo: &dyn SpawnRepository,
    world: &str,
) -> NemesisResult<Vec<Observation>> {
    let world = require_world(world)?;
    Ok(repo.get_observations(world).await?)
}

/// Most recent observations for one boss, newest first.
///
/// A non-positive `limit` means the default of 25.
pub async fn get_recent(
    repo: &dyn SpawnRepository,
    world: &str,
    name: &str,
    limit: i64,
) -> NemesisResult<Vec<Observation>> {
    let world = require_world(world)?;
    if name.trim().is_empty() {
        return Err(NemesisError::InvalidArgument("name".to_string()));
    }
    Ok(repo.get_recent(world, name, limit).await?)
}

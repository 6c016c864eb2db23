//! In-memory local repository implementation.
//!
//! Suitable for unit testing and local development. Rows live in a `BTreeMap`
//! keyed by `(world, name)`, which gives the name/world ordering the
//! repository contract asks for without extra sorting.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use crate::api::Observation;
use crate::db::repository::spawn::effective_limit;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, SpawnRepository};

/// In-memory local repository.
///
/// # Example
/// ```
/// use nemesis_api::db::repositories::LocalRepository;
///
/// let repo = LocalRepository::new();
/// assert_eq!(repo.row_count(), 0);
/// ```
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    rows: BTreeMap<(String, String), Observation>,
    // Connection health
    is_healthy: bool,
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData {
                rows: BTreeMap::new(),
                is_healthy: true,
            })),
        }
    }

    /// Set the health status for testing store outages.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Number of rows across all worlds.
    pub fn row_count(&self) -> usize {
        self.data.read().rows.len()
    }

    fn check_health(data: &LocalData, operation: &str) -> RepositoryResult<()> {
        if !data.is_healthy {
            return Err(RepositoryError::connection_with_context(
                "Store is not healthy",
                ErrorContext::new(operation),
            ));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpawnRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Self::check_health(&self.data.read(), "health_check")?;
        Ok(true)
    }

    async fn upsert_observations(
        &self,
        world: &str,
        observations: &[Observation],
    ) -> RepositoryResult<usize> {
        if world.is_empty() {
            return Err(RepositoryError::validation_with_context(
                "world required",
                ErrorContext::new("upsert_observations"),
            ));
        }
        if observations.is_empty() {
            return Ok(0);
        }

        // Validate the whole batch before touching any row
        if let Some(bad) = observations.iter().find(|o| o.name.trim().is_empty()) {
            return Err(RepositoryError::validation_with_context(
                "boss name required",
                ErrorContext::new("upsert_observations")
                    .with_world(world)
                    .with_details(format!("updated_at={}", bad.updated_at)),
            ));
        }

        let mut data = self.data.write();
        Self::check_health(&data, "upsert_observations")?;

        for obs in observations {
            let mut row = obs.clone();
            row.world = world.to_string();
            data.rows.insert((world.to_string(), obs.name.clone()), row);
        }

        Ok(observations.len())
    }

    async fn get_observations(&self, world: &str) -> RepositoryResult<Vec<Observation>> {
        let data = self.data.read();
        Self::check_health(&data, "get_observations")?;

        Ok(data
            .rows
            .iter()
            .filter(|((w, _), _)| w == world)
            .map(|(_, obs)| obs.clone())
            .collect())
    }

    async fn list_worlds(&self) -> RepositoryResult<Vec<String>> {
        let data = self.data.read();
        Self::check_health(&data, "list_worlds")?;

        let worlds: BTreeSet<&String> = data.rows.keys().map(|(w, _)| w).collect();
        Ok(worlds.into_iter().cloned().collect())
    }

    async fn get_recent(
        &self,
        world: &str,
        name: &str,
        limit: i64,
    ) -> RepositoryResult<Vec<Observation>> {
        let data = self.data.read();
        Self::check_health(&data, "get_recent")?;

        let mut rows: Vec<Observation> = data
            .rows
            .get(&(world.to_string(), name.to_string()))
            .cloned()
            .into_iter()
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows.truncate(effective_limit(limit));
        Ok(rows)
    }
}

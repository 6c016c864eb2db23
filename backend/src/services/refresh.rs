//! Refresh orchestrator: fetch → parse → normalize → persist for one world.

use chrono::{DateTime, Utc};
use log::info;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

use crate::api::Observation;
use crate::db::repository::SpawnRepository;
use crate::db::services;
use crate::error::{require_world, NemesisResult};
use crate::scraper::SpawnSource;

/// Outcome of one successful world refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    pub world: String,
    /// Number of observations written.
    pub stored: usize,
    /// SHA-256 of the fetched markup.
    pub checksum: String,
}

/// Drives refresh cycles against a store and a spawn source.
///
/// Cheap to share: both collaborators sit behind `Arc`, so the scheduler task
/// and the HTTP handlers hold the same orchestrator.
pub struct RefreshOrchestrator {
    repository: Arc<dyn SpawnRepository>,
    source: Arc<dyn SpawnSource>,
}

impl RefreshOrchestrator {
    pub fn new(repository: Arc<dyn SpawnRepository>, source: Arc<dyn SpawnSource>) -> Self {
        Self { repository, source }
    }

    pub fn repository(&self) -> &Arc<dyn SpawnRepository> {
        &self.repository
    }

    /// Refresh one world.
    ///
    /// Fetch and store errors are returned as-is; nothing is retried here.
    pub async fn refresh_world(&self, world: &str) -> NemesisResult<RefreshSummary> {
        let world = require_world(world)?;
        let page = self.source.fetch(world).await?;

        let now = Utc::now();
        let observations: Vec<Observation> = dedupe_by_name(page.observations)
            .into_iter()
            .map(|obs| normalize(world, obs, now))
            .collect();

        let stored = services::store_observations(self.repository.as_ref(), world, &observations)
            .await?;
        info!(
            "refresh: {} - stored {} bosses (checksum {})",
            world, stored, page.checksum
        );

        Ok(RefreshSummary {
            world: world.to_string(),
            stored,
            checksum: page.checksum,
        })
    }
}

/// Drop repeated boss names from one page, keeping the last row for each.
///
/// A batch upsert must not touch the same `(world, name)` key twice.
fn dedupe_by_name(observations: Vec<Observation>) -> Vec<Observation> {
    let mut seen = HashSet::with_capacity(observations.len());
    let mut kept: Vec<Observation> = observations
        .into_iter()
        .rev()
        .filter(|obs| seen.insert(obs.name.clone()))
        .collect();
    kept.reverse();
    kept
}

/// Prepare a parsed observation for commit.
///
/// Percent is clamped to `0..=100`, negative day counts become unknown, and
/// the world and timestamp are overwritten with the commit values.
pub fn normalize(world: &str, mut obs: Observation, now: DateTime<Utc>) -> Observation {
    obs.world = world.to_string();
    obs.percent = obs.percent.map(|p| p.clamp(0, 100));
    obs.days_since_kill = obs.days_since_kill.filter(|d| *d >= 0);
    obs.updated_at = now;
    obs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repositories::LocalRepository;
    use crate::error::NemesisError;
    use crate::scraper::{ScrapeError, ScrapedPage};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedSource {
        observations: Vec<Observation>,
        calls: AtomicUsize,
    }

    impl FixedSource {
        fn new(observations: Vec<Observation>) -> Self {
            Self {
                observations,
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SpawnSource for FixedSource {
        async fn fetch(&self, _world: &str) -> Result<ScrapedPage, ScrapeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(ScrapedPage {
                observations: self.observations.clone(),
                checksum: "abc123".to_string(),
            })
        }
    }

    struct DownSource;

    #[async_trait]
    impl SpawnSource for DownSource {
        async fn fetch(&self, world: &str) -> Result<ScrapedPage, ScrapeError> {
            Err(ScrapeError::Status {
                status: 503,
                url: format!("https://example.test/{}", world),
            })
        }
    }

    fn parsed(name: &str) -> Observation {
        Observation::new("Antica", name, Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_normalize_clamps_percent() {
        let now = Utc::now();
        for (raw, expected) in [(-5, 0), (0, 0), (45, 45), (100, 100), (250, 100)] {
            let obs = normalize("Antica", parsed("Yeti").with_percent(raw), now);
            assert_eq!(obs.percent, Some(expected));
        }
        assert_eq!(normalize("Antica", parsed("Yeti"), now).percent, None);
    }

    #[test]
    fn test_normalize_stamps_and_drops_negative_days() {
        let now = Utc::now();
        let obs = normalize("Secura", parsed("Yeti").with_days_since_kill(-3), now);
        assert_eq!(obs.days_since_kill, None);
        assert_eq!(obs.updated_at, now);
        assert_eq!(obs.world, "Secura");
    }

    #[tokio::test]
    async fn test_refresh_world_persists_normalized_rows() {
        let repo = Arc::new(LocalRepository::new());
        let source = Arc::new(FixedSource::new(vec![
            parsed("Ferumbras").with_percent(140).with_days_since_kill(10),
            parsed("Yeti").no_chance(),
        ]));
        let orchestrator = RefreshOrchestrator::new(repo.clone(), source);

        let before = Utc::now();
        let summary = orchestrator.refresh_world("Antica").await.unwrap();
        assert_eq!(summary.stored, 2);
        assert_eq!(summary.checksum, "abc123");

        let rows = repo.get_observations("Antica").await.unwrap();
        assert_eq!(rows[0].percent, Some(100));
        assert!(rows.iter().all(|o| o.updated_at >= before));
    }

    #[tokio::test]
    async fn test_refresh_twice_is_idempotent_except_timestamp() {
        let repo = Arc::new(LocalRepository::new());
        let source = Arc::new(FixedSource::new(vec![
            parsed("Ferumbras").with_percent(45).with_days_since_kill(10),
            parsed("Zushuka").with_days_since_kill(2),
        ]));
        let orchestrator = RefreshOrchestrator::new(repo.clone(), source.clone());

        orchestrator.refresh_world("Antica").await.unwrap();
        let first = repo.get_observations("Antica").await.unwrap();
        orchestrator.refresh_world("Antica").await.unwrap();
        let second = repo.get_observations("Antica").await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(repo.row_count(), 2);
        let strip = |rows: Vec<Observation>| -> Vec<_> {
            rows.into_iter()
                .map(|o| (o.world, o.name, o.percent, o.days_since_kill, o.is_no_chance))
                .collect()
        };
        assert_eq!(strip(first), strip(second));
    }

    #[test]
    fn test_dedupe_keeps_last_row_per_name() {
        let rows = vec![
            parsed("Yeti").with_percent(3),
            parsed("Ferumbras").with_days_since_kill(4),
            parsed("Yeti").with_percent(9),
            parsed("yeti").with_percent(1),
        ];
        let kept = dedupe_by_name(rows);
        let summary: Vec<_> = kept.iter().map(|o| (o.name.as_str(), o.percent)).collect();
        assert_eq!(
            summary,
            vec![("Ferumbras", None), ("Yeti", Some(9)), ("yeti", Some(1))]
        );
    }

    #[tokio::test]
    async fn test_refresh_with_repeated_boss_stores_one_row() {
        let repo = Arc::new(LocalRepository::new());
        let source = Arc::new(FixedSource::new(vec![
            parsed("Yeti").with_percent(3),
            parsed("Ferumbras").with_percent(20),
            parsed("Yeti").with_percent(9),
        ]));
        let orchestrator = RefreshOrchestrator::new(repo.clone(), source);

        let summary = orchestrator.refresh_world("Antica").await.unwrap();
        assert_eq!(summary.stored, 2);
        assert_eq!(repo.row_count(), 2);

        let rows = repo.get_observations("Antica").await.unwrap();
        let yeti = rows.iter().find(|o| o.name == "Yeti").unwrap();
        assert_eq!(yeti.percent, Some(9));
    }

    #[tokio::test]
    async fn test_empty_world_fails_before_fetch() {
        let source = Arc::new(FixedSource::new(vec![parsed("Yeti").with_percent(1)]));
        let orchestrator =
            RefreshOrchestrator::new(Arc::new(LocalRepository::new()), source.clone());

        let err = orchestrator.refresh_world("").await.unwrap_err();
        assert!(matches!(err, NemesisError::InvalidArgument(_)));
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fetch_failure_is_surfaced_unmodified() {
        let repo = Arc::new(LocalRepository::new());
        let orchestrator = RefreshOrchestrator::new(repo.clone(), Arc::new(DownSource));

        let err = orchestrator.refresh_world("Antica").await.unwrap_err();
        assert!(matches!(
            err,
            NemesisError::UpstreamFetch(ScrapeError::Status { status: 503, .. })
        ));
        assert_eq!(repo.row_count(), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_surfaced() {
        let repo = Arc::new(LocalRepository::new());
        repo.set_healthy(false);
        let source = Arc::new(FixedSource::new(vec![parsed("Yeti").with_percent(1)]));
        let orchestrator = RefreshOrchestrator::new(repo.clone(), source);

        let err = orchestrator.refresh_world("Antica").await.unwrap_err();
        assert!(matches!(err, NemesisError::Persistence(_)));
    }
}

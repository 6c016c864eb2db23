//! Eligibility engine: joins stored observations with the catalogue and
//! decides which bosses are realistic targets.

use chrono::{DateTime, Utc};
use log::debug;
use std::collections::HashMap;

use crate::api::{boss_key, BossView, BossesResponse, InclusionRange, Observation};
use crate::catalogue::Catalogue;
use crate::db::repository::SpawnRepository;
use crate::db::services;
use crate::error::NemesisResult;

/// Spawnability of a scraped boss under its optional inclusion range.
///
/// Without a range only an explicit positive percent counts. With a range:
/// unknown days are spawnable, days below `min_days` are not, days at or past
/// `max_days` are spawnable even when marked "No Chance", and inside the band
/// the boss needs a positive percent and no "No Chance" marker.
pub fn is_spawnable(obs: &Observation, range: Option<InclusionRange>) -> bool {
    let Some(range) = range else {
        return obs.has_positive_percent();
    };
    let Some(days) = obs.days_since_kill else {
        return true;
    };

    if days < range.min_days {
        false
    } else if days >= range.max_days {
        true
    } else {
        obs.has_positive_percent() && !obs.is_no_chance
    }
}

/// Build the response for `world` from a store snapshot.
///
/// Catalogue bosses with no stored row appear as spawnable placeholders.
/// Output is sorted by display name.
pub fn compute_view(
    world: &str,
    observations: Vec<Observation>,
    catalogue: &Catalogue,
    now: DateTime<Utc>,
) -> BossesResponse {
    let mut by_key: HashMap<String, Observation> = HashMap::with_capacity(observations.len());
    for obs in observations {
        let key = boss_key(&obs.name);
        let keep_existing = by_key
            .get(&key)
            .is_some_and(|existing| !supersedes(&obs, existing));
        if !keep_existing {
            by_key.insert(key, obs);
        }
    }

    let updated_at = by_key.values().map(|o| o.updated_at).max().unwrap_or(now);

    let mut bosses: Vec<BossView> = by_key
        .values()
        .map(|obs| {
            let entry = catalogue.get(&obs.name);
            BossView {
                name: entry.map_or_else(|| obs.name.clone(), |e| e.name.clone()),
                percent: obs.percent,
                days_since_kill: obs.days_since_kill,
                spawnable: is_spawnable(obs, entry.and_then(|e| e.inclusion_range)),
            }
        })
        .collect();

    let placeholders: Vec<BossView> = catalogue
        .entries()
        .filter(|entry| !by_key.contains_key(&boss_key(&entry.name)))
        .map(|entry| BossView {
            name: entry.name.clone(),
            percent: None,
            days_since_kill: None,
            spawnable: true,
        })
        .collect();
    debug!(
        "eligibility: {} - {} observed, {} placeholders",
        world,
        bosses.len(),
        placeholders.len()
    );
    bosses.extend(placeholders);
    bosses.sort_by(|a, b| a.name.cmp(&b.name));

    BossesResponse {
        world: world.to_string(),
        updated_at,
        bosses,
    }
}

// Rows differing only in name casing: newest wins, then the smaller stored name.
fn supersedes(candidate: &Observation, existing: &Observation) -> bool {
    candidate
        .updated_at
        .cmp(&existing.updated_at)
        .then_with(|| existing.name.cmp(&candidate.name))
        .is_gt()
}

/// All bosses for a world with their current spawnability.
pub async fn bosses_for_world(
    repo: &dyn SpawnRepository,
    catalogue: &Catalogue,
    world: &str,
) -> NemesisResult<BossesResponse> {
    let observations = services::get_observations(repo, world).await?;
    Ok(compute_view(world, observations, catalogue, Utc::now()))
}

/// Only the bosses currently considered spawnable.
pub async fn spawnables(
    repo: &dyn SpawnRepository,
    catalogue: &Catalogue,
    world: &str,
) -> NemesisResult<BossesResponse> {
    Ok(bosses_for_world(repo, catalogue, world).await?.into_spawnable())
}

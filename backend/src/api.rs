//! Public API surface for the spawn tracker.
//!
//! This file consolidates the data model shared by the scraper, the store,
//! the eligibility engine and the HTTP layer. All types derive
//! Serialize/Deserialize for JSON serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Case-insensitive lookup key for a boss name.
///
/// Stored records keep the casing they were scraped with; this key is only
/// used to reconcile them against the catalogue at read time.
pub fn boss_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Latest spawn observation for one boss on one world.
///
/// At most one observation exists per `(world, name)` in the store; every
/// refresh overwrites the previous value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub world: String,
    pub name: String,
    /// Spawn chance in percent, `None` when the page showed no percentage.
    pub percent: Option<i32>,
    /// Days since the last recorded kill, `None` when unknown.
    pub days_since_kill: Option<i32>,
    /// The source explicitly marked the boss as "No Chance".
    #[serde(default)]
    pub is_no_chance: bool,
    pub updated_at: DateTime<Utc>,
}

impl Observation {
    /// Create an observation with no signals, stamped `updated_at`.
    pub fn new(world: impl Into<String>, name: impl Into<String>, updated_at: DateTime<Utc>) -> Self {
        Self {
            world: world.into(),
            name: name.into(),
            percent: None,
            days_since_kill: None,
            is_no_chance: false,
            updated_at,
        }
    }

    pub fn with_percent(mut self, percent: i32) -> Self {
        self.percent = Some(percent);
        self
    }

    pub fn with_days_since_kill(mut self, days: i32) -> Self {
        self.days_since_kill = Some(days);
        self
    }

    pub fn no_chance(mut self) -> Self {
        self.is_no_chance = true;
        self
    }

    /// Whether the observation carries at least one usable signal.
    pub fn has_signal(&self) -> bool {
        self.percent.is_some() || self.days_since_kill.is_some() || self.is_no_chance
    }

    /// Whether the boss carries an explicit positive spawn chance.
    pub fn has_positive_percent(&self) -> bool {
        self.percent.is_some_and(|p| p > 0)
    }
}

/// Day window `[min_days, max_days)` gating when a boss is a believable target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InclusionRange {
    pub min_days: i32,
    pub max_days: i32,
}

impl InclusionRange {
    pub fn new(min_days: i32, max_days: i32) -> Self {
        Self { min_days, max_days }
    }
}

/// Static catalogue metadata for one boss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogueEntry {
    /// Canonical display name.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inclusion_range: Option<InclusionRange>,
}

impl CatalogueEntry {
    pub fn new(name: impl Into<String>, inclusion_range: Option<InclusionRange>) -> Self {
        Self {
            name: name.into(),
            inclusion_range,
        }
    }
}

/// Per-request view of one boss with its derived spawnability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossView {
    pub name: String,
    pub percent: Option<i32>,
    pub days_since_kill: Option<i32>,
    pub spawnable: bool,
}

/// All bosses for one world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BossesResponse {
    pub world: String,
    /// Latest `updated_at` across the stored observations.
    pub updated_at: DateTime<Utc>,
    pub bosses: Vec<BossView>,
}

impl BossesResponse {
    /// Keep only the bosses currently considered spawnable.
    pub fn into_spawnable(mut self) -> Self {
        self.bosses.retain(|b| b.spawnable);
        self
    }
}

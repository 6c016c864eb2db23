use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::spawn_chances;
use crate::api::Observation;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = spawn_chances)]
#[diesel(check_for_backend(diesel::pg::Pg))]
#[allow(dead_code)] // id is only used by the database
pub struct SpawnChanceRow {
    pub id: i64,
    pub world: String,
    pub name: String,
    pub percent: Option<i32>,
    pub days_since_kill: Option<i32>,
    pub is_no_chance: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<SpawnChanceRow> for Observation {
    fn from(row: SpawnChanceRow) -> Self {
        Observation {
            world: row.world,
            name: row.name,
            percent: row.percent,
            days_since_kill: row.days_since_kill,
            is_no_chance: row.is_no_chance,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = spawn_chances)]
pub struct NewSpawnChanceRow {
    pub world: String,
    pub name: String,
    pub percent: Option<i32>,
    pub days_since_kill: Option<i32>,
    pub is_no_chance: bool,
    pub updated_at: DateTime<Utc>,
}

impl NewSpawnChanceRow {
    pub fn from_observation(world: &str, obs: &Observation) -> Self {
        Self {
            world: world.to_string(),
            name: obs.name.clone(),
            percent: obs.percent,
            days_since_kill: obs.days_since_kill,
            is_no_chance: obs.is_no_chance,
            updated_at: obs.updated_at,
        }
    }
}

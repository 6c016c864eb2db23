//! Postgres repository implementation using Diesel.
//!
//! Stores one row per `(world, name)` in `spawn_chances`; upserts rely on the
//! table's unique constraint and run inside a single transaction per batch.
//!
//! ## Configuration
//!
//! Built from the `[postgres]` section of `AppConfig`
//! (see `PostgresSettings::to_postgres_config`), where the `DATABASE_URL` and
//! `PG_*` environment overrides are applied.

use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::sql_query;
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::time::Duration;
use tokio::task;

use crate::api::Observation;
use crate::db::repository::spawn::effective_limit;
use crate::db::repository::{ErrorContext, RepositoryError, RepositoryResult, SpawnRepository};

mod models;
mod schema;

use models::{NewSpawnChanceRow, SpawnChanceRow};
use schema::spawn_chances;

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub database_url: String,
    pub max_pool_size: u32,
    pub min_pool_size: u32,
    pub connection_timeout_sec: u64,
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

/// Diesel-backed spawn repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get()?;
            conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
                RepositoryError::internal_with_context(
                    format!("Migration failed: {}", e),
                    ErrorContext::new("run_migrations"),
                )
            })?;
        }

        Ok(Self { pool, config })
    }

    /// Run `f` on a pooled connection off the async runtime, retrying
    /// transient failures with exponential backoff.
    async fn with_conn<T, F>(&self, operation: &'static str, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;

        task::spawn_blocking(move || {
            let mut retry_delay = Duration::from_millis(retry_delay_ms);
            let mut attempt = 0;

            loop {
                let result = pool
                    .get()
                    .map_err(RepositoryError::from)
                    .and_then(|mut conn| f.clone()(&mut conn));

                match result {
                    Ok(value) => return Ok(value),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        attempt += 1;
                        log::warn!("{}: retrying after {} (attempt {})", operation, e, attempt);
                        std::thread::sleep(retry_delay);
                        retry_delay *= 2;
                    }
                    Err(e) => return Err(e.with_operation(operation)),
                }
            }
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }
}

#[async_trait]
impl SpawnRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn("health_check", |conn| {
            sql_query("SELECT 1").execute(conn)?;
            Ok(true)
        })
        .await
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

        let rows: Vec<NewSpawnChanceRow> = observations
            .iter()
            .map(|o| NewSpawnChanceRow::from_observation(world, o))
            .collect();

        self.with_conn("upsert_observations", move |conn| {
            conn.transaction::<_, RepositoryError, _>(|tx| {
                let written = diesel::insert_into(spawn_chances::table)
                    .values(&rows)
                    .on_conflict((spawn_chances::world, spawn_chances::name))
                    .do_update()
                    .set((
                        spawn_chances::percent.eq(excluded(spawn_chances::percent)),
                        spawn_chances::days_since_kill
                            .eq(excluded(spawn_chances::days_since_kill)),
                        spawn_chances::is_no_chance.eq(excluded(spawn_chances::is_no_chance)),
                        spawn_chances::updated_at.eq(excluded(spawn_chances::updated_at)),
                    ))
                    .execute(tx)?;
                Ok(written)
            })
        })
        .await
    }

    async fn get_observations(&self, world: &str) -> RepositoryResult<Vec<Observation>> {
        let world = world.to_string();
        self.with_conn("get_observations", move |conn| {
            let rows = spawn_chances::table
                .filter(spawn_chances::world.eq(&world))
                .order(spawn_chances::name.asc())
                .select(SpawnChanceRow::as_select())
                .load::<SpawnChanceRow>(conn)?;
            Ok(rows.into_iter().map(Observation::from).collect())
        })
        .await
    }

    async fn list_worlds(&self) -> RepositoryResult<Vec<String>> {
        self.with_conn("list_worlds", |conn| {
            let worlds = spawn_chances::table
                .select(spawn_chances::world)
                .distinct()
                .order(spawn_chances::world.asc())
                .load::<String>(conn)?;
            Ok(worlds)
        })
        .await
    }

    async fn get_recent(
        &self,
        world: &str,
        name: &str,
        limit: i64,
    ) -> RepositoryResult<Vec<Observation>> {
        let world = world.to_string();
        let name = name.to_string();
        let limit = effective_limit(limit) as i64;
        self.with_conn("get_recent", move |conn| {
            let rows = spawn_chances::table
                .filter(spawn_chances::world.eq(&world))
                .filter(spawn_chances::name.eq(&name))
                .order(spawn_chances::updated_at.desc())
                .limit(limit)
                .select(SpawnChanceRow::as_select())
                .load::<SpawnChanceRow>(conn)?;
            Ok(rows.into_iter().map(Observation::from).collect())
        })
        .await
    }
}

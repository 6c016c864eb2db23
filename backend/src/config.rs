//! Application configuration.
//!
//! Settings are resolved in three layers: built-in defaults, an optional TOML
//! file, then environment variable overrides.
//!
//! ```toml
//! [server]
//! port = 8080
//!
//! [schedule]
//! refresh_at = "9:30"
//! timezone = "Europe/Berlin"
//!
//! [catalogue]
//! path = "bosses_metadata.yaml"
//!
//! [repository]
//! type = "local"
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::factory::RepositoryType;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "nemesis.toml";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub schedule: ScheduleSettings,
    pub source: SourceSettings,
    pub catalogue: CatalogueSettings,
    pub repository: RepositorySettings,
    pub postgres: PostgresSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Wall-clock time of the daily refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleSettings {
    /// `HH:MM`, 24h clock
    pub refresh_at: String,
    /// IANA time zone name, e.g. `Europe/Berlin`
    pub timezone: String,
}

impl Default for ScheduleSettings {
    fn default() -> Self {
        Self {
            refresh_at: "9:30".to_string(),
            timezone: "CET".to_string(),
        }
    }
}

/// Remote statistics page the scraper reads from.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceSettings {
    /// The lower-cased world name is appended as the last path segment.
    pub base_url: String,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for SourceSettings {
    fn default() -> Self {
        Self {
            base_url: "https://www.tibia-statistic.com/bosshunter/details".to_string(),
            timeout_secs: 15,
            user_agent: "NemesisAPI/1.0".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogueSettings {
    pub path: PathBuf,
}

impl Default for CatalogueSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::from("bosses_metadata.yaml"),
        }
    }
}

/// Repository type settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositorySettings {
    #[serde(rename = "type")]
    pub repo_type: String,
}

impl Default for RepositorySettings {
    fn default() -> Self {
        Self {
            repo_type: "local".to_string(),
        }
    }
}

impl RepositorySettings {
    pub fn repository_type(&self) -> Result<RepositoryType, String> {
        self.repo_type.parse()
    }
}

/// Postgres connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PostgresSettings {
    pub database_url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout: u64,
    pub idle_timeout: u64,
    pub max_retries: u32,
    pub retry_delay_ms: u64,
}

impl Default for PostgresSettings {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_connections: 10,
            min_connections: 1,
            connect_timeout: 30,
            idle_timeout: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

#[cfg(feature = "postgres-repo")]
impl PostgresSettings {
    pub fn to_postgres_config(&self) -> Option<crate::db::PostgresConfig> {
        if self.database_url.is_empty() {
            return None;
        }
        Some(crate::db::PostgresConfig {
            database_url: self.database_url.clone(),
            max_pool_size: self.max_connections,
            min_pool_size: self.min_connections,
            connection_timeout_sec: self.connect_timeout,
            idle_timeout_sec: self.idle_timeout,
            max_retries: self.max_retries,
            retry_delay_ms: self.retry_delay_ms,
        })
    }
}

impl AppConfig {
    /// Load configuration from a TOML file, without environment overrides.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolve the full configuration for the running process.
    ///
    /// Uses `NEMESIS_CONFIG` when set, else [`DEFAULT_CONFIG_FILE`] when it
    /// exists, else built-in defaults; environment variables are applied last.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("NEMESIS_CONFIG") {
            Ok(path) => Self::from_file(path)?,
            Err(_) if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(DEFAULT_CONFIG_FILE)?
            }
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a variable lookup (the process environment in
    /// production). Empty values and unparsable numbers are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT").and_then(|v| v.parse().ok()) {
            self.server.port = port;
        }
        if let Some(at) = get("REFRESH_AT") {
            self.schedule.refresh_at = at;
        }
        if let Some(tz) = get("TZ") {
            self.schedule.timezone = tz;
        }
        if let Some(url) = get("SOURCE_BASE_URL") {
            self.source.base_url = url;
        }
        if let Some(secs) = get("FETCH_TIMEOUT_SECS").and_then(|v| v.parse().ok()) {
            self.source.timeout_secs = secs;
        }
        if let Some(path) = get("CATALOGUE_PATH") {
            self.catalogue.path = PathBuf::from(path);
        }
        if let Some(repo_type) = get("REPOSITORY_TYPE") {
            self.repository.repo_type = repo_type;
        }
        if let Some(url) = get("DATABASE_URL").or_else(|| get("PG_DATABASE_URL")) {
            self.postgres.database_url = url;
        }

        let pg = &mut self.postgres;
        if let Some(v) = get("PG_POOL_MAX").and_then(|v| v.parse().ok()) {
            pg.max_connections = v;
        }
        if let Some(v) = get("PG_POOL_MIN").and_then(|v| v.parse().ok()) {
            pg.min_connections = v;
        }
        if let Some(v) = get("PG_MAX_RETRIES").and_then(|v| v.parse().ok()) {
            pg.max_retries = v;
        }
        if let Some(v) = get("PG_CONN_TIMEOUT_SEC").and_then(|v| v.parse().ok()) {
            pg.connect_timeout = v;
        }
        if let Some(v) = get("PG_IDLE_TIMEOUT_SEC").and_then(|v| v.parse().ok()) {
            pg.idle_timeout = v;
        }
        if let Some(v) = get("PG_RETRY_DELAY_MS").and_then(|v| v.parse().ok()) {
            pg.retry_delay_ms = v;
        }
    }
}

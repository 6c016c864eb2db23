//! State store for spawn-chance observations.
//!
//! Storage goes through the Repository pattern so backends can be swapped
//! without touching the refresh or read paths.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Refresh orchestrator / HTTP handlers                   │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - argument validation      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  SpawnRepository trait (repository/)                    │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                │
//! ┌───▼──────────────────┐  ┌──────────▼──────────────┐
//! │ Postgres Repository  │  │ Local Repository        │
//! │ (diesel, optional)   │  │ (in-memory, default)    │
//! └──────────────────────┘  └─────────────────────────┘
//! ```
//!
//! The store keeps exactly one row per (world, name); each refresh
//! overwrites it.

#[cfg(not(any(feature = "postgres-repo", feature = "local-repo")))]
compile_error!("Enable at least one repository backend feature.");

pub mod factory;
pub mod repositories;
pub mod repository;
pub mod services;

pub use factory::{RepositoryFactory, RepositoryType};
pub use repositories::LocalRepository;
#[cfg(feature = "postgres-repo")]
pub use repositories::{PostgresConfig, PostgresRepository};
pub use repository::{
    ErrorContext, RepositoryError, RepositoryResult, SpawnRepository, DEFAULT_RECENT_LIMIT,
};

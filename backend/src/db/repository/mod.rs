//! Repository trait definitions for the spawn-chance store.
//!
//! The store is a current-state table keyed by `(world, name)`: a refresh
//! overwrites the previous row for each boss and nothing is ever deleted.
//!
//! # Module Organization
//!
//! - [`error`]: Error types for repository operations
//! - [`spawn`]: The [`SpawnRepository`] contract

pub mod error;
pub mod spawn;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};
pub use spawn::{SpawnRepository, DEFAULT_RECENT_LIMIT};

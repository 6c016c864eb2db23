//! # Nemesis API
//!
//! Tracks, per game world, the current chance that each boss is available to
//! fight. A statistics page is scraped once a day (or on demand), its rows are
//! normalized into one observation per boss, and a catalogue of per-boss day
//! windows decides which bosses are worth hunting.
//!
//! ## Architecture
//!
//! - [`api`]: Data model shared across layers
//! - [`scraper`]: Remote page fetching and pattern-based row extraction
//! - [`catalogue`]: Static boss metadata and inclusion ranges
//! - [`services`]: Eligibility engine, refresh orchestrator, daily scheduler
//! - [`db`]: Repository pattern and store backends
//! - [`config`]: TOML + environment configuration
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod catalogue;
pub mod checksum;
pub mod config;
pub mod db;
pub mod error;
pub mod scraper;
pub mod services;

#[cfg(feature = "http-server")]
pub mod http;

pub use error::{NemesisError, NemesisResult};

//! Service layer for business logic and orchestration.
//!
//! Services sit between the store and the HTTP façade: the eligibility engine
//! builds per-request views, the refresh orchestrator drives the
//! fetch → parse → normalize → persist pipeline, and the scheduler triggers it
//! once a day.

pub mod eligibility;
pub mod refresh;
pub mod scheduler;

#[cfg(test)]
#[path = "eligibility_tests.rs"]
mod eligibility_tests;

pub use eligibility::{bosses_for_world, compute_view, is_spawnable, spawnables};
pub use refresh::{RefreshOrchestrator, RefreshSummary};
pub use scheduler::{run_cycle, run_daily, CycleReport, DailySchedule};

//! Daily refresh of every known world.
//!
//! One background task sleeps until the configured wall-clock time in the
//! configured zone, then refreshes worlds one after another. A failing world
//! is logged and skipped; the loop itself never exits.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use log::{error, info, warn};
use std::sync::Arc;

use super::refresh::RefreshOrchestrator;
use crate::config::ScheduleSettings;
use crate::db::services;
use crate::error::NemesisResult;

/// Slot used when `refresh_at` cannot be parsed.
pub const DEFAULT_REFRESH_AT: NaiveTime = match NaiveTime::from_hms_opt(9, 0, 0) {
    Some(time) => time,
    None => panic!("09:00 is a valid time of day"),
};

/// Wall-clock time of day in a fixed time zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailySchedule {
    at: NaiveTime,
    tz: Tz,
}

impl DailySchedule {
    pub fn new(at: NaiveTime, tz: Tz) -> Self {
        Self { at, tz }
    }

    /// Build from settings. An unparsable time falls back to 09:00 and an
    /// unknown zone to UTC, both with a warning.
    pub fn from_settings(settings: &ScheduleSettings) -> Self {
        let at = parse_time_of_day(&settings.refresh_at).unwrap_or_else(|| {
            warn!(
                "scheduler: invalid refresh_at {:?}, using 09:00",
                settings.refresh_at
            );
            DEFAULT_REFRESH_AT
        });
        let tz = settings.timezone.parse::<Tz>().unwrap_or_else(|_| {
            warn!(
                "scheduler: unknown timezone {:?}, using UTC",
                settings.timezone
            );
            Tz::UTC
        });
        Self { at, tz }
    }

    pub fn at(&self) -> NaiveTime {
        self.at
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }

    /// First instant strictly after `now` matching the schedule.
    ///
    /// If today's slot has passed the next day's is used. A slot that falls
    /// into a DST gap moves forward by one hour; an ambiguous slot takes the
    /// earlier instant.
    pub fn next_run_after(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = now.with_timezone(&self.tz).date_naive();
        today
            .iter_days()
            .take(3)
            .filter_map(|date| self.resolve(date))
            .find(|candidate| *candidate > now)
            .unwrap_or_else(|| now + Duration::days(1))
    }

    fn resolve(&self, date: NaiveDate) -> Option<DateTime<Utc>> {
        let local = date.and_time(self.at);
        self.tz
            .from_local_datetime(&local)
            .earliest()
            .or_else(|| self.tz.from_local_datetime(&(local + Duration::hours(1))).earliest())
            .map(|t| t.with_timezone(&Utc))
    }
}

/// Parse `H:MM` or `HH:MM`.
pub fn parse_time_of_day(value: &str) -> Option<NaiveTime> {
    let (hours, minutes) = value.trim().split_once(':')?;
    NaiveTime::from_hms_opt(hours.parse().ok()?, minutes.parse().ok()?, 0)
}

/// Worlds refreshed and failed in one scheduled cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub refreshed: Vec<String>,
    pub failed: Vec<String>,
}

/// Refresh every world known to the store, sequentially.
///
/// Fails only when the world list itself cannot be read.
pub async fn run_cycle(orchestrator: &RefreshOrchestrator) -> NemesisResult<CycleReport> {
    let worlds = services::list_worlds(orchestrator.repository().as_ref()).await?;
    let mut report = CycleReport::default();

    for world in worlds {
        match orchestrator.refresh_world(&world).await {
            Ok(_) => report.refreshed.push(world),
            Err(e) => {
                error!("scheduler: refresh failed for {}: {}", world, e);
                report.failed.push(world);
            }
        }
    }
    Ok(report)
}

/// Sleep until the next slot, run a cycle, repeat forever.
pub async fn run_daily(orchestrator: Arc<RefreshOrchestrator>, schedule: DailySchedule) {
    loop {
        let now = Utc::now();
        let next = schedule.next_run_after(now);
        info!(
            "scheduler: next refresh at {} ({})",
            next.with_timezone(&schedule.tz),
            schedule.tz
        );
        tokio::time::sleep((next - now).to_std().unwrap_or_default()).await;

        match run_cycle(&orchestrator).await {
            Ok(report) => info!(
                "scheduler: cycle done, {} refreshed, {} failed",
                report.refreshed.len(),
                report.failed.len()
            ),
            Err(e) => error!("scheduler: could not list worlds: {}", e),
        }
    }
}

//! Shared fixtures for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use nemesis_api::api::{CatalogueEntry, InclusionRange};
use nemesis_api::catalogue::Catalogue;
use nemesis_api::scraper::{MarkupFetcher, ScrapeError};

static ENV_LOCK: Mutex<()> = Mutex::new(());

/// Runs `f` with environment variables temporarily modified.
///
/// Restores the previous values on unwind and serializes access to the
/// process environment across parallel tests.
///
/// `changes` is a list of `(key, value)` pairs:
/// - `Some(v)` sets the variable to `v`
/// - `None` removes the variable
pub fn with_scoped_env<F, R>(changes: &[(&str, Option<&str>)], f: F) -> R
where
    F: FnOnce() -> R,
{
    let _lock = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    let _guard = ScopedEnv::new(changes);
    f()
}

struct ScopedEnv {
    snapshot: Vec<(String, Option<String>)>,
}

impl ScopedEnv {
    fn new(changes: &[(&str, Option<&str>)]) -> Self {
        let keys: HashSet<&str> = changes.iter().map(|(k, _)| *k).collect();
        let snapshot = keys
            .into_iter()
            .map(|k| (k.to_string(), std::env::var(k).ok()))
            .collect();

        for (k, v) in changes {
            match v {
                Some(val) => std::env::set_var(k, val),
                None => std::env::remove_var(k),
            }
        }

        Self { snapshot }
    }
}

impl Drop for ScopedEnv {
    fn drop(&mut self) {
        for (k, v) in self.snapshot.drain(..) {
            match v {
                Some(val) => std::env::set_var(&k, val),
                None => std::env::remove_var(&k),
            }
        }
    }
}

/// Serves canned markup per world; unknown worlds answer HTTP 503.
#[derive(Default)]
pub struct StaticFetcher {
    pages: parking_lot::Mutex<HashMap<String, Vec<u8>>>,
    calls: AtomicUsize,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(self, world: &str, markup: impl Into<Vec<u8>>) -> Self {
        self.set_page(world, markup);
        self
    }

    pub fn set_page(&self, world: &str, markup: impl Into<Vec<u8>>) {
        self.pages.lock().insert(world.to_string(), markup.into());
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarkupFetcher for StaticFetcher {
    async fn fetch_markup(&self, world: &str) -> Result<Vec<u8>, ScrapeError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.pages
            .lock()
            .get(world)
            .cloned()
            .ok_or_else(|| ScrapeError::Status {
                status: 503,
                url: format!("https://stats.test/{}", world.to_lowercase()),
            })
    }
}

/// One boss row in the shape the statistics page uses.
pub struct BossRow<'a> {
    pub name: &'a str,
    pub days: Option<u32>,
    pub percent: Option<i32>,
    pub no_chance: bool,
}

impl<'a> BossRow<'a> {
    pub fn new(name: &'a str) -> Self {
        Self {
            name,
            days: None,
            percent: None,
            no_chance: false,
        }
    }

    pub fn days(mut self, days: u32) -> Self {
        self.days = Some(days);
        self
    }

    pub fn percent(mut self, percent: i32) -> Self {
        self.percent = Some(percent);
        self
    }

    pub fn no_chance(mut self) -> Self {
        self.no_chance = true;
        self
    }

    fn render(&self) -> String {
        let id = self.name.to_lowercase().replace(' ', "-");
        let mut cells = format!(
            r#"<td class="boss"><img src="/img/{id}.gif"><a class="boss-name-link" href="/boss/{id}">{}</a></td>"#,
            self.name
        );
        if let Some(days) = self.days {
            cells.push_str(&format!(
                r#"<td><span class="days-text">{} days ago</span></td>"#,
                days
            ));
        }
        if let Some(percent) = self.percent {
            cells.push_str(&format!(
                r#"<td><span class="chance-percentage">({}%)</span></td>"#,
                percent
            ));
        }
        if self.no_chance {
            cells.push_str(r#"<td><span class="chance-text no-chance">No Chance</span></td>"#);
        }
        format!(r#"<tr class="boss-row" id="boss-{id}">{cells}</tr>"#)
    }
}

/// Full page wrapping the given rows.
pub fn page(rows: &[BossRow<'_>]) -> String {
    let body: String = rows.iter().map(BossRow::render).collect();
    format!(
        "<html><body><table><tr id=\"header\"><th>Boss</th></tr>{}</table></body></html>",
        body
    )
}

/// Catalogue with a windowed Ferumbras and an unwindowed Morgaroth.
pub fn catalogue() -> Catalogue {
    Catalogue::from_entries(vec![
        CatalogueEntry::new("Ferumbras", Some(InclusionRange::new(7, 14))),
        CatalogueEntry::new("Morgaroth", None),
    ])
}

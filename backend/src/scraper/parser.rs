//! Pattern-based extraction of boss rows from the statistics page.
//!
//! The page is treated as loosely structured text rather than a document
//! tree: each boss row is located by its `id="boss-…"` marker and every field
//! is pulled out independently, so a row missing one field still yields the
//! others.

use chrono::Utc;
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use super::ParseError;
use crate::api::Observation;

static ROW_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)<tr[^>]*id="boss-[^"]+"[^>]*>(.*?)</tr>"#).expect("valid regex"));
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?s)class="boss-name-link"[^>]*>\s*(.*?)\s*</a>"#).expect("valid regex"));
static DAYS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class\s*=\s*"days-text"[^>]*>\s*(\d{1,4})\s*days?(?:\s+ago)?"#).expect("valid regex")
});
static PERCENT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?s)class\s*=\s*"chance-percentage[^"]*"[^>]*>\s*\((\d{1,3})%\)"#).expect("valid regex")
});
static NO_CHANCE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?si)class\s*=\s*"chance-text[^"]*"[^>]*>\s*No\s+Chance"#).expect("valid regex")
});
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));
static WS_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Parse raw page bytes into observations for `world`.
///
/// Fails only when the bytes are not valid UTF-8 text; malformed rows are
/// dropped or degrade to partial observations.
pub fn parse(world: &str, raw: &[u8]) -> Result<Vec<Observation>, ParseError> {
    let text = std::str::from_utf8(raw).map_err(ParseError::NotText)?;
    Ok(parse_str(world, text))
}

/// Parse already-decoded markup into observations for `world`.
pub fn parse_str(world: &str, markup: &str) -> Vec<Observation> {
    let now = Utc::now();
    let mut result = Vec::new();

    for row in ROW_RE.captures_iter(markup).filter_map(|c| c.get(1)) {
        let row = row.as_str();

        let Some(name) = extract_name(row) else {
            debug!("scraper: {} - dropping row without a boss name", world);
            continue;
        };

        let mut obs = Observation::new(world, name, now);
        obs.days_since_kill = capture_number(&DAYS_RE, row);
        obs.percent = capture_number(&PERCENT_RE, row);
        obs.is_no_chance = NO_CHANCE_RE.is_match(row);

        if !obs.has_signal() {
            debug!("scraper: {} - {}: no usable signal, dropped", world, obs.name);
            continue;
        }

        debug!(
            "scraper: {} - {}: percent={:?} days={:?} no_chance={}",
            world, obs.name, obs.percent, obs.days_since_kill, obs.is_no_chance
        );
        result.push(obs);
    }

    info!("scraper: parsed {} bosses for {}", result.len(), world);
    result
}

fn extract_name(row: &str) -> Option<String> {
    let raw = NAME_RE.captures(row)?.get(1)?.as_str();
    let name = clean_text(raw);
    (!name.is_empty()).then_some(name)
}

fn capture_number(re: &Regex, row: &str) -> Option<i32> {
    re.captures(row)?.get(1)?.as_str().parse().ok()
}

/// Strip markup tags, collapse runs of whitespace and trim.
pub fn clean_text(text: &str) -> String {
    let stripped = TAG_RE.replace_all(text, "");
    WS_RE.replace_all(&stripped, " ").trim().to_string()
}

//! Fetching and parsing of the remote boss statistics page.
//!
//! Two seams are exposed:
//!
//! - [`MarkupFetcher`]: raw transport, "give me the page for this world"
//! - [`SpawnSource`]: fetch + parse, what the refresh orchestrator consumes
//!
//! [`Scraper`] composes any fetcher with the pattern-based [`parser`].

pub mod parser;

use async_trait::async_trait;
use log::warn;
use std::time::Duration;

use crate::api::Observation;
use crate::config::SourceSettings;

/// Raw markup could not be interpreted.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("markup is not valid UTF-8 text: {0}")]
    NotText(#[source] std::str::Utf8Error),
}

/// The remote source could not deliver a usable page.
#[derive(Debug, thiserror::Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },
    #[error(transparent)]
    Markup(#[from] ParseError),
}

/// Observations scraped for one world plus a digest of the page they came from.
#[derive(Debug, Clone)]
pub struct ScrapedPage {
    pub observations: Vec<Observation>,
    /// SHA-256 hex digest of the fetched markup.
    pub checksum: String,
}

/// Fetch + parse collaborator used by the refresh orchestrator.
#[async_trait]
pub trait SpawnSource: Send + Sync {
    async fn fetch(&self, world: &str) -> Result<ScrapedPage, ScrapeError>;
}

/// Transport returning the raw page body for a world.
#[async_trait]
pub trait MarkupFetcher: Send + Sync {
    async fn fetch_markup(&self, world: &str) -> Result<Vec<u8>, ScrapeError>;
}

/// HTTP transport backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(settings: &SourceSettings) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;
        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Page URL for a world; the site expects lower-case world names.
    pub fn url_for(&self, world: &str) -> String {
        format!("{}/{}", self.base_url, world.to_lowercase())
    }
}

#[async_trait]
impl MarkupFetcher for HttpFetcher {
    async fn fetch_markup(&self, world: &str) -> Result<Vec<u8>, ScrapeError> {
        let url = self.url_for(world);
        let resp = self.client.get(&url).send().await.map_err(|e| {
            warn!("scraper: fetch failed for {}: {}", url, e);
            e
        })?;

        let status = resp.status();
        if !status.is_success() {
            warn!("scraper: HTTP {} for {}", status.as_u16(), url);
            return Err(ScrapeError::Status {
                status: status.as_u16(),
                url,
            });
        }

        Ok(resp.bytes().await?.to_vec())
    }
}

/// Fetcher + parser pipeline.
pub struct Scraper<F> {
    fetcher: F,
}

impl<F: MarkupFetcher> Scraper<F> {
    pub fn new(fetcher: F) -> Self {
        Self { fetcher }
    }
}

#[async_trait]
impl<F: MarkupFetcher> SpawnSource for Scraper<F> {
    async fn fetch(&self, world: &str) -> Result<ScrapedPage, ScrapeError> {
        let raw = self.fetcher.fetch_markup(world).await?;
        let checksum = crate::checksum::calculate_checksum(&raw);
        let observations = parser::parse(world, &raw)?;
        Ok(ScrapedPage {
            observations,
            checksum,
        })
    }
}

//! Static boss metadata catalogue.
//!
//! Loaded once at startup from an operator-maintained file and immutable
//! afterwards. Lookups are case-insensitive; the entry's own casing is the
//! preferred display name.
//!
//! ```yaml
//! _comment: days are counted since the last recorded kill
//! bosses:
//!   Ferumbras:
//!     inclusion_range: { min_days: 7, max_days: 14 }
//!   Zushuka: {}
//! ```

use log::{info, warn};
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};

use crate::api::{boss_key, CatalogueEntry, InclusionRange};

#[derive(Debug, thiserror::Error)]
pub enum CatalogueError {
    #[error("failed to read catalogue {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid YAML catalogue {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("invalid JSON catalogue {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct CatalogueFile {
    #[serde(default)]
    bosses: BTreeMap<String, CatalogueFileEntry>,
}

#[derive(Debug, Default, Deserialize)]
struct CatalogueFileEntry {
    #[serde(default)]
    inclusion_range: Option<InclusionRange>,
}

/// Immutable set of catalogue entries indexed by [`boss_key`].
#[derive(Debug, Clone, Default)]
pub struct Catalogue {
    entries: HashMap<String, CatalogueEntry>,
}

impl Catalogue {
    /// A catalogue with no entries; eligibility falls back to percent-only rules.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build from entries; a later entry replaces an earlier one with the same key.
    pub fn from_entries<I>(entries: I) -> Self
    where
        I: IntoIterator<Item = CatalogueEntry>,
    {
        let entries = entries
            .into_iter()
            .map(|entry| (boss_key(&entry.name), entry))
            .collect();
        Self { entries }
    }

    /// Load from a YAML file, or JSON when the extension is `.json`.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CatalogueError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| CatalogueError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        let file: CatalogueFile = if is_json {
            serde_json::from_str(&content).map_err(|source| CatalogueError::Json {
                path: path.to_path_buf(),
                source,
            })?
        } else {
            serde_yaml::from_str(&content).map_err(|source| CatalogueError::Yaml {
                path: path.to_path_buf(),
                source,
            })?
        };

        let catalogue = Self::from_entries(file.bosses.into_iter().map(|(name, entry)| {
            if let Some(range) = entry.inclusion_range {
                if range.min_days > range.max_days {
                    warn!(
                        "catalogue: {} has min_days {} above max_days {}",
                        name, range.min_days, range.max_days
                    );
                }
            }
            CatalogueEntry::new(name, entry.inclusion_range)
        }));

        info!(
            "Loaded metadata for {} bosses ({} with inclusion_range filters)",
            catalogue.len(),
            catalogue.ranged_count()
        );
        Ok(catalogue)
    }

    /// Load the catalogue, degrading to an empty one when the file is missing
    /// or invalid. Startup never fails because of the catalogue.
    pub fn load_or_empty<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(catalogue) => catalogue,
            Err(e) => {
                warn!("Failed to load boss metadata: {} (filtering disabled)", e);
                Self::empty()
            }
        }
    }

    /// Case-insensitive lookup.
    pub fn get(&self, name: &str) -> Option<&CatalogueEntry> {
        self.entries.get(&boss_key(name))
    }

    pub fn entries(&self) -> impl Iterator<Item = &CatalogueEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries carrying an inclusion range.
    pub fn ranged_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| e.inclusion_range.is_some())
            .count()
    }
}

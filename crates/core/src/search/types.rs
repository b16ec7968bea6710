//! Canonical search query and release types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::category::Category;

/// Site-agnostic search query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text search term. Ignored when `imdb_id` is set.
    #[serde(default)]
    pub term: String,
    /// External metadata id (IMDb, e.g. `tt0133093`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imdb_id: Option<String>,
    /// Limit to these categories; empty means all.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<u32>,
}

impl SearchQuery {
    /// Free-text query.
    pub fn term(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            ..Default::default()
        }
    }

    /// Lookup by IMDb id.
    pub fn imdb(imdb_id: impl Into<String>) -> Self {
        Self {
            imdb_id: Some(imdb_id.into()),
            ..Default::default()
        }
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_season(mut self, season: u32) -> Self {
        self.season = Some(season);
        self
    }

    pub fn with_episode(mut self, season: u32, episode: u32) -> Self {
        self.season = Some(season);
        self.episode = Some(episode);
        self
    }

    /// The external id, if one is set and not blank.
    pub fn imdb_lookup(&self) -> Option<&str> {
        self.imdb_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
    }

    /// Free-text string sent to the site: the term plus `S01` / `S01E02`.
    pub fn search_string(&self) -> String {
        let term = self.term.trim();
        let episode = match (self.season, self.episode) {
            (Some(season), Some(episode)) => format!("S{:02}E{:02}", season, episode),
            (Some(season), None) => format!("S{:02}", season),
            _ => String::new(),
        };

        match (term.is_empty(), episode.is_empty()) {
            (_, true) => term.to_string(),
            (true, false) => episode,
            (false, false) => format!("{} {}", term, episode),
        }
    }
}

/// Download ratio multiplier for a release's promotional flags.
///
/// Free-leech wins over half-download.
pub fn download_volume_factor(freeleech: bool, half_download: bool) -> f64 {
    if freeleech {
        0.0
    } else if half_download {
        0.5
    } else {
        1.0
    }
}

/// Upload ratio multiplier: double upload counts twice.
pub fn upload_volume_factor(double_upload: bool) -> f64 {
    if double_upload {
        2.0
    } else {
        1.0
    }
}

/// A normalized search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    /// Id of the indexer that returned this release.
    pub indexer: String,
    pub title: String,
    /// Where the content (.torrent) is downloaded from.
    pub link: Url,
    /// Human-facing details page.
    pub details: Url,
    pub guid: Url,
    pub categories: Vec<Category>,
    pub publish_date: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster: Option<Url>,
    pub size_bytes: u64,
    /// Times the release was downloaded to completion.
    pub grabs: u64,
    pub seeders: u32,
    /// Seeders plus leechers.
    pub peers: u32,
    pub download_volume_factor: f64,
    pub upload_volume_factor: f64,
    pub minimum_ratio: f64,
    pub minimum_seed_time_secs: u64,
}

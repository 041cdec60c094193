use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::ShowId;

/// One search hit as shown in a result list.
///
/// The cache treats this as opaque and hands it back unmodified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowSummary {
    pub id: ShowId,
    pub name: String,
    pub image: Option<String>,
    pub rating: Option<f32>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub status: Option<String>,
    pub premiered: Option<NaiveDate>,
    /// Relevance score reported by the catalog for the query that found it.
    #[serde(default)]
    pub score: f64,
}

impl ShowSummary {
    #[must_use]
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genres.iter().any(|g| g.eq_ignore_ascii_case(genre))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowDetail {
    pub id: ShowId,
    pub name: String,
    pub image: Option<String>,
    pub image_original: Option<String>,
    pub rating: Option<f32>,
    #[serde(default)]
    pub genres: Vec<String>,
    pub status: Option<String>,
    pub premiered: Option<NaiveDate>,
    pub ended: Option<NaiveDate>,
    pub language: Option<String>,
    pub runtime: Option<u32>,
    /// Network name, or the web channel for streaming-only shows.
    pub network: Option<String>,
    pub official_site: Option<String>,
    pub schedule: Option<Schedule>,
    /// Plain-text synopsis with the catalog's HTML markup removed.
    pub summary: Option<String>,
    #[serde(default)]
    pub total_episodes: usize,
    #[serde(default)]
    pub total_seasons: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub time: Option<String>,
    #[serde(default)]
    pub days: Vec<String>,
}

impl Schedule {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.time.as_deref().is_none_or(str::is_empty) && self.days.is_empty()
    }
}

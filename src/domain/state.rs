//! Read-only state snapshots published to observers.
//!
//! A snapshot is replaced as a whole after each transition, so an observer
//! never sees a half-applied update (for example results from one query paired
//! with the error of another).

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::clients::GatewayError;
use crate::domain::SortBy;
use crate::models::{ShowDetail, ShowSummary};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    /// Text most recently submitted, as typed.
    pub query: String,
    pub results: Arc<Vec<ShowSummary>>,
    pub is_loading: bool,
    pub error: Option<GatewayError>,
    pub has_searched: bool,
    /// Normalized form of the last query whose results are displayed.
    pub last_query: String,
}

impl SearchSnapshot {
    #[must_use]
    pub fn has_results(&self) -> bool {
        !self.results.is_empty()
    }

    /// A search ran and found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.has_searched && self.results.is_empty()
    }

    #[must_use]
    pub fn results_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn has_query(&self) -> bool {
        !self.query.trim().is_empty()
    }

    #[must_use]
    pub fn can_search(&self, min_query_length: usize) -> bool {
        self.query.trim().chars().count() >= min_query_length
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.as_ref().map(GatewayError::user_message)
    }

    #[must_use]
    pub fn filter_by_genre(&self, genre: &str) -> Vec<&ShowSummary> {
        self.results
            .iter()
            .filter(|show| genre.is_empty() || show.has_genre(genre))
            .collect()
    }

    /// Shows rated at least `min_rating`. Unrated shows are excluded unless
    /// the threshold is zero.
    #[must_use]
    pub fn filter_by_rating(&self, min_rating: f32) -> Vec<&ShowSummary> {
        self.results
            .iter()
            .filter(|show| min_rating <= 0.0 || show.rating.is_some_and(|r| r >= min_rating))
            .collect()
    }

    #[must_use]
    pub fn sorted(&self, sort_by: SortBy) -> Vec<ShowSummary> {
        sort_shows(self.results.as_ref().clone(), sort_by)
    }

    #[must_use]
    pub fn stats(&self) -> SearchStats {
        SearchStats::from_results(&self.results)
    }
}

/// Sorts a result list. Unknown ratings and dates sort last; the sort is
/// stable so equal keys keep their relevance order.
#[must_use]
pub fn sort_shows(mut shows: Vec<ShowSummary>, sort_by: SortBy) -> Vec<ShowSummary> {
    match sort_by {
        SortBy::Relevance => {}
        SortBy::Name => shows.sort_by_key(|s| s.name.to_lowercase()),
        SortBy::Rating => shows.sort_by(|a, b| {
            b.rating
                .unwrap_or_default()
                .total_cmp(&a.rating.unwrap_or_default())
        }),
        SortBy::Premiered => shows.sort_by(|a, b| b.premiered.cmp(&a.premiered)),
    }
    shows
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchStats {
    pub total: usize,
    pub by_genre: BTreeMap<String, usize>,
    pub by_status: BTreeMap<String, usize>,
    /// Mean over rated shows only; zero when nothing is rated.
    pub average_rating: f32,
    pub rating_range: (f32, f32),
}

impl SearchStats {
    #[must_use]
    pub fn from_results(results: &[ShowSummary]) -> Self {
        let mut stats = Self {
            total: results.len(),
            ..Self::default()
        };

        let mut rated = Vec::new();
        for show in results {
            for genre in &show.genres {
                *stats.by_genre.entry(genre.clone()).or_default() += 1;
            }
            if let Some(status) = &show.status {
                *stats.by_status.entry(status.clone()).or_default() += 1;
            }
            if let Some(rating) = show.rating {
                rated.push(rating);
            }
        }

        if !rated.is_empty() {
            #[allow(clippy::cast_precision_loss)]
            let count = rated.len() as f32;
            stats.average_rating = rated.iter().sum::<f32>() / count;
            stats.rating_range = (
                rated.iter().copied().fold(f32::INFINITY, f32::min),
                rated.iter().copied().fold(f32::NEG_INFINITY, f32::max),
            );
        }

        stats
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowSnapshot {
    pub current_show: Option<Arc<ShowDetail>>,
    pub is_loading: bool,
    pub error: Option<GatewayError>,
}

impl ShowSnapshot {
    #[must_use]
    pub const fn has_current_show(&self) -> bool {
        self.current_show.is_some()
    }

    #[must_use]
    pub fn error_message(&self) -> Option<&'static str> {
        self.error.as_ref().map(GatewayError::user_message)
    }
}

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::domain::normalize_query;
use crate::storage::{KeyValueStore, SEARCH_HISTORY_KEY};

/// Bounded, most-recent-first list of past queries.
///
/// Entries are normalized and unique. Every change is written through to the
/// backing store; a failed write is logged and otherwise ignored.
pub struct SearchHistory {
    entries: Vec<String>,
    max_size: usize,
    store: Arc<dyn KeyValueStore>,
}

impl SearchHistory {
    /// Loads history from `store`. Missing, malformed or non-array data
    /// yields an empty history.
    pub fn load(store: Arc<dyn KeyValueStore>, max_size: usize) -> Self {
        let entries = store
            .get(SEARCH_HISTORY_KEY)
            .map(|raw| Self::parse(&raw, max_size))
            .unwrap_or_default();

        debug!(entries = entries.len(), "Loaded search history");

        Self {
            entries,
            max_size,
            store,
        }
    }

    fn parse(raw: &str, max_size: usize) -> Vec<String> {
        let value: serde_json::Value = match serde_json::from_str(raw) {
            Ok(value) => value,
            Err(e) => {
                warn!(error = %e, "Stored search history is not valid JSON, ignoring it");
                return Vec::new();
            }
        };

        let Some(items) = value.as_array() else {
            warn!("Stored search history is not an array, ignoring it");
            return Vec::new();
        };

        let mut entries: Vec<String> = Vec::with_capacity(items.len().min(max_size));
        for item in items.iter().filter_map(serde_json::Value::as_str) {
            let normalized = normalize_query(item);
            if !normalized.is_empty() && !entries.contains(&normalized) {
                entries.push(normalized);
            }
        }
        entries.truncate(max_size);
        entries
    }

    /// Moves `query` to the front, inserting it if new.
    pub fn record(&mut self, query: &str) {
        let normalized = normalize_query(query);
        if normalized.is_empty() {
            return;
        }

        self.entries.retain(|entry| *entry != normalized);
        self.entries.insert(0, normalized);
        self.entries.truncate(self.max_size);
        self.persist();
    }

    /// Up to `limit` entries containing `partial`, most recent first. An empty
    /// partial returns the most recent entries.
    #[must_use]
    pub fn suggestions(&self, partial: &str, limit: usize) -> Vec<String> {
        let needle = normalize_query(partial);
        self.entries
            .iter()
            .filter(|entry| needle.is_empty() || entry.contains(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    #[must_use]
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.persist();
    }

    fn persist(&self) {
        let result = serde_json::to_string(&self.entries)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.set(SEARCH_HISTORY_KEY, &json));

        if let Err(e) = result {
            warn!(error = %e, "Failed to save search history");
        }
    }
}

/// Process-wide handle to the history tracker.
#[derive(Clone)]
pub struct SharedHistory(Arc<Mutex<SearchHistory>>);

impl SharedHistory {
    #[must_use]
    pub fn new(history: SearchHistory) -> Self {
        Self(Arc::new(Mutex::new(history)))
    }

    pub fn lock(&self) -> MutexGuard<'_, SearchHistory> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

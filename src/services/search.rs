//! Debounced, cache-first show search.
//!
//! [`SearchService`] turns a stream of user edits into at most one catalog
//! call per quiet period and publishes the outcome as [`SearchSnapshot`]s on a
//! `watch` channel.
//!
//! Every submission takes a new sequence number. An execution publishes only
//! while its number is still the latest, so a slow response can never replace
//! the results of a query submitted after it. Superseded responses are still
//! cached.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheStats, Keyspace, SharedCache};
use crate::clients::ShowSource;
use crate::config::SearchConfig;
use crate::domain::NormalizedQuery;
use crate::domain::state::SearchSnapshot;
use crate::services::history::SharedHistory;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchSettings {
    pub min_query_length: usize,
    pub debounce_delay: Duration,
    pub suggestion_limit: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            min_query_length: 2,
            debounce_delay: Duration::from_millis(500),
            suggestion_limit: 5,
        }
    }
}

impl From<&SearchConfig> for SearchSettings {
    fn from(config: &SearchConfig) -> Self {
        Self {
            min_query_length: config.min_query_length,
            debounce_delay: Duration::from_millis(config.debounce_delay_ms),
            suggestion_limit: config.suggestion_limit,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CacheMode {
    Use,
    Bypass,
}

pub struct SearchService {
    inner: Arc<SearchInner>,
    /// Debounce timer of the most recent `submit`, if still waiting.
    pending: Mutex<Option<JoinHandle<()>>>,
}

struct SearchInner {
    source: Arc<dyn ShowSource>,
    cache: SharedCache,
    history: SharedHistory,
    settings: SearchSettings,
    sequence: AtomicU64,
    state: watch::Sender<SearchSnapshot>,
}

impl SearchService {
    #[must_use]
    pub fn new(
        source: Arc<dyn ShowSource>,
        cache: SharedCache,
        history: SharedHistory,
        settings: SearchSettings,
    ) -> Self {
        let (state, _) = watch::channel(SearchSnapshot::default());
        Self {
            inner: Arc::new(SearchInner {
                source,
                cache,
                history,
                settings,
                sequence: AtomicU64::new(0),
                state,
            }),
            pending: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn settings(&self) -> &SearchSettings {
        &self.inner.settings
    }

    /// Schedules `query` after the debounce delay, replacing any query still
    /// waiting. A query below the minimum length clears the results at once.
    pub fn submit(&self, query: &str) {
        self.cancel_pending();
        let seq = self.inner.next_sequence();

        if NormalizedQuery::parse(query, self.inner.settings.min_query_length).is_none() {
            self.inner.publish_reset(seq, query);
            return;
        }

        self.inner.publish(seq, |s| s.query = query.to_string());

        let inner = Arc::clone(&self.inner);
        let raw = query.to_string();
        let delay = self.inner.settings.debounce_delay;

        let timer = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Detached so that a later submit only cancels the timer, never a
            // fetch that has already started.
            tokio::spawn(inner.execute(seq, raw, CacheMode::Use));
        });

        *self.pending.lock().unwrap_or_else(PoisonError::into_inner) = Some(timer);
    }

    /// Runs `query` on the next scheduler turn, skipping the debounce delay.
    pub fn submit_immediate(&self, query: &str) -> JoinHandle<()> {
        self.cancel_pending();
        let seq = self.inner.next_sequence();
        tokio::spawn(
            Arc::clone(&self.inner).execute(seq, query.to_string(), CacheMode::Use),
        )
    }

    pub fn search_from_suggestion(&self, suggestion: &str) -> JoinHandle<()> {
        self.submit_immediate(suggestion)
    }

    /// Re-runs the last *displayed* query (`last_query`) against the catalog,
    /// ignoring any cached result.
    ///
    /// A failed search never becomes the displayed query, so after a success
    /// followed by a failure this repeats the earlier successful query, and
    /// after a failed first search it returns `None`.
    pub fn retry(&self) -> Option<JoinHandle<()>> {
        let last_query = self.inner.state.borrow().last_query.clone();
        if last_query.is_empty() {
            return None;
        }

        self.cancel_pending();
        let seq = self.inner.next_sequence();
        info!(query = %last_query, "Retrying search");
        Some(tokio::spawn(
            Arc::clone(&self.inner).execute(seq, last_query, CacheMode::Bypass),
        ))
    }

    /// Cancels any waiting query, orphans in-flight ones and resets the state.
    pub fn clear_search(&self) {
        self.cancel_pending();
        self.inner.next_sequence();
        self.inner.state.send_replace(SearchSnapshot::default());
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|timer| !timer.is_finished())
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SearchSnapshot> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SearchSnapshot {
        self.inner.state.borrow().clone()
    }

    #[must_use]
    pub fn suggestions(&self, partial: &str) -> Vec<String> {
        self.inner
            .history
            .lock()
            .suggestions(partial, self.inner.settings.suggestion_limit)
    }

    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.inner.history.lock().entries().to_vec()
    }

    pub fn clear_history(&self) {
        self.inner.history.lock().clear();
    }

    /// Drops cached search results. Cached show details are kept.
    pub fn clear_cache(&self) {
        self.inner.cache.lock().clear_keyspace(Keyspace::Search);
    }

    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.inner.cache.lock().stats()
    }

    fn cancel_pending(&self) {
        if let Some(timer) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            timer.abort();
        }
    }
}

impl Drop for SearchService {
    fn drop(&mut self) {
        self.cancel_pending();
    }
}

impl SearchInner {
    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Applies `update` only if `seq` is still the latest submission.
    fn publish(&self, seq: u64, update: impl FnOnce(&mut SearchSnapshot)) -> bool {
        self.state.send_if_modified(|snapshot| {
            if self.sequence.load(Ordering::SeqCst) != seq {
                return false;
            }
            update(snapshot);
            true
        })
    }

    fn publish_reset(&self, seq: u64, raw: &str) {
        self.publish(seq, |s| {
            s.query = raw.to_string();
            s.results = Arc::default();
            s.is_loading = false;
            s.error = None;
            s.has_searched = false;
        });
    }

    async fn execute(self: Arc<Self>, seq: u64, raw: String, mode: CacheMode) {
        let Some(query) = NormalizedQuery::parse(&raw, self.settings.min_query_length) else {
            self.publish_reset(seq, &raw);
            return;
        };

        if mode == CacheMode::Use {
            let cached = self.cache.lock().lookup_search(query.as_str());
            if let Some(results) = cached {
                debug!(query = %query, results = results.len(), "Search served from cache");
                self.publish(seq, |s| {
                    s.query = raw;
                    s.results = results;
                    s.is_loading = false;
                    s.error = None;
                    s.has_searched = true;
                    s.last_query = query.into_inner();
                });
                return;
            }
        }

        self.publish(seq, |s| {
            s.query = raw.clone();
            s.results = Arc::default();
            s.is_loading = true;
            s.error = None;
        });

        info!(query = %query, "Searching shows");

        match self.source.search_shows(query.as_str()).await {
            Ok(results) => {
                let results = Arc::new(results);
                self.cache
                    .lock()
                    .insert_search(query.as_str(), Arc::clone(&results));
                self.history.lock().record(query.as_str());

                let count = results.len();
                let applied = self.publish(seq, |s| {
                    s.results = results;
                    s.is_loading = false;
                    s.error = None;
                    s.has_searched = true;
                    s.last_query = query.as_str().to_string();
                });

                if applied {
                    debug!(query = %query, results = count, "Search finished");
                } else {
                    debug!(query = %query, "Discarding results of superseded search");
                }
            }
            Err(e) => {
                warn!(query = %query, error = %e, "Search failed");
                self.publish(seq, |s| {
                    s.results = Arc::default();
                    s.is_loading = false;
                    s.error = Some(e);
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CachePolicy, ResultCache};
    use crate::clients::GatewayError;
    use crate::domain::ShowId;
    use crate::models::{Episode, Season, ShowDetail, ShowSummary};
    use crate::services::history::SearchHistory;
    use crate::storage::MemoryStore;
    use std::sync::atomic::AtomicUsize;

    struct CountingSource {
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ShowSource for CountingSource {
        async fn search_shows(&self, query: &str) -> Result<Vec<ShowSummary>, GatewayError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![ShowSummary {
                id: ShowId::new(1),
                name: query.to_uppercase(),
                image: None,
                rating: None,
                genres: vec![],
                status: None,
                premiered: None,
                score: 1.0,
            }])
        }

        async fn show_details(&self, _id: ShowId) -> Result<ShowDetail, GatewayError> {
            Err(GatewayError::NotFound)
        }

        async fn show_episodes(&self, _id: ShowId) -> Result<Vec<Episode>, GatewayError> {
            Ok(vec![])
        }

        async fn show_seasons(&self, _id: ShowId) -> Result<Vec<Season>, GatewayError> {
            Ok(vec![])
        }
    }

    fn service() -> (SearchService, Arc<CountingSource>) {
        let source = Arc::new(CountingSource {
            calls: AtomicUsize::new(0),
        });
        let history = SearchHistory::load(Arc::new(MemoryStore::new()), 10);
        let service = SearchService::new(
            source.clone(),
            SharedCache::new(ResultCache::new(CachePolicy::default())),
            SharedHistory::new(history),
            SearchSettings::default(),
        );
        (service, source)
    }

    #[tokio::test(start_paused = true)]
    async fn submit_waits_for_debounce_delay() {
        let (service, source) = service();
        service.submit("lost");
        assert!(service.has_pending());

        tokio::time::sleep(Duration::from_millis(499)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert!(!service.snapshot().has_searched);
        assert_eq!(service.snapshot().query, "lost");

        let mut rx = service.subscribe();
        let snapshot = rx.wait_for(|s| s.has_searched).await.unwrap().clone();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert_eq!(snapshot.last_query, "lost");
        assert_eq!(snapshot.results[0].name, "LOST");
    }

    #[tokio::test(start_paused = true)]
    async fn clear_search_cancels_pending_timer() {
        let (service, source) = service();
        service.submit("lost");
        service.clear_search();
        assert!(!service.has_pending());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(service.snapshot(), SearchSnapshot::default());
    }

    #[tokio::test(start_paused = true)]
    async fn retry_bypasses_cache() {
        let (service, source) = service();
        service.submit_immediate("dark").await.unwrap();
        service.submit_immediate("Dark").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);

        service.retry().unwrap().await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);
        assert_eq!(service.snapshot().last_query, "dark");
    }

    #[tokio::test]
    async fn retry_without_history_is_noop() {
        let (service, _) = service();
        assert!(service.retry().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn clear_cache_keeps_history() {
        let (service, source) = service();
        service.submit_immediate("ozark").await.unwrap();
        service.clear_cache();
        assert_eq!(service.cache_stats().searches, 0);
        assert_eq!(service.history(), ["ozark"]);
        assert_eq!(service.suggestions("oz"), ["ozark"]);

        service.search_from_suggestion("ozark").await.unwrap();
        assert_eq!(source.calls.load(Ordering::SeqCst), 2);

        service.clear_history();
        assert!(service.history().is_empty());
    }
}

//! Timestamped result cache shared by search and show lookups.
//!
//! Search results and show details live in separate keyspaces of one store.
//! Every entry carries the TTL of its keyspace; an entry older than its TTL is
//! never returned. Stale entries are removed lazily on lookup, in bulk by
//! [`ResultCache::evict_stale`] (driven by [`CacheJanitor`]) and whenever an
//! insert pushes the cache over its entry bound.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::debug;

use crate::config::CacheConfig;
use crate::domain::ShowId;
use crate::models::{ShowDetail, ShowSummary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyspace {
    Search,
    Show,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Normalized search text.
    Search(String),
    Show(ShowId),
}

impl CacheKey {
    #[must_use]
    pub const fn keyspace(&self) -> Keyspace {
        match self {
            Self::Search(_) => Keyspace::Search,
            Self::Show(_) => Keyspace::Show,
        }
    }
}

#[derive(Debug, Clone)]
pub enum CachedPayload {
    Search(Arc<Vec<ShowSummary>>),
    Show(Arc<ShowDetail>),
}

/// Immutable once created.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub payload: CachedPayload,
    pub fetched_at: Instant,
    pub ttl: Duration,
}

impl CacheEntry {
    #[must_use]
    pub fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    #[must_use]
    pub fn is_stale(&self, now: Instant) -> bool {
        self.age(now) > self.ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub search_ttl: Duration,
    pub show_ttl: Duration,
    pub max_entries: usize,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            search_ttl: Duration::from_secs(5 * 60),
            show_ttl: Duration::from_secs(15 * 60),
            max_entries: 50,
        }
    }
}

impl From<&CacheConfig> for CachePolicy {
    fn from(config: &CacheConfig) -> Self {
        Self {
            search_ttl: Duration::from_secs(config.search_ttl_seconds),
            show_ttl: Duration::from_secs(config.show_ttl_seconds),
            max_entries: config.max_entries,
        }
    }
}

impl CachePolicy {
    #[must_use]
    pub const fn ttl_for(&self, keyspace: Keyspace) -> Duration {
        match keyspace {
            Keyspace::Search => self.search_ttl,
            Keyspace::Show => self.show_ttl,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub searches: usize,
    pub shows: usize,
    pub total: usize,
    pub hits: u64,
    pub misses: u64,
}

#[derive(Debug, Default)]
pub struct ResultCache {
    entries: HashMap<CacheKey, CacheEntry>,
    policy: CachePolicy,
    hits: u64,
    misses: u64,
}

impl ResultCache {
    #[must_use]
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: HashMap::new(),
            policy,
            hits: 0,
            misses: 0,
        }
    }

    /// Returns the entry for `key` if it is younger than its TTL. A stale
    /// entry is removed and reported as absent.
    pub fn lookup(&mut self, key: &CacheKey) -> Option<CacheEntry> {
        let now = Instant::now();
        match self.entries.get(key) {
            Some(entry) if !entry.is_stale(now) => {
                self.hits += 1;
                Some(entry.clone())
            }
            Some(_) => {
                self.entries.remove(key);
                self.misses += 1;
                None
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    pub fn lookup_search(&mut self, normalized: &str) -> Option<Arc<Vec<ShowSummary>>> {
        match self.lookup(&CacheKey::Search(normalized.to_string()))?.payload {
            CachedPayload::Search(results) => Some(results),
            CachedPayload::Show(_) => None,
        }
    }

    pub fn lookup_show(&mut self, id: ShowId) -> Option<Arc<ShowDetail>> {
        match self.lookup(&CacheKey::Show(id))?.payload {
            CachedPayload::Show(detail) => Some(detail),
            CachedPayload::Search(_) => None,
        }
    }

    /// Stores `payload` under `key`, replacing any previous entry, stamped
    /// with the current time and the keyspace TTL.
    pub fn insert(&mut self, key: CacheKey, payload: CachedPayload) {
        let ttl = self.policy.ttl_for(key.keyspace());
        let entry = CacheEntry {
            key: key.clone(),
            payload,
            fetched_at: Instant::now(),
            ttl,
        };
        self.entries.insert(key, entry);

        if self.entries.len() > self.policy.max_entries {
            self.enforce_capacity();
        }
    }

    pub fn insert_search(&mut self, normalized: &str, results: Arc<Vec<ShowSummary>>) {
        self.insert(
            CacheKey::Search(normalized.to_string()),
            CachedPayload::Search(results),
        );
    }

    pub fn insert_show(&mut self, detail: Arc<ShowDetail>) {
        self.insert(CacheKey::Show(detail.id), CachedPayload::Show(detail));
    }

    /// Removes every entry older than `max_age`, regardless of its own TTL.
    /// Returns the number of removed entries.
    pub fn evict_expired(&mut self, max_age: Duration) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.age(now) <= max_age);
        before - self.entries.len()
    }

    /// Removes every entry older than its own TTL.
    pub fn evict_stale(&mut self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_stale(now));
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn clear_keyspace(&mut self, keyspace: Keyspace) {
        self.entries.retain(|key, _| key.keyspace() != keyspace);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> CacheStats {
        let searches = self
            .entries
            .keys()
            .filter(|k| k.keyspace() == Keyspace::Search)
            .count();
        CacheStats {
            searches,
            shows: self.entries.len() - searches,
            total: self.entries.len(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    fn enforce_capacity(&mut self) {
        let stale = self.evict_stale();
        let mut dropped = 0;

        while self.entries.len() > self.policy.max_entries {
            let Some(oldest) = self
                .entries
                .values()
                .min_by_key(|entry| entry.fetched_at)
                .map(|entry| entry.key.clone())
            else {
                break;
            };
            self.entries.remove(&oldest);
            dropped += 1;
        }

        debug!(stale, dropped, remaining = self.entries.len(), "Cache over capacity");
    }
}

/// Process-wide handle to the cache. Locks are never held across an await.
#[derive(Debug, Clone, Default)]
pub struct SharedCache(Arc<Mutex<ResultCache>>);

impl SharedCache {
    #[must_use]
    pub fn new(cache: ResultCache) -> Self {
        Self(Arc::new(Mutex::new(cache)))
    }

    pub fn lock(&self) -> MutexGuard<'_, ResultCache> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Periodic stale-entry eviction. The task is aborted when the janitor is
/// stopped or dropped.
pub struct CacheJanitor {
    handle: JoinHandle<()>,
}

impl CacheJanitor {
    pub fn start(cache: SharedCache, every: Duration) -> Self {
        let every = every.max(Duration::from_secs(1));
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + every, every);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;
                let removed = cache.lock().evict_stale();
                if removed > 0 {
                    debug!(removed, "Evicted stale cache entries");
                }
            }
        });

        Self { handle }
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        drop(self);
    }
}

impl Drop for CacheJanitor {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(id: u32, name: &str) -> ShowSummary {
        ShowSummary {
            id: ShowId::new(id),
            name: name.to_string(),
            image: None,
            rating: None,
            genres: vec![],
            status: None,
            premiered: None,
            score: 1.0,
        }
    }

    fn detail(id: u32) -> ShowDetail {
        ShowDetail {
            id: ShowId::new(id),
            name: format!("Show {id}"),
            image: None,
            image_original: None,
            rating: None,
            genres: vec![],
            status: None,
            premiered: None,
            ended: None,
            language: None,
            runtime: None,
            network: None,
            official_site: None,
            schedule: None,
            summary: None,
            total_episodes: 0,
            total_seasons: 0,
        }
    }

    fn policy(search_secs: u64, show_secs: u64, max_entries: usize) -> CachePolicy {
        CachePolicy {
            search_ttl: Duration::from_secs(search_secs),
            show_ttl: Duration::from_secs(show_secs),
            max_entries,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn lookup_returns_inserted_results() {
        let mut cache = ResultCache::new(CachePolicy::default());
        let results = Arc::new(vec![summary(1, "Breaking Bad"), summary(2, "Better Call Saul")]);
        cache.insert_search("br", Arc::clone(&results));

        let hit = cache.lookup_search("br").unwrap();
        assert_eq!(*hit, *results);
        assert_eq!(cache.stats().hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn entries_expire_after_ttl() {
        let mut cache = ResultCache::new(policy(60, 600, 50));
        cache.insert_search("br", Arc::new(vec![summary(1, "Breaking Bad")]));
        cache.insert_show(Arc::new(detail(1)));

        tokio::time::advance(Duration::from_secs(60)).await;
        assert!(cache.lookup_search("br").is_some());

        tokio::time::advance(Duration::from_millis(1)).await;
        assert!(cache.lookup_search("br").is_none());
        // Stale entries are dropped on lookup; the show keyspace has its own TTL.
        assert_eq!(cache.len(), 1);
        assert!(cache.lookup_show(ShowId::new(1)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn insert_overwrites_and_restamps() {
        let mut cache = ResultCache::new(policy(60, 60, 50));
        cache.insert_search("br", Arc::new(vec![summary(1, "Old")]));
        tokio::time::advance(Duration::from_secs(50)).await;
        cache.insert_search("br", Arc::new(vec![summary(2, "New")]));
        tokio::time::advance(Duration::from_secs(50)).await;

        let hit = cache.lookup_search("br").unwrap();
        assert_eq!(hit[0].name, "New");
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn keyspaces_are_independent() {
        let mut cache = ResultCache::new(CachePolicy::default());
        cache.insert_search("1", Arc::new(vec![]));
        cache.insert_show(Arc::new(detail(1)));

        assert!(cache.lookup_show(ShowId::new(2)).is_none());
        assert!(cache.lookup_show(ShowId::new(1)).is_some());

        cache.clear_keyspace(Keyspace::Search);
        let stats = cache.stats();
        assert_eq!(stats.searches, 0);
        assert_eq!(stats.shows, 1);
        assert_eq!(stats.total, 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn evict_expired_uses_given_age() {
        let mut cache = ResultCache::new(policy(600, 600, 50));
        cache.insert_search("old", Arc::new(vec![]));
        tokio::time::advance(Duration::from_secs(30)).await;
        cache.insert_search("new", Arc::new(vec![]));
        tokio::time::advance(Duration::from_secs(1)).await;

        assert_eq!(cache.evict_expired(Duration::from_secs(10)), 1);
        assert!(cache.lookup_search("old").is_none());
        assert!(cache.lookup_search("new").is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn capacity_prefers_stale_then_oldest() {
        let mut cache = ResultCache::new(policy(10, 600, 2));
        cache.insert_search("a", Arc::new(vec![]));
        tokio::time::advance(Duration::from_secs(20)).await;
        cache.insert_show(Arc::new(detail(1)));
        tokio::time::advance(Duration::from_secs(1)).await;
        // "a" is stale and goes first.
        cache.insert_show(Arc::new(detail(2)));
        assert_eq!(cache.len(), 2);
        assert!(cache.lookup_show(ShowId::new(1)).is_some());

        tokio::time::advance(Duration::from_secs(1)).await;
        // Nothing stale left; the oldest show is dropped.
        cache.insert_show(Arc::new(detail(3)));
        assert_eq!(cache.len(), 2);
        assert!(cache.lookup_show(ShowId::new(1)).is_none());
        assert!(cache.lookup_show(ShowId::new(2)).is_some());
        assert!(cache.lookup_show(ShowId::new(3)).is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn janitor_evicts_periodically_and_stops_on_drop() {
        let cache = SharedCache::new(ResultCache::new(policy(30, 30, 50)));
        cache.lock().insert_search("br", Arc::new(vec![]));

        let janitor = CacheJanitor::start(cache.clone(), Duration::from_secs(60));
        assert!(janitor.is_running());

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert!(cache.lock().is_empty());

        janitor.stop();
        cache.lock().insert_search("br", Arc::new(vec![]));
        tokio::time::sleep(Duration::from_secs(121)).await;
        // No janitor anymore, so the stale entry is still physically present.
        assert_eq!(cache.lock().len(), 1);
    }
}

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::cache::SharedCache;
use crate::clients::{GatewayError, ShowSource};
use crate::domain::ShowId;
use crate::domain::state::ShowSnapshot;
use crate::models::{Episode, Season, ShowDetail};

/// Loads show details into a single "current show" projection.
///
/// Details are cached under the show keyspace of the shared cache. Like
/// search, each load takes a sequence number and only the latest one may
/// publish.
pub struct ShowService {
    source: Arc<dyn ShowSource>,
    cache: SharedCache,
    sequence: AtomicU64,
    state: watch::Sender<ShowSnapshot>,
}

impl ShowService {
    #[must_use]
    pub fn new(source: Arc<dyn ShowSource>, cache: SharedCache) -> Self {
        let (state, _) = watch::channel(ShowSnapshot::default());
        Self {
            source,
            cache,
            sequence: AtomicU64::new(0),
            state,
        }
    }

    /// Makes `id` the current show, from cache when possible.
    pub async fn load_show(&self, id: ShowId) -> Option<Arc<ShowDetail>> {
        self.load(id, true).await
    }

    /// Like [`load_show`](Self::load_show) but always asks the catalog.
    pub async fn reload_show(&self, id: ShowId) -> Option<Arc<ShowDetail>> {
        self.load(id, false).await
    }

    /// # Errors
    ///
    /// Returns the gateway failure for a valid id.
    pub async fn episodes(&self, id: ShowId) -> Result<Vec<Episode>, GatewayError> {
        if !id.is_valid() {
            return Ok(Vec::new());
        }
        self.source.show_episodes(id).await
    }

    /// # Errors
    ///
    /// Returns the gateway failure for a valid id.
    pub async fn seasons(&self, id: ShowId) -> Result<Vec<Season>, GatewayError> {
        if !id.is_valid() {
            return Ok(Vec::new());
        }
        self.source.show_seasons(id).await
    }

    pub fn clear_current_show(&self) {
        self.next_sequence();
        self.state.send_replace(ShowSnapshot::default());
    }

    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<ShowSnapshot> {
        self.state.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> ShowSnapshot {
        self.state.borrow().clone()
    }

    async fn load(&self, id: ShowId, use_cache: bool) -> Option<Arc<ShowDetail>> {
        let seq = self.next_sequence();

        if !id.is_valid() {
            self.publish(seq, ShowSnapshot::default());
            return None;
        }

        if use_cache {
            let cached = self.cache.lock().lookup_show(id);
            if let Some(detail) = cached {
                debug!(show_id = %id, "Show served from cache");
                self.publish(
                    seq,
                    ShowSnapshot {
                        current_show: Some(Arc::clone(&detail)),
                        is_loading: false,
                        error: None,
                    },
                );
                return Some(detail);
            }
        }

        self.state.send_if_modified(|s| {
            if self.sequence.load(Ordering::SeqCst) != seq {
                return false;
            }
            s.is_loading = true;
            s.error = None;
            true
        });

        info!(show_id = %id, "Fetching show details");

        match self.fetch_complete(id).await {
            Ok(detail) => {
                let detail = Arc::new(detail);
                self.cache.lock().insert_show(Arc::clone(&detail));
                self.publish(
                    seq,
                    ShowSnapshot {
                        current_show: Some(Arc::clone(&detail)),
                        is_loading: false,
                        error: None,
                    },
                );
                Some(detail)
            }
            Err(e) => {
                warn!(show_id = %id, error = %e, "Failed to load show");
                self.publish(
                    seq,
                    ShowSnapshot {
                        current_show: None,
                        is_loading: false,
                        error: Some(e),
                    },
                );
                None
            }
        }
    }

    async fn fetch_complete(&self, id: ShowId) -> Result<ShowDetail, GatewayError> {
        let (details, episodes, seasons) = tokio::join!(
            self.source.show_details(id),
            self.source.show_episodes(id),
            self.source.show_seasons(id),
        );

        let mut detail = details?;
        detail.total_episodes = episodes.map_or_else(
            |e| {
                debug!(show_id = %id, error = %e, "Episode list unavailable");
                0
            },
            |episodes| episodes.len(),
        );
        detail.total_seasons = seasons.map_or_else(
            |e| {
                debug!(show_id = %id, error = %e, "Season list unavailable");
                0
            },
            |seasons| seasons.len(),
        );
        Ok(detail)
    }

    fn next_sequence(&self) -> u64 {
        self.sequence.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn publish(&self, seq: u64, snapshot: ShowSnapshot) {
        self.state.send_if_modified(|s| {
            if self.sequence.load(Ordering::SeqCst) != seq {
                return false;
            }
            *s = snapshot;
            true
        });
    }
}

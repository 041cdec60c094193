use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheJanitor, CachePolicy, ResultCache, SharedCache};
use crate::clients::{ShowSource, TvMazeClient};
use crate::config::Config;
use crate::services::{SearchHistory, SearchService, SearchSettings, SharedHistory, ShowService};
use crate::storage::{FileStore, KeyValueStore, MemoryStore};

/// Build the HTTP client used for every catalog call. Its timeout is the
/// gateway timeout.
fn build_shared_http_client(config: &Config) -> anyhow::Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(config.api.request_timeout_seconds))
        .user_agent(config.api.user_agent.as_str())
        .pool_max_idle_per_host(4)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build shared HTTP client: {e}"))
}

/// Everything a front end needs: the two services plus the shared cache and
/// history they sit on.
pub struct AppState {
    pub config: Config,

    pub cache: SharedCache,

    pub history: SharedHistory,

    pub search: SearchService,

    pub shows: ShowService,

    janitor: CacheJanitor,
}

impl AppState {
    /// Wires the production catalog client. Must run inside a Tokio runtime
    /// because the cache janitor is spawned here.
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = build_shared_http_client(&config)?;
        let client = TvMazeClient::with_shared_client(http_client, &config.api.base_url)
            .with_max_results(config.search.max_results);

        let store: Arc<dyn KeyValueStore> = if config.general.persist_history {
            Arc::new(FileStore::open(config.storage_path()))
        } else {
            Arc::new(MemoryStore::new())
        };

        Ok(Self::with_parts(config, Arc::new(client), store))
    }

    /// Wires the services around an arbitrary catalog and store.
    pub fn with_parts(
        config: Config,
        source: Arc<dyn ShowSource>,
        store: Arc<dyn KeyValueStore>,
    ) -> Self {
        let cache = SharedCache::new(ResultCache::new(CachePolicy::from(&config.cache)));
        let history = SharedHistory::new(SearchHistory::load(
            store,
            config.search.max_history_size,
        ));

        let search = SearchService::new(
            Arc::clone(&source),
            cache.clone(),
            history.clone(),
            SearchSettings::from(&config.search),
        );
        let shows = ShowService::new(source, cache.clone());

        let janitor = CacheJanitor::start(
            cache.clone(),
            Duration::from_secs(config.cache.cleanup_interval_seconds),
        );

        Self {
            config,
            cache,
            history,
            search,
            shows,
            janitor,
        }
    }

    #[must_use]
    pub fn janitor_running(&self) -> bool {
        self.janitor.is_running()
    }
}

//! In-memory catalog shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tvapi::clients::{GatewayError, ShowSource};
use tvapi::config::Config;
use tvapi::domain::ShowId;
use tvapi::models::{Episode, Season, ShowDetail, ShowSummary};
use tvapi::storage::{KeyValueStore, MemoryStore};
use tvapi::AppState;

#[derive(Clone)]
struct Reply {
    delay: Duration,
    result: Result<Vec<ShowSummary>, GatewayError>,
}

/// Catalog fake: canned replies per query, optional latency, and a log of
/// every call made.
#[derive(Default)]
pub struct FakeCatalog {
    searches: Mutex<HashMap<String, Reply>>,
    shows: Mutex<HashMap<ShowId, ShowDetail>>,
    show_delays: Mutex<HashMap<ShowId, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl FakeCatalog {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_results(&self, query: &str, names: &[&str]) {
        self.reply(query, Duration::ZERO, Ok(shows(names)));
    }

    pub fn with_delayed_results(&self, query: &str, delay: Duration, names: &[&str]) {
        self.reply(query, delay, Ok(shows(names)));
    }

    pub fn with_error(&self, query: &str, error: GatewayError) {
        self.reply(query, Duration::ZERO, Err(error));
    }

    pub fn with_show(&self, detail: ShowDetail) {
        self.shows.lock().unwrap().insert(detail.id, detail);
    }

    pub fn with_delayed_show(&self, detail: ShowDetail, delay: Duration) {
        self.show_delays.lock().unwrap().insert(detail.id, delay);
        self.with_show(detail);
    }

    fn reply(&self, query: &str, delay: Duration, result: Result<Vec<ShowSummary>, GatewayError>) {
        self.searches
            .lock()
            .unwrap()
            .insert(query.to_string(), Reply { delay, result });
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ShowSource for FakeCatalog {
    async fn search_shows(&self, query: &str) -> Result<Vec<ShowSummary>, GatewayError> {
        self.calls.lock().unwrap().push(format!("search:{query}"));
        let reply = self.searches.lock().unwrap().get(query).cloned();

        match reply {
            Some(reply) => {
                tokio::time::sleep(reply.delay).await;
                reply.result
            }
            None => Ok(Vec::new()),
        }
    }

    async fn show_details(&self, id: ShowId) -> Result<ShowDetail, GatewayError> {
        self.calls.lock().unwrap().push(format!("show:{id}"));
        let delay = self.show_delays.lock().unwrap().get(&id).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.shows
            .lock()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(GatewayError::NotFound)
    }

    async fn show_episodes(&self, id: ShowId) -> Result<Vec<Episode>, GatewayError> {
        if !self.shows.lock().unwrap().contains_key(&id) {
            return Err(GatewayError::NotFound);
        }
        Ok((1..=5)
            .map(|n| Episode {
                id: id.value() * 100 + n,
                name: Some(format!("Episode {n}")),
                season: if n <= 3 { 1 } else { 2 },
                number: Some(n),
                airdate: None,
                runtime: Some(47),
                rating: None,
                summary: None,
            })
            .collect())
    }

    async fn show_seasons(&self, id: ShowId) -> Result<Vec<Season>, GatewayError> {
        if !self.shows.lock().unwrap().contains_key(&id) {
            return Err(GatewayError::NotFound);
        }
        Ok((1..=2)
            .map(|n| Season {
                id: id.value() * 10 + n,
                number: n,
                name: None,
                episode_order: None,
                premiere_date: None,
                end_date: None,
            })
            .collect())
    }
}

pub fn shows(names: &[&str]) -> Vec<ShowSummary> {
    names
        .iter()
        .zip(1u32..)
        .map(|(name, id)| ShowSummary {
            id: ShowId::new(id),
            name: (*name).to_string(),
            image: None,
            rating: None,
            genres: vec![],
            status: Some("Ended".to_string()),
            premiered: None,
            score: 1.0 / f64::from(id),
        })
        .collect()
}

pub fn show_detail(id: u32, name: &str) -> ShowDetail {
    ShowDetail {
        id: ShowId::new(id),
        name: name.to_string(),
        image: None,
        image_original: None,
        rating: Some(9.2),
        genres: vec!["Drama".to_string(), "Crime".to_string()],
        status: Some("Ended".to_string()),
        premiered: None,
        ended: None,
        language: Some("English".to_string()),
        runtime: Some(60),
        network: Some("AMC".to_string()),
        official_site: None,
        schedule: None,
        summary: Some("A chemistry teacher turns to crime.".to_string()),
        total_episodes: 0,
        total_seasons: 0,
    }
}

pub fn app(catalog: &Arc<FakeCatalog>) -> (AppState, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let source: Arc<dyn ShowSource> = catalog.clone();
    let kv: Arc<dyn KeyValueStore> = store.clone();
    (AppState::with_parts(Config::default(), source, kv), store)
}

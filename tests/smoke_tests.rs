//! Application wiring and persistence across restarts.

mod common;

use std::sync::Arc;

use common::FakeCatalog;
use tvapi::clients::ShowSource;
use tvapi::config::Config;
use tvapi::storage::{FileStore, KeyValueStore};
use tvapi::AppState;

fn temp_config() -> Config {
    let mut config = Config::default();
    config.general.data_dir = std::env::temp_dir()
        .join(format!("tvapi-smoke-test-{}", uuid::Uuid::new_v4()))
        .display()
        .to_string();
    config
}

fn open_app(config: &Config, catalog: &Arc<FakeCatalog>) -> AppState {
    let source: Arc<dyn ShowSource> = catalog.clone();
    let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(config.storage_path()));
    AppState::with_parts(config.clone(), source, store)
}

#[tokio::test]
async fn history_survives_restart() {
    let config = temp_config();
    let catalog = FakeCatalog::new();

    {
        let state = open_app(&config, &catalog);
        state.search.submit_immediate("The Expanse").await.unwrap();
        state.search.submit_immediate("severance").await.unwrap();
    }

    let state = open_app(&config, &catalog);
    assert_eq!(state.search.history(), ["severance", "the expanse"]);
    // The cache is not persisted.
    assert!(state.cache.lock().is_empty());

    let _ = std::fs::remove_dir_all(&config.general.data_dir);
}

#[tokio::test]
async fn corrupt_storage_starts_with_empty_history() {
    let config = temp_config();
    std::fs::create_dir_all(config.data_dir()).unwrap();
    std::fs::write(
        config.storage_path(),
        r#"{"tvapi-search-history": "not an array"}"#,
    )
    .unwrap();

    let state = open_app(&config, &FakeCatalog::new());
    assert!(state.search.history().is_empty());

    let _ = std::fs::remove_dir_all(&config.general.data_dir);
}

#[tokio::test]
async fn production_wiring_starts_janitor() {
    let mut config = temp_config();
    config.general.persist_history = false;

    let state = AppState::new(config).unwrap();
    assert!(state.janitor_running());
    assert_eq!(state.search.settings().min_query_length, 2);
    assert!(!std::path::Path::new(&state.config.general.data_dir).exists());
}

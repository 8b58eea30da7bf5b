//! Application context - wires store, cache and saga together

use crate::config::AppConfig;
use ledger_cache::{CachedLedger, MemoryCache};
use ledger_core::SharedLedger;
use ledger_saga::{SagaConsumer, SagaParticipant};
use ledger_store::SqliteLedger;
use std::path::PathBuf;
use std::sync::Arc;

pub struct AppContext {
    pub config: AppConfig,
    /// What callers use: cached when the cache is enabled, the bare store otherwise
    pub ledger: SharedLedger,
    store: Arc<SqliteLedger>,
}

impl AppContext {
    pub async fn new(config: AppConfig) -> anyhow::Result<Self> {
        if let Some(dir) = database_dir(&config.store.database_url) {
            std::fs::create_dir_all(&dir)?;
        }

        let store = Arc::new(SqliteLedger::connect(&config.store).await?);
        let ledger: SharedLedger = if config.cache.enabled {
            let cache = Arc::new(MemoryCache::new());
            Arc::new(CachedLedger::new(store.clone(), cache, config.cache.clone()))
        } else {
            store.clone()
        };

        tracing::info!(
            database_url = %config.store.database_url,
            cache_enabled = config.cache.enabled,
            "ledger ready"
        );

        Ok(Self {
            config,
            ledger,
            store,
        })
    }

    /// The uncached store, for maintenance paths that must see committed state
    pub fn store(&self) -> &Arc<SqliteLedger> {
        &self.store
    }

    pub fn saga_consumer(&self) -> SagaConsumer {
        SagaConsumer::new(SagaParticipant::new(self.ledger.clone()))
    }
}

/// Parent directory of a file-backed SQLite URL, if it has one
fn database_dir(url: &str) -> Option<PathBuf> {
    let path = url
        .strip_prefix("sqlite://")
        .or_else(|| url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    PathBuf::from(path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(|p| p.to_path_buf())
}

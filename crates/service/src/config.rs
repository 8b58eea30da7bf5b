//! Application configuration
//!
//! A JSON file supplies the base values; a couple of environment variables
//! override them so deployments can repoint the database without editing
//! the file.

use ledger_cache::CacheConfig;
use ledger_store::StoreConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Overrides `store.database_url`
pub const ENV_DATABASE_URL: &str = "LEDGER_DATABASE_URL";
/// Overrides `cache.enabled` (`true`/`false`/`1`/`0`)
pub const ENV_CACHE_ENABLED: &str = "LEDGER_CACHE_ENABLED";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

impl AppConfig {
    /// Load from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("cannot read config {}: {e}", path.display()))?;
        let config = serde_json::from_str(&raw)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {e}", path.display()))?;
        Ok(config)
    }

    /// File (or defaults), then environment overrides, then validation
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env()?;
        config.store.validate()?;
        Ok(config)
    }

    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<()> {
        if let Some(url) = lookup(ENV_DATABASE_URL) {
            self.store.database_url = url;
        }
        if let Some(flag) = lookup(ENV_CACHE_ENABLED) {
            self.cache.enabled = parse_flag(&flag)
                .ok_or_else(|| anyhow::anyhow!("{ENV_CACHE_ENABLED} must be a boolean, got {flag:?}"))?;
        }
        Ok(())
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

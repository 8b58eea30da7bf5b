//! Cache configuration
//!
//! TTLs follow staleness tolerance: single accounts live longest, the
//! privileged all-accounts listing shortest.

use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false the ledger is served without a cache
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Point lookups by id or account number
    #[serde(default = "default_account_ttl_secs")]
    pub account_ttl_secs: u64,

    /// A user's account pages
    #[serde(default = "default_user_list_ttl_secs")]
    pub user_list_ttl_secs: u64,

    /// Active-account directory
    #[serde(default = "default_active_list_ttl_secs")]
    pub active_list_ttl_secs: u64,

    /// All-accounts pages
    #[serde(default = "default_all_list_ttl_secs")]
    pub all_list_ttl_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_account_ttl_secs() -> u64 {
    300 // 5 minutes
}

fn default_user_list_ttl_secs() -> u64 {
    120
}

fn default_active_list_ttl_secs() -> u64 {
    60
}

fn default_all_list_ttl_secs() -> u64 {
    30
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            account_ttl_secs: default_account_ttl_secs(),
            user_list_ttl_secs: default_user_list_ttl_secs(),
            active_list_ttl_secs: default_active_list_ttl_secs(),
            all_list_ttl_secs: default_all_list_ttl_secs(),
        }
    }
}

impl CacheConfig {
    pub fn account_ttl(&self) -> Duration {
        Duration::from_secs(self.account_ttl_secs)
    }

    pub fn user_list_ttl(&self) -> Duration {
        Duration::from_secs(self.user_list_ttl_secs)
    }

    pub fn active_list_ttl(&self) -> Duration {
        Duration::from_secs(self.active_list_ttl_secs)
    }

    pub fn all_list_ttl(&self) -> Duration {
        Duration::from_secs(self.all_list_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_ttls_ordered_by_staleness_tolerance() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert!(config.account_ttl() > config.user_list_ttl());
        assert!(config.user_list_ttl() > config.active_list_ttl());
        assert!(config.active_list_ttl() > config.all_list_ttl());
    }

    #[test]
    fn test_config_partial_json() {
        let config: CacheConfig = serde_json::from_str(r#"{ "enabled": false }"#).unwrap();
        assert!(!config.enabled);
        assert_eq!(config.account_ttl_secs, 300);
    }
}

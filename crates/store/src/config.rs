//! Store configuration
//!
//! Every field has a serde default, so a partial JSON document is enough.

use crate::error::{StoreError, StoreResult};
use ledger_core::limits::DEFAULT_DAILY_WITHDRAWAL_LIMIT;
use ledger_core::number::{validate_prefix, DEFAULT_ROUTING_PREFIX};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// SQLite database URL
    #[serde(default = "default_database_url")]
    pub database_url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// How long a caller waits for a pooled connection
    #[serde(default = "default_acquire_timeout_ms")]
    pub acquire_timeout_ms: u64,

    /// How long a transaction waits for a row lock held by another
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,

    /// Savings withdrawal ceiling per calendar day
    #[serde(default = "default_daily_withdrawal_limit")]
    pub daily_withdrawal_limit: Decimal,

    /// 4-digit routing prefix of generated account numbers
    #[serde(default = "default_account_number_prefix")]
    pub account_number_prefix: String,

    /// Insert attempts before giving up on account number collisions
    #[serde(default = "default_account_number_attempts")]
    pub account_number_attempts: u32,
}

fn default_database_url() -> String {
    "sqlite:data/ledger.db?mode=rwc".to_string()
}

fn default_max_connections() -> u32 {
    5
}

fn default_acquire_timeout_ms() -> u64 {
    5_000
}

fn default_busy_timeout_ms() -> u64 {
    5_000
}

fn default_daily_withdrawal_limit() -> Decimal {
    DEFAULT_DAILY_WITHDRAWAL_LIMIT
}

fn default_account_number_prefix() -> String {
    DEFAULT_ROUTING_PREFIX.to_string()
}

fn default_account_number_attempts() -> u32 {
    3
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database_url: default_database_url(),
            max_connections: default_max_connections(),
            acquire_timeout_ms: default_acquire_timeout_ms(),
            busy_timeout_ms: default_busy_timeout_ms(),
            daily_withdrawal_limit: default_daily_withdrawal_limit(),
            account_number_prefix: default_account_number_prefix(),
            account_number_attempts: default_account_number_attempts(),
        }
    }
}

impl StoreConfig {
    /// Config pointing at a database file, created on first connect
    pub fn for_path(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            ..Self::default()
        }
    }

    pub fn validate(&self) -> StoreResult<()> {
        validate_prefix(&self.account_number_prefix)
            .map_err(|e| StoreError::Configuration(e.to_string()))?;
        if self.max_connections == 0 {
            return Err(StoreError::Configuration(
                "max_connections must be at least 1".to_string(),
            ));
        }
        if self.account_number_attempts == 0 {
            return Err(StoreError::Configuration(
                "account_number_attempts must be at least 1".to_string(),
            ));
        }
        if self.daily_withdrawal_limit <= Decimal::ZERO {
            return Err(StoreError::Configuration(
                "daily_withdrawal_limit must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

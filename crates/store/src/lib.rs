//! # Ledger Store
//!
//! The authoritative account ledger on SQLite (sqlx).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledger_core::{AccountLedger, AccountType};
//! use ledger_store::{SqliteLedger, StoreConfig};
//!
//! let ledger = SqliteLedger::connect(&StoreConfig::for_path("ledger.db")).await?;
//! let account = ledger.create(user_id, AccountType::Savings, None).await?;
//! ledger.deposit(account.id, dec!(100)).await?;
//! ```

pub mod config;
pub mod error;
pub mod schema;
pub mod store;

pub use config::StoreConfig;
pub use error::{StoreError, StoreResult};
pub use schema::AccountRow;
pub use store::{create_pool, run_migrations, SqliteLedger};

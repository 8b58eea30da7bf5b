//! # Ledger Cache
//!
//! Cache-aside layer for the account ledger.
//!
//! [`CachedLedger`] implements the same [`ledger_core::AccountLedger`]
//! contract as the store it wraps, so callers cannot tell the two apart
//! except by latency.

pub mod cache;
pub mod cached;
pub mod config;
pub mod error;
pub mod keys;
pub mod memory;

pub use cache::{Cache, CacheExt};
pub use cached::CachedLedger;
pub use config::CacheConfig;
pub use error::{CacheError, CacheResult};
pub use memory::MemoryCache;

//! Ledger Service - composition root
//!
//! Builds the ledger from configuration and exposes the commands the
//! `ledgerd` binary dispatches to.

pub mod commands;
pub mod config;
pub mod context;

pub use config::AppConfig;
pub use context::AppContext;

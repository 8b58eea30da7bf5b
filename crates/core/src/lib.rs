//! # Ledger Core
//!
//! Domain types for the account ledger:
//!
//! - [`Account`] with its [`AccountType`] and [`AccountStatus`]
//! - [`LedgerError`], the typed failure kinds of every operation
//! - [`AccountLedger`], the contract implemented by the store and the cache layer
//! - request/response shapes in [`dto`] and broker messages in [`event`]
//! - the savings daily limit ([`limits`]) and account number generation ([`number`])

pub mod account;
pub mod clock;
pub mod dto;
pub mod error;
pub mod event;
pub mod ledger;
pub mod limits;
pub mod number;

pub use account::{Account, AccountStatus, AccountType, DEFAULT_CURRENCY};
pub use clock::{Clock, FixedClock, SystemClock};
pub use dto::{AccountPage, Page};
pub use error::{LedgerError, LedgerResult};
pub use event::{PaymentRequested, PaymentResult, ResultStatus, TransferRequested, TransferResult};
pub use ledger::{AccountLedger, SharedLedger};
pub use limits::{DailyWithdrawal, DEFAULT_DAILY_WITHDRAWAL_LIMIT};

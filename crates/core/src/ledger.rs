//! The operation contract shared by the ledger store and its cache layer.

use crate::account::{Account, AccountStatus, AccountType};
use crate::dto::{AccountPage, Page};
use crate::error::LedgerResult;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use uuid::Uuid;

/// Account ledger operations.
///
/// Implementations must make every money-moving call atomic: on error,
/// no balance or limit bookkeeping has changed. Dropping the returned
/// future aborts the call with the same guarantee.
#[async_trait]
pub trait AccountLedger: Send + Sync {
    /// Opens an `active` account with zero balance.
    async fn create(
        &self,
        user_id: Uuid,
        account_type: AccountType,
        currency: Option<&str>,
    ) -> LedgerResult<Account>;

    async fn get_by_id(&self, id: Uuid) -> LedgerResult<Account>;

    async fn get_by_account_number(&self, number: &str) -> LedgerResult<Account>;

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> LedgerResult<AccountPage>;

    /// All active accounts ordered by account number (transfer directory)
    async fn list_all_active(&self) -> LedgerResult<AccountPage>;

    /// Every account regardless of owner or status
    async fn list_all(&self, page: Page) -> LedgerResult<AccountPage>;

    /// Sets the status with no transition rules applied.
    async fn update_status(&self, id: Uuid, status: AccountStatus) -> LedgerResult<Account>;

    /// Soft-deletes the account by moving it to `closed`.
    async fn close(&self, id: Uuid) -> LedgerResult<()>;

    async fn deposit(&self, id: Uuid, amount: Decimal) -> LedgerResult<Account>;

    async fn withdraw(&self, id: Uuid, amount: Decimal) -> LedgerResult<Account>;

    async fn transfer(&self, from_id: Uuid, to_id: Uuid, amount: Decimal) -> LedgerResult<()>;
}

/// Shared handle used by consumers of the ledger
pub type SharedLedger = Arc<dyn AccountLedger>;

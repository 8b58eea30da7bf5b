//! Cache-aside decorator over any [`AccountLedger`].
//!
//! Reads try the cache first and fall back to the inner ledger, populating
//! the cache on the way out. Writes always go to the inner ledger first and
//! then invalidate every cached view of the touched accounts. A failing
//! cache only costs performance: its errors are logged and treated as
//! misses.

use crate::cache::{Cache, CacheExt};
use crate::config::CacheConfig;
use crate::keys;
use async_trait::async_trait;
use ledger_core::{
    Account, AccountLedger, AccountPage, AccountStatus, AccountType, LedgerResult, Page,
    SharedLedger,
};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct CachedLedger {
    inner: SharedLedger,
    cache: Arc<dyn Cache>,
    config: CacheConfig,
}

impl CachedLedger {
    pub fn new(inner: SharedLedger, cache: Arc<dyn Cache>, config: CacheConfig) -> Self {
        Self {
            inner,
            cache,
            config,
        }
    }

    pub fn inner(&self) -> &SharedLedger {
        &self.inner
    }

    async fn read_through<T, F, Fut>(&self, key: &str, ttl: Duration, load: F) -> LedgerResult<T>
    where
        T: Serialize + DeserializeOwned + Send + Sync + 'static,
        F: FnOnce() -> Fut + Send,
        Fut: Future<Output = LedgerResult<T>> + Send,
    {
        match self.cache.get_json::<T>(key).await {
            Ok(Some(value)) => {
                tracing::debug!(key, "cache hit");
                return Ok(value);
            }
            Ok(None) => tracing::debug!(key, "cache miss"),
            Err(e) => tracing::warn!(key, "cache read failed, falling back to store: {e}"),
        }

        let value = load().await?;
        if let Err(e) = self.cache.set_json(key, &value, ttl).await {
            tracing::warn!(key, "cache write failed: {e}");
        }
        Ok(value)
    }

    /// Drops every cached view that may contain one of `accounts`
    async fn invalidate(&self, accounts: &[&Account]) {
        let mut point_keys = vec![keys::ACTIVE_ACCOUNTS.to_string()];
        let mut patterns = vec![keys::ALL_ACCOUNTS_PATTERN.to_string()];
        for account in accounts {
            point_keys.push(keys::account_by_id(account.id));
            point_keys.push(keys::account_by_number(&account.account_number));
            let pattern = keys::user_accounts_pattern(account.user_id);
            if !patterns.contains(&pattern) {
                patterns.push(pattern);
            }
        }

        self.delete_keys(&point_keys).await;
        for pattern in &patterns {
            match self.cache.delete_pattern(pattern).await {
                Ok(removed) => tracing::debug!(pattern = %pattern, removed, "cache pages invalidated"),
                Err(e) => tracing::warn!(pattern = %pattern, "cache pattern invalidation failed: {e}"),
            }
        }
    }

    async fn delete_keys(&self, keys: &[String]) {
        if let Err(e) = self.cache.delete(keys).await {
            tracing::warn!(count = keys.len(), "cache invalidation failed: {e}");
        }
    }
}

#[async_trait]
impl AccountLedger for CachedLedger {
    async fn create(
        &self,
        user_id: Uuid,
        account_type: AccountType,
        currency: Option<&str>,
    ) -> LedgerResult<Account> {
        let account = self.inner.create(user_id, account_type, currency).await?;
        self.invalidate(&[&account]).await;
        Ok(account)
    }

    async fn get_by_id(&self, id: Uuid) -> LedgerResult<Account> {
        let key = keys::account_by_id(id);
        self.read_through(&key, self.config.account_ttl(), || self.inner.get_by_id(id))
            .await
    }

    async fn get_by_account_number(&self, number: &str) -> LedgerResult<Account> {
        let key = keys::account_by_number(number);
        self.read_through(&key, self.config.account_ttl(), || {
            self.inner.get_by_account_number(number)
        })
        .await
    }

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> LedgerResult<AccountPage> {
        let page = page.normalized();
        let key = keys::user_accounts(user_id, page);
        self.read_through(&key, self.config.user_list_ttl(), || {
            self.inner.list_by_user(user_id, page)
        })
        .await
    }

    async fn list_all_active(&self) -> LedgerResult<AccountPage> {
        self.read_through(keys::ACTIVE_ACCOUNTS, self.config.active_list_ttl(), || {
            self.inner.list_all_active()
        })
        .await
    }

    async fn list_all(&self, page: Page) -> LedgerResult<AccountPage> {
        let page = page.normalized();
        let key = keys::all_accounts(page);
        self.read_through(&key, self.config.all_list_ttl(), || self.inner.list_all(page))
            .await
    }

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> LedgerResult<Account> {
        let account = self.inner.update_status(id, status).await?;
        self.invalidate(&[&account]).await;
        Ok(account)
    }

    async fn close(&self, id: Uuid) -> LedgerResult<()> {
        // Close does not return the record, so read it first for its number and owner.
        let existing = self.inner.get_by_id(id).await?;
        self.inner.close(id).await?;
        self.invalidate(&[&existing]).await;
        Ok(())
    }

    async fn deposit(&self, id: Uuid, amount: Decimal) -> LedgerResult<Account> {
        let account = self.inner.deposit(id, amount).await?;
        self.invalidate(&[&account]).await;
        Ok(account)
    }

    async fn withdraw(&self, id: Uuid, amount: Decimal) -> LedgerResult<Account> {
        let account = self.inner.withdraw(id, amount).await?;
        self.invalidate(&[&account]).await;
        Ok(account)
    }

    async fn transfer(&self, from_id: Uuid, to_id: Uuid, amount: Decimal) -> LedgerResult<()> {
        self.inner.transfer(from_id, to_id, amount).await?;

        let mut touched = Vec::with_capacity(2);
        for id in [from_id, to_id] {
            match self.inner.get_by_id(id).await {
                Ok(account) => touched.push(account),
                Err(e) => {
                    tracing::warn!(account_id = %id, "re-read after transfer failed: {e}");
                    self.delete_keys(&[keys::account_by_id(id)]).await;
                }
            }
        }
        let refs: Vec<&Account> = touched.iter().collect();
        self.invalidate(&refs).await;
        Ok(())
    }
}

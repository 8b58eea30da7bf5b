//! SQLite-backed ledger store.
//!
//! Money-moving operations follow one pattern: open a transaction, lock the
//! affected rows, validate against the locked state, write, commit. Any
//! early return drops the transaction, which rolls it back.
//!
//! SQLite has no `SELECT ... FOR UPDATE`. A row is locked by making the
//! first statement of the transaction a no-op `UPDATE ... RETURNING *`,
//! which takes the database write lock and hands back the row as it stands
//! under that lock. Concurrent writers wait up to `busy_timeout`.

use crate::config::StoreConfig;
use crate::error::{StoreError, StoreResult};
use crate::schema::AccountRow;
use async_trait::async_trait;
use chrono::Utc;
use ledger_core::dto::{validate_amount, validate_currency};
use ledger_core::limits::check_daily_limit;
use ledger_core::number::generate_account_number;
use ledger_core::{
    Account, AccountLedger, AccountPage, AccountStatus, AccountType, Clock, LedgerError,
    LedgerResult, Page, SystemClock, DEFAULT_CURRENCY,
};
use rust_decimal::Decimal;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{SqliteConnection, SqlitePool};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

/// Opens a connection pool for the configured database
pub async fn create_pool(config: &StoreConfig) -> StoreResult<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(config.busy_timeout());

    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.acquire_timeout())
        .connect_with(options)
        .await?;
    Ok(pool)
}

/// Applies the embedded schema migrations
pub async fn run_migrations(pool: &SqlitePool) -> StoreResult<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// The account ledger on SQLite.
pub struct SqliteLedger {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
    daily_limit: Decimal,
    number_prefix: String,
    number_attempts: u32,
}

impl SqliteLedger {
    /// Connects, migrates, and returns a ready store
    pub async fn connect(config: &StoreConfig) -> StoreResult<Self> {
        config.validate()?;
        let pool = create_pool(config).await?;
        run_migrations(&pool).await?;
        tracing::info!(url = %config.database_url, "ledger store ready");
        Ok(Self::new(pool, config))
    }

    /// Wraps an existing, already migrated pool
    pub fn new(pool: SqlitePool, config: &StoreConfig) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
            daily_limit: config.daily_withdrawal_limit,
            number_prefix: config.account_number_prefix.clone(),
            number_attempts: config.account_number_attempts.max(1),
        }
    }

    /// Replaces the calendar used for daily limit accounting
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn daily_limit(&self) -> Decimal {
        self.daily_limit
    }

    // === Reads ===

    async fn fetch_by_id(&self, id: Uuid) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or(LedgerError::NotFound)?;
        Account::try_from(row)
    }

    async fn fetch_by_number(&self, number: &str) -> StoreResult<Account> {
        let row =
            sqlx::query_as::<_, AccountRow>("SELECT * FROM accounts WHERE account_number = ?")
                .bind(number)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(LedgerError::NotFound)?;
        Account::try_from(row)
    }

    async fn fetch_page_by_user(&self, user_id: Uuid, page: Page) -> StoreResult<AccountPage> {
        let page = page.normalized();
        let user = user_id.to_string();
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts WHERE user_id = ?")
            .bind(&user)
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM accounts WHERE user_id = ? ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
        )
        .bind(&user)
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await?;

        to_page(rows, total)
    }

    async fn fetch_active(&self) -> StoreResult<AccountPage> {
        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM accounts WHERE status = ? ORDER BY account_number",
        )
        .bind(AccountStatus::Active.as_str())
        .fetch_all(&self.pool)
        .await?;

        let total = rows.len() as i64;
        to_page(rows, total)
    }

    async fn fetch_page(&self, page: Page) -> StoreResult<AccountPage> {
        let page = page.normalized();
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM accounts")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query_as::<_, AccountRow>(
            "SELECT * FROM accounts ORDER BY created_at DESC, id LIMIT ? OFFSET ?",
        )
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await?;

        to_page(rows, total)
    }

    // === Lifecycle ===

    async fn insert_account(
        &self,
        user_id: Uuid,
        account_type: AccountType,
        currency: &str,
    ) -> StoreResult<Account> {
        validate_currency(currency)?;

        let mut attempt = 0;
        loop {
            attempt += 1;
            let number = generate_account_number(&self.number_prefix)?;
            match self.insert_row(user_id, account_type, currency, &number).await {
                Ok(account) => return Ok(account),
                Err(e) if e.is_account_number_conflict() => {
                    tracing::warn!(attempt, "account number collision, regenerating");
                    if attempt >= self.number_attempts {
                        return Err(StoreError::AccountNumberExhausted(attempt));
                    }
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn insert_row(
        &self,
        user_id: Uuid,
        account_type: AccountType,
        currency: &str,
        number: &str,
    ) -> StoreResult<Account> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO accounts (
                id, user_id, account_number, account_type, balance, currency, status,
                daily_withdrawal_used, last_withdrawal_date, created_at, updated_at
            )
            VALUES (?, ?, ?, ?, '0', ?, ?, '0', NULL, ?, ?)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4().to_string())
        .bind(user_id.to_string())
        .bind(number)
        .bind(account_type.as_str())
        .bind(currency)
        .bind(AccountStatus::Active.as_str())
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;
        Account::try_from(row)
    }

    async fn write_status(&self, id: Uuid, status: AccountStatus) -> StoreResult<Account> {
        let row = sqlx::query_as::<_, AccountRow>(
            "UPDATE accounts SET status = ?, updated_at = ? WHERE id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(Utc::now())
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await?
        .ok_or(LedgerError::NotFound)?;
        Account::try_from(row)
    }

    async fn mark_closed(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("UPDATE accounts SET status = ?, updated_at = ? WHERE id = ?")
            .bind(AccountStatus::Closed.as_str())
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::NotFound.into());
        }
        Ok(())
    }

    // === Money movement ===

    async fn apply_deposit(&self, id: Uuid, amount: Decimal) -> StoreResult<Account> {
        validate_amount(amount)?;

        let mut tx = self.pool.begin().await?;
        let mut account = lock_account(&mut tx, id).await?;
        account.ensure_active()?;

        account.credit(amount)?;
        account.updated_at = Utc::now();
        write_balance(&mut tx, &account).await?;
        tx.commit().await?;

        Ok(account)
    }

    async fn apply_withdrawal(&self, id: Uuid, amount: Decimal) -> StoreResult<Account> {
        validate_amount(amount)?;

        let mut tx = self.pool.begin().await?;
        let mut account = lock_account(&mut tx, id).await?;
        account.ensure_active()?;

        self.debit(&mut account, amount)?;
        write_balance(&mut tx, &account).await?;
        tx.commit().await?;

        Ok(account)
    }

    async fn apply_transfer(&self, from_id: Uuid, to_id: Uuid, amount: Decimal) -> StoreResult<()> {
        validate_amount(amount)?;
        if from_id == to_id {
            return Err(LedgerError::InvalidInput(
                "cannot transfer to the same account".to_string(),
            )
            .into());
        }

        let mut tx = self.pool.begin().await?;

        // Lower id first, whichever side it is on.
        let (first_id, second_id) = if from_id < to_id {
            (from_id, to_id)
        } else {
            (to_id, from_id)
        };
        let first = lock_account(&mut tx, first_id).await?;
        let second = lock_account(&mut tx, second_id).await?;
        let (mut source, mut destination) = if first.id == from_id {
            (first, second)
        } else {
            (second, first)
        };

        source.ensure_active()?;
        destination.ensure_can_receive()?;

        self.debit(&mut source, amount)?;
        destination.credit(amount)?;
        destination.updated_at = source.updated_at;

        write_balance(&mut tx, &source).await?;
        write_balance(&mut tx, &destination).await?;
        tx.commit().await?;

        Ok(())
    }

    /// Validates and applies a debit to a locked account, including the
    /// savings daily limit. Leaves `account` untouched on error.
    fn debit(&self, account: &mut Account, amount: Decimal) -> Result<(), LedgerError> {
        account.ensure_sufficient_funds(amount)?;
        let daily = check_daily_limit(account, self.clock.today(), amount, self.daily_limit)?;

        account.balance -= amount;
        if let Some(daily) = daily {
            account.daily_withdrawal_used = daily.used;
            account.last_withdrawal_date = Some(daily.date);
        }
        account.updated_at = Utc::now();
        Ok(())
    }
}

/// Locks an account row for the rest of the transaction and returns it.
async fn lock_account(conn: &mut SqliteConnection, id: Uuid) -> StoreResult<Account> {
    let row = sqlx::query_as::<_, AccountRow>(
        "UPDATE accounts SET updated_at = updated_at WHERE id = ? RETURNING *",
    )
    .bind(id.to_string())
    .fetch_optional(&mut *conn)
    .await?
    .ok_or(LedgerError::NotFound)?;
    Account::try_from(row)
}

async fn write_balance(conn: &mut SqliteConnection, account: &Account) -> StoreResult<()> {
    sqlx::query(
        r#"
        UPDATE accounts
        SET balance = ?, daily_withdrawal_used = ?, last_withdrawal_date = ?, updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(account.balance.to_string())
    .bind(account.daily_withdrawal_used.to_string())
    .bind(account.last_withdrawal_date)
    .bind(account.updated_at)
    .bind(account.id.to_string())
    .execute(&mut *conn)
    .await?;
    Ok(())
}

fn to_page(rows: Vec<AccountRow>, total: i64) -> StoreResult<AccountPage> {
    let accounts = rows
        .into_iter()
        .map(Account::try_from)
        .collect::<StoreResult<Vec<_>>>()?;
    Ok(AccountPage { accounts, total })
}

/// Converts a store result for callers, logging by severity
fn finish<T>(op: &'static str, result: StoreResult<T>) -> LedgerResult<T> {
    result.map_err(|err| {
        let err = LedgerError::from(err);
        if err.is_business_rule() {
            tracing::debug!(op, code = err.code(), "rejected: {err}");
        } else {
            tracing::error!(op, "store failure: {err}");
        }
        err
    })
}

#[async_trait]
impl AccountLedger for SqliteLedger {
    async fn create(
        &self,
        user_id: Uuid,
        account_type: AccountType,
        currency: Option<&str>,
    ) -> LedgerResult<Account> {
        let currency = currency.unwrap_or(DEFAULT_CURRENCY);
        let account = finish(
            "create",
            self.insert_account(user_id, account_type, currency).await,
        )?;
        tracing::info!(
            account_id = %account.id,
            user_id = %user_id,
            account_type = %account_type,
            "account created"
        );
        Ok(account)
    }

    async fn get_by_id(&self, id: Uuid) -> LedgerResult<Account> {
        finish("get_by_id", self.fetch_by_id(id).await)
    }

    async fn get_by_account_number(&self, number: &str) -> LedgerResult<Account> {
        finish("get_by_account_number", self.fetch_by_number(number).await)
    }

    async fn list_by_user(&self, user_id: Uuid, page: Page) -> LedgerResult<AccountPage> {
        finish("list_by_user", self.fetch_page_by_user(user_id, page).await)
    }

    async fn list_all_active(&self) -> LedgerResult<AccountPage> {
        finish("list_all_active", self.fetch_active().await)
    }

    async fn list_all(&self, page: Page) -> LedgerResult<AccountPage> {
        finish("list_all", self.fetch_page(page).await)
    }

    async fn update_status(&self, id: Uuid, status: AccountStatus) -> LedgerResult<Account> {
        let account = finish("update_status", self.write_status(id, status).await)?;
        tracing::info!(account_id = %id, status = %status, "account status updated");
        Ok(account)
    }

    async fn close(&self, id: Uuid) -> LedgerResult<()> {
        finish("close", self.mark_closed(id).await)?;
        tracing::info!(account_id = %id, "account closed");
        Ok(())
    }

    async fn deposit(&self, id: Uuid, amount: Decimal) -> LedgerResult<Account> {
        let account = finish("deposit", self.apply_deposit(id, amount).await)?;
        tracing::info!(account_id = %id, amount = %amount, balance = %account.balance, "deposit applied");
        Ok(account)
    }

    async fn withdraw(&self, id: Uuid, amount: Decimal) -> LedgerResult<Account> {
        let account = finish("withdraw", self.apply_withdrawal(id, amount).await)?;
        tracing::info!(account_id = %id, amount = %amount, balance = %account.balance, "withdrawal applied");
        Ok(account)
    }

    async fn transfer(&self, from_id: Uuid, to_id: Uuid, amount: Decimal) -> LedgerResult<()> {
        finish("transfer", self.apply_transfer(from_id, to_id, amount).await)?;
        tracing::info!(from = %from_id, to = %to_id, amount = %amount, "transfer applied");
        Ok(())
    }
}

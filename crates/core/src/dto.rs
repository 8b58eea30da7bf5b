//! Request and response shapes shared with the transport layer.
//!
//! Requests deserialize from JSON and are checked with `validate()` before
//! reaching the ledger. Responses are plain views over [`Account`].

use crate::account::{Account, AccountStatus, AccountType, DEFAULT_CURRENCY};
use crate::error::LedgerError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

/// Request to open an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    pub account_type: AccountType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl CreateAccountRequest {
    pub fn validate(&self) -> Result<(), LedgerError> {
        if let Some(currency) = &self.currency {
            validate_currency(currency)?;
        }
        Ok(())
    }

    /// Currency to open the account in, falling back to USD
    pub fn currency_or_default(&self) -> &str {
        self.currency.as_deref().unwrap_or(DEFAULT_CURRENCY)
    }
}

/// Checks an ISO-4217-style code: exactly three ASCII uppercase letters
pub fn validate_currency(currency: &str) -> Result<(), LedgerError> {
    if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_uppercase()) {
        return Err(LedgerError::InvalidInput(format!(
            "currency must be a 3-letter code: {currency:?}"
        )));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: AccountStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepositRequest {
    pub amount: Decimal,
}

impl DepositRequest {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_amount(self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WithdrawRequest {
    pub amount: Decimal,
}

impl WithdrawRequest {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_amount(self.amount)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: Decimal,
}

impl TransferRequest {
    pub fn validate(&self) -> Result<(), LedgerError> {
        validate_amount(self.amount)?;
        if self.from_account_id == self.to_account_id {
            return Err(LedgerError::InvalidInput(
                "cannot transfer to the same account".to_string(),
            ));
        }
        Ok(())
    }
}

pub fn validate_amount(amount: Decimal) -> Result<(), LedgerError> {
    if amount <= Decimal::ZERO {
        return Err(LedgerError::InvalidAmount);
    }
    Ok(())
}

/// Balance view of an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceResponse {
    pub account_id: Uuid,
    pub account_number: String,
    pub balance: Decimal,
    pub currency: String,
    pub status: AccountStatus,
}

impl From<&Account> for BalanceResponse {
    fn from(account: &Account) -> Self {
        Self {
            account_id: account.id,
            account_number: account.account_number.clone(),
            balance: account.balance,
            currency: account.currency.clone(),
            status: account.status,
        }
    }
}

/// Pagination window, clamped to sane bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Page {
    #[serde(default = "default_limit")]
    pub limit: u32,
    #[serde(default)]
    pub offset: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Page {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self {
            limit: limit.clamp(1, MAX_PAGE_LIMIT),
            offset,
        }
    }

    /// Re-applies the limit bounds after deserialization
    pub fn normalized(self) -> Self {
        Self::new(self.limit, self.offset)
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_LIMIT, 0)
    }
}

/// A window of accounts plus the total matching count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountPage {
    pub accounts: Vec<Account>,
    pub total: i64,
}

/// Paginated list response for the transport layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountListResponse {
    pub accounts: Vec<Account>,
    pub total: i64,
    pub limit: u32,
    pub offset: u32,
}

impl AccountListResponse {
    pub fn new(page: AccountPage, window: Page) -> Self {
        Self {
            accounts: page.accounts,
            total: page.total,
            limit: window.limit,
            offset: window.offset,
        }
    }
}

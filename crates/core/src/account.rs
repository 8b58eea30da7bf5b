//! # Account Module
//!
//! The ledger's single entity. An account carries one balance column and
//! the bookkeeping needed for the savings daily withdrawal limit.

use crate::error::LedgerError;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Default currency when none is given at creation
pub const DEFAULT_CURRENCY: &str = "USD";

/// Kind of account. Fixed at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    Checking,
    /// Subject to the daily withdrawal limit
    Savings,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Checking => "checking",
            AccountType::Savings => "savings",
        }
    }

    pub fn has_daily_limit(&self) -> bool {
        matches!(self, AccountType::Savings)
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "checking" => Ok(AccountType::Checking),
            "savings" => Ok(AccountType::Savings),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown account type: {other}"
            ))),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Account status.
///
/// `Active` ⇄ `Frozen`, and either may move to `Closed`, which is terminal.
/// Money only moves on `Active` accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Frozen,
    Closed,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Frozen => "frozen",
            AccountStatus::Closed => "closed",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "frozen" => Ok(AccountStatus::Frozen),
            "closed" => Ok(AccountStatus::Closed),
            other => Err(LedgerError::InvalidInput(format!(
                "unknown account status: {other}"
            ))),
        }
    }
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A ledger account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    /// Owning user. Not checked against the user service.
    pub user_id: Uuid,
    /// 4-digit routing prefix followed by 12 random digits
    pub account_number: String,
    pub account_type: AccountType,
    pub balance: Decimal,
    pub currency: String,
    pub status: AccountStatus,
    /// Withdrawals accumulated on `last_withdrawal_date` (savings only)
    pub daily_withdrawal_used: Decimal,
    pub last_withdrawal_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Checks that money may leave or enter this account.
    pub fn ensure_active(&self) -> Result<(), LedgerError> {
        match self.status {
            AccountStatus::Active => Ok(()),
            AccountStatus::Frozen => Err(LedgerError::Frozen),
            AccountStatus::Closed => Err(LedgerError::Closed),
        }
    }

    /// Like [`Account::ensure_active`], reported from the receiving side of a transfer.
    pub fn ensure_can_receive(&self) -> Result<(), LedgerError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(LedgerError::DestinationUnavailable {
                status: self.status,
            })
        }
    }

    /// Adds `amount` to the balance, refusing a sum that does not fit in a `Decimal`.
    pub fn credit(&mut self, amount: Decimal) -> Result<(), LedgerError> {
        self.balance = self.balance.checked_add(amount).ok_or_else(|| {
            LedgerError::InvalidInput("amount overflows balance".to_string())
        })?;
        Ok(())
    }

    pub fn ensure_sufficient_funds(&self, amount: Decimal) -> Result<(), LedgerError> {
        if self.balance < amount {
            return Err(LedgerError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        Ok(())
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Account {} ({}, {}, {} {})",
            self.account_number, self.account_type, self.status, self.balance, self.currency
        )
    }
}

#[cfg(test)]
pub(crate) fn sample_account(account_type: AccountType, balance: Decimal) -> Account {
    let now = Utc::now();
    Account {
        id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        account_number: "4000123456789012".to_string(),
        account_type,
        balance,
        currency: DEFAULT_CURRENCY.to_string(),
        status: AccountStatus::Active,
        daily_withdrawal_used: Decimal::ZERO,
        last_withdrawal_date: None,
        created_at: now,
        updated_at: now,
    }
}

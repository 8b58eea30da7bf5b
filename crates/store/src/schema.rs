//! Row type for the `accounts` table and its conversion to the domain type.
//!
//! Schema lives in migrations/20260101000000_create_accounts.sql

use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, NaiveDate, Utc};
use ledger_core::Account;
use rust_decimal::Decimal;
use std::str::FromStr;
use uuid::Uuid;

/// Row type for table `accounts`
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRow {
    pub id: String,
    pub user_id: String,
    pub account_number: String,
    pub account_type: String,
    pub balance: String, // Decimal stored as TEXT
    pub currency: String,
    pub status: String,
    pub daily_withdrawal_used: String, // Decimal stored as TEXT
    pub last_withdrawal_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

fn parse_uuid(column: &'static str, value: &str) -> StoreResult<Uuid> {
    Uuid::parse_str(value).map_err(|_| StoreError::InvalidColumn {
        column,
        value: value.to_string(),
    })
}

fn parse_decimal(column: &'static str, value: &str) -> StoreResult<Decimal> {
    Decimal::from_str(value).map_err(|_| StoreError::InvalidDecimal {
        column,
        value: value.to_string(),
    })
}

impl TryFrom<AccountRow> for Account {
    type Error = StoreError;

    fn try_from(row: AccountRow) -> Result<Self, Self::Error> {
        Ok(Account {
            id: parse_uuid("id", &row.id)?,
            user_id: parse_uuid("user_id", &row.user_id)?,
            account_type: row.account_type.parse().map_err(|_| StoreError::InvalidColumn {
                column: "account_type",
                value: row.account_type.clone(),
            })?,
            status: row.status.parse().map_err(|_| StoreError::InvalidColumn {
                column: "status",
                value: row.status.clone(),
            })?,
            balance: parse_decimal("balance", &row.balance)?,
            daily_withdrawal_used: parse_decimal(
                "daily_withdrawal_used",
                &row.daily_withdrawal_used,
            )?,
            account_number: row.account_number,
            currency: row.currency,
            last_withdrawal_date: row.last_withdrawal_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledger_core::{AccountStatus, AccountType};
    use rust_decimal_macros::dec;

    fn row() -> AccountRow {
        let now = Utc::now();
        AccountRow {
            id: Uuid::new_v4().to_string(),
            user_id: Uuid::new_v4().to_string(),
            account_number: "4000000000000001".to_string(),
            account_type: "savings".to_string(),
            balance: "1500.25".to_string(),
            currency: "EUR".to_string(),
            status: "frozen".to_string(),
            daily_withdrawal_used: "0".to_string(),
            last_withdrawal_date: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_row_conversion() {
        let account = Account::try_from(row()).unwrap();
        assert_eq!(account.account_type, AccountType::Savings);
        assert_eq!(account.status, AccountStatus::Frozen);
        assert_eq!(account.balance, dec!(1500.25));
        assert_eq!(account.currency, "EUR");
    }

    #[test]
    fn test_corrupt_row_rejected() {
        let mut bad = row();
        bad.balance = "lots".to_string();
        assert!(matches!(
            Account::try_from(bad),
            Err(StoreError::InvalidDecimal { column: "balance", .. })
        ));

        let mut bad = row();
        bad.status = "deleted".to_string();
        assert!(matches!(
            Account::try_from(bad),
            Err(StoreError::InvalidColumn { column: "status", .. })
        ));
    }
}

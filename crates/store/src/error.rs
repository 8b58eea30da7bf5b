//! # Store Errors
//!
//! Error types for the ledger store, wrapping sqlx errors. Everything that
//! is not a business rule leaves the store as `LedgerError::Internal`.

use ledger_core::LedgerError;
use thiserror::Error;

/// Ledger store errors
#[derive(Debug, Error)]
pub enum StoreError {
    // === Database errors ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    // === Conversion errors ===
    #[error("Invalid decimal value in column {column}: {value}")]
    InvalidDecimal { column: &'static str, value: String },

    #[error("Invalid value in column {column}: {value}")]
    InvalidColumn { column: &'static str, value: String },

    // === Configuration errors ===
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Could not allocate a unique account number after {0} attempts")]
    AccountNumberExhausted(u32),

    // === Business rules ===
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// Result type alias with StoreError
pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    /// True when an insert collided with an existing account number
    pub fn is_account_number_conflict(&self) -> bool {
        match self {
            Self::Database(sqlx::Error::Database(db)) => {
                db.is_unique_violation() && db.message().contains("account_number")
            }
            _ => false,
        }
    }
}

impl From<StoreError> for LedgerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Ledger(inner) => inner,
            other => LedgerError::internal(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_errors_pass_through() {
        let err: LedgerError = StoreError::Ledger(LedgerError::Frozen).into();
        assert_eq!(err, LedgerError::Frozen);
    }

    #[test]
    fn test_infrastructure_errors_become_internal() {
        let err: LedgerError = StoreError::Database(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.code(), "internal");

        let err: LedgerError = StoreError::InvalidDecimal {
            column: "balance",
            value: "abc".into(),
        }
        .into();
        assert!(err.to_string().contains("balance"));
    }

    #[test]
    fn test_conflict_detection_ignores_other_errors() {
        assert!(!StoreError::Database(sqlx::Error::RowNotFound).is_account_number_conflict());
        assert!(!StoreError::Ledger(LedgerError::NotFound).is_account_number_conflict());
    }
}

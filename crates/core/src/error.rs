//! # Error Module
//!
//! Domain errors for the account ledger, built with thiserror.
//!
//! Business-rule failures each get their own variant so the transport layer
//! can map them to precise responses. Infrastructure failures are folded
//! into [`LedgerError::Internal`].

use crate::account::AccountStatus;
use rust_decimal::Decimal;
use thiserror::Error;

/// Ledger errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    // === Lookup errors ===
    #[error("Account not found")]
    NotFound,

    // === Validation errors ===
    #[error("Amount must be positive")]
    InvalidAmount,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Account state errors ===
    #[error("Account is frozen")]
    Frozen,

    #[error("Account is closed")]
    Closed,

    /// The destination of a transfer is not active.
    ///
    /// Kept apart from [`LedgerError::Frozen`] / [`LedgerError::Closed`], which
    /// always describe the account being debited.
    #[error("Destination account is not available: {status}")]
    DestinationUnavailable { status: AccountStatus },

    // === Money errors ===
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        requested: Decimal,
        available: Decimal,
    },

    #[error("Daily withdrawal limit exceeded: limit {limit}, used {used}, requested {requested}")]
    WithdrawalLimitExceeded {
        limit: Decimal,
        used: Decimal,
        requested: Decimal,
    },

    // === Infrastructure ===
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias with LedgerError
pub type LedgerResult<T> = Result<T, LedgerError>;

impl LedgerError {
    /// Wrap any infrastructure failure as an opaque internal error
    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    /// Stable machine-readable code for this error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::InvalidAmount => "invalid_amount",
            Self::InvalidInput(_) => "invalid_input",
            Self::Frozen => "account_frozen",
            Self::Closed => "account_closed",
            Self::DestinationUnavailable { .. } => "destination_unavailable",
            Self::InsufficientFunds { .. } => "insufficient_funds",
            Self::WithdrawalLimitExceeded { .. } => "withdrawal_limit_exceeded",
            Self::Internal(_) => "internal",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }

    /// True for failures caused by a business rule rather than infrastructure
    pub fn is_business_rule(&self) -> bool {
        !matches!(self, Self::Internal(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_display() {
        let err = LedgerError::InsufficientFunds {
            requested: dec!(100),
            available: dec!(50),
        };
        assert_eq!(
            err.to_string(),
            "Insufficient funds: requested 100, available 50"
        );

        let err = LedgerError::DestinationUnavailable {
            status: AccountStatus::Frozen,
        };
        assert_eq!(
            err.to_string(),
            "Destination account is not available: frozen"
        );
    }

    #[test]
    fn test_error_codes_are_distinct() {
        let errors = [
            LedgerError::NotFound,
            LedgerError::InvalidAmount,
            LedgerError::InvalidInput("x".into()),
            LedgerError::Frozen,
            LedgerError::Closed,
            LedgerError::DestinationUnavailable {
                status: AccountStatus::Closed,
            },
            LedgerError::InsufficientFunds {
                requested: dec!(1),
                available: dec!(0),
            },
            LedgerError::WithdrawalLimitExceeded {
                limit: dec!(5000),
                used: dec!(3000),
                requested: dec!(3000),
            },
            LedgerError::Internal("db".into()),
        ];
        let mut codes: Vec<_> = errors.iter().map(|e| e.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), errors.len());
    }

    #[test]
    fn test_internal_is_not_business_rule() {
        assert!(!LedgerError::internal("connection reset").is_business_rule());
        assert!(LedgerError::Frozen.is_business_rule());
        assert!(LedgerError::NotFound.is_not_found());
    }
}

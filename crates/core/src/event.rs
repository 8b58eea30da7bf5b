//! # Event Module
//!
//! Messages exchanged with peer services (cards, payments) over the broker.
//! The ledger consumes `*Requested` events and answers with `*Result`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Outcome of a requested operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultStatus {
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferRequested {
    pub transfer_id: Uuid,
    pub reference_id: String,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferResult {
    pub transfer_id: Uuid,
    pub reference_id: String,
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub from_account_id: Uuid,
    pub to_account_id: Uuid,
    /// Unknown when the source account does not exist
    pub from_user_id: Option<Uuid>,
    pub to_user_id: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentRequested {
    pub payment_id: Uuid,
    pub reference_id: String,
    pub account_id: Uuid,
    pub user_id: Uuid,
    pub payment_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_account: Option<String>,
    pub amount: Decimal,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentResult {
    pub payment_id: Uuid,
    pub reference_id: String,
    pub status: ResultStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,
    pub account_id: Uuid,
    pub user_id: Uuid,
}

impl TransferResult {
    pub fn is_completed(&self) -> bool {
        self.status == ResultStatus::Completed
    }
}

impl PaymentResult {
    pub fn is_completed(&self) -> bool {
        self.status == ResultStatus::Completed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_payment_requested_optional_fields() {
        let json = r#"{
            "payment_id": "6f1c3b7e-2f0a-4c1b-9d55-7a0c2f9b8e11",
            "reference_id": "PAY-1001",
            "account_id": "0b8f2d8c-5b3e-4a47-8f0e-3c9d6f4b1a22",
            "user_id": "a1d4c6e8-7b9f-4e2d-8c1a-5f3b7d9e0c33",
            "payment_type": "bill",
            "amount": "49.99",
            "currency": "USD"
        }"#;
        let event: PaymentRequested = serde_json::from_str(json).unwrap();
        assert_eq!(event.amount, dec!(49.99));
        assert!(event.recipient_name.is_none());
    }

    #[test]
    fn test_result_status_wire_format() {
        let result = TransferResult {
            transfer_id: Uuid::nil(),
            reference_id: "TRX-1".into(),
            status: ResultStatus::Failed,
            failure_reason: Some("insufficient_funds".into()),
            from_account_id: Uuid::nil(),
            to_account_id: Uuid::nil(),
            from_user_id: None,
            to_user_id: None,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["failure_reason"], "insufficient_funds");
        assert!(!result.is_completed());
    }
}

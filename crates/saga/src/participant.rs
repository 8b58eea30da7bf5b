//! Local step of the cross-service transfer and payment sagas.
//!
//! Each request maps to one ledger call. The outcome, success or failure,
//! always comes back as a result event; nothing is retried here.

use ledger_core::{
    Account, LedgerError, PaymentRequested, PaymentResult, ResultStatus, SharedLedger,
    TransferRequested, TransferResult,
};

/// Failure reason when the request currency differs from an involved account's
pub const CURRENCY_MISMATCH: &str = "currency_mismatch";
/// Failure reason when a payment names an account the user does not own
pub const ACCOUNT_OWNER_MISMATCH: &str = "account_owner_mismatch";

pub struct SagaParticipant {
    ledger: SharedLedger,
}

impl SagaParticipant {
    pub fn new(ledger: SharedLedger) -> Self {
        Self { ledger }
    }

    pub async fn handle_transfer(&self, req: &TransferRequested) -> TransferResult {
        let source = self.ledger.get_by_id(req.from_account_id).await.ok();
        let destination = self.ledger.get_by_id(req.to_account_id).await.ok();

        // No conversion: both sides must already hold the request currency
        let mismatched = [&source, &destination]
            .into_iter()
            .flatten()
            .any(|account| account.currency != req.currency);

        let outcome = if mismatched {
            Err(CURRENCY_MISMATCH.to_string())
        } else {
            self.ledger
                .transfer(req.from_account_id, req.to_account_id, req.amount)
                .await
                .map_err(|e| failure_code(&e))
        };

        let (status, failure_reason) = split(outcome);
        match &failure_reason {
            None => tracing::info!(
                transfer_id = %req.transfer_id,
                reference_id = %req.reference_id,
                amount = %req.amount,
                "transfer completed"
            ),
            Some(reason) => tracing::warn!(
                transfer_id = %req.transfer_id,
                reference_id = %req.reference_id,
                reason = %reason,
                "transfer failed"
            ),
        }

        TransferResult {
            transfer_id: req.transfer_id,
            reference_id: req.reference_id.clone(),
            status,
            failure_reason,
            from_account_id: req.from_account_id,
            to_account_id: req.to_account_id,
            from_user_id: source.as_ref().map(|a| a.user_id),
            to_user_id: destination.as_ref().map(|a| a.user_id),
        }
    }

    pub async fn handle_payment(&self, req: &PaymentRequested) -> PaymentResult {
        let outcome = match self.ledger.get_by_id(req.account_id).await {
            Err(e) => Err(failure_code(&e)),
            Ok(account) => self.pay(&account, req).await,
        };

        let (status, failure_reason) = split(outcome);
        match &failure_reason {
            None => tracing::info!(
                payment_id = %req.payment_id,
                reference_id = %req.reference_id,
                payment_type = %req.payment_type,
                amount = %req.amount,
                "payment completed"
            ),
            Some(reason) => tracing::warn!(
                payment_id = %req.payment_id,
                reference_id = %req.reference_id,
                reason = %reason,
                "payment failed"
            ),
        }

        PaymentResult {
            payment_id: req.payment_id,
            reference_id: req.reference_id.clone(),
            status,
            failure_reason,
            account_id: req.account_id,
            user_id: req.user_id,
        }
    }

    async fn pay(&self, account: &Account, req: &PaymentRequested) -> Result<(), String> {
        if account.user_id != req.user_id {
            return Err(ACCOUNT_OWNER_MISMATCH.to_string());
        }
        if account.currency != req.currency {
            return Err(CURRENCY_MISMATCH.to_string());
        }
        self.ledger
            .withdraw(account.id, req.amount)
            .await
            .map(|_| ())
            .map_err(|e| failure_code(&e))
    }
}

fn failure_code(err: &LedgerError) -> String {
    err.code().to_string()
}

fn split(outcome: Result<(), String>) -> (ResultStatus, Option<String>) {
    match outcome {
        Ok(()) => (ResultStatus::Completed, None),
        Err(reason) => (ResultStatus::Failed, Some(reason)),
    }
}

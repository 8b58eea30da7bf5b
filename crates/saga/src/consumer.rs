//! In-process event consumer
//!
//! Inbound requests arrive on a tokio channel; each is applied in arrival
//! order and answered with exactly one result event on the outbound channel.
//! Transport adapters (a broker client, the stdin reader in `ledgerd`) only
//! need to feed and drain the two channels.

use crate::error::{SagaError, SagaResult};
use crate::participant::SagaParticipant;
use ledger_core::{PaymentRequested, PaymentResult, TransferRequested, TransferResult};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Request events addressed to the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundEvent {
    TransferRequested(TransferRequested),
    PaymentRequested(PaymentRequested),
}

impl InboundEvent {
    /// Parse one JSON-encoded event
    pub fn from_json(line: &str) -> SagaResult<Self> {
        Ok(serde_json::from_str(line)?)
    }

    pub fn reference_id(&self) -> &str {
        match self {
            InboundEvent::TransferRequested(e) => &e.reference_id,
            InboundEvent::PaymentRequested(e) => &e.reference_id,
        }
    }
}

/// Result events published back to the saga coordinators
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundEvent {
    TransferResult(TransferResult),
    PaymentResult(PaymentResult),
}

impl OutboundEvent {
    pub fn to_json(&self) -> SagaResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn is_completed(&self) -> bool {
        match self {
            OutboundEvent::TransferResult(r) => r.is_completed(),
            OutboundEvent::PaymentResult(r) => r.is_completed(),
        }
    }
}

pub struct SagaConsumer {
    participant: SagaParticipant,
}

impl SagaConsumer {
    pub fn new(participant: SagaParticipant) -> Self {
        Self { participant }
    }

    /// Apply one request and build its reply
    pub async fn handle(&self, event: &InboundEvent) -> OutboundEvent {
        match event {
            InboundEvent::TransferRequested(req) => {
                OutboundEvent::TransferResult(self.participant.handle_transfer(req).await)
            }
            InboundEvent::PaymentRequested(req) => {
                OutboundEvent::PaymentResult(self.participant.handle_payment(req).await)
            }
        }
    }

    /// Consume until the inbound channel closes.
    ///
    /// Returns the number of events processed. Fails only if the outbound
    /// side hangs up, since a result that cannot be delivered must not be
    /// silently dropped.
    pub async fn run(
        self,
        mut inbound: mpsc::Receiver<InboundEvent>,
        outbound: mpsc::Sender<OutboundEvent>,
    ) -> SagaResult<u64> {
        let mut processed = 0u64;
        while let Some(event) = inbound.recv().await {
            tracing::debug!(reference_id = %event.reference_id(), "saga event received");
            let reply = self.handle(&event).await;
            outbound
                .send(reply)
                .await
                .map_err(|_| SagaError::ChannelClosed)?;
            processed += 1;
        }
        tracing::info!(processed, "saga consumer stopped");
        Ok(processed)
    }

    pub fn spawn(
        self,
        inbound: mpsc::Receiver<InboundEvent>,
        outbound: mpsc::Sender<OutboundEvent>,
    ) -> JoinHandle<SagaResult<u64>> {
        tokio::spawn(self.run(inbound, outbound))
    }
}

//! # Ledger Saga
//!
//! The ledger's side of the distributed transfer and payment sagas.
//! [`SagaParticipant`] turns a request event into one ledger call and a
//! result event; [`SagaConsumer`] drives it from a channel.

pub mod consumer;
pub mod error;
pub mod participant;

pub use consumer::{InboundEvent, OutboundEvent, SagaConsumer};
pub use error::{SagaError, SagaResult};
pub use participant::{SagaParticipant, ACCOUNT_OWNER_MISMATCH, CURRENCY_MISMATCH};

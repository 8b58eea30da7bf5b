//! Saga consumer errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SagaError {
    #[error("Malformed event: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Channel closed")]
    ChannelClosed,
}

pub type SagaResult<T> = Result<T, SagaError>;

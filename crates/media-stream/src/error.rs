//! Stream error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StreamError {
    #[error("Stream acquisition failed: {0}")]
    AcquisitionFailed(String),

    #[error("Capture token rejected by platform: {0}")]
    TokenRejected(String),

    #[error("Requested constraints not satisfiable: {0}")]
    ConstraintsNotSatisfied(String),

    #[error("Platform error: {0}")]
    Platform(String),
}

pub type StreamResult<T> = Result<T, StreamError>;

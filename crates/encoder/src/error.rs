//! Encoder error types

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncoderError {
    #[error("Encoder construction failed: {0}")]
    InitFailed(String),

    #[error("No supported encoding format among preferences")]
    NoSupportedFormat,

    #[error("Encoding fault: {0}")]
    Fault(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type EncoderResult<T> = Result<T, EncoderError>;

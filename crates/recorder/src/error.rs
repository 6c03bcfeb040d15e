//! Session controller error types
//!
//! Every variant is terminal for its session and recoverable for the user:
//! none is retried automatically, none harms the authority or concurrent
//! sessions, and the caller may simply start a new session. The one
//! exception is `AlreadyStarted`, which indicates a programming error.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecorderError {
    #[error("Capture denied: {0}")]
    AuthorizationDenied(String),

    #[error("Capture authority unresponsive")]
    AuthorizationTimeout,

    #[error("No capture target available: {0}")]
    Unavailable(String),

    #[error("Failed to acquire media stream: {0}")]
    Acquisition(String),

    #[error("Recording stopped before capture started")]
    Aborted,

    #[error("Session already started")]
    AlreadyStarted,
}

pub type RecorderResult<T> = Result<T, RecorderError>;

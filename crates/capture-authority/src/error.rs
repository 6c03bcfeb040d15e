//! Authority error types

use thiserror::Error;

/// Error raised by the platform consent primitive itself.
///
/// A user cancelling the prompt is not an error; the prompt resolves with no
/// token in that case.
#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Consent prompt unavailable: {0}")]
    Unavailable(String),
}

/// Error on the request/response channel to the authority task
#[derive(Debug, Error)]
pub enum AuthorityError {
    #[error("Capture authority is not running")]
    Closed,

    #[error("Capture authority dropped the request")]
    Dropped,
}

pub type AuthorityResult<T> = Result<T, AuthorityError>;

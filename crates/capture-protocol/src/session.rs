//! Recording session vocabulary

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique recording session identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Recording session lifecycle state.
///
/// One tagged enum instead of scattered is-recording/is-paused/is-starting
/// flags, so impossible combinations cannot be represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecorderState {
    /// Initial state, nothing owned
    Idle,
    /// Authorization round trip in flight
    Authorizing,
    /// Exchanging the granted token for a live stream
    Acquiring,
    /// Encoder running, chunks accumulating
    Recording,
    /// Encoder and duration counter suspended, stream still owned
    Paused,
    /// One-shot cleanup: flush encoder, stop tracks, cancel ticker
    Finalizing,
    /// Artifact handed off, all handles released (terminal)
    Delivered,
    /// Unrecoverable error, all handles released (terminal)
    Failed,
}

impl RecorderState {
    /// Terminal states accept no further transitions
    pub fn is_terminal(&self) -> bool {
        matches!(self, RecorderState::Delivered | RecorderState::Failed)
    }

    /// States in which the session owns a live media stream
    pub fn owns_stream(&self) -> bool {
        matches!(
            self,
            RecorderState::Recording | RecorderState::Paused | RecorderState::Finalizing
        )
    }
}

impl std::fmt::Display for RecorderState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            RecorderState::Idle => "idle",
            RecorderState::Authorizing => "authorizing",
            RecorderState::Acquiring => "acquiring",
            RecorderState::Recording => "recording",
            RecorderState::Paused => "paused",
            RecorderState::Finalizing => "finalizing",
            RecorderState::Delivered => "delivered",
            RecorderState::Failed => "failed",
        };
        write!(f, "{name}")
    }
}

//! Capture handshake types
//!
//! A `CaptureRequest` travels from the session controller to the capture
//! authority; exactly one `CaptureOutcome` travels back. A granted outcome
//! carries a single-use `CaptureToken` which the controller exchanges for a
//! live media stream.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of capture source the user may pick from in the consent prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Entire screen
    Screen,
    /// A single application window
    Window,
    /// A single browser tab
    Tab,
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceKind::Screen => write!(f, "screen"),
            SourceKind::Window => write!(f, "window"),
            SourceKind::Tab => write!(f, "tab"),
        }
    }
}

/// Opaque handle to an addressable tab/window the capture is associated with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceId(pub Uuid);

impl SurfaceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SurfaceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which surface the capture should be bound to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurfaceTarget {
    /// Resolve whatever surface is currently in the foreground
    Active,
    /// An explicit surface
    Surface(SurfaceId),
}

impl Default for SurfaceTarget {
    fn default() -> Self {
        Self::Active
    }
}

/// Request for a capture authorization, immutable once sent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRequest {
    /// Source kinds offered in the consent prompt, in preference order
    pub source_kinds: Vec<SourceKind>,
    /// Surface the capture should be associated with
    pub target: SurfaceTarget,
}

impl CaptureRequest {
    pub fn new(source_kinds: Vec<SourceKind>, target: SurfaceTarget) -> Self {
        Self {
            source_kinds,
            target,
        }
    }

    /// The original's default offer: screen, window, or tab of the active surface
    pub fn any_source_of_active() -> Self {
        Self {
            source_kinds: vec![SourceKind::Screen, SourceKind::Window, SourceKind::Tab],
            target: SurfaceTarget::Active,
        }
    }
}

/// Single-use capture credential minted by the platform consent primitive.
///
/// Deliberately not `Clone`: the one legitimate consumer takes it by value,
/// so a second use does not typecheck.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureToken(String);

impl CaptureToken {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Consume the token, yielding the raw platform stream id
    pub fn into_stream_id(self) -> String {
        self.0
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Result of one authorization handshake, exactly one per request
#[derive(Debug, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// User picked a source; token is valid for one stream acquisition
    Granted(CaptureToken),
    /// User cancelled or the platform refused
    Denied(String),
    /// No eligible capture target could be resolved
    Unavailable(String),
}

impl CaptureOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, CaptureOutcome::Granted(_))
    }

    /// Failure reason, if any
    pub fn reason(&self) -> Option<&str> {
        match self {
            CaptureOutcome::Granted(_) => None,
            CaptureOutcome::Denied(reason) | CaptureOutcome::Unavailable(reason) => Some(reason),
        }
    }
}

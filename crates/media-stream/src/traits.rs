//! Desktop media trait abstraction

use async_trait::async_trait;
use capture_protocol::CaptureToken;
use tokio::sync::watch;

use crate::StreamResult;

/// Constraints applied when exchanging a token for a stream
#[derive(Debug, Clone)]
pub struct StreamConstraints {
    /// Capture system/tab audio alongside video
    pub audio: bool,
    /// Cap on video width in pixels
    pub max_width: u32,
    /// Cap on video height in pixels
    pub max_height: u32,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            audio: true,
            max_width: 1920,
            max_height: 1080,
        }
    }
}

/// A live, exclusively-owned media stream.
///
/// The primary video track can end on its own when the user stops sharing
/// through platform chrome; [`MediaStream::ended`] is the only out-of-band
/// signal the controller listens for.
pub trait MediaStream: Send {
    /// Platform identifier of the underlying stream
    fn id(&self) -> &str;

    /// Watch channel that flips to `true` when the primary video track ends
    fn ended(&self) -> watch::Receiver<bool>;

    /// Stop every track. Idempotent: stopping an already-stopped stream is a
    /// no-op.
    fn stop_all_tracks(&mut self);
}

/// Platform primitive exchanging a capture token for a live stream.
///
/// The token is consumed by value: one token, one acquisition. Implementors
/// must stop any partially-acquired tracks themselves before returning an
/// error, so a failed acquisition never leaks a live track to the caller.
#[async_trait]
pub trait DesktopMedia: Send + Sync {
    async fn acquire(
        &self,
        token: CaptureToken,
        constraints: &StreamConstraints,
    ) -> StreamResult<Box<dyn MediaStream>>;
}

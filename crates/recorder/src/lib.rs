//! Recorder - the session controller for Clipreel
//!
//! Owns one recording session's full lifecycle: the authorization handshake
//! with the capture authority (guarded by a bounded wait), the token-for-
//! stream exchange, the pausable chunking loop, and the finalize-once
//! cleanup that assembles the artifact and hands it to the preview surface.

mod error;
mod handoff;
mod session;

pub use error::*;
pub use handoff::*;
pub use session::*;

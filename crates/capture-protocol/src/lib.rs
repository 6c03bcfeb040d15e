//! Shared Protocol Definitions for Clipreel
//!
//! This crate contains the types exchanged between the privileged capture
//! authority and the unprivileged session controller, plus the session
//! lifecycle vocabulary shared across the workspace.

mod capture;
mod error;
mod messages;
mod session;

pub use capture::*;
pub use error::*;
pub use messages::*;
pub use session::*;

/// Protocol version for compatibility checking
pub const PROTOCOL_VERSION: u32 = 1;

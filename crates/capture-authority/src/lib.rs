//! Capture Authority - privileged consent side of the capture handshake
//!
//! Owns the only capability that can open the platform consent prompt and
//! mint single-use capture tokens. Runs as a long-lived background task;
//! unprivileged session controllers talk to it through an [`AuthorityHandle`].

mod authority;
mod error;
mod traits;

pub use authority::*;
pub use error::*;
pub use traits::*;

//! Media Stream - platform desktop-media seam for Clipreel
//!
//! Abstraction over the platform primitive that exchanges a single-use
//! capture token for a live media stream. The concrete implementation lives
//! with the platform; this crate fixes the contract the session controller
//! programs against.

mod error;
mod traits;

pub use error::*;
pub use traits::*;

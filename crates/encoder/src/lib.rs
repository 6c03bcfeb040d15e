//! Chunk Encoder - recording encoder seam for Clipreel
//!
//! Abstraction over the platform's chunking media recorder: bound to one
//! stream, emits one appendable chunk per timeslice, supports a
//! pause/resume lifecycle and a final flush on stop.

mod error;
mod format;
mod traits;

pub use error::*;
pub use format::*;
pub use traits::*;

//! Platform seams for the privileged context

use async_trait::async_trait;
use capture_protocol::{CaptureToken, SourceKind, SurfaceId, SurfaceTarget};

use crate::PromptError;

/// The platform consent primitive.
///
/// Shows the source picker for `kinds`, bound to `surface`, and blocks until
/// the user picks a source or dismisses the prompt. The authority cannot
/// impose a timeout here; the prompt's own resolution is the only
/// termination signal.
#[async_trait]
pub trait ConsentPrompt: Send + Sync {
    /// `Ok(Some(token))` when the user picked a source, `Ok(None)` when the
    /// user cancelled, `Err` on a platform failure.
    async fn choose_source(
        &self,
        kinds: &[SourceKind],
        surface: SurfaceId,
    ) -> Result<Option<CaptureToken>, PromptError>;
}

/// Resolves a request's surface target to a concrete addressable surface
#[async_trait]
pub trait SurfaceResolver: Send + Sync {
    /// `None` when no eligible surface exists (e.g. no active foreground tab)
    async fn resolve(&self, target: SurfaceTarget) -> Option<SurfaceId>;
}

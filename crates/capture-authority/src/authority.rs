//! The capture authority service task
//!
//! One long-lived task consumes authorization requests from a channel; each
//! request is served on its own spawned task so concurrent sessions each get
//! an independent consent prompt and an independent token. The authority
//! retains no reference to a token after replying.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use capture_protocol::{CaptureOutcome, CaptureRequest};

use crate::{AuthorityError, AuthorityResult, ConsentPrompt, SurfaceResolver};

/// Reason string when no active surface can be resolved
pub const NO_SURFACE_REASON: &str = "Could not get current tab";

/// Reason string when the user dismisses the consent prompt
pub const CANCELLED_REASON: &str = "Screen capture was cancelled";

struct AuthorityRequest {
    request: CaptureRequest,
    reply: oneshot::Sender<CaptureOutcome>,
}

/// Client side of the authority request/response channel.
///
/// Cheap to clone; one handle per session controller. Dropping the awaited
/// future abandons the in-flight request: the authority's eventual reply
/// fails to send and is discarded, which is exactly the stale-response
/// behavior the controller's timeout guard relies on.
#[derive(Clone)]
pub struct AuthorityHandle {
    tx: mpsc::Sender<AuthorityRequest>,
}

impl AuthorityHandle {
    /// Perform one authorization handshake. Resolves with exactly one
    /// outcome; unbounded from this side, so callers wrap it in a timeout.
    pub async fn request_capture(&self, request: CaptureRequest) -> AuthorityResult<CaptureOutcome> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(AuthorityRequest {
                request,
                reply: reply_tx,
            })
            .await
            .map_err(|_| AuthorityError::Closed)?;

        reply_rx.await.map_err(|_| AuthorityError::Dropped)
    }
}

/// The privileged capture authority
pub struct CaptureAuthority {
    prompt: Arc<dyn ConsentPrompt>,
    resolver: Arc<dyn SurfaceResolver>,
}

impl CaptureAuthority {
    pub fn new(prompt: Arc<dyn ConsentPrompt>, resolver: Arc<dyn SurfaceResolver>) -> Self {
        Self { prompt, resolver }
    }

    /// Spawn the service task and return the client handle
    pub fn spawn(self) -> AuthorityHandle {
        let (tx, mut rx) = mpsc::channel::<AuthorityRequest>(16);

        tokio::spawn(async move {
            info!("Capture authority started");

            while let Some(AuthorityRequest { request, reply }) = rx.recv().await {
                let prompt = self.prompt.clone();
                let resolver = self.resolver.clone();

                // Independent task per request: a prompt left open by one
                // session must not block another session's handshake.
                tokio::spawn(async move {
                    let outcome = serve_request(prompt, resolver, request).await;
                    if reply.send(outcome).is_err() {
                        debug!("Requester gone before outcome was ready, discarding");
                    }
                });
            }

            info!("Capture authority stopped");
        });

        AuthorityHandle { tx }
    }
}

async fn serve_request(
    prompt: Arc<dyn ConsentPrompt>,
    resolver: Arc<dyn SurfaceResolver>,
    request: CaptureRequest,
) -> CaptureOutcome {
    debug!(kinds = ?request.source_kinds, "Authorization requested");

    let Some(surface) = resolver.resolve(request.target).await else {
        warn!("No eligible capture surface");
        return CaptureOutcome::Unavailable(NO_SURFACE_REASON.to_string());
    };

    match prompt.choose_source(&request.source_kinds, surface).await {
        Ok(Some(token)) => {
            info!(%surface, "Capture granted");
            CaptureOutcome::Granted(token)
        }
        Ok(None) => {
            info!(%surface, "User cancelled capture prompt");
            CaptureOutcome::Denied(CANCELLED_REASON.to_string())
        }
        Err(e) => {
            warn!(%surface, "Consent prompt failed: {e}");
            CaptureOutcome::Denied(e.to_string())
        }
    }
}

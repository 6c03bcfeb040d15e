//! Recording session state machine - the core path
//!
//! One `SessionController` per recording. The controller drives the session
//! through idle → authorizing → acquiring → recording ⇄ paused →
//! finalizing → delivered, with `failed` reachable from every non-terminal
//! state. All owned handles (stream, encoder, ticker) are released on every
//! terminal path, and releasing an absent handle is a no-op.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use tokio::sync::{Notify, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use capture_authority::AuthorityHandle;
use capture_protocol::{
    CaptureOutcome, CaptureRequest, RecorderState, SessionId, SourceKind, SurfaceTarget,
};
use encoder::{ChunkEncoder, EncoderFactory, EncoderSettings, select_media_type};
use media_stream::{DesktopMedia, MediaStream, StreamConstraints};

use crate::{Artifact, HandoffStore, PreviewLauncher, RecorderError, RecorderResult};

/// Failure reason recorded when the authority misses the round-trip guard
pub const AUTHORITY_UNRESPONSIVE_REASON: &str = "capture authority unresponsive";

/// Failure reason recorded when stop lands before recording begins
const STOPPED_EARLY_REASON: &str = "recording stopped before capture started";

/// Session controller configuration.
///
/// Everything the reference behavior hard-codes is an explicit field here;
/// the default mirrors that behavior (15 s guard, 1 s chunks, 2.5 Mbps,
/// vp9 → vp8 → webm, audio on, 1920×1080 caps).
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Source kinds offered in the consent prompt
    pub source_kinds: Vec<SourceKind>,
    /// Surface the capture is associated with
    pub target: SurfaceTarget,
    /// Constraints for the token-for-stream exchange
    pub constraints: StreamConstraints,
    /// Encoding formats to probe, most specific first
    pub format_preferences: Vec<String>,
    /// Fixed target video bitrate
    pub video_bits_per_second: u32,
    /// Bound on the whole authorization round trip
    pub authority_timeout: Duration,
    /// Wall-clock spacing of encoder chunk emission
    pub chunk_interval: Duration,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            source_kinds: vec![SourceKind::Screen, SourceKind::Window, SourceKind::Tab],
            target: SurfaceTarget::Active,
            constraints: StreamConstraints::default(),
            format_preferences: encoder::default_format_preferences(),
            video_bits_per_second: 2_500_000,
            authority_timeout: Duration::from_secs(15),
            chunk_interval: Duration::from_secs(1),
        }
    }
}

/// Shared state of one recording session.
///
/// Exclusively owns at most one stream, one encoder and one ticker handle
/// at any time; each lives in an `Option` taken on the way out.
pub struct RecordingSession {
    id: SessionId,
    state: RwLock<RecorderState>,
    failure: Mutex<Option<String>>,
    elapsed_secs: AtomicU64,
    chunks: Mutex<Vec<Bytes>>,
    media_type: Mutex<Option<String>>,
    stream: Mutex<Option<Box<dyn MediaStream>>>,
    encoder: Mutex<Option<Box<dyn ChunkEncoder>>>,
    ticker: Mutex<Option<JoinHandle<()>>>,
    cancel_start: Notify,
}

impl RecordingSession {
    fn new() -> Self {
        Self {
            id: SessionId::new(),
            state: RwLock::new(RecorderState::Idle),
            failure: Mutex::new(None),
            elapsed_secs: AtomicU64::new(0),
            chunks: Mutex::new(Vec::new()),
            media_type: Mutex::new(None),
            stream: Mutex::new(None),
            encoder: Mutex::new(None),
            ticker: Mutex::new(None),
            cancel_start: Notify::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn state(&self) -> RecorderState {
        *self.state.read()
    }

    /// Elapsed active recording time in whole seconds, paused time excluded
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs.load(Ordering::SeqCst)
    }

    /// Human-readable reason once the session has failed
    pub fn failure_reason(&self) -> Option<String> {
        self.failure.lock().clone()
    }

    /// Release every owned handle. Idempotent; absent handles are no-ops.
    fn release_handles(&self) {
        if let Some(mut stream) = self.stream.lock().take() {
            stream.stop_all_tracks();
        }
        drop(self.encoder.lock().take());
        if let Some(ticker) = self.ticker.lock().take() {
            ticker.abort();
        }
    }
}

/// Drives one recording session end to end
pub struct SessionController {
    authority: AuthorityHandle,
    media: Arc<dyn DesktopMedia>,
    encoders: Arc<dyn EncoderFactory>,
    handoff: Arc<HandoffStore>,
    launcher: Arc<dyn PreviewLauncher>,
    config: RecorderConfig,
    session: Arc<RecordingSession>,
}

impl SessionController {
    pub fn new(
        authority: AuthorityHandle,
        media: Arc<dyn DesktopMedia>,
        encoders: Arc<dyn EncoderFactory>,
        handoff: Arc<HandoffStore>,
        launcher: Arc<dyn PreviewLauncher>,
        config: RecorderConfig,
    ) -> Self {
        Self {
            authority,
            media,
            encoders,
            handoff,
            launcher,
            config,
            session: Arc::new(RecordingSession::new()),
        }
    }

    pub fn state(&self) -> RecorderState {
        self.session.state()
    }

    pub fn elapsed_secs(&self) -> u64 {
        self.session.elapsed_secs()
    }

    pub fn failure_reason(&self) -> Option<String> {
        self.session.failure_reason()
    }

    pub fn session_id(&self) -> SessionId {
        self.session.id()
    }

    /// Run the start command: authorization handshake, stream acquisition,
    /// encoder construction, then the periodic chunk loop in the background.
    ///
    /// Returns once recording is live or the session has reached `failed`.
    pub async fn start(&self) -> RecorderResult<()> {
        {
            let mut state = self.session.state.write();
            if *state != RecorderState::Idle {
                return Err(RecorderError::AlreadyStarted);
            }
            *state = RecorderState::Authorizing;
        }
        info!(session = %self.session.id, "Requesting capture authorization");

        let token = self.authorize().await?;

        {
            let mut state = self.session.state.write();
            if *state != RecorderState::Authorizing {
                // A stop raced the grant; the token is dropped unused.
                debug!(session = %self.session.id, "Discarding token for superseded session");
                return Err(RecorderError::Aborted);
            }
            *state = RecorderState::Acquiring;
        }

        let (stream, encoder) = self.acquire(token).await?;
        let ended = stream.ended();

        {
            let mut state = self.session.state.write();
            if *state != RecorderState::Acquiring {
                // Stop landed during acquisition: never expose the stream.
                let mut stream = stream;
                stream.stop_all_tracks();
                return Err(RecorderError::Aborted);
            }
            *self.session.media_type.lock() = Some(encoder.media_type().to_string());
            *self.session.stream.lock() = Some(stream);
            *self.session.encoder.lock() = Some(encoder);
            self.session.elapsed_secs.store(0, Ordering::SeqCst);
            *state = RecorderState::Recording;
        }
        info!(session = %self.session.id, "Recording started");

        let ticker = tokio::spawn(run_chunk_loop(
            self.session.clone(),
            self.handoff.clone(),
            self.launcher.clone(),
            ended,
            self.config.chunk_interval,
        ));
        *self.session.ticker.lock() = Some(ticker);

        Ok(())
    }

    /// Authorization round trip, guarded by the configured bound. A
    /// straggler outcome after the guard elapses has nowhere to land: the
    /// reply channel is dropped with the timed-out future.
    async fn authorize(&self) -> RecorderResult<capture_protocol::CaptureToken> {
        let request = CaptureRequest::new(self.config.source_kinds.clone(), self.config.target);

        let guarded = tokio::select! {
            res = tokio::time::timeout(
                self.config.authority_timeout,
                self.authority.request_capture(request),
            ) => res,
            _ = self.session.cancel_start.notified() => {
                debug!(session = %self.session.id, "Authorization wait cancelled by stop");
                return Err(RecorderError::Aborted);
            }
        };

        let outcome = match guarded {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(e)) => {
                warn!(session = %self.session.id, "Capture authority gone: {e}");
                self.fail(AUTHORITY_UNRESPONSIVE_REASON);
                return Err(RecorderError::AuthorizationTimeout);
            }
            Err(_) => {
                warn!(
                    session = %self.session.id,
                    "No outcome within {:?}", self.config.authority_timeout
                );
                self.fail(AUTHORITY_UNRESPONSIVE_REASON);
                return Err(RecorderError::AuthorizationTimeout);
            }
        };

        match outcome {
            CaptureOutcome::Granted(token) => Ok(token),
            CaptureOutcome::Denied(reason) => {
                self.fail(&reason);
                Err(RecorderError::AuthorizationDenied(reason))
            }
            CaptureOutcome::Unavailable(reason) => {
                self.fail(&reason);
                Err(RecorderError::Unavailable(reason))
            }
        }
    }

    /// Exchange the token for a stream and bind an encoder to it. Any
    /// partially-acquired resources are stopped before the error returns.
    async fn acquire(
        &self,
        token: capture_protocol::CaptureToken,
    ) -> RecorderResult<(Box<dyn MediaStream>, Box<dyn ChunkEncoder>)> {
        debug!(session = %self.session.id, "Exchanging token for media stream");
        let mut stream = match self.media.acquire(token, &self.config.constraints).await {
            Ok(stream) => stream,
            Err(e) => {
                let reason = e.to_string();
                self.fail(&reason);
                return Err(RecorderError::Acquisition(reason));
            }
        };

        let media_type = select_media_type(self.encoders.as_ref(), &self.config.format_preferences);
        let settings = EncoderSettings {
            media_type,
            video_bits_per_second: self.config.video_bits_per_second,
        };

        let built = self
            .encoders
            .create(stream.as_ref(), settings)
            .and_then(|mut encoder| encoder.start().map(|()| encoder));

        match built {
            Ok(encoder) => Ok((stream, encoder)),
            Err(e) => {
                stream.stop_all_tracks();
                let reason = e.to_string();
                self.fail(&reason);
                Err(RecorderError::Acquisition(reason))
            }
        }
    }

    /// Pause command. No-op unless currently recording.
    pub fn pause(&self) {
        {
            let mut state = self.session.state.write();
            if *state != RecorderState::Recording {
                return;
            }
            *state = RecorderState::Paused;
        }
        let paused = self
            .session
            .encoder
            .lock()
            .as_mut()
            .map(|encoder| encoder.pause());
        if let Some(Err(e)) = paused {
            fail_session(&self.session, e.to_string());
            return;
        }
        info!(session = %self.session.id, "Recording paused");
    }

    /// Resume command. No-op unless currently paused.
    pub fn resume(&self) {
        {
            let mut state = self.session.state.write();
            if *state != RecorderState::Paused {
                return;
            }
            *state = RecorderState::Recording;
        }
        let resumed = self
            .session
            .encoder
            .lock()
            .as_mut()
            .map(|encoder| encoder.resume());
        if let Some(Err(e)) = resumed {
            fail_session(&self.session, e.to_string());
            return;
        }
        info!(session = %self.session.id, "Recording resumed");
    }

    /// Stop command. From recording/paused this finalizes and delivers;
    /// before recording it cancels the start cleanly; in idle or a terminal
    /// state it is a no-op.
    pub fn stop(&self) {
        let state = self.session.state();
        match state {
            RecorderState::Recording | RecorderState::Paused => {
                finalize_session(&self.session, &self.handoff, self.launcher.as_ref());
            }
            RecorderState::Authorizing | RecorderState::Acquiring => {
                debug!(session = %self.session.id, %state, "Stop during startup");
                self.fail(STOPPED_EARLY_REASON);
                self.session.cancel_start.notify_waiters();
            }
            RecorderState::Idle
            | RecorderState::Finalizing
            | RecorderState::Delivered
            | RecorderState::Failed => {}
        }
    }

    fn fail(&self, reason: &str) {
        fail_session(&self.session, reason.to_string());
    }
}

/// Transition to `failed`, releasing whatever handles are owned. No-op when
/// the session is already finalizing or terminal.
fn fail_session(session: &Arc<RecordingSession>, reason: String) {
    {
        let mut state = session.state.write();
        if state.is_terminal() || *state == RecorderState::Finalizing {
            return;
        }
        *state = RecorderState::Failed;
    }
    warn!(session = %session.id, %reason, "Session failed");
    *session.failure.lock() = Some(reason);
    session.release_handles();
}

/// One-shot cleanup and delivery: flush the encoder, stop every track,
/// cancel the ticker, assemble and deposit the artifact. The state guard
/// makes a second invocation a no-op, so an explicit stop and a spontaneous
/// stream end cannot double-finalize.
fn finalize_session(
    session: &Arc<RecordingSession>,
    handoff: &HandoffStore,
    launcher: &dyn PreviewLauncher,
) {
    {
        let mut state = session.state.write();
        match *state {
            RecorderState::Recording | RecorderState::Paused => {
                *state = RecorderState::Finalizing;
            }
            _ => return,
        }
    }
    info!(session = %session.id, "Finalizing recording");

    let flushed = session.encoder.lock().take().map(|mut encoder| encoder.finish());
    match flushed {
        Some(Ok(Some(chunk))) if !chunk.is_empty() => session.chunks.lock().push(chunk),
        Some(Ok(_)) | None => {}
        Some(Err(e)) => {
            // Deliver what was already accumulated; the flush alone failing
            // does not discard a finished recording.
            warn!(session = %session.id, "Encoder flush failed: {e}");
        }
    }

    session.release_handles();

    let media_type = session
        .media_type
        .lock()
        .take()
        .unwrap_or_else(|| encoder::FALLBACK_MEDIA_TYPE.to_string());
    let chunks = std::mem::take(&mut *session.chunks.lock());
    let artifact = Artifact::assemble(chunks, media_type, unix_millis());

    info!(
        session = %session.id,
        filename = %artifact.filename,
        bytes = artifact.len(),
        seconds = session.elapsed_secs(),
        "Recording delivered"
    );
    handoff.deposit_recording(artifact);
    launcher.open_recording_preview();

    *session.state.write() = RecorderState::Delivered;
}

/// The periodic chunk loop. Each interval tick spent in `recording`
/// advances the duration counter and appends one encoder chunk; ticks spent
/// in `paused` are consumed without effect. The stream's ended signal is
/// treated exactly like an explicit stop.
async fn run_chunk_loop(
    session: Arc<RecordingSession>,
    handoff: Arc<HandoffStore>,
    launcher: Arc<dyn PreviewLauncher>,
    mut ended: watch::Receiver<bool>,
    period: Duration,
) {
    let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
    debug!(session = %session.id, "Chunk loop started");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if session.state() != RecorderState::Recording {
                    continue;
                }
                session.elapsed_secs.fetch_add(1, Ordering::SeqCst);

                let emitted = session
                    .encoder
                    .lock()
                    .as_mut()
                    .map(|encoder| encoder.emit_chunk());
                match emitted {
                    Some(Ok(Some(chunk))) if !chunk.is_empty() => {
                        debug!(session = %session.id, bytes = chunk.len(), "Chunk appended");
                        session.chunks.lock().push(chunk);
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        fail_session(&session, e.to_string());
                        break;
                    }
                    // Encoder already released by a concurrent terminal
                    // transition; nothing left to drive.
                    None => break,
                }
            }
            changed = ended.changed() => {
                // A closed sender means the stream handle is gone, which
                // only happens on a terminal path; both cases end the loop.
                if changed.is_err() || *ended.borrow() {
                    if changed.is_ok() {
                        info!(session = %session.id, "Stream ended by platform");
                    }
                    finalize_session(&session, &handoff, launcher.as_ref());
                    break;
                }
            }
        }

        if session.state().is_terminal() {
            break;
        }
    }
    debug!(session = %session.id, "Chunk loop ended");
}

fn unix_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
}

//! Scripted platform doubles shared by the recorder integration tests
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::sync::watch;

use capture_authority::{
    AuthorityHandle, CaptureAuthority, ConsentPrompt, PromptError, SurfaceResolver,
};
use capture_protocol::{CaptureToken, SourceKind, SurfaceId, SurfaceTarget};
use encoder::{ChunkEncoder, EncoderError, EncoderFactory, EncoderResult, EncoderSettings};
use media_stream::{DesktopMedia, MediaStream, StreamConstraints, StreamError, StreamResult};
use recorder::{HandoffStore, PreviewLauncher, RecorderConfig, SessionController};

/// Size of every non-empty chunk the fake encoder emits
pub const CHUNK_LEN: usize = 4;

// --- consent prompt doubles ---

/// Grants immediately, minting a fresh numbered token per prompt
pub struct InstantGrant {
    minted: AtomicU32,
}

impl InstantGrant {
    pub fn new() -> Self {
        Self {
            minted: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl ConsentPrompt for InstantGrant {
    async fn choose_source(
        &self,
        _kinds: &[SourceKind],
        _surface: SurfaceId,
    ) -> Result<Option<CaptureToken>, PromptError> {
        let n = self.minted.fetch_add(1, Ordering::SeqCst);
        Ok(Some(CaptureToken::new(format!("stream-{n}"))))
    }
}

/// User dismisses the picker
pub struct CancelPrompt;

#[async_trait]
impl ConsentPrompt for CancelPrompt {
    async fn choose_source(
        &self,
        _kinds: &[SourceKind],
        _surface: SurfaceId,
    ) -> Result<Option<CaptureToken>, PromptError> {
        Ok(None)
    }
}

/// Prompt that never resolves
pub struct NeverPrompt;

#[async_trait]
impl ConsentPrompt for NeverPrompt {
    async fn choose_source(
        &self,
        _kinds: &[SourceKind],
        _surface: SurfaceId,
    ) -> Result<Option<CaptureToken>, PromptError> {
        std::future::pending().await
    }
}

/// Grants after a fixed delay, for straggler-response scenarios
pub struct DelayedGrant {
    pub delay: Duration,
    minted: AtomicU32,
}

impl DelayedGrant {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            minted: AtomicU32::new(0),
        }
    }
}

#[async_trait]
impl ConsentPrompt for DelayedGrant {
    async fn choose_source(
        &self,
        _kinds: &[SourceKind],
        _surface: SurfaceId,
    ) -> Result<Option<CaptureToken>, PromptError> {
        tokio::time::sleep(self.delay).await;
        let n = self.minted.fetch_add(1, Ordering::SeqCst);
        Ok(Some(CaptureToken::new(format!("late-{n}"))))
    }
}

struct ActiveSurface;

#[async_trait]
impl SurfaceResolver for ActiveSurface {
    async fn resolve(&self, _target: SurfaceTarget) -> Option<SurfaceId> {
        Some(SurfaceId::new())
    }
}

// --- desktop media double ---

pub struct FakeDesktopMedia {
    /// Stream ids of every token ever redeemed, to catch token reuse
    pub used_tokens: Mutex<Vec<String>>,
    /// When set, acquisition fails with this message
    pub fail_with: Mutex<Option<String>>,
    /// End switch of the most recently acquired stream
    ended_tx: Mutex<Option<watch::Sender<bool>>>,
    /// Total `stop_all_tracks` calls across all streams
    stop_calls: Arc<AtomicU32>,
}

impl FakeDesktopMedia {
    pub fn new() -> Self {
        Self {
            used_tokens: Mutex::new(Vec::new()),
            fail_with: Mutex::new(None),
            ended_tx: Mutex::new(None),
            stop_calls: Arc::new(AtomicU32::new(0)),
        }
    }

    /// Simulate the user stopping the share via platform chrome
    pub fn end_stream(&self) {
        if let Some(tx) = self.ended_tx.lock().as_ref() {
            let _ = tx.send(true);
        }
    }

    pub fn stop_calls(&self) -> u32 {
        self.stop_calls.load(Ordering::SeqCst)
    }

    pub fn tokens_used(&self) -> usize {
        self.used_tokens.lock().len()
    }
}

struct FakeStream {
    id: String,
    ended: watch::Receiver<bool>,
    stops: Arc<AtomicU32>,
    stopped: bool,
}

impl MediaStream for FakeStream {
    fn id(&self) -> &str {
        &self.id
    }

    fn ended(&self) -> watch::Receiver<bool> {
        self.ended.clone()
    }

    fn stop_all_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.stops.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[async_trait]
impl DesktopMedia for FakeDesktopMedia {
    async fn acquire(
        &self,
        token: CaptureToken,
        _constraints: &StreamConstraints,
    ) -> StreamResult<Box<dyn MediaStream>> {
        let id = token.into_stream_id();
        {
            let mut used = self.used_tokens.lock();
            assert!(!used.contains(&id), "capture token redeemed twice: {id}");
            used.push(id.clone());
        }

        if let Some(message) = self.fail_with.lock().clone() {
            return Err(StreamError::AcquisitionFailed(message));
        }

        let (tx, rx) = watch::channel(false);
        *self.ended_tx.lock() = Some(tx);
        Ok(Box::new(FakeStream {
            id,
            ended: rx,
            stops: self.stop_calls.clone(),
            stopped: false,
        }))
    }
}

// --- encoder doubles ---

/// Shared inspection/scripting handle for the fake encoder
pub struct EncoderProbe {
    chunk_seq: AtomicU32,
    /// 1-based chunk number at which `emit_chunk` starts failing
    pub fail_on_chunk: Mutex<Option<u32>>,
    /// Data flushed as the final chunk on `finish`
    pub buffered_final: Mutex<Option<Bytes>>,
    /// Emit zero-length chunks instead of real payloads
    pub emit_empty: AtomicBool,
    pub events: Mutex<Vec<&'static str>>,
}

impl EncoderProbe {
    fn new() -> Self {
        Self {
            chunk_seq: AtomicU32::new(0),
            fail_on_chunk: Mutex::new(None),
            buffered_final: Mutex::new(None),
            emit_empty: AtomicBool::new(false),
            events: Mutex::new(Vec::new()),
        }
    }

    pub fn events(&self) -> Vec<&'static str> {
        self.events.lock().clone()
    }
}

pub struct FakeEncoderFactory {
    /// Media types the platform claims to support
    pub supported: Mutex<Vec<String>>,
    /// When set, `create` refuses with an init error
    pub fail_create: AtomicBool,
    pub probe: Arc<EncoderProbe>,
}

impl FakeEncoderFactory {
    pub fn new() -> Self {
        Self {
            supported: Mutex::new(encoder::default_format_preferences()),
            fail_create: AtomicBool::new(false),
            probe: Arc::new(EncoderProbe::new()),
        }
    }
}

struct FakeChunkEncoder {
    media_type: String,
    probe: Arc<EncoderProbe>,
}

impl ChunkEncoder for FakeChunkEncoder {
    fn media_type(&self) -> &str {
        &self.media_type
    }

    fn start(&mut self) -> EncoderResult<()> {
        self.probe.events.lock().push("start");
        Ok(())
    }

    fn pause(&mut self) -> EncoderResult<()> {
        self.probe.events.lock().push("pause");
        Ok(())
    }

    fn resume(&mut self) -> EncoderResult<()> {
        self.probe.events.lock().push("resume");
        Ok(())
    }

    fn emit_chunk(&mut self) -> EncoderResult<Option<Bytes>> {
        let seq = self.probe.chunk_seq.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(fail_at) = *self.probe.fail_on_chunk.lock() {
            if seq >= fail_at {
                return Err(EncoderError::Fault("synthetic encoder fault".into()));
            }
        }
        if self.probe.emit_empty.load(Ordering::SeqCst) {
            return Ok(Some(Bytes::new()));
        }
        Ok(Some(Bytes::from(vec![seq as u8; CHUNK_LEN])))
    }

    fn finish(&mut self) -> EncoderResult<Option<Bytes>> {
        self.probe.events.lock().push("finish");
        Ok(self.probe.buffered_final.lock().take())
    }
}

impl EncoderFactory for FakeEncoderFactory {
    fn supports(&self, media_type: &str) -> bool {
        self.supported.lock().iter().any(|m| m == media_type)
    }

    fn create(
        &self,
        _stream: &dyn MediaStream,
        settings: EncoderSettings,
    ) -> EncoderResult<Box<dyn ChunkEncoder>> {
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(EncoderError::InitFailed("encoder construction refused".into()));
        }
        Ok(Box::new(FakeChunkEncoder {
            media_type: settings.media_type,
            probe: self.probe.clone(),
        }))
    }
}

// --- preview launcher double ---

pub struct CountingLauncher {
    opens: AtomicU32,
}

impl CountingLauncher {
    pub fn new() -> Self {
        Self {
            opens: AtomicU32::new(0),
        }
    }

    pub fn opens(&self) -> u32 {
        self.opens.load(Ordering::SeqCst)
    }
}

impl PreviewLauncher for CountingLauncher {
    fn open_recording_preview(&self) {
        self.opens.fetch_add(1, Ordering::SeqCst);
    }
}

// --- harness ---

pub struct Harness {
    pub controller: Arc<SessionController>,
    pub media: Arc<FakeDesktopMedia>,
    pub encoders: Arc<FakeEncoderFactory>,
    pub handoff: Arc<HandoffStore>,
    pub launcher: Arc<CountingLauncher>,
}

pub fn harness(prompt: impl ConsentPrompt + 'static) -> Harness {
    harness_with(prompt, RecorderConfig::default())
}

pub fn harness_with(prompt: impl ConsentPrompt + 'static, config: RecorderConfig) -> Harness {
    let authority: AuthorityHandle =
        CaptureAuthority::new(Arc::new(prompt), Arc::new(ActiveSurface)).spawn();

    let media = Arc::new(FakeDesktopMedia::new());
    let encoders = Arc::new(FakeEncoderFactory::new());
    let handoff = Arc::new(HandoffStore::new());
    let launcher = Arc::new(CountingLauncher::new());

    let controller = Arc::new(SessionController::new(
        authority,
        media.clone(),
        encoders.clone(),
        handoff.clone(),
        launcher.clone(),
        config,
    ));

    Harness {
        controller,
        media,
        encoders,
        handoff,
        launcher,
    }
}

/// Advance paused test time one chunk interval at a time, yielding so the
/// chunk loop observes every tick
pub async fn run_for_secs(n: u64) {
    for _ in 0..n {
        settle().await;
        tokio::time::advance(Duration::from_secs(1)).await;
        settle().await;
    }
}

/// Let spawned tasks observe pending signals without moving the clock
pub async fn settle() {
    for _ in 0..4 {
        tokio::task::yield_now().await;
    }
}

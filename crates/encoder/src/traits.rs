//! Chunk encoder trait abstraction

use bytes::Bytes;
use media_stream::MediaStream;

use crate::EncoderResult;

/// Encoder configuration
#[derive(Debug, Clone)]
pub struct EncoderSettings {
    /// Selected media type, e.g. `video/webm;codecs=vp9`
    pub media_type: String,
    /// Fixed target video bitrate in bits per second
    pub video_bits_per_second: u32,
}

impl Default for EncoderSettings {
    fn default() -> Self {
        Self {
            media_type: "video/webm".to_string(),
            video_bits_per_second: 2_500_000,
        }
    }
}

/// A chunking encoder bound to one media stream.
///
/// Driven by the session controller's timeslice tick: each call to
/// [`ChunkEncoder::emit_chunk`] yields the data buffered since the previous
/// call. Chunks concatenated in emission order form a playable artifact.
pub trait ChunkEncoder: Send {
    /// Media type the artifact will be tagged with (may carry codec
    /// parameters on top of the configured format)
    fn media_type(&self) -> &str;

    /// Begin encoding from the bound stream
    fn start(&mut self) -> EncoderResult<()>;

    /// Suspend encoding; buffered data is retained, not emitted
    fn pause(&mut self) -> EncoderResult<()>;

    /// Resume a paused encoder
    fn resume(&mut self) -> EncoderResult<()>;

    /// Yield one chunk of encoded output. `None` when nothing was buffered
    /// in this timeslice (the controller drops empty chunks).
    fn emit_chunk(&mut self) -> EncoderResult<Option<Bytes>>;

    /// Stop encoding, flushing any buffered-but-unemitted data as a final
    /// chunk. Called exactly once, after which the encoder is spent.
    fn finish(&mut self) -> EncoderResult<Option<Bytes>>;
}

/// Constructor seam for encoders, including the platform's own
/// format-support query.
pub trait EncoderFactory: Send + Sync {
    /// The platform's support query for a concrete media type string
    fn supports(&self, media_type: &str) -> bool;

    /// Bind a new encoder to `stream` with the given settings
    fn create(
        &self,
        stream: &dyn MediaStream,
        settings: EncoderSettings,
    ) -> EncoderResult<Box<dyn ChunkEncoder>>;
}

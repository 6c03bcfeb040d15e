//! Artifact assembly and the passive handoff surface
//!
//! The handoff store is process-wide key/value storage: the controller
//! deposits the finished artifact under a fixed key, a preview surface
//! reads it once on its own initialization. The store never notifies;
//! the controller separately signals the launcher to open the preview.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::{Bytes, BytesMut};
use parking_lot::RwLock;
use tracing::info;

/// Key under which the finished recording artifact is deposited
pub const RECORDING_PREVIEW_KEY: &str = "recording-preview";

/// Companion key holding the suggested filename
pub const RECORDING_FILENAME_KEY: &str = "recording-filename";

/// Finished recording output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Concatenation of all output chunks in emission order
    pub data: Bytes,
    /// Media type reported by the encoder
    pub media_type: String,
    /// Suggested download filename
    pub filename: String,
}

impl Artifact {
    /// Assemble the artifact from the ordered chunk sequence.
    ///
    /// Produced exactly once per session, at the finalizing transition.
    pub fn assemble(chunks: Vec<Bytes>, media_type: String, timestamp_millis: u128) -> Self {
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        let mut data = BytesMut::with_capacity(total);
        for chunk in &chunks {
            data.extend_from_slice(chunk);
        }

        let filename = format!(
            "screen-recording-{timestamp_millis}.{}",
            extension_for(&media_type)
        );

        Self {
            data: data.freeze(),
            media_type,
            filename,
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn extension_for(media_type: &str) -> &'static str {
    // Codec parameters ("video/webm;codecs=vp9") do not affect the container
    if media_type.starts_with("video/webm") {
        "webm"
    } else if media_type.starts_with("video/mp4") {
        "mp4"
    } else {
        "bin"
    }
}

/// Value stored under a handoff key
#[derive(Debug, Clone)]
pub enum HandoffValue {
    /// A binary media artifact
    Media(Arc<Artifact>),
    /// A plain string, e.g. a filename
    Text(String),
}

/// Process-wide passive key/value surface between controller and preview.
///
/// Write-once per session, read-many; entries are published whole and never
/// mutated in place, so a plain lock suffices.
#[derive(Default)]
pub struct HandoffStore {
    entries: RwLock<HashMap<String, HandoffValue>>,
}

impl HandoffStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposit a finished recording under the fixed preview keys
    pub fn deposit_recording(&self, artifact: Artifact) {
        info!(
            filename = %artifact.filename,
            bytes = artifact.len(),
            "Depositing recording artifact"
        );
        let artifact = Arc::new(artifact);
        let mut entries = self.entries.write();
        entries.insert(
            RECORDING_FILENAME_KEY.to_string(),
            HandoffValue::Text(artifact.filename.clone()),
        );
        entries.insert(
            RECORDING_PREVIEW_KEY.to_string(),
            HandoffValue::Media(artifact),
        );
    }

    /// The deposited recording, if a session has delivered one
    pub fn recording(&self) -> Option<Arc<Artifact>> {
        match self.entries.read().get(RECORDING_PREVIEW_KEY) {
            Some(HandoffValue::Media(artifact)) => Some(artifact.clone()),
            _ => None,
        }
    }

    /// Plain-text entry under `key`
    pub fn text(&self, key: &str) -> Option<String> {
        match self.entries.read().get(key) {
            Some(HandoffValue::Text(value)) => Some(value.clone()),
            _ => None,
        }
    }
}

/// Seam through which the controller opens the preview surface.
///
/// The handoff store is passive storage; something still has to launch the
/// surface that reads it.
pub trait PreviewLauncher: Send + Sync {
    fn open_recording_preview(&self);
}

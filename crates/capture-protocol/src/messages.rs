//! Cross-context wire messages
//!
//! The authority handshake crosses a privilege boundary as JSON. The request
//! carries `{"action":"startCapture","sourceKinds":[...]}`; the response is
//! `{"success":true,"streamId":...}` or `{"success":false,"error":...}`.
//! The wire shape collapses `Denied` and `Unavailable` into a bare error
//! string; in-process code passes `CaptureOutcome` around untouched.

use serde::{Deserialize, Serialize};

use crate::{CaptureOutcome, CaptureRequest, CaptureToken, ProtocolError, ProtocolResult, SourceKind};

/// Request message sent to the capture authority
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename = "startCapture", rename_all = "camelCase")]
pub struct StartCaptureMessage {
    pub source_kinds: Vec<SourceKind>,
}

impl StartCaptureMessage {
    pub fn to_json(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> ProtocolResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }
}

impl From<&CaptureRequest> for StartCaptureMessage {
    fn from(req: &CaptureRequest) -> Self {
        Self {
            source_kinds: req.source_kinds.clone(),
        }
    }
}

/// Response message from the capture authority, exactly one per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponseMessage {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CaptureResponseMessage {
    pub fn granted(stream_id: impl Into<String>) -> Self {
        Self {
            success: true,
            stream_id: Some(stream_id.into()),
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            stream_id: None,
            error: Some(error.into()),
        }
    }

    pub fn to_json(&self) -> ProtocolResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(raw: &str) -> ProtocolResult<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    /// Reconstruct a domain outcome from the wire shape.
    ///
    /// `Unavailable` is not representable on the wire, so every wire failure
    /// comes back as `Denied`.
    pub fn into_outcome(self) -> ProtocolResult<CaptureOutcome> {
        if self.success {
            let stream_id = self.stream_id.ok_or(ProtocolError::MissingField("streamId"))?;
            Ok(CaptureOutcome::Granted(CaptureToken::new(stream_id)))
        } else {
            let error = self.error.ok_or(ProtocolError::MissingField("error"))?;
            Ok(CaptureOutcome::Denied(error))
        }
    }
}

impl From<&CaptureOutcome> for CaptureResponseMessage {
    fn from(outcome: &CaptureOutcome) -> Self {
        match outcome {
            CaptureOutcome::Granted(token) => Self::granted(token.as_str()),
            CaptureOutcome::Denied(reason) | CaptureOutcome::Unavailable(reason) => {
                Self::failed(reason.clone())
            }
        }
    }
}

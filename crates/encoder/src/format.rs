//! Encoding format preference selection
//!
//! Mirrors the probe-then-fall-back idiom of platform recorders: try the
//! most specific format first, settle for the generic default when nothing
//! in the preference list is supported.

use tracing::debug;

use crate::EncoderFactory;

/// Generic default used when no preferred format is supported
pub const FALLBACK_MEDIA_TYPE: &str = "video/webm";

/// Ordered preference list, most specific/efficient first
pub fn default_format_preferences() -> Vec<String> {
    vec![
        "video/webm;codecs=vp9".to_string(),
        "video/webm;codecs=vp8".to_string(),
        "video/webm".to_string(),
    ]
}

/// Pick the first preference the platform supports, falling back to
/// [`FALLBACK_MEDIA_TYPE`]
pub fn select_media_type(factory: &dyn EncoderFactory, preferences: &[String]) -> String {
    for candidate in preferences {
        if factory.supports(candidate) {
            debug!(media_type = %candidate, "Selected encoding format");
            return candidate.clone();
        }
    }
    debug!("No preferred format supported, using fallback");
    FALLBACK_MEDIA_TYPE.to_string()
}

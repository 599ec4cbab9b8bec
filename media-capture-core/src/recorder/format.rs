//! Container/codec negotiation for the recorder.

use serde::Serialize;

use crate::models::error::CaptureError;
use crate::models::mode::MediaCategory;

/// Candidates for modes with video: efficient codecs first, then plain
/// containers with wider decoder support.
pub const VIDEO_MIME_PREFERENCES: &[&str] = &[
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm;codecs=h264,opus",
    "video/webm",
    "video/mp4;codecs=avc1,mp4a",
    "video/mp4",
];

/// Candidates for audio-only recording.
pub const AUDIO_MIME_PREFERENCES: &[&str] = &[
    "audio/webm;codecs=opus",
    "audio/ogg;codecs=opus",
    "audio/webm",
    "audio/mp4",
    "audio/ogg",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    WebM,
    Ogg,
    Mp4,
}

impl Container {
    /// Container named by a MIME type such as `video/webm;codecs=vp9`.
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        let essence = mime_type.split(';').next()?.trim();
        let subtype = essence.split('/').nth(1)?;
        match subtype.to_ascii_lowercase().as_str() {
            "webm" => Some(Self::WebM),
            "ogg" => Some(Self::Ogg),
            "mp4" => Some(Self::Mp4),
            _ => None,
        }
    }

    pub fn extension(self, category: MediaCategory) -> &'static str {
        match (self, category) {
            (Self::WebM, _) => "webm",
            (Self::Ogg, _) => "ogg",
            (Self::Mp4, MediaCategory::Audio) => "m4a",
            (Self::Mp4, MediaCategory::Video) => "mp4",
        }
    }
}

/// The format a recording is encoded in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingFormat {
    pub mime_type: String,
    pub container: Container,
    pub category: MediaCategory,
}

impl RecordingFormat {
    pub fn extension(&self) -> &'static str {
        self.container.extension(self.category)
    }
}

/// Pick the first candidate the platform can encode.
pub fn negotiate<F>(
    candidates: &[String],
    category: MediaCategory,
    is_supported: F,
) -> Result<RecordingFormat, CaptureError>
where
    F: Fn(&str) -> bool,
{
    for candidate in candidates {
        let Some(container) = Container::from_mime(candidate) else {
            log::warn!("Skipping format candidate with unknown container: {}", candidate);
            continue;
        };
        if is_supported(candidate) {
            log::debug!("Selected {} recording format {}", category.as_str(), candidate);
            return Ok(RecordingFormat {
                mime_type: candidate.clone(),
                container,
                category,
            });
        }
    }
    Err(CaptureError::NoSupportedFormat(format!(
        "none of the {} {} formats is supported by this platform",
        candidates.len(),
        category.as_str()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video_candidates() -> Vec<String> {
        VIDEO_MIME_PREFERENCES.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn picks_most_preferred_supported() {
        let format = negotiate(&video_candidates(), MediaCategory::Video, |_| true).unwrap();
        assert_eq!(format.mime_type, "video/webm;codecs=vp9,opus");
        assert_eq!(format.extension(), "webm");
    }

    #[test]
    fn falls_back_progressively() {
        let format = negotiate(&video_candidates(), MediaCategory::Video, |m| m.starts_with("video/mp4")).unwrap();
        assert_eq!(format.mime_type, "video/mp4;codecs=avc1,mp4a");
        assert_eq!(format.container, Container::Mp4);
        assert_eq!(format.extension(), "mp4");
    }

    #[test]
    fn nothing_supported_is_an_error() {
        let err = negotiate(&video_candidates(), MediaCategory::Video, |_| false).unwrap_err();
        assert!(matches!(err, CaptureError::NoSupportedFormat(_)));
    }

    #[test]
    fn unknown_containers_are_skipped() {
        let candidates = vec!["video/x-matroska".to_string(), "video/webm".to_string()];
        let format = negotiate(&candidates, MediaCategory::Video, |_| true).unwrap();
        assert_eq!(format.mime_type, "video/webm");
    }

    #[test]
    fn audio_mp4_uses_m4a() {
        assert_eq!(Container::from_mime("audio/mp4"), Some(Container::Mp4));
        assert_eq!(Container::Mp4.extension(MediaCategory::Audio), "m4a");
        assert_eq!(Container::from_mime("audio/ogg;codecs=opus"), Some(Container::Ogg));
        assert_eq!(Container::from_mime("garbage"), None);
    }
}

//! Naming and metadata for downloaded recordings.

use chrono::{DateTime, SecondsFormat, Utc};

use crate::models::artifact::RecordingArtifact;
use crate::models::snapshot::ArtifactInfo;

/// `<mode>-<timestamp>.<ext>`, e.g. `screen-audio-2024-05-01T09-30-00.250Z.webm`.
pub fn file_name(artifact: &RecordingArtifact) -> String {
    format!(
        "{}-{}.{}",
        artifact.mode_label(),
        timestamp_slug(&artifact.created_at),
        artifact.extension
    )
}

/// ISO 8601 with milliseconds, with ':' replaced so it is safe in file names.
pub fn timestamp_slug(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true).replace(':', "-")
}

/// Pretty-printed JSON sidecar describing the artifact.
pub fn metadata_json(artifact: &RecordingArtifact) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&ArtifactInfo::from(artifact))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::mode::{CaptureMode, MediaCategory};
    use crate::recorder::format::{Container, RecordingFormat};
    use chrono::TimeZone;

    fn artifact(mode: CaptureMode, mime: &str) -> RecordingArtifact {
        let format = RecordingFormat {
            mime_type: mime.to_string(),
            container: Container::from_mime(mime).unwrap(),
            category: mode.category(),
        };
        let mut artifact = RecordingArtifact::new(mode, &format, vec![1, 2, 3], 3.0);
        artifact.created_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap()
            + chrono::Duration::milliseconds(250);
        artifact
    }

    #[test]
    fn slug_has_no_colons() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap();
        assert_eq!(timestamp_slug(&at), "2024-05-01T09-30-00.000Z");
    }

    #[test]
    fn file_name_uses_mode_label_and_extension() {
        let a = artifact(CaptureMode::ScreenWithAudio, "video/webm;codecs=vp9,opus");
        assert_eq!(file_name(&a), "screen-audio-2024-05-01T09-30-00.250Z.webm");

        let a = artifact(CaptureMode::Audio, "audio/mp4");
        assert_eq!(a.mime_category, MediaCategory::Audio);
        assert_eq!(file_name(&a), "audio-2024-05-01T09-30-00.250Z.m4a");
    }

    #[test]
    fn metadata_describes_artifact_without_bytes() {
        let a = artifact(CaptureMode::Video, "video/mp4");
        let json = metadata_json(&a).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["modeLabel"], "video");
        assert_eq!(value["mimeCategory"], "video");
        assert_eq!(value["byteSize"], 3);
        assert_eq!(value["fileName"], "video-2024-05-01T09-30-00.250Z.mp4");
        assert!(value.get("data").is_none());
    }
}

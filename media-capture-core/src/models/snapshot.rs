use chrono::{DateTime, Utc};
use serde::Serialize;

use super::artifact::RecordingArtifact;
use super::error::{CaptureError, ErrorKind};
use super::mode::{CaptureMode, MediaCategory};
use super::permission::PermissionSnapshot;

/// Plain-data view of a session for rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: &'static str,
    pub mode: CaptureMode,
    pub busy: bool,
    pub elapsed_secs: u64,
    pub elapsed_label: String,
    pub error: Option<ErrorInfo>,
    pub warning: Option<String>,
    pub artifact: Option<ArtifactInfo>,
    pub permissions: PermissionSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorInfo {
    pub kind: ErrorKind,
    pub message: String,
    pub recoverable: bool,
}

impl From<&CaptureError> for ErrorInfo {
    fn from(err: &CaptureError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
            recoverable: err.is_recoverable(),
        }
    }
}

/// Artifact metadata without the bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactInfo {
    pub id: String,
    pub mode_label: &'static str,
    pub mime_category: MediaCategory,
    pub mime_type: String,
    pub byte_size: u64,
    pub duration_secs: f64,
    pub created_at: DateTime<Utc>,
    pub checksum: String,
    pub file_name: String,
}

impl From<&RecordingArtifact> for ArtifactInfo {
    fn from(artifact: &RecordingArtifact) -> Self {
        Self {
            id: artifact.id.clone(),
            mode_label: artifact.mode_label(),
            mime_category: artifact.mime_category,
            mime_type: artifact.mime_type.clone(),
            byte_size: artifact.byte_size,
            duration_secs: artifact.duration_secs,
            created_at: artifact.created_at,
            checksum: artifact.checksum.clone(),
            file_name: artifact.suggested_file_name(),
        }
    }
}

/// `mm:ss`, or `h:mm:ss` from one hour on.
pub fn format_elapsed(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_labels() {
        assert_eq!(format_elapsed(0), "00:00");
        assert_eq!(format_elapsed(75), "01:15");
        assert_eq!(format_elapsed(3599), "59:59");
        assert_eq!(format_elapsed(3661), "1:01:01");
    }

    #[test]
    fn error_info_carries_kind_and_message() {
        let info = ErrorInfo::from(&CaptureError::DeviceBusy("mic in use".into()));
        assert_eq!(info.kind, ErrorKind::DeviceBusy);
        assert_eq!(info.message, "device busy: mic in use");
        assert!(info.recoverable);
    }
}

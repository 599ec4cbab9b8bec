use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

use super::mode::{CaptureMode, MediaCategory};
use crate::recorder::format::RecordingFormat;

/// A finished recording, ready to be offered for download.
///
/// Immutable once built. Cloning shares the underlying bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordingArtifact {
    pub id: String,
    pub mode: CaptureMode,
    pub mime_category: MediaCategory,
    pub mime_type: String,
    pub extension: String,
    pub byte_size: u64,
    pub duration_secs: f64,
    pub created_at: DateTime<Utc>,
    /// SHA-256 of the bytes, lowercase hex.
    pub checksum: String,
    #[serde(skip)]
    data: Arc<[u8]>,
}

impl RecordingArtifact {
    pub fn new(mode: CaptureMode, format: &RecordingFormat, data: Vec<u8>, duration_secs: f64) -> Self {
        let checksum = hex_encode(&Sha256::digest(&data));
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            mode,
            mime_category: mode.category(),
            mime_type: format.mime_type.clone(),
            extension: format.extension().to_string(),
            byte_size: data.len() as u64,
            duration_secs,
            created_at: Utc::now(),
            checksum,
            data: data.into(),
        }
    }

    pub fn mode_label(&self) -> &'static str {
        self.mode.label()
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// File name offered to the user when downloading.
    pub fn suggested_file_name(&self) -> String {
        crate::export::file_name(self)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

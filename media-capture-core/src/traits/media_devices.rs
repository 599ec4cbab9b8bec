use async_trait::async_trait;

use crate::models::constraints::{DisplayConstraints, MediaConstraints};
use crate::models::error::PlatformError;
use crate::models::stream::MediaStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaDeviceKind {
    AudioInput,
    VideoInput,
    AudioOutput,
}

/// Raw enumeration entry from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaDeviceInfo {
    pub kind: MediaDeviceKind,
    pub label: String,
    pub device_id: String,
    pub group_id: String,
}

/// Platform device access.
///
/// Implemented by:
/// - `SimPlatform` (media-capture-sim)
/// - a browser binding over `navigator.mediaDevices`
#[async_trait]
pub trait MediaDevices: Send + Sync {
    /// Capture is only exposed to secure (https/localhost) contexts.
    fn is_secure_context(&self) -> bool;

    fn supports_display_capture(&self) -> bool;

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, PlatformError>;

    /// Acquire microphone and/or camera tracks.
    async fn get_user_media(&self, constraints: &MediaConstraints) -> Result<MediaStream, PlatformError>;

    /// Prompt for a display, window or tab surface.
    async fn get_display_media(&self, constraints: &DisplayConstraints) -> Result<MediaStream, PlatformError>;
}

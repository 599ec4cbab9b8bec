pub mod encoder;
pub mod media_devices;
pub mod media_track;
pub mod permission_source;
pub mod preview_sink;
pub mod session_observer;

use encoder::EncoderFactory;
use media_devices::MediaDevices;
use permission_source::PermissionSource;

/// Everything the session controller needs from a platform.
///
/// Blanket-implemented for any type providing the three capabilities.
pub trait MediaPlatform: MediaDevices + PermissionSource + EncoderFactory + 'static {}

impl<T> MediaPlatform for T where T: MediaDevices + PermissionSource + EncoderFactory + 'static {}

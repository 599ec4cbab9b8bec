//! # media-capture-core
//!
//! Platform-agnostic media capture core.
//!
//! Acquires microphone, camera and screen streams through a platform
//! binding, records them into chunked in-memory buffers and drives the
//! whole lifecycle through one state machine. Platform bindings implement
//! the traits in [`traits`] and plug into [`SessionController`].
//!
//! ## Architecture
//!
//! ```text
//! media-capture-core (this crate)
//! ├── traits/     ← MediaDevices, PermissionSource, EncoderFactory, MediaTrack, PreviewSink, SessionObserver
//! ├── models/     ← CaptureMode, CaptureError, SessionState, SessionConfig, RecordingArtifact, etc.
//! ├── devices/    ← DeviceInventory, PermissionTracker
//! ├── session/    ← CaptureSession (stream ownership), SessionController (state machine)
//! ├── recorder/   ← format negotiation, RecordingBuffer, RecorderPipeline
//! └── export/     ← file naming and metadata sidecar
//! ```

pub mod devices;
pub mod export;
pub mod models;
pub mod recorder;
pub mod session;
pub mod subscription;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use devices::inventory::DeviceInventory;
pub use devices::permissions::PermissionTracker;
pub use models::artifact::RecordingArtifact;
pub use models::config::SessionConfig;
pub use models::constraints::{AudioConstraints, DisplayConstraints, FacingMode, MediaConstraints, VideoConstraints};
pub use models::device::{DeviceDescriptor, DeviceKind, DeviceList};
pub use models::error::{Action, CaptureError, ConfigError, ErrorKind, PlatformError, TransitionError};
pub use models::mode::{CaptureMode, MediaCategory};
pub use models::permission::{Capability, PermissionSnapshot, PermissionState};
pub use models::snapshot::{ArtifactInfo, ErrorInfo, SessionSnapshot};
pub use models::state::SessionState;
pub use models::stream::{MediaStream, TrackKind, TrackRef, TrackState};
pub use recorder::buffer::RecordingBuffer;
pub use recorder::format::{Container, RecordingFormat};
pub use recorder::pipeline::{RecorderFailure, RecorderHandle, RecorderPipeline};
pub use session::capture::{Acquisition, ActiveStream, AcquiredStream, CaptureSession};
pub use session::controller::{SessionController, SessionControllerBuilder};
pub use subscription::Subscription;
pub use traits::encoder::{EncoderEvent, EncoderFactory, EncoderOptions, MediaEncoder};
pub use traits::media_devices::{MediaDeviceInfo, MediaDeviceKind, MediaDevices};
pub use traits::media_track::{EndedCallback, MediaTrack};
pub use traits::permission_source::{PermissionCallback, PermissionSource};
pub use traits::preview_sink::PreviewSink;
pub use traits::session_observer::SessionObserver;
pub use traits::MediaPlatform;

//! # media-capture-sim
//!
//! In-memory platform backend for media-capture-core.
//!
//! Provides:
//! - `SimPlatform` — devices, permissions, screen capture and encoders, all scriptable at runtime
//! - `SimTrack` — tracks that can be ended by "the user" to exercise surface-ended handling
//! - `EncoderTap` — test-side control over a running encoder (chunks, failures, stalls)
//! - `RecordingPreview`, `StateLog` — preview sink and observer that record what they saw
//!
//! ## Usage
//! ```ignore
//! use media_capture_core::{CaptureMode, SessionController};
//! use media_capture_sim::SimPlatform;
//!
//! let platform = SimPlatform::new();
//! let controller = SessionController::builder(platform.clone()).build()?;
//! controller.start(CaptureMode::Audio).await?;
//! platform.last_encoder().unwrap().deliver(vec![0; 512]);
//! controller.stop().await?;
//! ```

pub mod devices;
pub mod encoder;
pub mod observer;
pub mod permissions;
pub mod platform;
pub mod preview;
pub mod track;

pub use devices::{device, DeviceCatalog};
pub use encoder::{EncoderTap, SimEncoder};
pub use observer::StateLog;
pub use permissions::PermissionBoard;
pub use platform::{SimPlatform, DEFAULT_SUPPORTED_TYPES};
pub use preview::{PreviewEvent, RecordingPreview};
pub use track::{SimTrack, TrackSource};

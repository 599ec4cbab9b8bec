//! Scriptable platform implementing every media-capture-core platform trait.
//!
//! Defaults model a secure browser tab with one microphone, one camera and
//! one output device, WebM support, and labels withheld until the first
//! grant. Every behavior can be changed at runtime through `&self`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use media_capture_core::models::constraints::{DisplayConstraints, MediaConstraints};
use media_capture_core::models::error::PlatformError;
use media_capture_core::models::permission::{Capability, PermissionState};
use media_capture_core::models::stream::MediaStream;
use media_capture_core::subscription::Subscription;
use media_capture_core::traits::encoder::{EncoderFactory, EncoderOptions, MediaEncoder};
use media_capture_core::traits::media_devices::{MediaDeviceInfo, MediaDeviceKind, MediaDevices};
use media_capture_core::traits::permission_source::{PermissionCallback, PermissionSource};

use crate::devices::DeviceCatalog;
use crate::encoder::{EncoderTap, SimEncoder};
use crate::permissions::PermissionBoard;
use crate::track::{SimTrack, TrackSource};

/// MIME types the simulated encoder accepts by default.
pub const DEFAULT_SUPPORTED_TYPES: &[&str] = &[
    "video/webm;codecs=vp9,opus",
    "video/webm;codecs=vp8,opus",
    "video/webm",
    "audio/webm;codecs=opus",
    "audio/webm",
];

struct SimState {
    secure_context: bool,
    display_supported: bool,
    display_audio: bool,
    catalog: DeviceCatalog,
    permissions: PermissionBoard,
    supported_types: Vec<String>,
    acquisition_delay: Duration,
    tracks_start_ended: bool,
    enumeration_error: Option<PlatformError>,
    microphone_error: Option<PlatformError>,
    camera_error: Option<PlatformError>,
    display_error: Option<PlatformError>,
    encoder_error: Option<PlatformError>,
    tracks: Vec<Arc<SimTrack>>,
    encoders: Vec<EncoderTap>,
    user_media_calls: usize,
    display_media_calls: usize,
}

impl Default for SimState {
    fn default() -> Self {
        Self {
            secure_context: true,
            display_supported: true,
            display_audio: false,
            catalog: DeviceCatalog::default(),
            permissions: PermissionBoard::default(),
            supported_types: DEFAULT_SUPPORTED_TYPES.iter().map(|s| s.to_string()).collect(),
            acquisition_delay: Duration::ZERO,
            tracks_start_ended: false,
            enumeration_error: None,
            microphone_error: None,
            camera_error: None,
            display_error: None,
            encoder_error: None,
            tracks: Vec::new(),
            encoders: Vec::new(),
            user_media_calls: 0,
            display_media_calls: 0,
        }
    }
}

impl SimState {
    fn new_track(&mut self, source: TrackSource, label: String) -> Arc<SimTrack> {
        let track = if self.tracks_start_ended {
            SimTrack::new_ended(source, label)
        } else {
            SimTrack::new(source, label)
        };
        self.tracks.push(Arc::clone(&track));
        track
    }

    fn grant(&mut self, capability: Capability) -> Vec<PermissionCallback> {
        self.catalog.grant_labels();
        self.permissions.set(capability, PermissionState::Granted)
    }
}

#[derive(Default)]
pub struct SimPlatform {
    state: Arc<Mutex<SimState>>,
}

impl SimPlatform {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_secure_context(&self, secure: bool) {
        self.state.lock().secure_context = secure;
    }

    pub fn set_display_supported(&self, supported: bool) {
        self.state.lock().display_supported = supported;
    }

    /// Offer a system audio track with screen captures.
    pub fn set_display_audio(&self, offered: bool) {
        self.state.lock().display_audio = offered;
    }

    pub fn set_devices(&self, devices: Vec<MediaDeviceInfo>) {
        self.state.lock().catalog.replace(devices);
    }

    pub fn remove_devices(&self, kind: MediaDeviceKind) {
        self.state.lock().catalog.remove_kind(kind);
    }

    pub fn set_supported_types(&self, types: &[&str]) {
        self.state.lock().supported_types = types.iter().map(|s| s.to_string()).collect();
    }

    /// Time every acquisition request takes to resolve.
    pub fn set_acquisition_delay(&self, delay: Duration) {
        self.state.lock().acquisition_delay = delay;
    }

    /// Hand out tracks that are already ended.
    pub fn set_tracks_start_ended(&self, ended: bool) {
        self.state.lock().tracks_start_ended = ended;
    }

    pub fn fail_enumeration(&self, error: Option<PlatformError>) {
        self.state.lock().enumeration_error = error;
    }

    pub fn fail_microphone(&self, error: Option<PlatformError>) {
        self.state.lock().microphone_error = error;
    }

    pub fn fail_camera(&self, error: Option<PlatformError>) {
        self.state.lock().camera_error = error;
    }

    pub fn fail_display(&self, error: Option<PlatformError>) {
        self.state.lock().display_error = error;
    }

    pub fn fail_encoder_creation(&self, error: Option<PlatformError>) {
        self.state.lock().encoder_error = error;
    }

    pub fn set_permission_query_supported(&self, supported: bool) {
        self.state.lock().permissions.query_supported = supported;
    }

    pub fn set_permission_watch_supported(&self, supported: bool) {
        self.state.lock().permissions.watch_supported = supported;
    }

    /// Change a permission as the user would in browser settings.
    pub fn set_permission(&self, capability: Capability, state: PermissionState) {
        let callbacks = self.state.lock().permissions.set(capability, state);
        for callback in callbacks {
            callback(state);
        }
    }

    pub fn permission(&self, capability: Capability) -> PermissionState {
        self.state.lock().permissions.get(capability)
    }

    pub fn permission_watcher_count(&self) -> usize {
        self.state.lock().permissions.watcher_count()
    }

    /// The user clicks "Stop sharing": every live display track ends.
    pub fn end_display_surface(&self) -> usize {
        let display: Vec<Arc<SimTrack>> = self
            .state
            .lock()
            .tracks
            .iter()
            .filter(|track| track.source() == TrackSource::Display && track.is_live())
            .cloned()
            .collect();
        for track in &display {
            track.end_by_platform();
        }
        display.len()
    }

    pub fn tracks(&self) -> Vec<Arc<SimTrack>> {
        self.state.lock().tracks.clone()
    }

    pub fn live_track_count(&self) -> usize {
        self.state.lock().tracks.iter().filter(|track| track.is_live()).count()
    }

    pub fn last_encoder(&self) -> Option<EncoderTap> {
        self.state.lock().encoders.last().cloned()
    }

    pub fn encoder_count(&self) -> usize {
        self.state.lock().encoders.len()
    }

    pub fn user_media_calls(&self) -> usize {
        self.state.lock().user_media_calls
    }

    pub fn display_media_calls(&self) -> usize {
        self.state.lock().display_media_calls
    }

    fn notify(callbacks: Vec<PermissionCallback>) {
        for callback in callbacks {
            callback(PermissionState::Granted);
        }
    }
}

#[async_trait]
impl MediaDevices for SimPlatform {
    fn is_secure_context(&self) -> bool {
        self.state.lock().secure_context
    }

    fn supports_display_capture(&self) -> bool {
        self.state.lock().display_supported
    }

    async fn enumerate_devices(&self) -> Result<Vec<MediaDeviceInfo>, PlatformError> {
        let state = self.state.lock();
        if let Some(err) = &state.enumeration_error {
            return Err(err.clone());
        }
        Ok(state.catalog.enumerate())
    }

    async fn get_user_media(&self, constraints: &MediaConstraints) -> Result<MediaStream, PlatformError> {
        let delay = {
            let mut state = self.state.lock();
            state.user_media_calls += 1;
            state.acquisition_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let (stream, callbacks) = {
            let mut state = self.state.lock();
            if constraints.audio.is_some() {
                if let Some(err) = &state.microphone_error {
                    return Err(err.clone());
                }
                if !state.catalog.has(MediaDeviceKind::AudioInput) {
                    return Err(PlatformError::new("NotFoundError", "Requested device not found"));
                }
            }
            if constraints.video.is_some() {
                if let Some(err) = &state.camera_error {
                    return Err(err.clone());
                }
                if !state.catalog.has(MediaDeviceKind::VideoInput) {
                    return Err(PlatformError::new("NotFoundError", "Requested device not found"));
                }
            }

            let mut tracks = Vec::new();
            let mut callbacks = Vec::new();
            if constraints.audio.is_some() {
                let label = state
                    .catalog
                    .first_label(MediaDeviceKind::AudioInput)
                    .unwrap_or_default();
                tracks.push(state.new_track(TrackSource::Microphone, label).as_track_ref());
                callbacks.extend(state.grant(Capability::Microphone));
            }
            if constraints.video.is_some() {
                let label = state
                    .catalog
                    .first_label(MediaDeviceKind::VideoInput)
                    .unwrap_or_default();
                tracks.push(state.new_track(TrackSource::Camera, label).as_track_ref());
                callbacks.extend(state.grant(Capability::Camera));
            }
            (MediaStream::new(tracks), callbacks)
        };
        Self::notify(callbacks);
        Ok(stream)
    }

    async fn get_display_media(&self, constraints: &DisplayConstraints) -> Result<MediaStream, PlatformError> {
        let delay = {
            let mut state = self.state.lock();
            state.display_media_calls += 1;
            state.acquisition_delay
        };
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let (stream, callbacks) = {
            let mut state = self.state.lock();
            if let Some(err) = &state.display_error {
                return Err(err.clone());
            }
            let mut tracks = vec![state.new_track(TrackSource::Display, "Screen 1".into()).as_track_ref()];
            if state.display_audio && constraints.request_system_audio {
                tracks.push(state.new_track(TrackSource::SystemAudio, "System Audio".into()).as_track_ref());
            }
            let callbacks = state.permissions.set(Capability::Screen, PermissionState::Granted);
            (MediaStream::new(tracks), callbacks)
        };
        Self::notify(callbacks);
        Ok(stream)
    }
}

#[async_trait]
impl PermissionSource for SimPlatform {
    async fn query_permission(&self, capability: Capability) -> Result<PermissionState, PlatformError> {
        let state = self.state.lock();
        if !state.permissions.query_supported {
            return Err(PlatformError::new(
                "TypeError",
                format!("permission query for '{}' is not supported", capability),
            ));
        }
        Ok(state.permissions.get(capability))
    }

    fn watch_permission(&self, capability: Capability, callback: PermissionCallback) -> Option<Subscription> {
        let id = {
            let mut state = self.state.lock();
            if !state.permissions.watch_supported {
                return None;
            }
            state.permissions.add_watcher(capability, callback)
        };
        let state = Arc::clone(&self.state);
        Some(Subscription::new(move || {
            state.lock().permissions.remove_watcher(id);
        }))
    }
}

impl EncoderFactory for SimPlatform {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        self.state
            .lock()
            .supported_types
            .iter()
            .any(|supported| supported.eq_ignore_ascii_case(mime_type))
    }

    fn create_encoder(
        &self,
        stream: &MediaStream,
        options: &EncoderOptions,
    ) -> Result<Box<dyn MediaEncoder>, PlatformError> {
        let mut state = self.state.lock();
        if let Some(err) = &state.encoder_error {
            return Err(err.clone());
        }
        if !state.supported_types.iter().any(|t| t.eq_ignore_ascii_case(&options.mime_type)) {
            return Err(PlatformError::new(
                "NotSupportedError",
                format!("{} is not supported", options.mime_type),
            ));
        }
        let (encoder, tap) = SimEncoder::new(stream.id().to_string(), options.clone());
        state.encoders.push(tap);
        Ok(Box::new(encoder))
    }
}

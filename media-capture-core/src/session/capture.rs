//! Capture session: owns the one live stream of the current attempt.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::time;

use crate::models::config::SessionConfig;
use crate::models::constraints::MediaConstraints;
use crate::models::error::CaptureError;
use crate::models::mode::CaptureMode;
use crate::models::stream::{MediaStream, TrackKind};
use crate::subscription::Subscription;
use crate::traits::media_devices::MediaDevices;
use crate::traits::preview_sink::PreviewSink;

/// Called when the user ends a screen share from outside the app.
pub type SurfaceEndedCallback = Arc<dyn Fn() + Send + Sync + 'static>;

/// Owning handle for an acquired stream.
///
/// Releasing drops the track listeners, hides the preview and stops every
/// live track. Runs at most once, and on drop if not done explicitly.
pub struct ActiveStream {
    stream: MediaStream,
    mode: CaptureMode,
    generation: u64,
    preview: Option<Arc<dyn PreviewSink>>,
    subscriptions: Vec<Subscription>,
    released: bool,
}

impl ActiveStream {
    fn new(stream: MediaStream, mode: CaptureMode, generation: u64) -> Self {
        Self {
            stream,
            mode,
            generation,
            preview: None,
            subscriptions: Vec::new(),
            released: false,
        }
    }

    pub fn stream(&self) -> &MediaStream {
        &self.stream
    }

    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn release(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        self.subscriptions.clear();
        if let Some(preview) = self.preview.take() {
            preview.hide();
        }
        self.stream.stop_all();
        log::debug!(
            "Released {} stream {} ({} tracks)",
            self.mode,
            self.stream.id(),
            self.stream.tracks().len()
        );
    }
}

impl Drop for ActiveStream {
    fn drop(&mut self) {
        self.release();
    }
}

/// A successful acquisition. `stream` is a view; the session keeps ownership.
#[derive(Debug, Clone)]
pub struct AcquiredStream {
    pub stream: MediaStream,
    /// Non-fatal problem, e.g. the microphone of a screen+audio capture.
    pub warning: Option<String>,
    pub generation: u64,
}

#[derive(Debug, Clone)]
pub enum Acquisition {
    Ready(AcquiredStream),
    /// A newer acquire or a release happened while this one was in flight.
    /// The result was released.
    Superseded,
}

pub struct CaptureSession<D: ?Sized> {
    devices: Arc<D>,
    config: Arc<SessionConfig>,
    preview: Option<Arc<dyn PreviewSink>>,
    slot: Mutex<Option<ActiveStream>>,
    generation: AtomicU64,
}

impl<D: MediaDevices + ?Sized> CaptureSession<D> {
    pub fn new(devices: Arc<D>, config: Arc<SessionConfig>, preview: Option<Arc<dyn PreviewSink>>) -> Self {
        Self {
            devices,
            config,
            preview,
            slot: Mutex::new(None),
            generation: AtomicU64::new(0),
        }
    }

    /// Acquire a stream for `mode`, replacing whatever was held before.
    ///
    /// The previous stream is released before anything is requested from
    /// the platform. `on_surface_ended` is registered on the video tracks of
    /// screen captures. The preview sink receives the stream of modes with
    /// a visual component; it must not call back into the session.
    ///
    /// With `microphone_listed` false, a screen+audio capture skips the
    /// microphone request and degrades straight away.
    pub async fn acquire(
        &self,
        mode: CaptureMode,
        microphone_listed: bool,
        on_surface_ended: Option<SurfaceEndedCallback>,
    ) -> Result<Acquisition, CaptureError> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.release_slot();

        if !self.devices.is_secure_context() {
            return Err(CaptureError::InsecureContext(
                "media capture requires a secure context (HTTPS or localhost)".into(),
            ));
        }

        let settle = self.config.settle_interval();
        if !settle.is_zero() {
            time::sleep(settle).await;
        }
        if !self.is_current(generation) {
            return Ok(Acquisition::Superseded);
        }

        let mut warning = None;
        let mut held = match mode {
            CaptureMode::Audio => {
                let constraints = MediaConstraints::microphone(self.config.audio.clone());
                let stream = self
                    .devices
                    .get_user_media(&constraints)
                    .await
                    .map_err(CaptureError::from)?;
                ActiveStream::new(stream, mode, generation)
            }
            CaptureMode::Video => {
                let constraints =
                    MediaConstraints::camera_with_microphone(self.config.audio.clone(), self.config.video.clone());
                let stream = self
                    .devices
                    .get_user_media(&constraints)
                    .await
                    .map_err(CaptureError::from)?;
                ActiveStream::new(stream, mode, generation)
            }
            CaptureMode::Screen => self.acquire_display(mode, generation).await?,
            CaptureMode::ScreenWithAudio => {
                let mut held = self.acquire_display(mode, generation).await?;
                if !self.is_current(generation) {
                    return Ok(Acquisition::Superseded);
                }
                let microphone = if microphone_listed {
                    let constraints = MediaConstraints::microphone(self.config.audio.clone());
                    self.devices
                        .get_user_media(&constraints)
                        .await
                        .map_err(CaptureError::from)
                } else {
                    Err(CaptureError::DeviceNotFound("no microphone is connected".into()))
                };
                match microphone {
                    Ok(microphone) => held.stream.add_tracks(microphone),
                    Err(err) => {
                        log::warn!("Continuing screen capture without microphone: {}", err);
                        warning = Some(err.message().to_string());
                    }
                }
                held
            }
        };

        if !self.is_current(generation) {
            log::debug!("Discarding late {} acquisition (generation {})", mode, generation);
            return Ok(Acquisition::Superseded);
        }

        if !held.stream.has_live_track() {
            held.release();
            return Err(CaptureError::Unknown("acquired stream has no live tracks".into()));
        }

        if mode.is_screen() {
            if let Some(on_ended) = on_surface_ended {
                let subscriptions: Vec<Subscription> = held
                    .stream
                    .tracks_of(TrackKind::Video)
                    .map(|track| {
                        let on_ended = Arc::clone(&on_ended);
                        track.on_ended(Box::new(move || on_ended()))
                    })
                    .collect();
                held.subscriptions.extend(subscriptions);
            }
        }

        let view = held.stream.clone();
        let mut slot = self.slot.lock();
        if !self.is_current(generation) {
            drop(slot);
            log::debug!("Discarding late {} acquisition (generation {})", mode, generation);
            return Ok(Acquisition::Superseded);
        }
        if mode.requires_preview() {
            if let Some(preview) = &self.preview {
                preview.show(&view);
                held.preview = Some(Arc::clone(preview));
            }
        }
        let previous = slot.replace(held);
        drop(slot);
        drop(previous);

        log::info!(
            "Acquired {} stream {} with {} live tracks",
            mode,
            view.id(),
            view.live_track_count()
        );
        Ok(Acquisition::Ready(AcquiredStream {
            stream: view,
            warning,
            generation,
        }))
    }

    async fn acquire_display(&self, mode: CaptureMode, generation: u64) -> Result<ActiveStream, CaptureError> {
        if !self.devices.supports_display_capture() {
            return Err(CaptureError::DeviceNotFound(
                "screen capture is not supported on this platform".into(),
            ));
        }
        let stream = self
            .devices
            .get_display_media(&self.config.display)
            .await
            .map_err(CaptureError::from_display_media)?;
        Ok(ActiveStream::new(stream, mode, generation))
    }

    /// Release the held stream and invalidate in-flight acquisitions.
    /// Returns whether a stream was held.
    pub fn release(&self) -> bool {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.release_slot()
    }

    fn release_slot(&self) -> bool {
        let held = self.slot.lock().take();
        match held {
            Some(mut active) => {
                active.release();
                true
            }
            None => false,
        }
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    pub fn is_holding(&self) -> bool {
        self.slot.lock().is_some()
    }

    /// View of the held stream, if any.
    pub fn stream(&self) -> Option<MediaStream> {
        self.slot.lock().as_ref().map(|active| active.stream.clone())
    }

    /// Release the held stream only if it came from acquisition
    /// `generation`.
    pub fn release_generation(&self, generation: u64) -> bool {
        let held = {
            let mut slot = self.slot.lock();
            match slot.as_ref() {
                Some(active) if active.generation == generation => slot.take(),
                _ => None,
            }
        };
        match held {
            Some(mut active) => {
                active.release();
                true
            }
            None => false,
        }
    }
}

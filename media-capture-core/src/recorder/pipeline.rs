//! Recorder pipeline: wraps a live stream in a platform encoder, buffers
//! the chunks it emits and finalizes them into one artifact.
//!
//! ```text
//! [ActiveStream] → [MediaEncoder] → EncoderEvent channel → drain task → [RecordingBuffer]
//!                                                                           ↓ stop
//!                                                                  [RecordingArtifact]
//! ```
//!
//! The drain task is the one that stops the encoder, after every event
//! queued ahead of the stop request has been handled. An encoder error seen
//! before that point is a recording failure; one seen after is a
//! finalization failure.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::buffer::RecordingBuffer;
use super::format::{self, RecordingFormat};
use crate::models::artifact::RecordingArtifact;
use crate::models::config::SessionConfig;
use crate::models::error::CaptureError;
use crate::models::mode::CaptureMode;
use crate::models::stream::MediaStream;
use crate::traits::encoder::{EncoderEvent, EncoderFactory, EncoderOptions, MediaEncoder};

/// Invoked once if the encoder fails while recording.
pub type FailureCallback = Box<dyn FnOnce(CaptureError) + Send + 'static>;

type SharedEncoder = Arc<Mutex<Box<dyn MediaEncoder>>>;

#[derive(Debug)]
enum Finalization {
    Flushed,
    /// The encoder failed while recording, before the stop request.
    Interrupted(CaptureError),
    /// The encoder failed while flushing after the stop request.
    Failed(CaptureError),
}

/// A recording that could not be finalized.
///
/// `salvaged` holds the chunks buffered before the failure, if any.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{error}")]
pub struct RecorderFailure {
    pub error: CaptureError,
    pub salvaged: Option<RecordingArtifact>,
}

impl From<CaptureError> for RecorderFailure {
    fn from(error: CaptureError) -> Self {
        Self { error, salvaged: None }
    }
}

/// A running recording. Dropping it stops the encoder and discards the
/// buffer.
pub struct RecorderHandle {
    mode: CaptureMode,
    format: RecordingFormat,
    encoder: SharedEncoder,
    buffer: Arc<Mutex<RecordingBuffer>>,
    stop_request: Option<oneshot::Sender<()>>,
    finished: Option<oneshot::Receiver<Finalization>>,
    drain: Option<JoinHandle<()>>,
    started_at: Instant,
}

impl RecorderHandle {
    pub fn mode(&self) -> CaptureMode {
        self.mode
    }

    pub fn format(&self) -> &RecordingFormat {
        &self.format
    }

    pub fn buffered_bytes(&self) -> usize {
        self.buffer.lock().byte_size()
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    fn stop_encoder(&self) {
        self.encoder.lock().stop();
    }

    /// Hand the stop to the drain task. Falls back to stopping the encoder
    /// here when the task has already finished.
    fn request_stop(&mut self) {
        let delivered = match self.stop_request.take() {
            Some(request) => request.send(()).is_ok(),
            None => false,
        };
        if !delivered {
            self.stop_encoder();
        }
    }

    fn take_artifact(&mut self, duration: Duration) -> Option<RecordingArtifact> {
        let data = self.buffer.lock().take_all();
        if data.is_empty() {
            return None;
        }
        Some(RecordingArtifact::new(
            self.mode,
            &self.format,
            data,
            duration.as_secs_f64(),
        ))
    }
}

impl Drop for RecorderHandle {
    fn drop(&mut self) {
        self.stop_encoder();
        if let Some(drain) = self.drain.take() {
            drain.abort();
        }
    }
}

pub struct RecorderPipeline<E: ?Sized> {
    encoders: Arc<E>,
    config: Arc<SessionConfig>,
}

impl<E: EncoderFactory + ?Sized> RecorderPipeline<E> {
    pub fn new(encoders: Arc<E>, config: Arc<SessionConfig>) -> Self {
        Self { encoders, config }
    }

    pub fn select_format(&self, mode: CaptureMode) -> Result<RecordingFormat, CaptureError> {
        format::negotiate(self.config.mime_preferences(mode), mode.category(), |mime| {
            self.encoders.is_type_supported(mime)
        })
    }

    pub fn encoder_options(&self, mode: CaptureMode, format: &RecordingFormat) -> EncoderOptions {
        EncoderOptions {
            mime_type: format.mime_type.clone(),
            audio_bits_per_second: Some(self.config.audio_bits_per_second),
            video_bits_per_second: mode.has_video().then_some(self.config.video_bits_per_second),
        }
    }

    /// Start encoding `stream`. Chunks arrive every configured timeslice.
    ///
    /// `on_failure` fires if the encoder reports an error before it is
    /// stopped. Must be called from within a tokio runtime.
    pub fn start(
        &self,
        stream: &MediaStream,
        mode: CaptureMode,
        on_failure: Option<FailureCallback>,
    ) -> Result<RecorderHandle, CaptureError> {
        let format = self.select_format(mode)?;
        let options = self.encoder_options(mode, &format);

        let mut encoder = self
            .encoders
            .create_encoder(stream, &options)
            .map_err(CaptureError::from_encoder)?;
        let events = encoder
            .start(self.config.timeslice())
            .map_err(CaptureError::from_encoder)?;
        let encoder: SharedEncoder = Arc::new(Mutex::new(encoder));

        let buffer = Arc::new(Mutex::new(RecordingBuffer::new()));
        let (stop_tx, stop_rx) = oneshot::channel();
        let (finished_tx, finished_rx) = oneshot::channel();
        let drain = tokio::spawn(drain_events(
            events,
            Arc::clone(&encoder),
            Arc::clone(&buffer),
            stop_rx,
            finished_tx,
            on_failure,
        ));

        log::info!(
            "Recorder started: mode={} format={} timeslice={:?}",
            mode,
            format.mime_type,
            self.config.timeslice()
        );

        Ok(RecorderHandle {
            mode,
            format,
            encoder,
            buffer,
            stop_request: Some(stop_tx),
            finished: Some(finished_rx),
            drain: Some(drain),
            started_at: Instant::now(),
        })
    }

    /// Stop the encoder, wait for its final chunk and build the artifact.
    ///
    /// Fails with `NoDataRecorded` if nothing was buffered. An encoder error
    /// during finalization still yields an artifact when chunks exist. An
    /// error the encoder reported before the stop fails the recording, with
    /// the buffered chunks attached as `salvaged`.
    pub async fn stop(&self, mut handle: RecorderHandle) -> Result<RecordingArtifact, RecorderFailure> {
        let duration = handle.elapsed();
        handle.request_stop();

        let outcome = match handle.finished.take() {
            Some(finished) => match time::timeout(self.config.finalize_timeout(), finished).await {
                Ok(Ok(outcome)) => outcome,
                Ok(Err(_)) => Finalization::Flushed,
                Err(_) => {
                    log::warn!(
                        "Encoder did not finish within {:?}; finalizing buffered data",
                        self.config.finalize_timeout()
                    );
                    Finalization::Flushed
                }
            },
            None => Finalization::Flushed,
        };
        handle.stop_encoder();

        let artifact = handle.take_artifact(duration);
        match (outcome, artifact) {
            (Finalization::Interrupted(error), salvaged) => {
                log::warn!(
                    "Encoder failed before stop ({}); salvaged {} bytes",
                    error,
                    salvaged.as_ref().map_or(0, |a| a.byte_size)
                );
                Err(RecorderFailure { error, salvaged })
            }
            (Finalization::Failed(err), None) => Err(err.into()),
            (Finalization::Failed(err), Some(artifact)) => {
                log::warn!(
                    "Encoder failed during finalization ({}); keeping {} buffered bytes",
                    err,
                    artifact.byte_size
                );
                Ok(artifact)
            }
            (Finalization::Flushed, None) => Err(CaptureError::NoDataRecorded.into()),
            (Finalization::Flushed, Some(artifact)) => {
                log::info!(
                    "Recording finalized: {} bytes, {:.1}s, {}",
                    artifact.byte_size,
                    artifact.duration_secs,
                    artifact.mime_type
                );
                Ok(artifact)
            }
        }
    }

    /// Stop without waiting for a final flush and keep whatever was already
    /// buffered. Used when the encoder has failed mid-recording.
    pub fn salvage(&self, mut handle: RecorderHandle) -> Option<RecordingArtifact> {
        let duration = handle.elapsed();
        handle.stop_encoder();
        let artifact = handle.take_artifact(duration);
        match &artifact {
            Some(a) => log::info!("Salvaged {} bytes from failed recording", a.byte_size),
            None => log::info!("Nothing to salvage from failed recording"),
        }
        artifact
    }
}

async fn drain_events(
    mut events: mpsc::UnboundedReceiver<EncoderEvent>,
    encoder: SharedEncoder,
    buffer: Arc<Mutex<RecordingBuffer>>,
    mut stop_request: oneshot::Receiver<()>,
    finished: oneshot::Sender<Finalization>,
    mut on_failure: Option<FailureCallback>,
) {
    let mut stopping = false;
    let outcome = loop {
        tokio::select! {
            // Queued events belong to the recording, not to its finalization.
            biased;
            event = events.recv() => match event {
                Some(EncoderEvent::Data(chunk)) => {
                    let size = chunk.len();
                    if buffer.lock().append(chunk) {
                        log::trace!("Buffered {} byte chunk", size);
                    } else {
                        log::trace!("Dropped {} byte chunk", size);
                    }
                }
                Some(EncoderEvent::Error(err)) => {
                    let error = CaptureError::from(err);
                    if stopping {
                        log::error!("Encoder failed while finalizing: {}", error);
                        break Finalization::Failed(error);
                    }
                    log::error!("Encoder failed: {}", error);
                    if let Some(notify) = on_failure.take() {
                        notify(error.clone());
                    }
                    break Finalization::Interrupted(error);
                }
                Some(EncoderEvent::Stopped) | None => break Finalization::Flushed,
            },
            _ = &mut stop_request, if !stopping => {
                stopping = true;
                encoder.lock().stop();
            }
        }
    };
    let _ = finished.send(outcome);
}

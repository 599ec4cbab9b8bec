//! Scriptable encoder. Tests push chunks through an [`EncoderTap`].

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;

use media_capture_core::models::error::PlatformError;
use media_capture_core::traits::encoder::{EncoderEvent, EncoderOptions, MediaEncoder};

struct TapState {
    options: EncoderOptions,
    stream_id: String,
    sender: Option<mpsc::UnboundedSender<EncoderEvent>>,
    timeslice: Option<Duration>,
    stopped: bool,
    final_chunk: Option<Vec<u8>>,
    stall_on_stop: bool,
    fail_on_stop: Option<PlatformError>,
}

/// Test-side handle on a [`SimEncoder`].
#[derive(Clone)]
pub struct EncoderTap {
    state: Arc<Mutex<TapState>>,
}

impl EncoderTap {
    fn new(stream_id: String, options: EncoderOptions) -> Self {
        Self {
            state: Arc::new(Mutex::new(TapState {
                options,
                stream_id,
                sender: None,
                timeslice: None,
                stopped: false,
                final_chunk: None,
                stall_on_stop: false,
                fail_on_stop: None,
            })),
        }
    }

    /// Emit one chunk, as a timeslice elapsing would. Returns false once the
    /// encoder is stopped or was never started.
    pub fn deliver(&self, chunk: Vec<u8>) -> bool {
        let state = self.state.lock();
        if state.stopped {
            return false;
        }
        match &state.sender {
            Some(sender) => sender.send(EncoderEvent::Data(chunk)).is_ok(),
            None => false,
        }
    }

    /// Report a mid-recording encoder error.
    pub fn fail(&self, name: &str, message: &str) -> bool {
        let state = self.state.lock();
        match &state.sender {
            Some(sender) => sender
                .send(EncoderEvent::Error(PlatformError::new(name, message)))
                .is_ok(),
            None => false,
        }
    }

    /// Chunk flushed when the encoder is stopped.
    pub fn set_final_chunk(&self, chunk: Vec<u8>) {
        self.state.lock().final_chunk = Some(chunk);
    }

    /// Never signal completion after stop.
    pub fn set_stall_on_stop(&self, stall: bool) {
        self.state.lock().stall_on_stop = stall;
    }

    /// Report `error` instead of completion after stop.
    pub fn set_fail_on_stop(&self, error: PlatformError) {
        self.state.lock().fail_on_stop = Some(error);
    }

    pub fn is_started(&self) -> bool {
        self.state.lock().timeslice.is_some()
    }

    pub fn is_stopped(&self) -> bool {
        self.state.lock().stopped
    }

    pub fn options(&self) -> EncoderOptions {
        self.state.lock().options.clone()
    }

    pub fn timeslice(&self) -> Option<Duration> {
        self.state.lock().timeslice
    }

    pub fn stream_id(&self) -> String {
        self.state.lock().stream_id.clone()
    }
}

pub struct SimEncoder {
    mime_type: String,
    tap: EncoderTap,
}

impl SimEncoder {
    pub fn new(stream_id: String, options: EncoderOptions) -> (Self, EncoderTap) {
        let tap = EncoderTap::new(stream_id, options.clone());
        let encoder = Self {
            mime_type: options.mime_type,
            tap: tap.clone(),
        };
        (encoder, tap)
    }
}

impl MediaEncoder for SimEncoder {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn start(&mut self, timeslice: Duration) -> Result<mpsc::UnboundedReceiver<EncoderEvent>, PlatformError> {
        let mut state = self.tap.state.lock();
        if state.timeslice.is_some() {
            return Err(PlatformError::new("InvalidStateError", "encoder already started"));
        }
        let (sender, receiver) = mpsc::unbounded_channel();
        state.sender = Some(sender);
        state.timeslice = Some(timeslice);
        log::debug!("Sim encoder started: {} every {:?}", self.mime_type, timeslice);
        Ok(receiver)
    }

    fn stop(&mut self) {
        let mut state = self.tap.state.lock();
        if state.stopped {
            return;
        }
        state.stopped = true;
        if state.stall_on_stop {
            return;
        }
        let Some(sender) = state.sender.take() else {
            return;
        };
        if let Some(chunk) = state.final_chunk.take() {
            let _ = sender.send(EncoderEvent::Data(chunk));
        }
        let last = match state.fail_on_stop.take() {
            Some(error) => EncoderEvent::Error(error),
            None => EncoderEvent::Stopped,
        };
        let _ = sender.send(last);
    }
}

use std::time::Duration;

use tokio::sync::mpsc;

use crate::models::error::PlatformError;
use crate::models::stream::MediaStream;

/// Settings passed to the platform encoder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncoderOptions {
    pub mime_type: String,
    pub audio_bits_per_second: Option<u32>,
    pub video_bits_per_second: Option<u32>,
}

/// Events delivered by a running encoder, in platform order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncoderEvent {
    /// An encoded chunk. May be empty.
    Data(Vec<u8>),
    Error(PlatformError),
    /// The encoder flushed its last chunk and stopped.
    Stopped,
}

/// Incremental encoder over a live stream.
pub trait MediaEncoder: Send {
    fn mime_type(&self) -> &str;

    /// Begin encoding, delivering a chunk every `timeslice`.
    fn start(&mut self, timeslice: Duration) -> Result<mpsc::UnboundedReceiver<EncoderEvent>, PlatformError>;

    /// Ask the encoder to flush and stop. Completion is signalled by
    /// `EncoderEvent::Stopped`. Idempotent.
    fn stop(&mut self);
}

pub trait EncoderFactory: Send + Sync {
    fn is_type_supported(&self, mime_type: &str) -> bool;

    fn create_encoder(
        &self,
        stream: &MediaStream,
        options: &EncoderOptions,
    ) -> Result<Box<dyn MediaEncoder>, PlatformError>;
}

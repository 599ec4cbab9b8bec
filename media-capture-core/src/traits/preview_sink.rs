use crate::models::stream::MediaStream;

/// Where a live video or screen stream is shown while recording.
pub trait PreviewSink: Send + Sync {
    fn show(&self, stream: &MediaStream);

    fn hide(&self);
}

//! Preview sink that records what it was asked to show.

use parking_lot::Mutex;

use media_capture_core::models::stream::MediaStream;
use media_capture_core::traits::preview_sink::PreviewSink;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewEvent {
    Shown { stream_id: String, tracks: usize },
    Hidden,
}

#[derive(Default)]
pub struct RecordingPreview {
    events: Mutex<Vec<PreviewEvent>>,
}

impl RecordingPreview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PreviewEvent> {
        self.events.lock().clone()
    }

    /// Whether the most recent event was a show.
    pub fn is_showing(&self) -> bool {
        matches!(self.events.lock().last(), Some(PreviewEvent::Shown { .. }))
    }
}

impl PreviewSink for RecordingPreview {
    fn show(&self, stream: &MediaStream) {
        self.events.lock().push(PreviewEvent::Shown {
            stream_id: stream.id().to_string(),
            tracks: stream.tracks().len(),
        });
    }

    fn hide(&self) {
        self.events.lock().push(PreviewEvent::Hidden);
    }
}

//! In-memory media track.

use std::sync::Arc;

use parking_lot::Mutex;

use media_capture_core::models::stream::{TrackKind, TrackRef, TrackState};
use media_capture_core::subscription::Subscription;
use media_capture_core::traits::media_track::{EndedCallback, MediaTrack};

/// What produced a simulated track.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackSource {
    Microphone,
    Camera,
    Display,
    SystemAudio,
}

impl TrackSource {
    pub fn kind(self) -> TrackKind {
        match self {
            Self::Microphone | Self::SystemAudio => TrackKind::Audio,
            Self::Camera | Self::Display => TrackKind::Video,
        }
    }
}

type Listener = Arc<dyn Fn() + Send + Sync + 'static>;

#[derive(Default)]
struct Listeners {
    next_id: u64,
    callbacks: Vec<(u64, Listener)>,
}

/// A track whose lifetime is driven by the test.
///
/// `stop()` is the application ending the track and, like a browser, does
/// not fire `ended` listeners. [`SimTrack::end_by_platform`] is the user
/// or OS ending it and does.
pub struct SimTrack {
    id: String,
    source: TrackSource,
    label: String,
    state: Mutex<TrackState>,
    listeners: Arc<Mutex<Listeners>>,
}

impl SimTrack {
    pub fn new(source: TrackSource, label: impl Into<String>) -> Arc<Self> {
        Arc::new(Self {
            id: uuid::Uuid::new_v4().to_string(),
            source,
            label: label.into(),
            state: Mutex::new(TrackState::Live),
            listeners: Arc::new(Mutex::new(Listeners::default())),
        })
    }

    /// A track that ended before it was handed out.
    pub fn new_ended(source: TrackSource, label: impl Into<String>) -> Arc<Self> {
        let track = Self::new(source, label);
        *track.state.lock() = TrackState::Ended;
        track
    }

    pub fn source(&self) -> TrackSource {
        self.source
    }

    pub fn is_live(&self) -> bool {
        *self.state.lock() == TrackState::Live
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.lock().callbacks.len()
    }

    pub fn as_track_ref(self: &Arc<Self>) -> TrackRef {
        Arc::clone(self) as TrackRef
    }

    /// End the track from outside the application and notify listeners.
    pub fn end_by_platform(&self) {
        {
            let mut state = self.state.lock();
            if *state == TrackState::Ended {
                return;
            }
            *state = TrackState::Ended;
        }
        let callbacks: Vec<Listener> = self
            .listeners
            .lock()
            .callbacks
            .iter()
            .map(|(_, callback)| Arc::clone(callback))
            .collect();
        log::debug!("Track {} ({:?}) ended by platform", self.id, self.source);
        for callback in callbacks {
            callback();
        }
    }
}

impl MediaTrack for SimTrack {
    fn id(&self) -> &str {
        &self.id
    }

    fn kind(&self) -> TrackKind {
        self.source.kind()
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn ready_state(&self) -> TrackState {
        *self.state.lock()
    }

    fn stop(&self) {
        *self.state.lock() = TrackState::Ended;
    }

    fn on_ended(&self, callback: EndedCallback) -> Subscription {
        let id = {
            let mut listeners = self.listeners.lock();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.callbacks.push((id, Arc::from(callback)));
            id
        };
        let listeners = Arc::clone(&self.listeners);
        Subscription::new(move || {
            listeners.lock().callbacks.retain(|(existing, _)| *existing != id);
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn stop_does_not_fire_listeners() {
        let track = SimTrack::new(TrackSource::Display, "Screen 1");
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let _sub = track.on_ended(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        track.stop();
        assert_eq!(track.ready_state(), TrackState::Ended);
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn platform_end_fires_until_unsubscribed() {
        let track = SimTrack::new(TrackSource::Display, "Screen 1");
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let sub = track.on_ended(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));
        assert_eq!(track.listener_count(), 1);

        drop(sub);
        assert_eq!(track.listener_count(), 0);
        track.end_by_platform();
        assert_eq!(fired.load(Ordering::SeqCst), 0);
        assert!(!track.is_live());
    }
}

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::traits::media_track::MediaTrack;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackKind {
    Audio,
    Video,
}

/// Platform ready state of a track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackState {
    Live,
    Ended,
}

pub type TrackRef = Arc<dyn MediaTrack>;

/// A set of tracks handed out by the platform.
///
/// This is a non-owning view: cloning it shares the same tracks and dropping
/// it stops nothing. Ownership lives in `ActiveStream`.
#[derive(Clone)]
pub struct MediaStream {
    id: String,
    tracks: Vec<TrackRef>,
}

impl MediaStream {
    pub fn new(tracks: Vec<TrackRef>) -> Self {
        Self::with_id(uuid::Uuid::new_v4().to_string(), tracks)
    }

    pub fn with_id(id: impl Into<String>, tracks: Vec<TrackRef>) -> Self {
        Self {
            id: id.into(),
            tracks,
        }
    }

    /// Combine several streams into one, keeping track order.
    pub fn merge(streams: impl IntoIterator<Item = MediaStream>) -> Self {
        let tracks = streams.into_iter().flat_map(|s| s.tracks).collect();
        Self::new(tracks)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn tracks(&self) -> &[TrackRef] {
        &self.tracks
    }

    pub fn add_tracks(&mut self, other: MediaStream) {
        self.tracks.extend(other.tracks);
    }

    pub fn tracks_of(&self, kind: TrackKind) -> impl Iterator<Item = &TrackRef> {
        self.tracks.iter().filter(move |t| t.kind() == kind)
    }

    pub fn live_track_count(&self) -> usize {
        self.tracks
            .iter()
            .filter(|t| t.ready_state() == TrackState::Live)
            .count()
    }

    pub fn has_live_track(&self) -> bool {
        self.live_track_count() > 0
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Stop every track. Safe to repeat.
    pub fn stop_all(&self) {
        for track in &self.tracks {
            if track.ready_state() == TrackState::Live {
                track.stop();
            }
        }
    }
}

impl fmt::Debug for MediaStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tracks: Vec<String> = self
            .tracks
            .iter()
            .map(|t| format!("{:?}:{}:{:?}", t.kind(), t.id(), t.ready_state()))
            .collect();
        f.debug_struct("MediaStream")
            .field("id", &self.id)
            .field("tracks", &tracks)
            .finish()
    }
}

use super::artifact::RecordingArtifact;
use super::error::CaptureError;

/// Session controller state machine.
///
/// ```text
/// idle → initializing → recording → stopping → completed
///             ↓             ↓                      ↓ reset
///           failed ←────────┘                     idle
///             ↓ retry
///         initializing
/// ```
///
/// Only `Recording` runs the tick timer and the encoder. Only
/// `Initializing`, `Recording` and `Stopping` may hold a live stream.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Initializing,
    Recording { duration_secs: f64 },
    Stopping,
    /// Idle with a finished artifact waiting to be downloaded or reset.
    Completed(Box<RecordingArtifact>),
    Failed(CaptureError),
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Initializing => "initializing",
            Self::Recording { .. } => "recording",
            Self::Stopping => "stopping",
            Self::Completed(_) => "completed",
            Self::Failed(_) => "failed",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// Mid-transition: the controller rejects other requests.
    pub fn is_busy(&self) -> bool {
        matches!(self, Self::Initializing | Self::Stopping)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed(_) | Self::Failed(_))
    }

    pub fn may_hold_stream(&self) -> bool {
        matches!(self, Self::Initializing | Self::Recording { .. } | Self::Stopping)
    }

    pub fn duration(&self) -> Option<f64> {
        match self {
            Self::Recording { duration_secs } => Some(*duration_secs),
            Self::Completed(artifact) => Some(artifact.duration_secs),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&CaptureError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }

    pub fn artifact(&self) -> Option<&RecordingArtifact> {
        match self {
            Self::Completed(artifact) => Some(&**artifact),
            _ => None,
        }
    }
}

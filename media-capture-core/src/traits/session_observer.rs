use std::time::Duration;

use crate::models::permission::{Capability, PermissionState};
use crate::models::state::SessionState;

/// Event delegate for session notifications.
///
/// Called from whichever task drives the transition; implementations should
/// hand off to their UI thread if they need one.
pub trait SessionObserver: Send + Sync {
    /// Called when the session state changes.
    fn on_state_changed(&self, state: &SessionState);

    /// Called on every elapsed-time tick while recording.
    fn on_tick(&self, _elapsed: Duration) {}

    /// Called for non-fatal problems, such as a screen recording continuing
    /// without its microphone.
    fn on_warning(&self, _message: &str) {}

    fn on_permission_changed(&self, _capability: Capability, _state: PermissionState) {}
}

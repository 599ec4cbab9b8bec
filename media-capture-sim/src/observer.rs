//! Observer that keeps a log of everything the controller reported.

use std::time::Duration;

use parking_lot::Mutex;

use media_capture_core::models::permission::{Capability, PermissionState};
use media_capture_core::models::state::SessionState;
use media_capture_core::traits::session_observer::SessionObserver;

#[derive(Default)]
struct Log {
    states: Vec<SessionState>,
    ticks: Vec<Duration>,
    warnings: Vec<String>,
    permissions: Vec<(Capability, PermissionState)>,
}

#[derive(Default)]
pub struct StateLog {
    log: Mutex<Log>,
}

impl StateLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// State names in the order they were reported.
    pub fn names(&self) -> Vec<&'static str> {
        self.log.lock().states.iter().map(SessionState::name).collect()
    }

    pub fn last(&self) -> Option<SessionState> {
        self.log.lock().states.last().cloned()
    }

    pub fn ticks(&self) -> Vec<Duration> {
        self.log.lock().ticks.clone()
    }

    pub fn warnings(&self) -> Vec<String> {
        self.log.lock().warnings.clone()
    }

    pub fn permission_changes(&self) -> Vec<(Capability, PermissionState)> {
        self.log.lock().permissions.clone()
    }

    pub fn clear(&self) {
        *self.log.lock() = Log::default();
    }
}

impl SessionObserver for StateLog {
    fn on_state_changed(&self, state: &SessionState) {
        log::debug!("Observed state: {}", state.name());
        self.log.lock().states.push(state.clone());
    }

    fn on_tick(&self, elapsed: Duration) {
        self.log.lock().ticks.push(elapsed);
    }

    fn on_warning(&self, message: &str) {
        self.log.lock().warnings.push(message.to_string());
    }

    fn on_permission_changed(&self, capability: Capability, state: PermissionState) {
        self.log.lock().permissions.push((capability, state));
    }
}

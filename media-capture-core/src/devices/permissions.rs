//! Permission tracker for microphone, camera and screen capture.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::CaptureError;
use crate::models::mode::CaptureMode;
use crate::models::permission::{Capability, PermissionSnapshot, PermissionState};
use crate::subscription::Subscription;
use crate::traits::permission_source::{PermissionCallback, PermissionSource};

pub struct PermissionTracker<S: ?Sized> {
    source: Arc<S>,
    states: Arc<Mutex<PermissionSnapshot>>,
}

impl<S: PermissionSource + ?Sized> PermissionTracker<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            states: Arc::new(Mutex::new(PermissionSnapshot::default())),
        }
    }

    /// Ask the platform for the current state.
    ///
    /// Without a query facility this returns whatever acquisition outcomes
    /// have taught us, which is `Unknown` until the first attempt.
    pub async fn query_state(&self, capability: Capability) -> PermissionState {
        match self.source.query_permission(capability).await {
            Ok(state) => {
                self.states.lock().set(capability, state);
                state
            }
            Err(err) => {
                log::debug!("Permission query for {} unavailable: {}", capability, err);
                self.states.lock().get(capability)
            }
        }
    }

    /// Register `on_change` for transitions of `capability`.
    ///
    /// The returned handle must be kept for as long as the callback is
    /// wanted. Platforms that cannot report changes yield an inert handle.
    pub fn subscribe<F>(&self, capability: Capability, on_change: F) -> Subscription
    where
        F: Fn(PermissionState) + Send + Sync + 'static,
    {
        let states = Arc::clone(&self.states);
        let callback: PermissionCallback = Arc::new(move |state| {
            states.lock().set(capability, state);
            on_change(state);
        });
        match self.source.watch_permission(capability, callback) {
            Some(subscription) => subscription,
            None => {
                log::debug!("Platform cannot report {} permission changes", capability);
                Subscription::inert()
            }
        }
    }

    /// Fold an acquisition outcome into the known states.
    ///
    /// `microphone_degraded` marks a screen+audio capture that continued
    /// without its microphone; the microphone state is left alone then.
    pub fn record_acquisition(
        &self,
        mode: CaptureMode,
        outcome: Result<(), &CaptureError>,
        microphone_degraded: bool,
    ) {
        let mut states = self.states.lock();
        for &capability in mode.capabilities() {
            if mode == CaptureMode::ScreenWithAudio && capability == Capability::Microphone {
                if outcome.is_ok() && !microphone_degraded {
                    states.set(capability, PermissionState::Granted);
                }
                continue;
            }
            match outcome {
                Ok(()) => states.set(capability, PermissionState::Granted),
                Err(CaptureError::PermissionDenied(_)) => states.set(capability, PermissionState::Denied),
                Err(_) => {}
            }
        }
    }

    pub fn snapshot(&self) -> PermissionSnapshot {
        *self.states.lock()
    }
}

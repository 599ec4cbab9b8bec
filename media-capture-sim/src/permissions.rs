//! Simulated permission store with change notification.

use std::collections::HashMap;

use media_capture_core::models::permission::{Capability, PermissionState};
use media_capture_core::traits::permission_source::PermissionCallback;

pub struct PermissionBoard {
    states: HashMap<Capability, PermissionState>,
    next_watch: u64,
    watchers: Vec<(u64, Capability, PermissionCallback)>,
    pub query_supported: bool,
    pub watch_supported: bool,
}

impl Default for PermissionBoard {
    fn default() -> Self {
        let states = Capability::ALL
            .iter()
            .map(|&capability| (capability, PermissionState::Prompt))
            .collect();
        Self {
            states,
            next_watch: 0,
            watchers: Vec::new(),
            query_supported: true,
            watch_supported: true,
        }
    }
}

impl PermissionBoard {
    pub fn get(&self, capability: Capability) -> PermissionState {
        self.states
            .get(&capability)
            .copied()
            .unwrap_or(PermissionState::Prompt)
    }

    /// Record `state` and return the callbacks to notify if it changed.
    /// Callers invoke them after releasing their lock.
    #[must_use]
    pub fn set(&mut self, capability: Capability, state: PermissionState) -> Vec<PermissionCallback> {
        let previous = self.states.insert(capability, state);
        if previous == Some(state) {
            return Vec::new();
        }
        self.watchers
            .iter()
            .filter(|(_, watched, _)| *watched == capability)
            .map(|(_, _, callback)| callback.clone())
            .collect()
    }

    pub fn add_watcher(&mut self, capability: Capability, callback: PermissionCallback) -> u64 {
        let id = self.next_watch;
        self.next_watch += 1;
        self.watchers.push((id, capability, callback));
        id
    }

    pub fn remove_watcher(&mut self, id: u64) {
        self.watchers.retain(|(existing, _, _)| *existing != id);
    }

    pub fn watcher_count(&self) -> usize {
        self.watchers.len()
    }
}

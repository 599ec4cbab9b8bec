use std::fmt;

use serde::{Deserialize, Serialize};

/// A capture capability guarded by a user/OS permission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Capability {
    Microphone,
    Camera,
    Screen,
}

impl Capability {
    pub const ALL: [Capability; 3] = [Capability::Microphone, Capability::Camera, Capability::Screen];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Microphone => "microphone",
            Self::Camera => "camera",
            Self::Screen => "screen",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grant state of a single capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PermissionState {
    /// The platform cannot report state ahead of an acquisition attempt.
    #[default]
    Unknown,
    Prompt,
    Granted,
    Denied,
}

impl PermissionState {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    pub fn is_denied(self) -> bool {
        matches!(self, Self::Denied)
    }
}

impl fmt::Display for PermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Unknown => "unknown",
            Self::Prompt => "prompt",
            Self::Granted => "granted",
            Self::Denied => "denied",
        };
        f.write_str(s)
    }
}

/// Last known state of every capability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionSnapshot {
    pub microphone: PermissionState,
    pub camera: PermissionState,
    pub screen: PermissionState,
}

impl PermissionSnapshot {
    pub fn get(&self, capability: Capability) -> PermissionState {
        match capability {
            Capability::Microphone => self.microphone,
            Capability::Camera => self.camera,
            Capability::Screen => self.screen,
        }
    }

    pub fn set(&mut self, capability: Capability, state: PermissionState) {
        match capability {
            Capability::Microphone => self.microphone = state,
            Capability::Camera => self.camera = state,
            Capability::Screen => self.screen = state,
        }
    }
}

use serde::{Deserialize, Serialize};

/// Kind of capture device exposed by the inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceKind {
    Audio,
    Video,
}

/// A capture device as reported by the platform.
///
/// `label` is empty until the user has granted access at least once; the
/// platform withholds it before that.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceDescriptor {
    pub kind: DeviceKind,
    pub label: String,
    pub stable_id: String,
}

impl DeviceDescriptor {
    pub fn has_label(&self) -> bool {
        !self.label.trim().is_empty()
    }

    /// Human-readable name, falling back to a positional one while the
    /// platform withholds labels. `index` is zero-based.
    pub fn display_label(&self, index: usize) -> String {
        if self.has_label() {
            return self.label.clone();
        }
        let noun = match self.kind {
            DeviceKind::Audio => "Microphone",
            DeviceKind::Video => "Camera",
        };
        format!("{} {}", noun, index + 1)
    }
}

/// Result of one device enumeration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceList {
    pub audio_devices: Vec<DeviceDescriptor>,
    pub video_devices: Vec<DeviceDescriptor>,
}

impl DeviceList {
    pub fn has_audio(&self) -> bool {
        !self.audio_devices.is_empty()
    }

    pub fn has_video(&self) -> bool {
        !self.video_devices.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.audio_devices.is_empty() && self.video_devices.is_empty()
    }

    /// Whether any device carries a real label.
    pub fn labels_available(&self) -> bool {
        self.audio_devices
            .iter()
            .chain(&self.video_devices)
            .any(DeviceDescriptor::has_label)
    }
}

//! Simulated device catalog.
//!
//! Mirrors browser enumeration: every device is listed, but labels stay
//! empty until the first capture grant.

use media_capture_core::traits::media_devices::{MediaDeviceInfo, MediaDeviceKind};

#[derive(Debug, Clone)]
pub struct DeviceCatalog {
    devices: Vec<MediaDeviceInfo>,
    labels_granted: bool,
}

impl Default for DeviceCatalog {
    fn default() -> Self {
        Self {
            devices: vec![
                device(MediaDeviceKind::AudioInput, "Built-in Microphone", "mic-1"),
                device(MediaDeviceKind::VideoInput, "FaceTime HD Camera", "cam-1"),
                device(MediaDeviceKind::AudioOutput, "Built-in Speakers", "spk-1"),
            ],
            labels_granted: false,
        }
    }
}

impl DeviceCatalog {
    pub fn replace(&mut self, devices: Vec<MediaDeviceInfo>) {
        self.devices = devices;
    }

    pub fn remove_kind(&mut self, kind: MediaDeviceKind) {
        self.devices.retain(|device| device.kind != kind);
    }

    pub fn has(&self, kind: MediaDeviceKind) -> bool {
        self.devices.iter().any(|device| device.kind == kind)
    }

    /// Label of the first device of `kind`, if any.
    pub fn first_label(&self, kind: MediaDeviceKind) -> Option<String> {
        self.devices
            .iter()
            .find(|device| device.kind == kind)
            .map(|device| device.label.clone())
    }

    pub fn grant_labels(&mut self) {
        self.labels_granted = true;
    }

    pub fn labels_granted(&self) -> bool {
        self.labels_granted
    }

    pub fn enumerate(&self) -> Vec<MediaDeviceInfo> {
        self.devices
            .iter()
            .map(|device| MediaDeviceInfo {
                label: if self.labels_granted {
                    device.label.clone()
                } else {
                    String::new()
                },
                ..device.clone()
            })
            .collect()
    }
}

/// Shorthand for a device entry grouped by its own id.
pub fn device(kind: MediaDeviceKind, label: &str, id: &str) -> MediaDeviceInfo {
    MediaDeviceInfo {
        kind,
        label: label.to_string(),
        device_id: id.to_string(),
        group_id: format!("group-{}", id),
    }
}

//! Device inventory: what capture devices the platform currently exposes.
//!
//! Every call re-enumerates. Labels are withheld by the platform until the
//! first grant, so callers re-enumerate after a successful acquisition to
//! get readable names.

use std::collections::HashSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::device::{DeviceDescriptor, DeviceKind, DeviceList};
use crate::models::error::CaptureError;
use crate::traits::media_devices::{MediaDeviceKind, MediaDevices};

pub struct DeviceInventory<D: ?Sized> {
    devices: Arc<D>,
    last: Mutex<Option<DeviceList>>,
}

impl<D: MediaDevices + ?Sized> DeviceInventory<D> {
    pub fn new(devices: Arc<D>) -> Self {
        Self {
            devices,
            last: Mutex::new(None),
        }
    }

    /// Enumerate audio and video capture devices. Output devices are skipped
    /// and duplicate ids collapse to their first entry.
    pub async fn list_devices(&self) -> Result<DeviceList, CaptureError> {
        let raw = self.devices.enumerate_devices().await.map_err(CaptureError::from)?;

        let mut seen = HashSet::new();
        let mut list = DeviceList::default();
        for info in raw {
            let kind = match info.kind {
                MediaDeviceKind::AudioInput => DeviceKind::Audio,
                MediaDeviceKind::VideoInput => DeviceKind::Video,
                MediaDeviceKind::AudioOutput => continue,
            };
            if !seen.insert((kind, info.device_id.clone())) {
                continue;
            }
            let descriptor = DeviceDescriptor {
                kind,
                label: info.label,
                stable_id: info.device_id,
            };
            match kind {
                DeviceKind::Audio => list.audio_devices.push(descriptor),
                DeviceKind::Video => list.video_devices.push(descriptor),
            }
        }

        log::debug!(
            "Enumerated {} audio and {} video devices (labels: {})",
            list.audio_devices.len(),
            list.video_devices.len(),
            list.labels_available()
        );
        *self.last.lock() = Some(list.clone());
        Ok(list)
    }

    /// Result of the most recent successful enumeration.
    pub fn last_known(&self) -> Option<DeviceList> {
        self.last.lock().clone()
    }
}

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use media_capture_core::{
    Capability, CaptureError, CaptureMode, DeviceInventory, MediaDeviceKind, PermissionState, PermissionTracker,
    PlatformError,
};
use media_capture_sim::{device, SimPlatform};

use common::harness;

#[tokio::test]
async fn inventory_skips_outputs_and_falls_back_to_positional_labels() {
    let platform = SimPlatform::new();
    let inventory = DeviceInventory::new(Arc::clone(&platform));

    let list = inventory.list_devices().await.unwrap();
    assert_eq!(list.audio_devices.len(), 1);
    assert_eq!(list.video_devices.len(), 1);
    assert!(!list.labels_available());
    assert_eq!(list.audio_devices[0].display_label(0), "Microphone 1");
    assert_eq!(list.video_devices[0].display_label(1), "Camera 2");
    assert_eq!(list.audio_devices[0].stable_id, "mic-1");
    assert_eq!(inventory.last_known(), Some(list));
}

#[tokio::test]
async fn inventory_collapses_duplicate_ids() {
    let platform = SimPlatform::new();
    platform.set_devices(vec![
        device(MediaDeviceKind::AudioInput, "USB Mic", "usb"),
        device(MediaDeviceKind::AudioInput, "USB Mic (again)", "usb"),
        device(MediaDeviceKind::AudioInput, "Headset", "headset"),
    ]);
    let inventory = DeviceInventory::new(Arc::clone(&platform));

    let list = inventory.list_devices().await.unwrap();
    let ids: Vec<&str> = list.audio_devices.iter().map(|d| d.stable_id.as_str()).collect();
    assert_eq!(ids, vec!["usb", "headset"]);
    assert!(list.video_devices.is_empty());
}

#[tokio::test]
async fn inventory_maps_enumeration_errors() {
    let platform = SimPlatform::new();
    platform.fail_enumeration(Some(PlatformError::new("SecurityError", "blocked by policy")));
    let inventory = DeviceInventory::new(Arc::clone(&platform));

    let err = inventory.list_devices().await.unwrap_err();
    assert_eq!(err, CaptureError::PermissionDenied("blocked by policy".into()));
    assert!(inventory.last_known().is_none());
}

#[tokio::test(start_paused = true)]
async fn controller_refreshes_labels_after_first_grant() {
    let h = harness();
    let before = h.controller.refresh_devices().await.unwrap();
    assert!(!before.labels_available());

    h.controller.start(CaptureMode::Audio).await.unwrap();

    let after = h.controller.devices().unwrap();
    assert!(after.labels_available());
    assert_eq!(after.audio_devices[0].display_label(0), "Built-in Microphone");
}

#[tokio::test]
async fn query_degrades_to_unknown_without_platform_support() {
    let platform = SimPlatform::new();
    platform.set_permission_query_supported(false);
    let tracker = PermissionTracker::new(Arc::clone(&platform));

    assert_eq!(tracker.query_state(Capability::Microphone).await, PermissionState::Unknown);

    tracker.record_acquisition(CaptureMode::Audio, Ok(()), false);
    assert_eq!(tracker.query_state(Capability::Microphone).await, PermissionState::Granted);
}

#[tokio::test]
async fn query_reports_platform_state() {
    let platform = SimPlatform::new();
    let tracker = PermissionTracker::new(Arc::clone(&platform));

    assert_eq!(tracker.query_state(Capability::Camera).await, PermissionState::Prompt);
    platform.set_permission(Capability::Camera, PermissionState::Denied);
    assert_eq!(tracker.query_state(Capability::Camera).await, PermissionState::Denied);
    assert_eq!(tracker.snapshot().camera, PermissionState::Denied);
}

#[tokio::test]
async fn subscription_delivers_until_released() {
    let platform = SimPlatform::new();
    let tracker = PermissionTracker::new(Arc::clone(&platform));
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = Arc::clone(&calls);
    let subscription = tracker.subscribe(Capability::Microphone, move |state| {
        assert_eq!(state, PermissionState::Granted);
        counter.fetch_add(1, Ordering::SeqCst);
    });
    assert!(subscription.is_active());
    assert_eq!(platform.permission_watcher_count(), 1);

    platform.set_permission(Capability::Microphone, PermissionState::Granted);
    platform.set_permission(Capability::Microphone, PermissionState::Granted);
    platform.set_permission(Capability::Camera, PermissionState::Granted);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(tracker.snapshot().microphone, PermissionState::Granted);

    subscription.unsubscribe();
    assert_eq!(platform.permission_watcher_count(), 0);
    platform.set_permission(Capability::Microphone, PermissionState::Denied);
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn subscription_is_inert_without_platform_support() {
    let platform = SimPlatform::new();
    platform.set_permission_watch_supported(false);
    let tracker = PermissionTracker::new(Arc::clone(&platform));

    let subscription = tracker.subscribe(Capability::Screen, |_| {});
    assert!(!subscription.is_active());
}

#[tokio::test]
async fn degraded_microphone_is_not_marked_granted() {
    let platform = SimPlatform::new();
    let tracker = PermissionTracker::new(Arc::clone(&platform));

    tracker.record_acquisition(CaptureMode::ScreenWithAudio, Ok(()), true);
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.screen, PermissionState::Granted);
    assert_eq!(snapshot.microphone, PermissionState::Unknown);

    tracker.record_acquisition(
        CaptureMode::Video,
        Err(&CaptureError::PermissionDenied("no".into())),
        false,
    );
    let snapshot = tracker.snapshot();
    assert_eq!(snapshot.microphone, PermissionState::Denied);
    assert_eq!(snapshot.camera, PermissionState::Denied);
}

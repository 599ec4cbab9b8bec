mod common;

use std::time::Duration;

use media_capture_core::{
    CaptureError, CaptureMode, ErrorKind, MediaDeviceKind, PermissionState, PlatformError, SessionState,
};

use common::{harness, settle, wait_for_state};

fn failure(state: SessionState) -> CaptureError {
    match state {
        SessionState::Failed(err) => err,
        other => panic!("expected failure, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn missing_microphone_fails_fast_without_acquiring() {
    let h = harness();
    h.platform.remove_devices(MediaDeviceKind::AudioInput);

    for mode in [CaptureMode::Audio, CaptureMode::Video] {
        let err = failure(h.controller.start(mode).await.unwrap());
        assert_eq!(err.kind(), ErrorKind::DeviceNotFound, "{}", mode);
        h.controller.reset().unwrap();
    }
    assert_eq!(h.platform.user_media_calls(), 0);
    assert_eq!(h.log.names(), vec!["initializing", "failed", "idle", "initializing", "failed", "idle"]);
}

#[tokio::test(start_paused = true)]
async fn missing_camera_fails_video_only() {
    let h = harness();
    h.platform.remove_devices(MediaDeviceKind::VideoInput);

    let err = failure(h.controller.start(CaptureMode::Video).await.unwrap());
    assert_eq!(err, CaptureError::DeviceNotFound("no camera is connected".into()));
    assert_eq!(h.platform.user_media_calls(), 0);

    h.controller.change_mode(CaptureMode::Audio).unwrap();
    assert!(h.controller.start(CaptureMode::Audio).await.unwrap().is_recording());
}

#[tokio::test(start_paused = true)]
async fn enumeration_failure_does_not_block_acquisition() {
    let h = harness();
    h.platform
        .fail_enumeration(Some(PlatformError::new("UnknownError", "enumeration broke")));

    let state = h.controller.start(CaptureMode::Audio).await.unwrap();
    assert!(state.is_recording());
    assert_eq!(h.platform.user_media_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_without_chunks_is_no_data_recorded() {
    let h = harness();
    h.controller.start(CaptureMode::Audio).await.unwrap();

    let err = failure(h.controller.stop().await.unwrap());
    assert_eq!(err, CaptureError::NoDataRecorded);
    assert!(h.controller.artifact().is_none());
    assert_eq!(h.platform.live_track_count(), 0);

    let snapshot = h.controller.snapshot();
    assert_eq!(snapshot.state, "failed");
    assert!(snapshot.artifact.is_none());
    assert!(snapshot.error.unwrap().recoverable);
}

#[tokio::test(start_paused = true)]
async fn only_empty_chunks_is_no_data_recorded() {
    let h = harness();
    h.controller.start(CaptureMode::Video).await.unwrap();
    let tap = h.platform.last_encoder().unwrap();
    tap.deliver(Vec::new());
    tap.set_final_chunk(Vec::new());

    let err = failure(h.controller.stop().await.unwrap());
    assert_eq!(err, CaptureError::NoDataRecorded);
}

#[tokio::test(start_paused = true)]
async fn no_supported_format_fails_and_releases_stream() {
    let h = harness();
    h.platform.set_supported_types(&[]);

    let err = failure(h.controller.start(CaptureMode::Audio).await.unwrap());
    assert_eq!(err.kind(), ErrorKind::NoSupportedFormat);
    assert_eq!(h.platform.encoder_count(), 0);
    assert_eq!(h.platform.tracks().len(), 1);
    assert_eq!(h.platform.live_track_count(), 0);
    assert!(!h.controller.is_holding_stream());
}

#[tokio::test(start_paused = true)]
async fn format_falls_back_to_wider_support() {
    let h = harness();
    h.platform.set_supported_types(&["video/mp4"]);

    h.controller.start(CaptureMode::Video).await.unwrap();
    let tap = h.platform.last_encoder().unwrap();
    assert_eq!(tap.options().mime_type, "video/mp4");
    tap.deliver(vec![0; 12]);

    let state = h.controller.stop().await.unwrap();
    let artifact = state.artifact().unwrap();
    assert_eq!(artifact.extension, "mp4");
    assert!(artifact.suggested_file_name().starts_with("video-"));
}

#[tokio::test(start_paused = true)]
async fn encoder_rejecting_format_is_no_supported_format() {
    let h = harness();
    h.platform
        .fail_encoder_creation(Some(PlatformError::new("NotSupportedError", "")));

    let err = failure(h.controller.start(CaptureMode::Audio).await.unwrap());
    assert_eq!(
        err,
        CaptureError::NoSupportedFormat("the recorder rejected the selected format".into())
    );
    assert_eq!(h.platform.live_track_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn insecure_context_is_unrecoverable() {
    let h = harness();
    h.platform.set_secure_context(false);

    let err = failure(h.controller.start(CaptureMode::Audio).await.unwrap());
    assert_eq!(err.kind(), ErrorKind::InsecureContext);
    assert!(!err.is_recoverable());
    assert!(!h.controller.snapshot().error.unwrap().recoverable);
    assert_eq!(h.platform.user_media_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn denied_microphone_is_permission_denied() {
    let h = harness();
    h.platform
        .fail_microphone(Some(PlatformError::new("NotAllowedError", "Permission denied")));

    let err = failure(h.controller.start(CaptureMode::Audio).await.unwrap());
    assert_eq!(err, CaptureError::PermissionDenied("Permission denied".into()));
    assert_eq!(h.controller.permissions().microphone, PermissionState::Denied);
}

#[tokio::test(start_paused = true)]
async fn overconstrained_camera_is_reported() {
    let h = harness();
    h.platform
        .fail_camera(Some(PlatformError::new("OverconstrainedError", "")));

    let err = failure(h.controller.start(CaptureMode::Video).await.unwrap());
    assert_eq!(err.kind(), ErrorKind::ConstraintsUnsatisfiable);
    assert_eq!(err.to_string(), "constraints unsatisfiable: the device cannot satisfy the requested quality");
}

#[tokio::test(start_paused = true)]
async fn unknown_platform_error_keeps_original_text() {
    let h = harness();
    h.platform
        .fail_microphone(Some(PlatformError::new("WeirdError", "something odd")));

    let err = failure(h.controller.start(CaptureMode::Audio).await.unwrap());
    assert_eq!(err, CaptureError::Unknown("WeirdError: something odd".into()));
}

#[tokio::test(start_paused = true)]
async fn stream_without_live_tracks_is_rejected() {
    let h = harness();
    h.platform.set_tracks_start_ended(true);

    let err = failure(h.controller.start(CaptureMode::Audio).await.unwrap());
    assert_eq!(err, CaptureError::Unknown("acquired stream has no live tracks".into()));
    assert!(!h.controller.is_holding_stream());
    assert_eq!(h.platform.encoder_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn encoder_failure_salvages_buffered_chunks() {
    let h = harness();
    h.controller.start(CaptureMode::Audio).await.unwrap();
    let tap = h.platform.last_encoder().unwrap();
    tap.deliver(vec![1; 100]);
    tap.deliver(vec![2; 50]);
    tap.fail("UnknownError", "encoder crashed");

    let state = wait_for_state(&h.controller, "failed").await;
    assert_eq!(
        state.error(),
        Some(&CaptureError::Unknown("UnknownError: encoder crashed".into()))
    );
    let salvaged = h.controller.artifact().unwrap();
    assert_eq!(salvaged.byte_size, 150);
    assert_eq!(&salvaged.data()[..100], &[1; 100][..]);
    assert_eq!(h.platform.live_track_count(), 0);
    assert!(h.log.names().iter().all(|name| *name != "stopping"));
    assert!(h.controller.snapshot().artifact.is_some());
}

#[tokio::test(start_paused = true)]
async fn encoder_error_right_before_stop_fails_with_salvaged_chunks() {
    let h = harness();
    h.controller.start(CaptureMode::Audio).await.unwrap();
    let tap = h.platform.last_encoder().unwrap();
    tap.deliver(vec![5; 100]);
    settle().await;

    tap.fail("UnknownError", "encoder crashed");
    let state = h.controller.stop().await.unwrap();

    assert_eq!(
        state.error(),
        Some(&CaptureError::Unknown("UnknownError: encoder crashed".into()))
    );
    let salvaged = h.controller.artifact().unwrap();
    assert_eq!(salvaged.byte_size, 100);
    assert_eq!(
        h.log.names(),
        vec!["initializing", "recording", "stopping", "failed"]
    );
    assert_eq!(h.platform.live_track_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn encoder_failure_without_chunks_has_no_artifact() {
    let h = harness();
    h.controller.start(CaptureMode::Video).await.unwrap();
    h.platform
        .last_encoder()
        .unwrap()
        .fail("EncodingError", "gpu lost");

    wait_for_state(&h.controller, "failed").await;
    assert!(h.controller.artifact().is_none());
    assert_eq!(h.platform.live_track_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn stalled_encoder_finalizes_after_timeout() {
    let h = harness();
    h.controller.start(CaptureMode::Audio).await.unwrap();
    let tap = h.platform.last_encoder().unwrap();
    tap.deliver(vec![8; 64]);
    tap.set_stall_on_stop(true);

    let started = tokio::time::Instant::now();
    let state = h.controller.stop().await.unwrap();
    assert!(started.elapsed() >= Duration::from_secs(5));
    assert_eq!(state.artifact().unwrap().byte_size, 64);
}

#[tokio::test(start_paused = true)]
async fn failure_while_finalizing_keeps_buffered_data() {
    let h = harness();
    h.controller.start(CaptureMode::Audio).await.unwrap();
    let tap = h.platform.last_encoder().unwrap();
    tap.deliver(vec![1; 20]);
    tap.set_final_chunk(vec![2; 10]);
    tap.set_fail_on_stop(PlatformError::new("UnknownError", "flush failed"));

    let state = h.controller.stop().await.unwrap();
    let artifact = state.artifact().unwrap();
    assert_eq!(artifact.byte_size, 30);
    assert_eq!(&artifact.data()[20..], &[2; 10][..]);
}

#[tokio::test(start_paused = true)]
async fn failure_while_finalizing_without_data_fails() {
    let h = harness();
    h.controller.start(CaptureMode::Audio).await.unwrap();
    h.platform
        .last_encoder()
        .unwrap()
        .set_fail_on_stop(PlatformError::new("UnknownError", "flush failed"));

    let err = failure(h.controller.stop().await.unwrap());
    assert_eq!(err, CaptureError::Unknown("UnknownError: flush failed".into()));
}

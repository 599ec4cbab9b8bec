#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use media_capture_core::{SessionConfig, SessionController, SessionState};
use media_capture_sim::{RecordingPreview, SimPlatform, StateLog};

pub struct Harness {
    pub platform: Arc<SimPlatform>,
    pub log: Arc<StateLog>,
    pub preview: Arc<RecordingPreview>,
    pub controller: SessionController<SimPlatform>,
}

pub fn harness() -> Harness {
    harness_with(SessionConfig::default())
}

pub fn harness_with(config: SessionConfig) -> Harness {
    let platform = SimPlatform::new();
    let log = Arc::new(StateLog::new());
    let preview = Arc::new(RecordingPreview::new());
    let controller = SessionController::builder(Arc::clone(&platform))
        .config(config)
        .preview(preview.clone())
        .observer(log.clone())
        .build()
        .unwrap();
    Harness {
        platform,
        log,
        preview,
        controller,
    }
}

/// Let spawned tasks run. Time is paused in these tests, so this only
/// advances the clock once everything else is idle.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

/// Poll until the controller reports `name`, for at most ten simulated
/// seconds.
pub async fn wait_for_state(controller: &SessionController<SimPlatform>, name: &str) -> SessionState {
    for _ in 0..200 {
        let state = controller.state();
        if state.name() == name {
            return state;
        }
        settle().await;
    }
    panic!("timed out waiting for {}, still {:?}", name, controller.state());
}

//! Runs one simulated capture session end to end and prints the result.
//!
//! ```text
//! RUST_LOG=debug cargo run -p media-capture-sim --bin capture-demo -- screen+audio 3
//! ```

use std::error::Error;
use std::sync::Arc;

use media_capture_core::export;
use media_capture_core::{CaptureMode, SessionController, SessionState};
use media_capture_sim::{RecordingPreview, SimPlatform, StateLog};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let mode: CaptureMode = match args.next() {
        Some(arg) => arg.parse()?,
        None => CaptureMode::Audio,
    };
    let chunks: usize = match args.next() {
        Some(arg) => arg.parse()?,
        None => 3,
    };

    let platform = SimPlatform::new();
    platform.set_display_audio(true);
    let log = Arc::new(StateLog::new());
    let controller = SessionController::builder(Arc::clone(&platform))
        .preview(Arc::new(RecordingPreview::new()))
        .observer(log.clone())
        .initial_mode(mode)
        .build()?;

    println!("Recording {} for {} chunks", mode, chunks);
    let state = controller.start(mode).await?;
    if let SessionState::Failed(err) = &state {
        eprintln!("Capture failed: {}", err);
        return Ok(());
    }

    let tap = platform.last_encoder().ok_or("no encoder was created")?;
    let timeslice = controller.config().timeslice();
    for i in 0..chunks {
        tokio::time::sleep(timeslice).await;
        tap.deliver(vec![(i % 256) as u8; 4096]);
    }

    let state = if mode.is_screen() {
        // Stopped from the OS share indicator rather than the app.
        platform.end_display_surface();
        while !controller.state().is_terminal() && !controller.state().is_idle() {
            tokio::time::sleep(timeslice / 10).await;
        }
        controller.state()
    } else {
        controller.stop().await?
    };

    println!("States: {}", log.names().join(" -> "));
    println!("{}", serde_json::to_string_pretty(&controller.snapshot())?);
    if let Some(artifact) = state.artifact() {
        println!("{}", export::metadata_json(artifact)?);
    }

    controller.shutdown();
    Ok(())
}

//! Session controller: the state machine the UI drives.
//!
//! ```text
//! [SessionController] ──start──→ [CaptureSession::acquire] ──→ [RecorderPipeline::start]
//!        ↑                                 │ surface ended               │ encoder failure
//!        │                                 ↓                             ↓
//!        └──────────── pump task (ticks + signals, one per recording attempt)
//! ```
//!
//! Every request is answered immediately with a rejection or runs to the
//! next settled state. Requests arriving while the session is
//! `initializing` or `stopping` are rejected, never queued, with the
//! exception of stop/reset during `initializing`, which abandon the attempt.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::capture::{Acquisition, CaptureSession, SurfaceEndedCallback};
use crate::devices::inventory::DeviceInventory;
use crate::devices::permissions::PermissionTracker;
use crate::models::artifact::RecordingArtifact;
use crate::models::config::SessionConfig;
use crate::models::device::DeviceList;
use crate::models::error::{Action, CaptureError, ConfigError, TransitionError};
use crate::models::mode::CaptureMode;
use crate::models::permission::{Capability, PermissionSnapshot, PermissionState};
use crate::models::snapshot::{format_elapsed, ArtifactInfo, ErrorInfo, SessionSnapshot};
use crate::models::state::SessionState;
use crate::recorder::pipeline::{FailureCallback, RecorderFailure, RecorderHandle, RecorderPipeline};
use crate::subscription::Subscription;
use crate::traits::preview_sink::PreviewSink;
use crate::traits::session_observer::SessionObserver;
use crate::traits::MediaPlatform;

const EMPTY_EXTERNAL_STOP: &str = "capture ended before any data was recorded";
const NO_MICROPHONE: &str = "no microphone is connected";

/// Platform events routed to the pump task of a recording attempt.
#[derive(Debug)]
enum Signal {
    SurfaceEnded,
    EncoderFailed(CaptureError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StopCause {
    Requested,
    External,
}

struct Inner {
    state: SessionState,
    mode: CaptureMode,
    /// Bumped whenever an attempt starts or is abandoned. Completions
    /// carrying an older value are stale.
    attempt: u64,
    recorder: Option<RecorderHandle>,
    pump: Option<JoinHandle<()>>,
    started_at: Option<Instant>,
    artifact: Option<RecordingArtifact>,
    warning: Option<String>,
    permission_watch: Vec<Subscription>,
}

impl Inner {
    fn transition(&mut self, next: SessionState) {
        log::info!("Session state: {} -> {}", self.state.name(), next.name());
        self.state = next;
    }
}

struct Shared<P: MediaPlatform> {
    config: Arc<SessionConfig>,
    inventory: DeviceInventory<P>,
    permissions: PermissionTracker<P>,
    capture: CaptureSession<P>,
    recorder: RecorderPipeline<P>,
    observer: Option<Arc<dyn SessionObserver>>,
    inner: Mutex<Inner>,
}

impl<P: MediaPlatform> Shared<P> {
    fn notify(&self, state: &SessionState) {
        if let Some(observer) = &self.observer {
            observer.on_state_changed(state);
        }
    }

    fn warn(&self, message: &str) {
        if let Some(observer) = &self.observer {
            observer.on_warning(message);
        }
    }

    /// Stop the timer, the encoder and the stream. Idempotent.
    fn release_resources(&self, inner: &mut Inner) {
        if let Some(pump) = inner.pump.take() {
            pump.abort();
        }
        inner.recorder = None;
        inner.permission_watch.clear();
        inner.started_at = None;
        self.capture.release();
    }

    /// Invalidate the in-flight attempt and return to idle.
    fn abandon_attempt(&self, inner: &mut Inner) {
        log::info!("Abandoning attempt {} while initializing", inner.attempt);
        inner.attempt += 1;
        self.release_resources(inner);
        inner.artifact = None;
        inner.transition(SessionState::Idle);
    }

    fn begin_attempt(&self, inner: &mut Inner) -> u64 {
        self.release_resources(inner);
        inner.attempt += 1;
        inner.artifact = None;
        inner.warning = None;
        inner.transition(SessionState::Initializing);
        inner.attempt
    }

    /// Fail fast when a required device is missing, without asking the
    /// platform for a stream.
    ///
    /// Returns whether a microphone may be present. `false` only when the
    /// enumeration listed none.
    async fn preflight(&self, mode: CaptureMode) -> Result<bool, CaptureError> {
        let wants_microphone = mode.capabilities().contains(&Capability::Microphone);
        if !wants_microphone && !mode.requires_camera() {
            return Ok(true);
        }
        match self.inventory.list_devices().await {
            Ok(devices) => {
                if mode.requires_microphone() && !devices.has_audio() {
                    return Err(CaptureError::DeviceNotFound(NO_MICROPHONE.into()));
                }
                if mode.requires_camera() && !devices.has_video() {
                    return Err(CaptureError::DeviceNotFound("no camera is connected".into()));
                }
                Ok(devices.has_audio())
            }
            Err(err) => {
                log::warn!("Device enumeration failed, acquiring anyway: {}", err);
                Ok(true)
            }
        }
    }

    fn watch_permissions(&self, mode: CaptureMode) -> Vec<Subscription> {
        mode.capabilities()
            .iter()
            .map(|&capability| {
                let observer = self.observer.clone();
                self.permissions.subscribe(capability, move |state| {
                    log::debug!("{} permission changed to {}", capability, state);
                    if let Some(observer) = &observer {
                        observer.on_permission_changed(capability, state);
                    }
                })
            })
            .collect()
    }

    /// Run one attempt from `initializing` to `recording` or `failed`.
    async fn run_attempt(self: &Arc<Self>, attempt: u64, mode: CaptureMode) -> SessionState {
        let microphone_listed = match self.preflight(mode).await {
            Ok(listed) => listed,
            Err(err) => return self.fail_attempt(attempt, err),
        };

        let watch = self.watch_permissions(mode);
        {
            let mut inner = self.inner.lock();
            if inner.attempt != attempt {
                return inner.state.clone();
            }
            inner.permission_watch = watch;
        }

        let (signals_tx, signals_rx) = mpsc::unbounded_channel();
        let surface_tx = signals_tx.clone();
        let on_surface_ended: SurfaceEndedCallback = Arc::new(move || {
            let _ = surface_tx.send(Signal::SurfaceEnded);
        });

        let acquisition = self
            .capture
            .acquire(mode, microphone_listed, Some(on_surface_ended))
            .await;

        let acquired = match acquisition {
            Ok(Acquisition::Ready(acquired)) => {
                self.permissions
                    .record_acquisition(mode, Ok(()), acquired.warning.is_some());
                acquired
            }
            Ok(Acquisition::Superseded) => {
                log::debug!("Attempt {} was superseded during acquisition", attempt);
                return self.state();
            }
            Err(err) => {
                self.permissions.record_acquisition(mode, Err(&err), false);
                return self.fail_attempt(attempt, err);
            }
        };

        let on_failure: FailureCallback = Box::new(move |err: CaptureError| {
            let _ = signals_tx.send(Signal::EncoderFailed(err));
        });
        let handle = match self.recorder.start(&acquired.stream, mode, Some(on_failure)) {
            Ok(handle) => handle,
            Err(err) => return self.fail_attempt(attempt, err),
        };

        let state = {
            let mut inner = self.inner.lock();
            if inner.attempt != attempt || !matches!(inner.state, SessionState::Initializing) {
                log::debug!("Discarding late acquisition for attempt {}", attempt);
                drop(handle);
                self.capture.release_generation(acquired.generation);
                return inner.state.clone();
            }
            inner.recorder = Some(handle);
            inner.started_at = Some(Instant::now());
            inner.warning = acquired.warning.clone();
            inner.pump = Some(tokio::spawn(pump(
                Arc::downgrade(self),
                attempt,
                signals_rx,
                self.config.tick_interval(),
            )));
            inner.transition(SessionState::Recording { duration_secs: 0.0 });
            inner.state.clone()
        };
        self.notify(&state);
        if let Some(warning) = &acquired.warning {
            self.warn(warning);
        }

        // Labels are only exposed after the first grant.
        if let Err(err) = self.inventory.list_devices().await {
            log::debug!("Device refresh after acquisition failed: {}", err);
        }
        state
    }

    fn fail_attempt(&self, attempt: u64, err: CaptureError) -> SessionState {
        let state = {
            let mut inner = self.inner.lock();
            if inner.attempt != attempt || !matches!(inner.state, SessionState::Initializing) {
                log::debug!("Ignoring late failure for attempt {}: {}", attempt, err);
                return inner.state.clone();
            }
            log::warn!("Capture attempt {} failed: {}", attempt, err);
            self.release_resources(&mut inner);
            inner.transition(SessionState::Failed(err));
            inner.state.clone()
        };
        self.notify(&state);
        state
    }

    fn on_tick(&self, attempt: u64) {
        let elapsed = {
            let mut inner = self.inner.lock();
            if inner.attempt != attempt {
                return;
            }
            let Some(started_at) = inner.started_at else {
                return;
            };
            let SessionState::Recording { duration_secs } = &mut inner.state else {
                return;
            };
            let elapsed = started_at.elapsed();
            *duration_secs = elapsed.as_secs_f64();
            elapsed
        };
        if let Some(observer) = &self.observer {
            observer.on_tick(elapsed);
        }
    }

    async fn handle_signal(&self, attempt: u64, signal: Signal) {
        match signal {
            Signal::SurfaceEnded => {
                log::info!("Capture surface ended by the user");
                let _ = self.stop_recording(Some(attempt), StopCause::External).await;
            }
            Signal::EncoderFailed(err) => self.fail_recording(attempt, err),
        }
    }

    /// `recording → stopping → completed | failed`.
    ///
    /// An encoder error reported before the stop lands in `failed`, keeping
    /// the salvaged chunks as the artifact.
    ///
    /// With `expected_attempt` set, a stop meant for an older attempt is
    /// ignored instead of rejected.
    async fn stop_recording(
        &self,
        expected_attempt: Option<u64>,
        cause: StopCause,
    ) -> Result<SessionState, TransitionError> {
        let (attempt, handle) = {
            let mut inner = self.inner.lock();
            if let Some(expected) = expected_attempt {
                if inner.attempt != expected || !inner.state.is_recording() {
                    log::debug!("Ignoring stale stop for attempt {}", expected);
                    return Ok(inner.state.clone());
                }
            }
            if !inner.state.is_recording() {
                return Err(rejected(Action::Stop, &inner.state));
            }
            if let Some(pump) = inner.pump.take() {
                pump.abort();
            }
            inner.transition(SessionState::Stopping);
            (inner.attempt, inner.recorder.take())
        };
        self.notify(&SessionState::Stopping);

        let result = match handle {
            Some(handle) => self.recorder.stop(handle).await,
            None => Err(RecorderFailure::from(CaptureError::NoDataRecorded)),
        };

        let mut warning = None;
        let state = {
            let mut inner = self.inner.lock();
            if inner.attempt != attempt || !matches!(inner.state, SessionState::Stopping) {
                log::debug!("Session moved on while attempt {} was finalizing", attempt);
                return Ok(inner.state.clone());
            }
            self.release_resources(&mut inner);
            match result {
                Ok(artifact) => {
                    inner.artifact = Some(artifact.clone());
                    inner.transition(SessionState::Completed(Box::new(artifact)));
                }
                Err(RecorderFailure {
                    error: CaptureError::NoDataRecorded,
                    ..
                }) if cause == StopCause::External => {
                    log::warn!("{}", EMPTY_EXTERNAL_STOP);
                    inner.warning = Some(EMPTY_EXTERNAL_STOP.to_string());
                    warning = inner.warning.clone();
                    inner.transition(SessionState::Idle);
                }
                Err(RecorderFailure { error, salvaged }) => {
                    log::warn!("Recording failed to finalize: {}", error);
                    inner.artifact = salvaged;
                    inner.transition(SessionState::Failed(error));
                }
            }
            inner.state.clone()
        };
        self.notify(&state);
        if let Some(warning) = warning {
            self.warn(&warning);
        }
        Ok(state)
    }

    /// Mid-recording encoder failure: keep what was buffered and fail.
    fn fail_recording(&self, attempt: u64, err: CaptureError) {
        let state = {
            let mut inner = self.inner.lock();
            if inner.attempt != attempt || !inner.state.is_recording() {
                log::debug!("Ignoring stale encoder failure for attempt {}", attempt);
                return;
            }
            let salvaged = inner
                .recorder
                .take()
                .and_then(|handle| self.recorder.salvage(handle));
            self.release_resources(&mut inner);
            inner.artifact = salvaged;
            inner.transition(SessionState::Failed(err));
            inner.state.clone()
        };
        self.notify(&state);
    }

    fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }
}

impl<P: MediaPlatform> Drop for Shared<P> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let Some(pump) = inner.pump.take() {
            pump.abort();
        }
        inner.recorder = None;
        inner.permission_watch.clear();
        self.capture.release();
    }
}

/// Drives the elapsed-time ticks and routes platform signals for one
/// recording attempt. Aborted when the attempt leaves `recording`.
async fn pump<P: MediaPlatform>(
    shared: Weak<Shared<P>>,
    attempt: u64,
    mut signals: mpsc::UnboundedReceiver<Signal>,
    tick: Duration,
) {
    let mut ticks = time::interval_at(Instant::now() + tick, tick);
    let mut signals_open = true;
    loop {
        tokio::select! {
            _ = ticks.tick() => {
                let Some(shared) = shared.upgrade() else { break };
                shared.on_tick(attempt);
            }
            signal = signals.recv(), if signals_open => {
                let Some(signal) = signal else {
                    signals_open = false;
                    continue;
                };
                let Some(shared) = shared.upgrade() else { break };
                // Handlers abort this task on their way out of `recording`.
                tokio::spawn(async move { shared.handle_signal(attempt, signal).await });
            }
        }
    }
}

fn rejected(action: Action, state: &SessionState) -> TransitionError {
    log::debug!("Rejected {} while {}", action, state.name());
    TransitionError::Rejected {
        action,
        state: state.name(),
    }
}

/// Builder for [`SessionController`].
pub struct SessionControllerBuilder<P: MediaPlatform> {
    platform: Arc<P>,
    config: SessionConfig,
    preview: Option<Arc<dyn PreviewSink>>,
    observer: Option<Arc<dyn SessionObserver>>,
    initial_mode: CaptureMode,
}

impl<P: MediaPlatform> SessionControllerBuilder<P> {
    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn preview(mut self, preview: Arc<dyn PreviewSink>) -> Self {
        self.preview = Some(preview);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    pub fn initial_mode(mut self, mode: CaptureMode) -> Self {
        self.initial_mode = mode;
        self
    }

    pub fn build(self) -> Result<SessionController<P>, ConfigError> {
        self.config.validate().map_err(ConfigError::Invalid)?;
        let config = Arc::new(self.config);
        let platform = self.platform;

        let shared = Shared {
            inventory: DeviceInventory::new(Arc::clone(&platform)),
            permissions: PermissionTracker::new(Arc::clone(&platform)),
            capture: CaptureSession::new(Arc::clone(&platform), Arc::clone(&config), self.preview),
            recorder: RecorderPipeline::new(platform, Arc::clone(&config)),
            config,
            observer: self.observer,
            inner: Mutex::new(Inner {
                state: SessionState::Idle,
                mode: self.initial_mode,
                attempt: 0,
                recorder: None,
                pump: None,
                started_at: None,
                artifact: None,
                warning: None,
                permission_watch: Vec::new(),
            }),
        };
        Ok(SessionController {
            shared: Arc::new(shared),
        })
    }
}

/// Per-session capture controller.
///
/// Cheap to clone; clones share one session. The session is torn down when
/// [`shutdown`](Self::shutdown) is called or the last clone is dropped.
pub struct SessionController<P: MediaPlatform> {
    shared: Arc<Shared<P>>,
}

impl<P: MediaPlatform> Clone for SessionController<P> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<P: MediaPlatform> SessionController<P> {
    pub fn builder(platform: Arc<P>) -> SessionControllerBuilder<P> {
        SessionControllerBuilder {
            platform,
            config: SessionConfig::default(),
            preview: None,
            observer: None,
            initial_mode: CaptureMode::default(),
        }
    }

    pub fn new(platform: Arc<P>, config: SessionConfig) -> Result<Self, ConfigError> {
        Self::builder(platform).config(config).build()
    }

    /// `idle → initializing → recording | failed`.
    ///
    /// Resolves once the attempt settles and returns the state it settled
    /// in. Acquisition failures are reported through the `failed` state,
    /// not as an `Err`.
    pub async fn start(&self, mode: CaptureMode) -> Result<SessionState, TransitionError> {
        let attempt = {
            let mut inner = self.shared.inner.lock();
            if !inner.state.is_idle() {
                return Err(rejected(Action::Start, &inner.state));
            }
            inner.mode = mode;
            log::info!("Starting {} capture", mode);
            self.shared.begin_attempt(&mut inner)
        };
        self.shared.notify(&SessionState::Initializing);
        Ok(self.shared.run_attempt(attempt, mode).await)
    }

    /// `failed → initializing`, same mode as the failed attempt.
    pub async fn retry(&self) -> Result<SessionState, TransitionError> {
        let (attempt, mode) = {
            let mut inner = self.shared.inner.lock();
            if !matches!(inner.state, SessionState::Failed(_)) {
                return Err(rejected(Action::Retry, &inner.state));
            }
            let mode = inner.mode;
            log::info!("Retrying {} capture", mode);
            (self.shared.begin_attempt(&mut inner), mode)
        };
        self.shared.notify(&SessionState::Initializing);
        Ok(self.shared.run_attempt(attempt, mode).await)
    }

    /// `recording → stopping → completed`.
    ///
    /// While `initializing` the attempt is abandoned and the session returns
    /// to idle at once; the acquisition result is released when it lands.
    pub async fn stop(&self) -> Result<SessionState, TransitionError> {
        {
            let mut inner = self.shared.inner.lock();
            if matches!(inner.state, SessionState::Initializing) {
                self.shared.abandon_attempt(&mut inner);
                drop(inner);
                self.shared.notify(&SessionState::Idle);
                return Ok(SessionState::Idle);
            }
        }
        self.shared.stop_recording(None, StopCause::Requested).await
    }

    /// Discard the artifact or error and return to idle.
    ///
    /// Teardown runs even when nothing is held. Rejected while recording or
    /// stopping.
    pub fn reset(&self) -> Result<(), TransitionError> {
        let changed = {
            let mut inner = self.shared.inner.lock();
            if matches!(inner.state, SessionState::Recording { .. } | SessionState::Stopping) {
                return Err(rejected(Action::Reset, &inner.state));
            }
            if matches!(inner.state, SessionState::Initializing) {
                self.shared.abandon_attempt(&mut inner);
                true
            } else {
                self.shared.release_resources(&mut inner);
                inner.artifact = None;
                inner.warning = None;
                let changed = !inner.state.is_idle();
                if changed {
                    inner.transition(SessionState::Idle);
                }
                changed
            }
        };
        if changed {
            self.shared.notify(&SessionState::Idle);
        }
        Ok(())
    }

    /// Switch mode. Always tears down first and discards any artifact.
    ///
    /// Rejected while initializing, recording or stopping; the current
    /// attempt is left untouched.
    pub fn change_mode(&self, mode: CaptureMode) -> Result<(), TransitionError> {
        let changed = {
            let mut inner = self.shared.inner.lock();
            if inner.state.may_hold_stream() {
                return Err(rejected(Action::ChangeMode, &inner.state));
            }
            self.shared.release_resources(&mut inner);
            inner.artifact = None;
            inner.warning = None;
            if inner.mode != mode {
                log::info!("Capture mode: {} -> {}", inner.mode, mode);
                inner.mode = mode;
            }
            let changed = !inner.state.is_idle();
            if changed {
                inner.transition(SessionState::Idle);
            }
            changed
        };
        if changed {
            self.shared.notify(&SessionState::Idle);
        }
        Ok(())
    }

    /// Tear everything down from any state without notifying observers.
    pub fn shutdown(&self) {
        let mut inner = self.shared.inner.lock();
        inner.attempt += 1;
        self.shared.release_resources(&mut inner);
        inner.artifact = None;
        inner.warning = None;
        inner.state = SessionState::Idle;
        log::info!("Session shut down");
    }

    pub fn state(&self) -> SessionState {
        self.shared.state()
    }

    pub fn mode(&self) -> CaptureMode {
        self.shared.inner.lock().mode
    }

    /// The finished recording, or what was salvaged from a failed one.
    pub fn artifact(&self) -> Option<RecordingArtifact> {
        self.shared.inner.lock().artifact.clone()
    }

    pub fn warning(&self) -> Option<String> {
        self.shared.inner.lock().warning.clone()
    }

    pub fn elapsed(&self) -> Duration {
        let inner = self.shared.inner.lock();
        match (&inner.state, inner.started_at) {
            (SessionState::Recording { .. }, Some(started_at)) => started_at.elapsed(),
            (SessionState::Completed(artifact), _) => Duration::from_secs_f64(artifact.duration_secs.max(0.0)),
            _ => Duration::ZERO,
        }
    }

    pub fn is_holding_stream(&self) -> bool {
        self.shared.capture.is_holding()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.shared.config
    }

    /// Devices from the most recent enumeration.
    pub fn devices(&self) -> Option<DeviceList> {
        self.shared.inventory.last_known()
    }

    pub async fn refresh_devices(&self) -> Result<DeviceList, CaptureError> {
        self.shared.inventory.list_devices().await
    }

    pub fn permissions(&self) -> PermissionSnapshot {
        self.shared.permissions.snapshot()
    }

    pub async fn query_permission(&self, capability: Capability) -> PermissionState {
        self.shared.permissions.query_state(capability).await
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let elapsed = self.elapsed().as_secs();
        let permissions = self.permissions();
        let inner = self.shared.inner.lock();
        SessionSnapshot {
            state: inner.state.name(),
            mode: inner.mode,
            busy: inner.state.is_busy(),
            elapsed_secs: elapsed,
            elapsed_label: format_elapsed(elapsed),
            error: inner.state.error().map(ErrorInfo::from),
            warning: inner.warning.clone(),
            artifact: inner.artifact.as_ref().map(ArtifactInfo::from),
            permissions,
        }
    }
}

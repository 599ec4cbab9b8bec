use crate::models::stream::{TrackKind, TrackState};
use crate::subscription::Subscription;

pub type EndedCallback = Box<dyn Fn() + Send + Sync + 'static>;

/// One continuous audio or video source handed out by the platform.
pub trait MediaTrack: Send + Sync {
    fn id(&self) -> &str;

    fn kind(&self) -> TrackKind;

    fn label(&self) -> &str;

    fn ready_state(&self) -> TrackState;

    /// Stop the track and release the underlying device. Idempotent.
    fn stop(&self);

    /// Register for the platform ending the track on its own (device
    /// unplugged, screen share revoked from OS chrome). Not fired by `stop`.
    fn on_ended(&self, callback: EndedCallback) -> Subscription;
}

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Failure raised by a platform media API.
///
/// `name` is the platform's error identifier (for browsers, the
/// `DOMException` name such as `NotAllowedError`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{name}: {message}")]
pub struct PlatformError {
    pub name: String,
    pub message: String,
}

impl PlatformError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            message: message.into(),
        }
    }
}

/// Errors that end a capture attempt or a recording.
///
/// Every variant renders a human-readable message; `Unknown` keeps the
/// platform's own text untranslated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CaptureError {
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("device not found: {0}")]
    DeviceNotFound(String),

    #[error("device busy: {0}")]
    DeviceBusy(String),

    #[error("constraints unsatisfiable: {0}")]
    ConstraintsUnsatisfiable(String),

    #[error("insecure context: {0}")]
    InsecureContext(String),

    #[error("capture aborted: {0}")]
    UserAborted(String),

    #[error("no supported recording format: {0}")]
    NoSupportedFormat(String),

    #[error("no data was recorded")]
    NoDataRecorded,

    #[error("unknown error: {0}")]
    Unknown(String),
}

/// Discriminant of [`CaptureError`], for UIs that branch on the reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    PermissionDenied,
    DeviceNotFound,
    DeviceBusy,
    ConstraintsUnsatisfiable,
    InsecureContext,
    UserAborted,
    NoSupportedFormat,
    NoDataRecorded,
    Unknown,
}

impl CaptureError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::PermissionDenied(_) => ErrorKind::PermissionDenied,
            Self::DeviceNotFound(_) => ErrorKind::DeviceNotFound,
            Self::DeviceBusy(_) => ErrorKind::DeviceBusy,
            Self::ConstraintsUnsatisfiable(_) => ErrorKind::ConstraintsUnsatisfiable,
            Self::InsecureContext(_) => ErrorKind::InsecureContext,
            Self::UserAborted(_) => ErrorKind::UserAborted,
            Self::NoSupportedFormat(_) => ErrorKind::NoSupportedFormat,
            Self::NoDataRecorded => ErrorKind::NoDataRecorded,
            Self::Unknown(_) => ErrorKind::Unknown,
        }
    }

    /// The message without the category prefix of `Display`.
    pub fn message(&self) -> &str {
        match self {
            Self::PermissionDenied(message)
            | Self::DeviceNotFound(message)
            | Self::DeviceBusy(message)
            | Self::ConstraintsUnsatisfiable(message)
            | Self::InsecureContext(message)
            | Self::UserAborted(message)
            | Self::NoSupportedFormat(message)
            | Self::Unknown(message) => message,
            Self::NoDataRecorded => "no data was recorded",
        }
    }

    /// Whether retrying can succeed without redeploying.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::InsecureContext(_))
    }

    /// Translate a failure from a screen-capture request.
    ///
    /// Dismissing the surface picker is reported as `NotAllowedError`,
    /// which here means the user backed out rather than a policy refusal.
    pub fn from_display_media(err: PlatformError) -> Self {
        if err.name == "NotAllowedError" {
            return Self::UserAborted(or_default(err.message, "screen capture was cancelled"));
        }
        Self::from(err)
    }

    /// Translate a failure from encoder creation or start.
    pub fn from_encoder(err: PlatformError) -> Self {
        if err.name == "NotSupportedError" {
            return Self::NoSupportedFormat(or_default(
                err.message,
                "the recorder rejected the selected format",
            ));
        }
        Self::from(err)
    }
}

impl From<PlatformError> for CaptureError {
    fn from(err: PlatformError) -> Self {
        match err.name.as_str() {
            "NotAllowedError" | "PermissionDeniedError" | "SecurityError" => Self::PermissionDenied(
                or_default(err.message, "access to the capture device was refused"),
            ),
            "NotFoundError" | "DevicesNotFoundError" => {
                Self::DeviceNotFound(or_default(err.message, "no matching capture device is connected"))
            }
            "NotReadableError" | "TrackStartError" => Self::DeviceBusy(or_default(
                err.message,
                "the device is in use by another application",
            )),
            "OverconstrainedError" | "ConstraintNotSatisfiedError" => Self::ConstraintsUnsatisfiable(
                or_default(err.message, "the device cannot satisfy the requested quality"),
            ),
            "AbortError" => Self::UserAborted(or_default(err.message, "the capture request was aborted")),
            _ => Self::Unknown(err.to_string()),
        }
    }
}

fn or_default(message: String, default: &str) -> String {
    if message.trim().is_empty() {
        default.to_string()
    } else {
        message
    }
}

/// A controller request that is not legal in the current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Start,
    Stop,
    Reset,
    Retry,
    ChangeMode,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Start => "start",
            Self::Stop => "stop",
            Self::Reset => "reset",
            Self::Retry => "retry",
            Self::ChangeMode => "change mode",
        };
        f.write_str(s)
    }
}

/// Usage error: the request was rejected and nothing changed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransitionError {
    #[error("cannot {action} while {state}")]
    Rejected { action: Action, state: &'static str },
}

/// Errors from loading a [`SessionConfig`](super::config::SessionConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration: {0}")]
    Invalid(String),

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_platform_names_to_taxonomy() {
        let cases = [
            ("NotAllowedError", ErrorKind::PermissionDenied),
            ("SecurityError", ErrorKind::PermissionDenied),
            ("NotFoundError", ErrorKind::DeviceNotFound),
            ("NotReadableError", ErrorKind::DeviceBusy),
            ("TrackStartError", ErrorKind::DeviceBusy),
            ("OverconstrainedError", ErrorKind::ConstraintsUnsatisfiable),
            ("AbortError", ErrorKind::UserAborted),
            ("TypeError", ErrorKind::Unknown),
        ];
        for (name, kind) in cases {
            let err = CaptureError::from(PlatformError::new(name, "boom"));
            assert_eq!(err.kind(), kind, "{name}");
        }
    }

    #[test]
    fn unknown_keeps_platform_text() {
        let err = CaptureError::from(PlatformError::new("InvalidStateError", "recorder is inactive"));
        assert_eq!(err, CaptureError::Unknown("InvalidStateError: recorder is inactive".into()));
    }

    #[test]
    fn empty_message_gets_a_readable_default() {
        let err = CaptureError::from(PlatformError::new("NotReadableError", ""));
        assert_eq!(
            err.to_string(),
            "device busy: the device is in use by another application"
        );
    }

    #[test]
    fn message_drops_the_category_prefix() {
        let err = CaptureError::from(PlatformError::new("NotReadableError", "Could not start audio source"));
        assert_eq!(err.to_string(), "device busy: Could not start audio source");
        assert_eq!(err.message(), "Could not start audio source");
        assert_eq!(CaptureError::NoDataRecorded.message(), "no data was recorded");
    }

    #[test]
    fn display_picker_dismissal_is_an_abort() {
        let err = CaptureError::from_display_media(PlatformError::new("NotAllowedError", ""));
        assert_eq!(err.kind(), ErrorKind::UserAborted);

        let err = CaptureError::from_display_media(PlatformError::new("NotFoundError", "no screens"));
        assert_eq!(err.kind(), ErrorKind::DeviceNotFound);
    }

    #[test]
    fn only_insecure_context_is_unrecoverable() {
        assert!(!CaptureError::InsecureContext("http".into()).is_recoverable());
        assert!(CaptureError::NoDataRecorded.is_recoverable());
        assert!(CaptureError::PermissionDenied("no".into()).is_recoverable());
    }

    #[test]
    fn rejected_transition_message() {
        let err = TransitionError::Rejected {
            action: Action::ChangeMode,
            state: "recording",
        };
        assert_eq!(err.to_string(), "cannot change mode while recording");
    }
}

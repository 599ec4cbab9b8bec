use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::permission::Capability;

/// Which media sources a session records.
///
/// Fixed for the lifetime of an acquisition; switching modes tears the
/// current stream down and acquires again.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureMode {
    /// Microphone only.
    #[default]
    Audio,
    /// Front camera plus microphone.
    Video,
    /// A display, window or tab surface. Carries system audio when offered.
    Screen,
    /// Screen capture merged with a separately acquired microphone.
    #[serde(rename = "screen+audio")]
    ScreenWithAudio,
}

impl CaptureMode {
    pub const ALL: [CaptureMode; 4] = [
        CaptureMode::Audio,
        CaptureMode::Video,
        CaptureMode::Screen,
        CaptureMode::ScreenWithAudio,
    ];

    /// Label used in file names and logs.
    pub fn label(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
            Self::Screen => "screen",
            Self::ScreenWithAudio => "screen-audio",
        }
    }

    /// Coarse category of the recording this mode produces.
    pub fn category(self) -> MediaCategory {
        match self {
            Self::Audio => MediaCategory::Audio,
            Self::Video | Self::Screen | Self::ScreenWithAudio => MediaCategory::Video,
        }
    }

    pub fn has_video(self) -> bool {
        self.category() == MediaCategory::Video
    }

    pub fn is_screen(self) -> bool {
        matches!(self, Self::Screen | Self::ScreenWithAudio)
    }

    /// Modes with a visual component publish their stream to the preview sink.
    pub fn requires_preview(self) -> bool {
        self.has_video()
    }

    /// Whether acquisition fails outright without a microphone.
    ///
    /// `ScreenWithAudio` degrades to screen-only instead.
    pub fn requires_microphone(self) -> bool {
        matches!(self, Self::Audio | Self::Video)
    }

    pub fn requires_camera(self) -> bool {
        matches!(self, Self::Video)
    }

    /// Capabilities whose permission state matters for this mode.
    pub fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Audio => &[Capability::Microphone],
            Self::Video => &[Capability::Microphone, Capability::Camera],
            Self::Screen => &[Capability::Screen],
            Self::ScreenWithAudio => &[Capability::Screen, Capability::Microphone],
        }
    }
}

impl fmt::Display for CaptureMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for CaptureMode {
    type Err = String;

    /// Accepts the serialized names and the file-name labels.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "audio" => Ok(Self::Audio),
            "video" => Ok(Self::Video),
            "screen" => Ok(Self::Screen),
            "screen+audio" | "screen-audio" => Ok(Self::ScreenWithAudio),
            other => Err(format!("unknown capture mode '{}'", other)),
        }
    }
}

/// Coarse MIME category of a finished recording.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaCategory {
    Audio,
    Video,
}

impl MediaCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Audio => "audio",
            Self::Video => "video",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_audio_mode_is_audio_category() {
        for mode in CaptureMode::ALL {
            let expected = if mode == CaptureMode::Audio {
                MediaCategory::Audio
            } else {
                MediaCategory::Video
            };
            assert_eq!(mode.category(), expected, "{mode}");
        }
    }

    #[test]
    fn screen_with_audio_does_not_require_microphone() {
        assert!(CaptureMode::Audio.requires_microphone());
        assert!(CaptureMode::Video.requires_microphone());
        assert!(!CaptureMode::ScreenWithAudio.requires_microphone());
        assert!(CaptureMode::ScreenWithAudio
            .capabilities()
            .contains(&Capability::Microphone));
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&CaptureMode::ScreenWithAudio).unwrap();
        assert_eq!(json, "\"screen+audio\"");
        let mode: CaptureMode = serde_json::from_str("\"video\"").unwrap();
        assert_eq!(mode, CaptureMode::Video);
    }

    #[test]
    fn parses_names_and_labels() {
        assert_eq!("screen+audio".parse::<CaptureMode>(), Ok(CaptureMode::ScreenWithAudio));
        assert_eq!("Screen-Audio".parse::<CaptureMode>(), Ok(CaptureMode::ScreenWithAudio));
        assert_eq!("video".parse::<CaptureMode>(), Ok(CaptureMode::Video));
        assert!("webcam".parse::<CaptureMode>().is_err());
    }
}

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constraints::{AudioConstraints, DisplayConstraints, VideoConstraints};
use super::error::ConfigError;
use super::mode::{CaptureMode, MediaCategory};
use crate::recorder::format::{AUDIO_MIME_PREFERENCES, VIDEO_MIME_PREFERENCES};

/// Configuration for a capture session.
///
/// Every field has a default, so a partial JSON document is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    pub audio: AudioConstraints,
    pub video: VideoConstraints,
    pub display: DisplayConstraints,

    /// Audio bit rate target for every mode (default: 128 kbps).
    pub audio_bits_per_second: u32,

    /// Video bit rate target for modes carrying video (default: 2.5 Mbps).
    pub video_bits_per_second: u32,

    /// Chunk delivery cadence in milliseconds (default: 1000).
    pub timeslice_ms: u64,

    /// Elapsed-time tick in milliseconds (default: 1000).
    pub tick_interval_ms: u64,

    /// Pause between releasing a stream and acquiring the next (default: 100).
    pub settle_interval_ms: u64,

    /// How long to wait for the encoder's final flush (default: 5000).
    pub finalize_timeout_ms: u64,

    /// Container/codec candidates for modes with video, most preferred first.
    pub video_mime_types: Vec<String>,

    /// Container/codec candidates for audio-only recording.
    pub audio_mime_types: Vec<String>,
}

impl SessionConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.video.validate()?;
        if self.display.ideal_frame_rate == 0 || self.display.ideal_frame_rate > self.display.max_frame_rate {
            return Err(format!(
                "display frame rate {} must be within 1..={}",
                self.display.ideal_frame_rate, self.display.max_frame_rate
            ));
        }
        if self.audio_bits_per_second == 0 || self.video_bits_per_second == 0 {
            return Err("bit rates must be positive".into());
        }
        if self.timeslice_ms == 0 {
            return Err("timeslice must be positive".into());
        }
        if self.tick_interval_ms == 0 {
            return Err("tick interval must be positive".into());
        }
        if self.finalize_timeout_ms == 0 {
            return Err("finalize timeout must be positive".into());
        }
        if self.video_mime_types.is_empty() || self.audio_mime_types.is_empty() {
            return Err("format preference lists must not be empty".into());
        }
        Ok(())
    }

    pub fn timeslice(&self) -> Duration {
        Duration::from_millis(self.timeslice_ms)
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn settle_interval(&self) -> Duration {
        Duration::from_millis(self.settle_interval_ms)
    }

    pub fn finalize_timeout(&self) -> Duration {
        Duration::from_millis(self.finalize_timeout_ms)
    }

    pub fn mime_preferences(&self, mode: CaptureMode) -> &[String] {
        match mode.category() {
            MediaCategory::Video => &self.video_mime_types,
            MediaCategory::Audio => &self.audio_mime_types,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            audio: AudioConstraints::default(),
            video: VideoConstraints::default(),
            display: DisplayConstraints::default(),
            audio_bits_per_second: 128_000,
            video_bits_per_second: 2_500_000,
            timeslice_ms: 1000,
            tick_interval_ms: 1000,
            settle_interval_ms: 100,
            finalize_timeout_ms: 5000,
            video_mime_types: VIDEO_MIME_PREFERENCES.iter().map(|s| s.to_string()).collect(),
            audio_mime_types: AUDIO_MIME_PREFERENCES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeslice(), Duration::from_secs(1));
        assert_eq!(config.audio_bits_per_second, 128_000);
        assert_eq!(config.video_bits_per_second, 2_500_000);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SessionConfig::from_json(r#"{ "settleIntervalMs": 0, "audio": { "echoCancellation": false } }"#)
            .unwrap();
        assert_eq!(config.settle_interval(), Duration::ZERO);
        assert!(!config.audio.echo_cancellation);
        assert!(config.audio.noise_suppression);
        assert_eq!(config.video.ideal_width, 1280);
    }

    #[test]
    fn invalid_json_values_are_rejected() {
        let err = SessionConfig::from_json(r#"{ "timesliceMs": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SessionConfig::from_json(r#"{ "audioMimeTypes": [] }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SessionConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn zero_finalize_timeout_is_rejected() {
        let err = SessionConfig::from_json(r#"{ "finalizeTimeoutMs": 0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref message) if message.contains("finalize")));

        let config = SessionConfig::from_json(r#"{ "finalizeTimeoutMs": 1 }"#).unwrap();
        assert_eq!(config.finalize_timeout(), Duration::from_millis(1));
    }

    #[test]
    fn preferences_follow_mode_category() {
        let config = SessionConfig::default();
        assert!(config.mime_preferences(CaptureMode::Audio)[0].starts_with("audio/"));
        assert!(config.mime_preferences(CaptureMode::ScreenWithAudio)[0].starts_with("video/"));
    }
}

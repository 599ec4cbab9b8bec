use serde::{Deserialize, Serialize};

/// Microphone processing requested from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AudioConstraints {
    pub echo_cancellation: bool,
    pub noise_suppression: bool,
    pub auto_gain_control: bool,
    /// Specific input device, or None for the platform default.
    pub device_id: Option<String>,
}

impl Default for AudioConstraints {
    fn default() -> Self {
        Self {
            echo_cancellation: true,
            noise_suppression: true,
            auto_gain_control: true,
            device_id: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    #[default]
    User,
    Environment,
}

/// Camera resolution and frame-rate targets. `ideal_*` values are
/// preferences, `max_*` values are caps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VideoConstraints {
    pub ideal_width: u32,
    pub max_width: u32,
    pub ideal_height: u32,
    pub max_height: u32,
    pub ideal_frame_rate: u32,
    pub max_frame_rate: u32,
    pub facing_mode: FacingMode,
    pub device_id: Option<String>,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            ideal_width: 1280,
            max_width: 1920,
            ideal_height: 720,
            max_height: 1080,
            ideal_frame_rate: 30,
            max_frame_rate: 60,
            facing_mode: FacingMode::User,
            device_id: None,
        }
    }
}

impl VideoConstraints {
    pub fn validate(&self) -> Result<(), String> {
        if self.ideal_width == 0 || self.ideal_height == 0 {
            return Err("video resolution must be non-zero".into());
        }
        if self.ideal_width > self.max_width || self.ideal_height > self.max_height {
            return Err(format!(
                "ideal resolution {}x{} exceeds cap {}x{}",
                self.ideal_width, self.ideal_height, self.max_width, self.max_height
            ));
        }
        if self.ideal_frame_rate == 0 || self.ideal_frame_rate > self.max_frame_rate {
            return Err(format!(
                "ideal frame rate {} must be within 1..={}",
                self.ideal_frame_rate, self.max_frame_rate
            ));
        }
        Ok(())
    }
}

/// Screen-capture request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DisplayConstraints {
    pub ideal_frame_rate: u32,
    pub max_frame_rate: u32,
    /// Ask for system/tab audio; the platform may ignore it.
    pub request_system_audio: bool,
}

impl Default for DisplayConstraints {
    fn default() -> Self {
        Self {
            ideal_frame_rate: 30,
            max_frame_rate: 60,
            request_system_audio: true,
        }
    }
}

/// A device media request. `None` leaves that media kind out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaConstraints {
    pub audio: Option<AudioConstraints>,
    pub video: Option<VideoConstraints>,
}

impl MediaConstraints {
    pub fn microphone(audio: AudioConstraints) -> Self {
        Self {
            audio: Some(audio),
            video: None,
        }
    }

    pub fn camera_with_microphone(audio: AudioConstraints, video: VideoConstraints) -> Self {
        Self {
            audio: Some(audio),
            video: Some(video),
        }
    }
}

use crate::asset::AssetId;
use crate::config::component_desc::{validate_non_negative, validate_pitch, validate_volume};
use crate::error::Result;

/// Settings for a single sound slot.
///
/// `name` is only consulted when the config is handed to
/// [`SoundComponent::set_slots`](crate::SoundComponent::set_slots); entries
/// without a name are dropped there. [`SoundComponent::add_slot`](crate::SoundComponent::add_slot)
/// takes the name as a separate argument and ignores this field.
#[derive(Debug, Clone)]
pub struct SlotConfig {
    pub name: Option<String>,
    /// Playback volume in `[0, 1]`
    pub volume: f32,
    /// Relative pitch, 1.0 plays at normal pitch
    pub pitch: f32,
    /// Restart from `start_time` when the end is reached
    pub looping: bool,
    /// Offset in seconds playback starts from
    pub start_time: f64,
    /// Seconds to play from `start_time` (None = until the end of the asset)
    pub duration: Option<f64>,
    /// Play every request independently instead of replacing the current sound
    pub overlap: bool,
    /// Start playing as soon as the component is enabled and the asset is loaded
    pub auto_play: bool,
    pub asset: Option<AssetId>,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            name: None,
            volume: 1.0,
            pitch: 1.0,
            looping: false,
            start_time: 0.0,
            duration: None,
            overlap: false,
            auto_play: false,
            asset: None,
        }
    }
}

impl SlotConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Config record carrying its own slot name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    pub fn start_time(mut self, seconds: f64) -> Self {
        self.start_time = seconds;
        self
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    pub fn overlap(mut self, overlap: bool) -> Self {
        self.overlap = overlap;
        self
    }

    pub fn auto_play(mut self, auto_play: bool) -> Self {
        self.auto_play = auto_play;
        self
    }

    pub fn asset(mut self, asset: AssetId) -> Self {
        self.asset = Some(asset);
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_volume(self.volume)?;
        validate_pitch(self.pitch)?;
        validate_non_negative("start_time", self.start_time as f32)?;
        if let Some(duration) = self.duration {
            validate_non_negative("duration", duration as f32)?;
        }
        Ok(())
    }
}

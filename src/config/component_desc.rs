use crate::error::{Result, SoundError};

/// Minimum pitch accepted for component-wide and per-slot pitch.
pub const MIN_PITCH: f32 = 0.01;

/// Algorithm used to reduce the volume of a positional sound as it moves away
/// from the listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DistanceModel {
    #[default]
    Linear,
    Inverse,
    Exponential,
}

impl std::fmt::Display for DistanceModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Linear => "linear",
            Self::Inverse => "inverse",
            Self::Exponential => "exponential",
        };
        f.write_str(name)
    }
}

/// Attenuation settings forwarded unchanged to positional instances.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistanceParams {
    pub model: DistanceModel,
    /// Distance below which no attenuation is applied
    pub ref_distance: f32,
    /// Distance beyond which the falloff stops (the sound is not silent there)
    pub max_distance: f32,
    /// Factor used in the falloff equation
    pub roll_off_factor: f32,
}

impl Default for DistanceParams {
    fn default() -> Self {
        Self {
            model: DistanceModel::Linear,
            ref_distance: 1.0,
            max_distance: 10000.0,
            roll_off_factor: 1.0,
        }
    }
}

/// Configuration descriptor for a [`SoundComponent`](crate::SoundComponent).
#[derive(Debug, Clone)]
pub struct SoundComponentDesc {
    /// Component-wide volume multiplier in `[0, 1]`
    pub volume: f32,
    /// Component-wide pitch multiplier, must be above [`MIN_PITCH`]
    pub pitch: f32,
    /// Spatialize playback relative to the entity position
    pub positional: bool,
    pub distance: DistanceParams,
    /// Initial value of the component's own enabled flag
    pub enabled: bool,
    /// Skip the audible part of enable reconciliation (authoring/editor hosts)
    pub suppress_playback_side_effects: bool,
}

impl Default for SoundComponentDesc {
    fn default() -> Self {
        Self {
            volume: 1.0,
            pitch: 1.0,
            positional: true,
            distance: DistanceParams::default(),
            enabled: true,
            suppress_playback_side_effects: false,
        }
    }
}

impl SoundComponentDesc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn volume(mut self, volume: f32) -> Self {
        self.volume = volume;
        self
    }

    pub fn pitch(mut self, pitch: f32) -> Self {
        self.pitch = pitch;
        self
    }

    pub fn positional(mut self, positional: bool) -> Self {
        self.positional = positional;
        self
    }

    pub fn distance_model(mut self, model: DistanceModel) -> Self {
        self.distance.model = model;
        self
    }

    pub fn ref_distance(mut self, distance: f32) -> Self {
        self.distance.ref_distance = distance;
        self
    }

    pub fn max_distance(mut self, distance: f32) -> Self {
        self.distance.max_distance = distance;
        self
    }

    pub fn roll_off_factor(mut self, factor: f32) -> Self {
        self.distance.roll_off_factor = factor;
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn suppress_playback_side_effects(mut self, suppress: bool) -> Self {
        self.suppress_playback_side_effects = suppress;
        self
    }

    /// Checks every field against its allowed range.
    pub fn validate(&self) -> Result<()> {
        validate_volume(self.volume)?;
        validate_pitch(self.pitch)?;
        validate_non_negative("ref_distance", self.distance.ref_distance)?;
        validate_non_negative("max_distance", self.distance.max_distance)?;
        validate_non_negative("roll_off_factor", self.distance.roll_off_factor)?;
        Ok(())
    }
}

pub(crate) fn validate_volume(volume: f32) -> Result<()> {
    if !(0.0..=1.0).contains(&volume) {
        return Err(SoundError::InvalidConfig(format!(
            "volume {} is outside [0, 1]",
            volume
        )));
    }
    Ok(())
}

pub(crate) fn validate_pitch(pitch: f32) -> Result<()> {
    if pitch.is_nan() || pitch <= MIN_PITCH {
        return Err(SoundError::InvalidConfig(format!(
            "pitch {} must be larger than {}",
            pitch, MIN_PITCH
        )));
    }
    Ok(())
}

pub(crate) fn validate_non_negative(field: &str, value: f32) -> Result<()> {
    if value.is_nan() || value < 0.0 {
        return Err(SoundError::InvalidConfig(format!(
            "{} {} must not be negative",
            field, value
        )));
    }
    Ok(())
}

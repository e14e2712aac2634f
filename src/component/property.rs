use crate::config::{
    DistanceModel, DistanceParams, SoundComponentDesc, validate_non_negative, validate_pitch,
    validate_volume,
};
use crate::error::Result;
use glam::Vec3;

/// A component-wide setting, routed by
/// [`SoundComponent::set_property`](crate::SoundComponent::set_property).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ComponentProperty {
    Volume(f32),
    Pitch(f32),
    RefDistance(f32),
    MaxDistance(f32),
    RollOffFactor(f32),
    DistanceModel(DistanceModel),
    /// Changing this recreates live instances
    Positional(bool),
}

impl ComponentProperty {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Volume(_) => "volume",
            Self::Pitch(_) => "pitch",
            Self::RefDistance(_) => "refDistance",
            Self::MaxDistance(_) => "maxDistance",
            Self::RollOffFactor(_) => "rollOffFactor",
            Self::DistanceModel(_) => "distanceModel",
            Self::Positional(_) => "positional",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            Self::Volume(volume) => validate_volume(volume),
            Self::Pitch(pitch) => validate_pitch(pitch),
            Self::RefDistance(value) => validate_non_negative("ref_distance", value),
            Self::MaxDistance(value) => validate_non_negative("max_distance", value),
            Self::RollOffFactor(value) => validate_non_negative("roll_off_factor", value),
            Self::DistanceModel(_) | Self::Positional(_) => Ok(()),
        }
    }
}

/// Component-wide values every slot folds into the instances it creates.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ComponentMix {
    pub volume: f32,
    pub pitch: f32,
    pub positional: bool,
    pub distance: DistanceParams,
    /// Entity position handed to positional instances
    pub position: Vec3,
}

impl Default for ComponentMix {
    fn default() -> Self {
        Self::from_desc(&SoundComponentDesc::default(), Vec3::ZERO)
    }
}

impl ComponentMix {
    pub fn from_desc(desc: &SoundComponentDesc, position: Vec3) -> Self {
        Self {
            volume: desc.volume,
            pitch: desc.pitch,
            positional: desc.positional,
            distance: desc.distance,
            position,
        }
    }

    /// Returns the mix with `property` applied, or `None` when it already
    /// holds that value.
    pub fn with(&self, property: ComponentProperty) -> Option<Self> {
        let mut next = self.clone();
        match property {
            ComponentProperty::Volume(volume) => next.volume = volume,
            ComponentProperty::Pitch(pitch) => next.pitch = pitch,
            ComponentProperty::RefDistance(value) => next.distance.ref_distance = value,
            ComponentProperty::MaxDistance(value) => next.distance.max_distance = value,
            ComponentProperty::RollOffFactor(value) => next.distance.roll_off_factor = value,
            ComponentProperty::DistanceModel(model) => next.distance.model = model,
            ComponentProperty::Positional(positional) => next.positional = positional,
        }
        (next != *self).then_some(next)
    }

    pub fn write_back(&self, desc: &mut SoundComponentDesc) {
        desc.volume = self.volume;
        desc.pitch = self.pitch;
        desc.positional = self.positional;
        desc.distance = self.distance;
    }
}

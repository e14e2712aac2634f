//! Configuration for sound components and their slots

mod component_desc;
mod slot_config;

pub use component_desc::{DistanceModel, DistanceParams, MIN_PITCH, SoundComponentDesc};
pub use slot_config::SlotConfig;
pub(crate) use component_desc::{validate_non_negative, validate_pitch, validate_volume};

//! Sound component for entity-based engines.
//!
//! A [`SoundComponent`] is attached to one entity and owns any number of
//! named [`SoundSlot`]s. Each slot plays one asset with its own volume,
//! pitch, looping and overlap settings; the component layers shared volume,
//! pitch, spatialization and distance attenuation settings on top and ties
//! playback to the entity's enabled state.
//!
//! Decoding goes through [`AssetRegistry`] (symphonia for files), playback
//! through the [`SoundInstance`] trait. [`PlaybackInstance`] is a headless
//! implementation that only keeps a clock.

pub mod asset;
pub mod audio_data;
pub mod component;
pub mod config;
pub mod error;
pub mod events;
pub mod lifecycle;
pub mod playback;
pub mod slot;

pub use asset::{AssetEvent, AssetId, AssetRegistry, AssetState};
pub use audio_data::{AudioData, AudioDataLoader, LoadOptions, SymphoniaLoader};
pub use component::{ComponentProperty, SoundComponent};
pub use config::{DistanceModel, DistanceParams, SlotConfig, SoundComponentDesc};
pub use error::{Result, SoundError};
pub use events::{ComponentId, SoundEvent};
pub use lifecycle::{ComponentBase, Lifecycle};
pub use playback::{InstanceFactory, InstanceParams, PlaybackFactory, PlaybackInstance, SoundInstance};
pub use slot::{InstanceId, SlotInput, SoundSlot};

pub use glam::Vec3;

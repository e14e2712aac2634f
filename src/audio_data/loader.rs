use crate::audio_data::{AudioData, LoadOptions};
use crate::error::Result;
use std::sync::Arc;

/// Decodes the file behind an asset into [`AudioData`].
///
/// The [`AssetRegistry`](crate::asset::AssetRegistry) calls this from a
/// background thread, so implementations must be `Send + Sync`. The crate
/// ships [`SymphoniaLoader`](crate::audio_data::SymphoniaLoader); hosts with
/// their own decoders plug them in here.
pub trait AudioDataLoader: Send + Sync {
    fn load(&self, path: &str, options: &LoadOptions) -> Result<Arc<AudioData>>;
}

//! Error types for soundslots

use crate::asset::AssetId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SoundError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Audio format error: {0}")]
    AudioFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio loading error: {0}")]
    AudioLoading(String),

    #[error("Asset {0} not found")]
    AssetNotFound(AssetId),
}

pub type Result<T> = std::result::Result<T, SoundError>;

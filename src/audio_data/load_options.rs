use std::time::Duration;

/// Defines how to handle channel conversion during audio loading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvertToMono {
    /// Keep original channels
    #[default]
    Original,
    /// Average all channels into one
    ForceMono,
}

/// Options for controlling how slot assets are decoded.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    pub convert_to_mono: ConvertToMono,
    /// Maximum duration to decode (None = whole file)
    pub max_duration: Option<Duration>,
}

impl LoadOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn convert_to_mono(mut self, convert: ConvertToMono) -> Self {
        self.convert_to_mono = convert;
        self
    }

    pub fn max_duration(mut self, duration: Duration) -> Self {
        self.max_duration = Some(duration);
        self
    }
}

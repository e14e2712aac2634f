//! Decoded audio data and the loaders that produce it

mod load_options;
mod loader;
mod symphonia_loader;

use crate::error::{Result, SoundError};
pub use load_options::{ConvertToMono, LoadOptions};
pub use loader::AudioDataLoader;
use std::sync::Arc;
use std::time::Duration;
pub use symphonia_loader::SymphoniaLoader;

/// Decoded PCM audio shared between an asset and the instances playing it.
///
/// Samples are stored interleaved (`[L0, R0, L1, R1, ...]` for stereo).
#[derive(Debug, Clone)]
pub struct AudioData {
    inner: Arc<AudioDataInner>,
}

#[derive(Debug)]
struct AudioDataInner {
    samples: Vec<f32>,
    sample_rate: u32,
    channels: u16,
    duration: Duration,
    total_frames: usize,
}

impl AudioData {
    /// Wraps interleaved samples.
    ///
    /// # Errors
    ///
    /// Returns [`SoundError::AudioFormat`] when `channels` or `sample_rate` is zero
    /// or the sample count is not a whole number of frames.
    pub fn from_samples(samples: Vec<f32>, sample_rate: u32, channels: u16) -> Result<Self> {
        if channels == 0 || sample_rate == 0 {
            return Err(SoundError::AudioFormat(format!(
                "invalid layout: {} channels at {} Hz",
                channels, sample_rate
            )));
        }
        if samples.len() % channels as usize != 0 {
            return Err(SoundError::AudioFormat(format!(
                "{} samples do not divide into {} channels",
                samples.len(),
                channels
            )));
        }

        let total_frames = samples.len() / channels as usize;
        let duration = Duration::from_secs_f64(total_frames as f64 / sample_rate as f64);
        Ok(Self {
            inner: Arc::new(AudioDataInner {
                samples,
                sample_rate,
                channels,
                duration,
                total_frames,
            }),
        })
    }

    /// Silent mono data of the given length, handy for headless hosts.
    pub fn silence(duration: Duration, sample_rate: u32) -> Self {
        let frames = (duration.as_secs_f64() * sample_rate as f64).round() as usize;
        Self {
            inner: Arc::new(AudioDataInner {
                samples: vec![0.0; frames],
                sample_rate,
                channels: 1,
                duration,
                total_frames: frames,
            }),
        }
    }

    pub fn sample_rate(&self) -> u32 {
        self.inner.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.inner.channels
    }

    pub fn duration(&self) -> Duration {
        self.inner.duration
    }

    pub fn samples(&self) -> &[f32] {
        &self.inner.samples
    }

    pub fn total_frames(&self) -> usize {
        self.inner.total_frames
    }

    pub fn is_empty(&self) -> bool {
        self.inner.samples.is_empty()
    }

    /// Convert to mono by averaging all channels
    pub fn to_mono(&self) -> Self {
        if self.inner.channels == 1 {
            return self.clone();
        }

        let channels = self.inner.channels as usize;
        let samples: Vec<f32> = self
            .inner
            .samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect();

        Self {
            inner: Arc::new(AudioDataInner {
                total_frames: samples.len(),
                samples,
                sample_rate: self.inner.sample_rate,
                channels: 1,
                duration: self.inner.duration,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_samples_computes_duration() {
        let data = AudioData::from_samples(vec![0.0; 48000 * 2], 48000, 2).unwrap();
        assert_eq!(data.total_frames(), 48000);
        assert_eq!(data.duration(), Duration::from_secs(1));
    }

    #[test]
    fn from_samples_rejects_partial_frames() {
        assert!(AudioData::from_samples(vec![0.0; 3], 44100, 2).is_err());
        assert!(AudioData::from_samples(vec![0.0; 4], 44100, 0).is_err());
    }

    #[test]
    fn to_mono_averages_frames() {
        let data = AudioData::from_samples(vec![1.0, 0.0, 0.5, 0.5], 10, 2).unwrap();
        let mono = data.to_mono();
        assert_eq!(mono.channels(), 1);
        assert_eq!(mono.samples(), &[0.5, 0.5]);
        assert_eq!(mono.duration(), data.duration());
    }
}

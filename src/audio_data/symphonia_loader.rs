use crate::audio_data::{AudioData, AudioDataLoader, ConvertToMono, LoadOptions};
use crate::error::{Result, SoundError};
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use symphonia::{
    core::{
        audio::SampleBuffer, codecs::DecoderOptions, errors::Error, formats::FormatOptions,
        io::MediaSourceStream, meta::MetadataOptions, probe::Hint,
    },
    default::{get_codecs, get_probe},
};

/// Default loader decoding WAV, MP3, FLAC, OGG and friends through Symphonia.
#[derive(Debug, Clone, Copy, Default)]
pub struct SymphoniaLoader;

impl AudioDataLoader for SymphoniaLoader {
    fn load(&self, path: &str, options: &LoadOptions) -> Result<Arc<AudioData>> {
        let file = File::open(path)?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = Path::new(path).extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| SoundError::AudioLoading(format!("Failed to probe {}: {:?}", path, e)))?;

        let mut format = probed.format;

        let track = format
            .default_track()
            .ok_or_else(|| SoundError::AudioLoading(format!("No audio track in {}", path)))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| SoundError::AudioLoading("Sample rate not found".to_string()))?;

        let channels = track
            .codec_params
            .channels
            .ok_or_else(|| SoundError::AudioLoading("Channel count not found".to_string()))?
            .count() as u16;

        let mut decoder = get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| SoundError::AudioLoading(format!("Failed to create decoder: {:?}", e)))?;

        let max_frames = options
            .max_duration
            .map(|d| (d.as_secs_f64() * sample_rate as f64) as usize)
            .unwrap_or(usize::MAX);

        let mut samples: Vec<f32> = Vec::new();
        let mut frames_decoded = 0;

        while frames_decoded < max_frames {
            let packet = match format.next_packet() {
                Ok(packet) => packet,
                Err(Error::IoError(_)) => break, // end-of-file
                Err(e) => {
                    return Err(SoundError::AudioLoading(format!(
                        "Error reading packet: {:?}",
                        e
                    )));
                }
            };

            let decoded = match decoder.decode(&packet) {
                Ok(decoded) => decoded,
                Err(Error::IoError(_)) => break,
                Err(Error::DecodeError(_)) => continue, // recoverable corruption
                Err(e) => {
                    return Err(SoundError::AudioLoading(format!(
                        "Error decoding packet: {:?}",
                        e
                    )));
                }
            };

            let spec = *decoded.spec();
            let frames = decoded.frames();
            let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
            buffer.copy_interleaved_ref(decoded);

            samples.extend_from_slice(buffer.samples());
            frames_decoded += frames;
        }

        let limit = max_frames.saturating_mul(channels as usize);
        if samples.len() > limit {
            samples.truncate(limit);
        }

        log::debug!(
            "Decoded {} ({} frames, {} Hz, {} ch)",
            path,
            frames_decoded,
            sample_rate,
            channels
        );

        let data = AudioData::from_samples(samples, sample_rate, channels)?;
        let data = match options.convert_to_mono {
            ConvertToMono::Original => data,
            ConvertToMono::ForceMono => data.to_mono(),
        };

        Ok(Arc::new(data))
    }
}

use std::path::Path;

use crate::audio::domain::audio_segment::AudioSegment;
use crate::audio::domain::audio_source::{AudioError, AudioSource};
use crate::shared::constants::{BITS_PER_SAMPLE, CHANNELS, SAMPLE_RATE};

/// Reads 16 kHz, 16-bit, mono PCM WAV files. Anything else is rejected
/// rather than converted.
#[derive(Debug, Default)]
pub struct WavAudioSource;

impl WavAudioSource {
    pub fn new() -> Self {
        Self
    }
}

impl AudioSource for WavAudioSource {
    fn read(&self, path: &Path) -> Result<AudioSegment, AudioError> {
        let decode_error = |e: hound::Error| AudioError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let reader = hound::WavReader::open(path).map_err(decode_error)?;

        let spec = reader.spec();
        let expected = describe(SAMPLE_RATE, BITS_PER_SAMPLE, CHANNELS, "int");
        let format = match spec.sample_format {
            hound::SampleFormat::Int => "int",
            hound::SampleFormat::Float => "float",
        };
        let actual = describe(spec.sample_rate, spec.bits_per_sample, spec.channels, format);
        if actual != expected {
            return Err(AudioError::FormatMismatch {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }

        let samples = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(decode_error)?;
        let segment = AudioSegment::new(samples, spec.sample_rate);
        log::info!(
            "Loaded {} ({:.2}s of audio)",
            path.display(),
            segment.duration()
        );
        Ok(segment)
    }
}

fn describe(sample_rate: u32, bits: u16, channels: u16, format: &str) -> String {
    format!("{sample_rate} Hz, {bits}-bit {format}, {channels} channel(s)")
}

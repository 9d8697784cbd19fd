//! PCM16 speech payload decoding.
//!
//! The backend returns raw 16-bit signed little-endian PCM, interleaved,
//! base64 encoded. Decoding yields one `f32` lane per channel, normalized by
//! 32768. No resampling or mixing happens here.

use std::path::Path;

use base64::Engine;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AudioDecodeError {
    #[error("audio payload is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("audio payload has {len} bytes, not a whole number of 16-bit samples")]
    MisalignedPayload { len: usize },

    #[error("channel count must be at least 1")]
    NoChannels,

    #[error("failed to write WAV: {0}")]
    Wav(#[from] hound::Error),
}

/// De-interleaved float samples.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleBuffer {
    pub sample_rate: u32,
    /// One vector per channel, each `frame_count()` long.
    pub channels: Vec<Vec<f32>>,
}

impl SampleBuffer {
    pub fn frame_count(&self) -> usize {
        self.channels.first().map(Vec::len).unwrap_or(0)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        self.channels.get(index).map(Vec::as_slice)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Frame-major samples, the layout WAV writers expect.
    pub fn interleaved(&self) -> Vec<f32> {
        let mut out = Vec::with_capacity(self.frame_count() * self.channel_count());
        for frame in 0..self.frame_count() {
            for channel in &self.channels {
                out.push(channel[frame]);
            }
        }
        out
    }

    /// Export as 16-bit PCM WAV.
    pub fn write_wav(&self, path: impl AsRef<Path>) -> Result<(), AudioDecodeError> {
        let spec = hound::WavSpec {
            channels: self.channel_count() as u16,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, spec)?;
        for sample in self.interleaved() {
            let scaled = (sample * 32768.0).round().clamp(i16::MIN as f32, i16::MAX as f32);
            writer.write_sample(scaled as i16)?;
        }
        writer.finalize()?;
        Ok(())
    }
}

/// Standard-alphabet base64 to bytes.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, AudioDecodeError> {
    Ok(base64::engine::general_purpose::STANDARD.decode(encoded.trim())?)
}

/// Interpret little-endian PCM16 bytes as `channels` interleaved lanes.
///
/// A trailing partial frame is dropped.
pub fn decode_pcm16(
    bytes: &[u8],
    sample_rate: u32,
    channels: usize,
) -> Result<SampleBuffer, AudioDecodeError> {
    if channels == 0 {
        return Err(AudioDecodeError::NoChannels);
    }
    if bytes.len() % 2 != 0 {
        return Err(AudioDecodeError::MisalignedPayload { len: bytes.len() });
    }

    let samples: Vec<i16> = bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect();
    let frame_count = samples.len() / channels;

    let mut lanes = vec![Vec::with_capacity(frame_count); channels];
    for frame in samples.chunks_exact(channels) {
        for (lane, sample) in lanes.iter_mut().zip(frame) {
            lane.push(*sample as f32 / 32768.0);
        }
    }

    Ok(SampleBuffer {
        sample_rate,
        channels: lanes,
    })
}

/// Full pipeline: base64 text to sample buffer.
pub fn decode_payload(
    encoded: &str,
    sample_rate: u32,
    channels: usize,
) -> Result<SampleBuffer, AudioDecodeError> {
    let bytes = decode_base64(encoded)?;
    decode_pcm16(&bytes, sample_rate, channels)
}

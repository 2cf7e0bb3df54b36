//! Deterministic silent WAV generation for accelerator warmup — spec.md §9
//! ("Silence generation for warmup"): a 100 ms mono 16-bit 16 kHz all-zero
//! PCM buffer, written with a correct RIFF header and cached once per
//! process since every caller asks for the identical bytes.

use std::io::Cursor;
use std::sync::OnceLock;

use crate::error::{EngineError, Result};

const SAMPLE_RATE: u32 = 16_000;
const DURATION_MS: u32 = 100;

static SILENT_WAV: OnceLock<Vec<u8>> = OnceLock::new();

fn render() -> Result<Vec<u8>> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut buf = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut buf, spec)
            .map_err(|e| EngineError::InvalidAudio(e.to_string()))?;
        let n_samples = SAMPLE_RATE as usize * DURATION_MS as usize / 1000;
        for _ in 0..n_samples {
            writer
                .write_sample(0i16)
                .map_err(|e| EngineError::InvalidAudio(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| EngineError::InvalidAudio(e.to_string()))?;
    }
    Ok(buf.into_inner())
}

/// Bytes of the cached 100 ms silent WAV, rendered once per process.
pub fn silent_wav_bytes() -> Result<&'static [u8]> {
    if let Some(bytes) = SILENT_WAV.get() {
        return Ok(bytes.as_slice());
    }
    let bytes = render()?;
    Ok(SILENT_WAV.get_or_init(|| bytes).as_slice())
}

/// Decode the cached silent WAV straight to `f32` PCM samples, ready to feed
/// a backend's `transcribe` call during warmup.
pub fn silent_pcm_samples() -> Result<Vec<f32>> {
    let bytes = silent_wav_bytes()?;
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| EngineError::InvalidAudio(e.to_string()))?;
    Ok(reader
        .samples::<i16>()
        .map(|s| s.unwrap_or(0) as f32 / i16::MAX as f32)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_correct_sample_count() {
        let samples = silent_pcm_samples().unwrap();
        assert_eq!(samples.len(), 1600);
        assert!(samples.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn is_cached_across_calls() {
        let a = silent_wav_bytes().unwrap().as_ptr();
        let b = silent_wav_bytes().unwrap().as_ptr();
        assert_eq!(a, b);
    }
}

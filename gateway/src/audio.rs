//! WAV bytes → f32 PCM, for audio arriving over the wire (multipart upload
//! or base64-decoded retry payload). The Gateway trusts its callers (Ingest
//! or a retry caller) to hand it canonical 16 kHz mono PCM16 WAV.

use std::io::Cursor;

use crate::error::GatewayError;

pub fn decode_wav_to_pcm(bytes: &[u8]) -> Result<Vec<f32>, GatewayError> {
    let mut reader = hound::WavReader::new(Cursor::new(bytes))
        .map_err(|e| GatewayError::Internal(anyhow::anyhow!("invalid WAV: {e}")))?;
    let spec = reader.spec();

    let samples: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Int => reader
            .samples::<i16>()
            .map(|s| s.unwrap_or(0) as f32 / i16::MAX as f32)
            .collect(),
        hound::SampleFormat::Float => reader.samples::<f32>().map(|s| s.unwrap_or(0.0)).collect(),
    };

    // Downmix to mono if the upload happens to be stereo; canonical sessions
    // are always mono already, this only guards foreign uploads.
    if spec.channels > 1 {
        let channels = spec.channels as usize;
        Ok(samples
            .chunks(channels)
            .map(|frame| frame.iter().sum::<f32>() / channels as f32)
            .collect())
    } else {
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_wav(samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut buf = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut buf, spec).unwrap();
            for &s in samples {
                writer.write_sample(s).unwrap();
            }
            writer.finalize().unwrap();
        }
        buf.into_inner()
    }

    #[test]
    fn decodes_mono_pcm16() {
        let wav = make_wav(&[0, i16::MAX, i16::MIN]);
        let pcm = decode_wav_to_pcm(&wav).unwrap();
        assert_eq!(pcm.len(), 3);
        assert!((pcm[1] - 1.0).abs() < 1e-4);
    }
}

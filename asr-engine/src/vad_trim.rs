//! Leading/trailing silence trim for the `primary` backend, using the same
//! Silero-backed detector the CLI's streaming pipeline gates inference with
//! (see `voice_activity_detector::VoiceActivityDetector`). Unlike the
//! streaming pipeline this operates over a whole in-memory clip rather than
//! a live stream, so there is no pre-roll/flush state machine — just a scan
//! for the first and last speech-probable chunk.

use voice_activity_detector::VoiceActivityDetector;

const CHUNK_SIZE: usize = 512;
const SAMPLE_RATE: i64 = 16_000;

/// Returns `(trimmed_pcm, leading_trim_secs)`. `leading_trim_secs` must be
/// added back to every timestamp the backend reports, so downstream
/// consumers see offsets relative to the original clip.
pub fn trim_silence(pcm: &[f32], threshold: f32) -> (Vec<f32>, f64) {
    if pcm.len() < CHUNK_SIZE {
        return (pcm.to_vec(), 0.0);
    }

    let mut vad = match VoiceActivityDetector::builder()
        .sample_rate(SAMPLE_RATE)
        .chunk_size(CHUNK_SIZE)
        .build()
    {
        Ok(v) => v,
        Err(_) => return (pcm.to_vec(), 0.0),
    };

    let chunks: Vec<&[f32]> = pcm.chunks(CHUNK_SIZE).collect();
    let mut speech_flags = Vec::with_capacity(chunks.len());
    for chunk in &chunks {
        if chunk.len() < CHUNK_SIZE {
            speech_flags.push(false);
            continue;
        }
        let prob = vad.predict(chunk.iter().copied());
        speech_flags.push(prob > threshold);
    }

    let first_speech = speech_flags.iter().position(|&s| s);
    let last_speech = speech_flags.iter().rposition(|&s| s);

    match (first_speech, last_speech) {
        (Some(first), Some(last)) => {
            let start_sample = first * CHUNK_SIZE;
            let end_sample = ((last + 1) * CHUNK_SIZE).min(pcm.len());
            let trimmed = pcm[start_sample..end_sample].to_vec();
            (trimmed, start_sample as f64 / SAMPLE_RATE as f64)
        }
        // No speech detected anywhere: leave the clip untouched rather than
        // feeding the model an empty buffer.
        _ => (pcm.to_vec(), 0.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_clip_is_returned_unchanged() {
        let pcm = vec![0.0f32; 100];
        let (trimmed, offset) = trim_silence(&pcm, 0.5);
        assert_eq!(trimmed.len(), 100);
        assert_eq!(offset, 0.0);
    }

    #[test]
    fn all_silence_is_returned_unchanged() {
        let pcm = vec![0.0f32; CHUNK_SIZE * 10];
        let (trimmed, offset) = trim_silence(&pcm, 0.5);
        assert_eq!(trimmed.len(), pcm.len());
        assert_eq!(offset, 0.0);
    }
}

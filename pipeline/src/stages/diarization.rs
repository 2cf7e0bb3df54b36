//! Stage 1.5 (`diarization`) — spec.md §4.2.3. If audio is present and the
//! diarizer is configured, each segment is assigned the speaker with the
//! largest time overlap; ties go to whichever speaker turn was encountered
//! first (spec.md §9, "first encountered wins"). If audio is missing, every
//! segment gets `speaker_id = "UNKNOWN"` and the fact is logged.

use tracing::warn;

use whisper_common::Segment;

use crate::clients::{DiarizedTurn, DiarizerClient};

pub async fn run(segments: &mut [Segment], audio_bytes: Option<&[u8]>, diarizer: Option<&DiarizerClient>) {
    let (Some(bytes), Some(client)) = (audio_bytes, diarizer) else {
        warn!("diarization: audio path missing or diarizer not configured, marking speakers UNKNOWN");
        mark_unknown(segments);
        return;
    };

    match client.diarize(bytes).await {
        Ok(turns) => assign_speakers(segments, &turns),
        Err(e) => {
            warn!(error = %e, "diarization: diarizer call failed, marking speakers UNKNOWN");
            mark_unknown(segments);
        }
    }
}

fn mark_unknown(segments: &mut [Segment]) {
    for seg in segments.iter_mut() {
        seg.speaker_id = Some("UNKNOWN".to_string());
    }
}

fn assign_speakers(segments: &mut [Segment], turns: &[DiarizedTurn]) {
    for seg in segments.iter_mut() {
        let mut best: Option<(&DiarizedTurn, f64)> = None;
        for turn in turns {
            let ov = overlap(seg.start, seg.end, turn.start, turn.end);
            if ov <= 0.0 {
                continue;
            }
            match best {
                Some((_, best_ov)) if ov <= best_ov => {}
                _ => best = Some((turn, ov)),
            }
        }
        seg.speaker_id = Some(best.map(|(t, _)| t.speaker_id.clone()).unwrap_or_else(|| "UNKNOWN".to_string()));
    }
}

fn overlap(a_start: f64, a_end: f64, b_start: f64, b_end: f64) -> f64 {
    (a_end.min(b_end) - a_start.max(b_start)).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turn(id: &str, start: f64, end: f64) -> DiarizedTurn {
        DiarizedTurn { speaker_id: id.to_string(), start, end }
    }

    #[test]
    fn largest_overlap_wins() {
        let mut segments = vec![Segment::new(0.0, 2.0, "hej")];
        let turns = vec![turn("speaker_0", 0.0, 0.5), turn("speaker_1", 0.4, 2.0)];
        assign_speakers(&mut segments, &turns);
        assert_eq!(segments[0].speaker_id.as_deref(), Some("speaker_1"));
    }

    #[test]
    fn tie_goes_to_first_encountered() {
        let mut segments = vec![Segment::new(0.0, 1.0, "hej")];
        let turns = vec![turn("speaker_a", 0.0, 0.5), turn("speaker_b", 0.5, 1.0)];
        assign_speakers(&mut segments, &turns);
        assert_eq!(segments[0].speaker_id.as_deref(), Some("speaker_a"));
    }

    #[test]
    fn no_overlap_is_unknown() {
        let mut segments = vec![Segment::new(0.0, 1.0, "hej")];
        let turns = vec![turn("speaker_a", 5.0, 6.0)];
        assign_speakers(&mut segments, &turns);
        assert_eq!(segments[0].speaker_id.as_deref(), Some("UNKNOWN"));
    }
}

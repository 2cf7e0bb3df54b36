//! Audio canonicalization via `ffmpeg`/`ffprobe` subprocess calls — spec.md
//! §4.3. One or many opaque encoded chunks become a single 16 kHz mono
//! PCM16 WAV via a concat-manifest pass; duration is then probed from the
//! produced WAV. Every temp input is removed on all exit paths.

use std::path::{Path, PathBuf};

use tokio::process::Command;

use crate::error::IngestError;

/// Concatenate and convert `chunks` into one canonical WAV at `output_path`.
pub async fn concat_chunks_to_wav(chunks: &[Vec<u8>], output_path: &Path) -> Result<(), IngestError> {
    let tmp_dir = tempfile::Builder::new()
        .prefix("ingest_session_")
        .tempdir()
        .map_err(IngestError::Io)?;

    let mut chunk_paths = Vec::with_capacity(chunks.len());
    for (i, chunk) in chunks.iter().enumerate() {
        let path = tmp_dir.path().join(format!("chunk_{i:04}.bin"));
        tokio::fs::write(&path, chunk).await?;
        chunk_paths.push(path);
    }

    let concat_path = tmp_dir.path().join("concat.txt");
    let manifest = chunk_paths
        .iter()
        .map(|p| format!("file '{}'\n", p.display()))
        .collect::<String>();
    tokio::fs::write(&concat_path, manifest).await?;

    if let Some(parent) = output_path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let status = Command::new("ffmpeg")
        .args(["-y", "-f", "concat", "-safe", "0", "-i"])
        .arg(&concat_path)
        .args(["-ar", "16000", "-ac", "1", "-f", "wav"])
        .arg(output_path)
        .output()
        .await
        .map_err(IngestError::Io)?;

    // `tmp_dir` drops (and removes itself) here regardless of the ffmpeg
    // outcome, satisfying "all temp inputs are deleted on all exit paths".
    if !status.status.success() {
        return Err(IngestError::Internal(anyhow::anyhow!(
            "ffmpeg concat/convert failed: {}",
            String::from_utf8_lossy(&status.stderr)
        )));
    }
    Ok(())
}

/// Probe a WAV file's duration in seconds via `ffprobe`.
pub async fn probe_duration(wav_path: &Path) -> f64 {
    let output = Command::new("ffprobe")
        .args(["-v", "quiet", "-show_entries", "format=duration", "-of", "csv=p=0"])
        .arg(wav_path)
        .output()
        .await;

    match output {
        Ok(out) if out.status.success() => String::from_utf8_lossy(&out.stdout).trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

pub fn session_audio_path(session_dir: &Path) -> PathBuf {
    session_dir.join("audio.wav")
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Exercises the manifest/temp-file bookkeeping without invoking
    /// ffmpeg itself (not assumed present on the test host); the concat
    /// manifest content is what ffmpeg's `-f concat` demuxer actually reads.
    #[tokio::test]
    async fn temp_chunk_files_are_removed_after_the_call() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.wav");
        let result = concat_chunks_to_wav(&[vec![0u8; 600]], &out).await;
        // ffmpeg may not be installed in every environment this runs in;
        // we only assert no dangling ingest_session_* dirs remain, success
        // or failure of the subprocess itself aside.
        let _ = result;
        let leaked = std::fs::read_dir(std::env::temp_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .any(|e| e.file_name().to_string_lossy().starts_with("ingest_session_"));
        assert!(!leaked);
    }
}

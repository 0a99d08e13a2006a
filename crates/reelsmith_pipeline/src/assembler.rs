//! Final video assembly with ffmpeg.
//!
//! Each clip is first normalized to the same codecs (H.264 + AAC stereo at
//! 44.1 kHz), with the narration audio muxed in or a silent track added, so
//! the concat demuxer can join them without re-encoding.

use async_trait::async_trait;
use reelsmith_error::{MediaError, MediaErrorKind, ReelsmithResult};
use reelsmith_interface::{ClipInput, MediaAssembler};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tokio::process::Command;
use tracing::{debug, info, instrument, warn};

/// Bytes of stderr kept in error messages.
const STDERR_TAIL: usize = 2000;

/// [`MediaAssembler`] that shells out to an ffmpeg executable.
#[derive(Debug, Clone, derive_getters::Getters)]
pub struct FfmpegAssembler {
    ffmpeg: PathBuf,
}

impl FfmpegAssembler {
    /// Use the given ffmpeg executable (a bare name is looked up on `PATH`).
    pub fn new(ffmpeg: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
        }
    }

    fn tool_name(&self) -> String {
        self.ffmpeg.display().to_string()
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.ffmpeg);
        command
            .arg("-y")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }

    async fn run(&self, mut command: Command) -> ReelsmithResult<()> {
        debug!(command = ?command.as_std(), "Running media tool");
        let output = command.output().await.map_err(|e| {
            MediaError::new(MediaErrorKind::Launch {
                tool: self.tool_name(),
                message: e.to_string(),
            })
        })?;

        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        let tail_start = stderr
            .char_indices()
            .rev()
            .nth(STDERR_TAIL)
            .map_or(0, |(i, _)| i);
        warn!(status = %output.status, "Media tool failed");
        Err(MediaError::new(MediaErrorKind::ToolFailed {
            tool: self.tool_name(),
            status: output.status.to_string(),
            stderr: stderr[tail_start..].trim().to_string(),
        })
        .into())
    }

    /// Re-encode one clip to the common format, laying `audio` over it.
    async fn normalize_clip(&self, clip: &ClipInput, output: &Path) -> ReelsmithResult<()> {
        let mut command = self.command();
        command.arg("-i").arg(&clip.video);
        match &clip.audio {
            Some(audio) => {
                // Hold the last frame so the full narration is kept.
                command.arg("-i").arg(audio).args([
                    "-filter_complex",
                    "[0:v]tpad=stop_mode=clone:stop=-1[v]",
                    "-map",
                    "[v]",
                    "-map",
                    "1:a",
                    "-shortest",
                ]);
            }
            None => {
                command.args([
                    "-f",
                    "lavfi",
                    "-i",
                    "anullsrc=channel_layout=stereo:sample_rate=44100",
                    "-map",
                    "0:v",
                    "-map",
                    "1:a",
                    "-shortest",
                ]);
            }
        }
        command
            .args([
                "-c:v", "libx264", "-pix_fmt", "yuv420p", "-r", "24", "-c:a", "aac", "-ar",
                "44100", "-ac", "2",
            ])
            .arg(output);
        self.run(command).await
    }
}

impl Default for FfmpegAssembler {
    fn default() -> Self {
        Self::new("ffmpeg")
    }
}

/// Line for the concat demuxer list; single quotes are escaped as `'\''`.
fn concat_entry(path: &Path) -> String {
    format!("file '{}'\n", path.display().to_string().replace('\'', "'\\''"))
}

/// Scratch directory removed on drop.
struct ScratchDir(PathBuf);

impl ScratchDir {
    async fn create() -> ReelsmithResult<Self> {
        let path = std::env::temp_dir().join(format!("reelsmith-assemble-{}", uuid::Uuid::new_v4()));
        tokio::fs::create_dir_all(&path)
            .await
            .map_err(|e| MediaError::new(MediaErrorKind::Io(e.to_string())))?;
        Ok(Self(path))
    }
}

impl Drop for ScratchDir {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_dir_all(&self.0) {
            debug!(path = %self.0.display(), error = %e, "Scratch cleanup failed");
        }
    }
}

#[async_trait]
impl MediaAssembler for FfmpegAssembler {
    #[instrument(skip(self, clips), fields(clips = clips.len()))]
    async fn assemble(&self, clips: &[ClipInput]) -> ReelsmithResult<Vec<u8>> {
        if clips.is_empty() {
            return Err(MediaError::new(MediaErrorKind::NoClips).into());
        }
        let scratch = ScratchDir::create().await?;

        let mut list = String::new();
        for (i, clip) in clips.iter().enumerate() {
            let normalized = scratch.0.join(format!("clip_{:04}.mp4", i));
            self.normalize_clip(clip, &normalized).await?;
            list.push_str(&concat_entry(&normalized));
        }

        let list_path = scratch.0.join("concat.txt");
        tokio::fs::write(&list_path, list)
            .await
            .map_err(|e| MediaError::new(MediaErrorKind::Io(e.to_string())))?;

        let output = scratch.0.join("final.mp4");
        let mut command = self.command();
        command
            .args(["-f", "concat", "-safe", "0", "-i"])
            .arg(&list_path)
            .args(["-c", "copy", "-movflags", "+faststart"])
            .arg(&output);
        self.run(command).await?;

        let bytes = tokio::fs::read(&output)
            .await
            .map_err(|e| MediaError::new(MediaErrorKind::Io(e.to_string())))?;
        info!(bytes = bytes.len(), "Assembled final video");
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_entry_escapes_quotes() {
        assert_eq!(
            concat_entry(Path::new("/tmp/it's.mp4")),
            "file '/tmp/it'\\''s.mp4'\n"
        );
    }

    #[tokio::test]
    async fn test_empty_clip_list_rejected() {
        let err = FfmpegAssembler::default().assemble(&[]).await.unwrap_err();
        assert!(err.to_string().contains("No clips"));
    }

    #[tokio::test]
    async fn test_missing_tool_is_launch_error() {
        let assembler = FfmpegAssembler::new("/nonexistent/reelsmith-ffmpeg");
        let err = assembler
            .assemble(&[ClipInput {
                video: PathBuf::from("/nonexistent/clip.mp4"),
                audio: None,
            }])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to launch"));
    }
}

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::Context as _;

use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::process::run_with_timeout;
use crate::media::probe::{MediaKind, MediaProber};

/// How a video and narration track are reconciled.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum MuxPlan {
    /// Audio outlasts video: re-encode, cloning the last frame for `gap_seconds`.
    FrameHold {
        /// `audio - video`, always positive.
        gap_seconds: f64,
    },
    /// Video is at least as long as audio: copy the video stream, stop at the shorter track.
    StreamCopy,
}

impl MuxPlan {
    /// Choose a plan from measured durations.
    pub fn for_durations(video_seconds: f64, audio_seconds: f64) -> Self {
        if audio_seconds > video_seconds {
            Self::FrameHold {
                gap_seconds: audio_seconds - video_seconds,
            }
        } else {
            Self::StreamCopy
        }
    }

    /// `ffmpeg` arguments muxing `video` and `audio` into `out` under this plan.
    pub fn ffmpeg_args(&self, video: &Path, audio: &Path, out: &Path) -> Vec<OsString> {
        let mut args: Vec<OsString> = ["-y", "-v", "error", "-i"]
            .into_iter()
            .map(OsString::from)
            .collect();
        args.push(video.into());
        args.push("-i".into());
        args.push(audio.into());

        let tail: Vec<String> = match *self {
            Self::FrameHold { gap_seconds } => vec![
                "-filter_complex".to_string(),
                format!("[0:v]tpad=stop_mode=clone:stop_duration={gap_seconds:.3}[v]"),
                "-map".to_string(),
                "[v]".to_string(),
                "-map".to_string(),
                "1:a".to_string(),
                "-c:v".to_string(),
                "libx264".to_string(),
                "-pix_fmt".to_string(),
                "yuv420p".to_string(),
                "-c:a".to_string(),
                "aac".to_string(),
                "-movflags".to_string(),
                "+faststart".to_string(),
            ],
            Self::StreamCopy => [
                "-map", "0:v", "-map", "1:a", "-c:v", "copy", "-c:a", "aac", "-shortest",
                "-movflags", "+faststart",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        };
        args.extend(tail.into_iter().map(OsString::from));
        args.push(out.into());
        args
    }
}

/// Combines a silent rendered video with narration audio.
#[derive(Clone, Debug)]
pub struct Muxer {
    ffmpeg_bin: String,
    timeout: Duration,
    prober: MediaProber,
}

impl Muxer {
    /// Muxer using `ffmpeg_bin` bounded by `timeout`, measuring inputs with `prober`.
    pub fn new(ffmpeg_bin: impl Into<String>, timeout: Duration, prober: MediaProber) -> Self {
        Self {
            ffmpeg_bin: ffmpeg_bin.into(),
            timeout,
            prober,
        }
    }

    /// Muxer configured from `cfg`.
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(
            cfg.ffmpeg_bin.clone(),
            cfg.mux_timeout(),
            MediaProber::from_config(cfg),
        )
    }

    /// Replace the silent `video` with a version carrying `audio`, returning its path.
    ///
    /// Never fails: on any error the original video is left untouched and its path returned.
    #[tracing::instrument(skip(self, video, audio), fields(video = %video.display(), audio = %audio.display()))]
    pub fn combine(&self, video: &Path, audio: &Path) -> PathBuf {
        match self.try_combine(video, audio) {
            Ok(path) => path,
            Err(e) => {
                tracing::warn!("mux failed, keeping silent video: {e}");
                video.to_path_buf()
            }
        }
    }

    /// Fallible core of [`combine`](Self::combine).
    pub fn try_combine(&self, video: &Path, audio: &Path) -> SceneResult<PathBuf> {
        if !video.is_file() {
            return Err(SceneError::mux(format!(
                "video '{}' does not exist",
                video.display()
            )));
        }
        if !audio.is_file() {
            return Err(SceneError::mux(format!(
                "audio '{}' does not exist",
                audio.display()
            )));
        }

        let video_seconds = self.prober.duration(video, MediaKind::Video);
        let audio_seconds = self.prober.duration(audio, MediaKind::Audio);
        let plan = MuxPlan::for_durations(video_seconds, audio_seconds);
        tracing::debug!(video_seconds, audio_seconds, ?plan, "mux plan selected");

        let staged = staging_path(video)?;
        let mut cmd = Command::new(&self.ffmpeg_bin);
        cmd.args(plan.ffmpeg_args(video, audio, &staged));

        let result = run_with_timeout(&mut cmd, self.timeout)
            .and_then(|out| out.into_success())
            .map_err(|e| SceneError::mux(format!("ffmpeg did not produce output: {e}")))
            .and_then(|_| {
                if staged.is_file() {
                    Ok(())
                } else {
                    Err(SceneError::mux("ffmpeg exited cleanly but wrote no file"))
                }
            });
        if let Err(e) = result {
            let _ = std::fs::remove_file(&staged);
            return Err(e);
        }

        std::fs::rename(&staged, video)
            .with_context(|| {
                format!(
                    "failed to move '{}' over '{}'",
                    staged.display(),
                    video.display()
                )
            })
            .inspect_err(|_| {
                let _ = std::fs::remove_file(&staged);
            })?;

        tracing::info!(video = %video.display(), ?plan, "narration muxed");
        Ok(video.to_path_buf())
    }
}

/// `<dir>/<stem>_with_audio.<ext>` next to `video`.
fn staging_path(video: &Path) -> SceneResult<PathBuf> {
    let stem = video
        .file_stem()
        .ok_or_else(|| SceneError::mux(format!("video path '{}' has no file name", video.display())))?;
    let mut name = stem.to_os_string();
    name.push("_with_audio");
    if let Some(ext) = video.extension() {
        name.push(".");
        name.push(ext);
    }
    Ok(video.with_file_name(name))
}

#[cfg(test)]
#[path = "../../tests/unit/media/mux.rs"]
mod tests;

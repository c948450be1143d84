use std::path::Path;
use std::process::Command;
use std::time::Duration;

use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::process::run_with_timeout;

/// Which fallback applies when a duration cannot be measured.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MediaKind {
    /// Rendered animation.
    Video,
    /// Synthesized narration.
    Audio,
}

/// A media file with its measured (or assumed) duration.
#[derive(Clone, Debug, PartialEq)]
pub struct MediaArtifact {
    /// Location on disk.
    pub path: std::path::PathBuf,
    /// Container duration in seconds.
    pub duration_seconds: f64,
}

/// Measures container durations with `ffprobe`.
#[derive(Clone, Debug)]
pub struct MediaProber {
    ffprobe_bin: String,
    timeout: Duration,
    fallback_video: f64,
    fallback_audio: f64,
}

impl MediaProber {
    /// Prober using `ffprobe_bin`, bounded by `timeout`, with per-kind fallbacks in seconds.
    pub fn new(
        ffprobe_bin: impl Into<String>,
        timeout: Duration,
        fallback_video: f64,
        fallback_audio: f64,
    ) -> Self {
        Self {
            ffprobe_bin: ffprobe_bin.into(),
            timeout,
            fallback_video,
            fallback_audio,
        }
    }

    /// Prober configured from `cfg`.
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(
            cfg.ffprobe_bin.clone(),
            cfg.probe_timeout(),
            cfg.fallback_video_duration_secs,
            cfg.fallback_audio_duration_secs,
        )
    }

    /// Duration assumed for `kind` when probing fails.
    pub fn fallback(&self, kind: MediaKind) -> f64 {
        match kind {
            MediaKind::Video => self.fallback_video,
            MediaKind::Audio => self.fallback_audio,
        }
    }

    /// Duration of `path` in seconds; never fails.
    ///
    /// Any probe failure (missing tool, timeout, non-zero exit, unparsable output) yields the
    /// fallback for `kind`.
    pub fn duration(&self, path: &Path, kind: MediaKind) -> f64 {
        match self.try_duration(path) {
            Ok(d) => d,
            Err(e) => {
                let fallback = self.fallback(kind);
                tracing::warn!(path = %path.display(), ?kind, fallback, "duration probe failed: {e}");
                fallback
            }
        }
    }

    /// Measure `path` and pair it with its duration.
    pub fn artifact(&self, path: &Path, kind: MediaKind) -> MediaArtifact {
        MediaArtifact {
            path: path.to_path_buf(),
            duration_seconds: self.duration(path, kind),
        }
    }

    /// Duration of `path` in seconds, or [`SceneError::Probe`].
    pub fn try_duration(&self, path: &Path) -> SceneResult<f64> {
        let mut cmd = Command::new(&self.ffprobe_bin);
        cmd.args([
            "-v",
            "quiet",
            "-show_entries",
            "format=duration",
            "-of",
            "csv=p=0",
        ])
        .arg(path);

        let out = run_with_timeout(&mut cmd, self.timeout)
            .map_err(|e| SceneError::probe(format!("ffprobe did not complete: {e}")))?;
        if !out.status.success() {
            return Err(SceneError::probe(format!(
                "ffprobe exited with status {} for '{}'",
                out.status,
                path.display()
            )));
        }
        parse_duration(&out.stdout_lossy())
    }
}

/// Parse `ffprobe` csv duration output (a single number, possibly with trailing newline).
pub fn parse_duration(raw: &str) -> SceneResult<f64> {
    let line = raw.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    let value = line
        .parse::<f64>()
        .map_err(|e| SceneError::probe(format!("unparsable duration '{line}': {e}")))?;
    if !value.is_finite() || value < 0.0 {
        return Err(SceneError::probe(format!("implausible duration {value}")));
    }
    Ok(value)
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;

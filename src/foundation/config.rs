use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{SceneError, SceneResult};

/// Pipeline configuration, fixed at startup.
///
/// Every field has a default, so a TOML file only needs to name what it changes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Renderer media root. Stable across calls; the renderer owns its layout.
    pub output_dir: PathBuf,
    /// Renderer executable.
    pub renderer_bin: String,
    /// Arguments placed before the script path (e.g. `["-m", "manim"]` for `python`).
    pub renderer_args: Vec<String>,
    /// `ffmpeg` executable used for muxing.
    pub ffmpeg_bin: String,
    /// `ffprobe` executable used for duration measurement.
    pub ffprobe_bin: String,
    /// Quality flag passed to the renderer.
    pub quality: String,
    /// Output container extension requested from the renderer.
    pub video_format: String,
    /// File stem of the temporary script; the renderer names its output directory after it.
    pub script_stem: String,
    /// Quality-tier directories probed for the artifact, lowest fidelity first.
    pub quality_tiers: Vec<String>,
    /// Longest animation the renderer is expected to produce.
    pub max_video_duration_secs: u64,
    /// Fixed buffer added to `max_video_duration_secs` to form the render timeout.
    pub processing_overhead_secs: u64,
    /// Upper bound for a single `ffprobe` call.
    pub probe_timeout_secs: u64,
    /// Upper bound for a single `ffmpeg` mux call.
    pub mux_timeout_secs: u64,
    /// Duration assumed for a video that cannot be probed.
    pub fallback_video_duration_secs: f64,
    /// Duration assumed for an audio file that cannot be probed.
    pub fallback_audio_duration_secs: f64,
    /// Scene class name used when the source declares none.
    pub default_scene_name: String,
    /// Artifacts older than this are removed by the retention sweep.
    pub retention_max_age_hours: u64,
    /// Kick off a background sweep after every successful render.
    pub sweep_after_render: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("./output"),
            renderer_bin: "manim".to_string(),
            renderer_args: Vec::new(),
            ffmpeg_bin: "ffmpeg".to_string(),
            ffprobe_bin: "ffprobe".to_string(),
            quality: "l".to_string(),
            video_format: "mp4".to_string(),
            script_stem: "animation".to_string(),
            quality_tiers: vec![
                "480p15".to_string(),
                "720p30".to_string(),
                "1080p60".to_string(),
            ],
            max_video_duration_secs: 300,
            processing_overhead_secs: 60,
            probe_timeout_secs: 30,
            mux_timeout_secs: 300,
            fallback_video_duration_secs: 30.0,
            fallback_audio_duration_secs: 10.0,
            default_scene_name: "Explanation".to_string(),
            retention_max_age_hours: 24,
            sweep_after_render: true,
        }
    }
}

impl PipelineConfig {
    /// Parse a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(s: &str) -> SceneResult<Self> {
        toml::from_str(s).map_err(|e| SceneError::validation(format!("invalid config: {e}")))
    }

    /// Read and parse a TOML config file.
    pub fn load(path: &Path) -> SceneResult<Self> {
        let s = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config '{}'", path.display()))?;
        let cfg = Self::from_toml_str(&s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env_overrides(&mut self) -> SceneResult<()> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary key lookup.
    ///
    /// Recognised keys: `MANIM_OUTPUT_DIR`, `MAX_VIDEO_DURATION`, `SCENECAST_RENDERER`,
    /// `SCENECAST_FFMPEG`, `SCENECAST_FFPROBE`, `SCENECAST_RETENTION_HOURS`.
    pub fn apply_overrides_from(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> SceneResult<()> {
        if let Some(v) = lookup("MANIM_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("MAX_VIDEO_DURATION") {
            self.max_video_duration_secs = parse_u64("MAX_VIDEO_DURATION", &v)?;
        }
        if let Some(v) = lookup("SCENECAST_RENDERER") {
            self.renderer_bin = v;
        }
        if let Some(v) = lookup("SCENECAST_FFMPEG") {
            self.ffmpeg_bin = v;
        }
        if let Some(v) = lookup("SCENECAST_FFPROBE") {
            self.ffprobe_bin = v;
        }
        if let Some(v) = lookup("SCENECAST_RETENTION_HOURS") {
            self.retention_max_age_hours = parse_u64("SCENECAST_RETENTION_HOURS", &v)?;
        }
        Ok(())
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> SceneResult<()> {
        if self.quality_tiers.is_empty() {
            return Err(SceneError::validation(
                "quality_tiers must name at least one tier directory",
            ));
        }
        for (name, value) in [
            ("renderer_bin", &self.renderer_bin),
            ("ffmpeg_bin", &self.ffmpeg_bin),
            ("ffprobe_bin", &self.ffprobe_bin),
            ("video_format", &self.video_format),
            ("script_stem", &self.script_stem),
            ("default_scene_name", &self.default_scene_name),
        ] {
            if value.trim().is_empty() {
                return Err(SceneError::validation(format!("{name} must be non-empty")));
            }
        }
        if self.render_timeout().is_zero() {
            return Err(SceneError::validation("render timeout must be non-zero"));
        }
        if self.probe_timeout_secs == 0 || self.mux_timeout_secs == 0 {
            return Err(SceneError::validation(
                "probe and mux timeouts must be non-zero",
            ));
        }
        if !(self.fallback_video_duration_secs > 0.0 && self.fallback_audio_duration_secs > 0.0) {
            return Err(SceneError::validation(
                "fallback durations must be positive",
            ));
        }
        Ok(())
    }

    /// Wall-clock limit for one renderer invocation.
    pub fn render_timeout(&self) -> Duration {
        Duration::from_secs(
            self.max_video_duration_secs
                .saturating_add(self.processing_overhead_secs),
        )
    }

    /// Wall-clock limit for one `ffprobe` invocation.
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Wall-clock limit for one `ffmpeg` mux invocation.
    pub fn mux_timeout(&self) -> Duration {
        Duration::from_secs(self.mux_timeout_secs)
    }

    /// Retention threshold as a [`Duration`].
    pub fn retention_max_age(&self) -> Duration {
        Duration::from_secs(self.retention_max_age_hours.saturating_mul(3600))
    }

    /// Directory under which the renderer writes per-tier output for our script.
    pub fn artifact_root(&self) -> PathBuf {
        self.output_dir.join("videos").join(&self.script_stem)
    }
}

fn parse_u64(key: &str, value: &str) -> SceneResult<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|e| SceneError::validation(format!("{key}='{value}' is not a whole number: {e}")))
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/config.rs"]
mod tests;

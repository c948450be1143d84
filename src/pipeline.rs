use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::config::PipelineConfig;
use crate::foundation::error::SceneResult;
use crate::media::mux::Muxer;
use crate::media::probe::{MediaKind, MediaProber};
use crate::render::driver::{RenderDriver, RenderResult};
use crate::retention::sweep::{SweepReport, spawn_sweep, sweep};
use crate::scene::naming::{rename_class, select_scene_name, uniquify};
use crate::scene::validate::{ValidationReport, validate};

/// Caller input for one render.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRequest {
    /// Generated scene source.
    pub source_code: String,
    /// Scene class to render when the source declares several.
    pub requested_scene_name: Option<String>,
}

impl RenderRequest {
    /// Request for `source_code` with no name hint.
    pub fn new(source_code: impl Into<String>) -> Self {
        Self {
            source_code: source_code.into(),
            requested_scene_name: None,
        }
    }

    /// Attach a scene name hint.
    pub fn with_scene_name(mut self, name: impl Into<String>) -> Self {
        self.requested_scene_name = Some(name.into());
        self
    }
}

/// Validate, name, render, locate, measure and optionally narrate a scene.
///
/// 1. [`validate`] rejects structurally broken source.
/// 2. [`select_scene_name`] + [`uniquify`] + [`rename_class`] give the run a unique scene name
///    that the executed source declares.
/// 3. [`RenderDriver::render`] runs the renderer and locates its artifact.
/// 4. [`Muxer::combine`] attaches narration when audio is supplied.
#[derive(Clone, Debug)]
pub struct ScenePipeline {
    cfg: PipelineConfig,
    driver: RenderDriver,
    prober: MediaProber,
    muxer: Muxer,
}

impl ScenePipeline {
    /// Build a pipeline after validating `cfg`.
    pub fn new(cfg: PipelineConfig) -> SceneResult<Self> {
        cfg.validate()?;
        Ok(Self {
            driver: RenderDriver::from_config(&cfg),
            prober: MediaProber::from_config(&cfg),
            muxer: Muxer::from_config(&cfg),
            cfg,
        })
    }

    /// Replace the render driver (e.g. to tighten its timeout).
    pub fn with_driver(mut self, driver: RenderDriver) -> Self {
        self.driver = driver;
        self
    }

    /// Active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.cfg
    }

    /// Static pre-flight check; see [`validate`].
    pub fn validate(&self, source: &str) -> ValidationReport {
        validate(source)
    }

    /// Render a scene to a silent video.
    pub fn render(&self, request: &RenderRequest) -> SceneResult<RenderResult> {
        validate(&request.source_code).into_result()?;

        let selected = select_scene_name(
            &request.source_code,
            request.requested_scene_name.as_deref(),
            &self.cfg.default_scene_name,
        );
        let scene = uniquify(selected);
        let source = rename_class(&request.source_code, &scene.declared, &scene.unique);
        tracing::debug!(declared = %scene.declared, unique = %scene.unique, "scene named");

        let result = self.driver.render(&source, &scene)?;

        if self.cfg.sweep_after_render {
            spawn_sweep(self.cfg.output_dir.clone(), self.cfg.retention_max_age());
        }
        Ok(result)
    }

    /// Render a scene and, when `audio` is given, mux it in and re-measure the result.
    pub fn render_narrated(
        &self,
        request: &RenderRequest,
        audio: Option<&Path>,
    ) -> SceneResult<RenderResult> {
        let rendered = self.render(request)?;
        let Some(audio) = audio else {
            return Ok(rendered);
        };

        let video_path = self.combine(&rendered.video_path, audio);
        let file_size_bytes = std::fs::metadata(&video_path)
            .map(|m| m.len())
            .unwrap_or(rendered.file_size_bytes);
        let duration_seconds = self.prober.duration(&video_path, MediaKind::Video);
        Ok(RenderResult {
            video_path,
            duration_seconds,
            file_size_bytes,
        })
    }

    /// Attach `audio` to `video`; see [`Muxer::combine`].
    pub fn combine(&self, video: &Path, audio: &Path) -> PathBuf {
        self.muxer.combine(video, audio)
    }

    /// Synchronously delete artifacts older than `max_age_hours`.
    pub fn sweep(&self, max_age_hours: u64) -> SweepReport {
        sweep(
            &self.cfg.output_dir,
            std::time::Duration::from_secs(max_age_hours.saturating_mul(3600)),
        )
    }

    /// Start a detached sweep using the configured retention.
    pub fn spawn_sweep(&self) {
        spawn_sweep(self.cfg.output_dir.clone(), self.cfg.retention_max_age());
    }

    /// `result.video_path` relative to the output root, as served to clients.
    pub fn relative_video_path(&self, result: &RenderResult) -> Option<PathBuf> {
        result
            .video_path
            .strip_prefix(&self.cfg.output_dir)
            .ok()
            .map(Path::to_path_buf)
    }
}

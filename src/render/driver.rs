use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;

use anyhow::Context as _;
use serde::Serialize;

use crate::foundation::config::PipelineConfig;
use crate::foundation::error::{SceneError, SceneResult};
use crate::foundation::process::run_with_timeout;
use crate::media::probe::{MediaKind, MediaProber};
use crate::render::locate::ArtifactLocator;
use crate::scene::naming::SceneIdentifier;

/// A rendered video handed back to the caller.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RenderResult {
    /// Location of the artifact inside the output tree.
    pub video_path: PathBuf,
    /// Measured (or fallback) duration.
    pub duration_seconds: f64,
    /// Size on disk.
    pub file_size_bytes: u64,
}

/// Runs the external renderer on scene source and collects its artifact.
#[derive(Clone, Debug)]
pub struct RenderDriver {
    renderer_bin: String,
    renderer_args: Vec<String>,
    output_dir: PathBuf,
    quality: String,
    video_format: String,
    script_stem: String,
    timeout: Duration,
    locator: ArtifactLocator,
    prober: MediaProber,
}

impl RenderDriver {
    /// Driver configured from `cfg`.
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self {
            renderer_bin: cfg.renderer_bin.clone(),
            renderer_args: cfg.renderer_args.clone(),
            output_dir: cfg.output_dir.clone(),
            quality: cfg.quality.clone(),
            video_format: cfg.video_format.clone(),
            script_stem: cfg.script_stem.clone(),
            timeout: cfg.render_timeout(),
            locator: ArtifactLocator::from_config(cfg),
            prober: MediaProber::from_config(cfg),
        }
    }

    /// Override the wall-clock limit.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Wall-clock limit applied to each render.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// The locator used after a successful exit.
    pub fn locator(&self) -> &ArtifactLocator {
        &self.locator
    }

    /// Render `source`, whose scene class must already be named `scene.unique`.
    ///
    /// The source is written to a private temporary directory that is removed when this call
    /// returns, whatever the outcome.
    #[tracing::instrument(skip(self, source, scene), fields(scene = %scene))]
    pub fn render(&self, source: &str, scene: &SceneIdentifier) -> SceneResult<RenderResult> {
        std::fs::create_dir_all(&self.output_dir).with_context(|| {
            format!(
                "failed to create output directory '{}'",
                self.output_dir.display()
            )
        })?;

        let workdir = tempfile::Builder::new()
            .prefix("scenecast-")
            .tempdir()
            .context("failed to create temporary render directory")?;
        let script = workdir.path().join(format!("{}.py", self.script_stem));
        std::fs::write(&script, source)
            .with_context(|| format!("failed to write scene source '{}'", script.display()))?;

        let mut cmd = self.command(&script, scene.as_str());
        let out = run_with_timeout(&mut cmd, self.timeout)?;
        if !out.status.success() {
            tracing::warn!(status = %out.status, "renderer failed");
            return Err(out.into_failure());
        }
        drop(workdir);

        let video_path = self.locator.find(scene.as_str()).ok_or_else(|| {
            SceneError::ArtifactMissing {
                scene: scene.unique.clone(),
                searched: self.locator.candidates(scene.as_str()),
            }
        })?;
        let file_size_bytes = std::fs::metadata(&video_path)
            .with_context(|| format!("failed to stat '{}'", video_path.display()))?
            .len();
        let duration_seconds = self.prober.duration(&video_path, MediaKind::Video);

        tracing::info!(
            path = %video_path.display(),
            duration_seconds,
            file_size_bytes,
            elapsed_ms = out.elapsed.as_millis() as u64,
            "scene rendered"
        );
        Ok(RenderResult {
            video_path,
            duration_seconds,
            file_size_bytes,
        })
    }

    /// The renderer invocation for `script` and `scene`.
    pub fn command(&self, script: &Path, scene: &str) -> Command {
        let mut cmd = Command::new(&self.renderer_bin);
        cmd.args(&self.renderer_args)
            .arg(script)
            .arg(scene)
            .args(["--format", &self.video_format])
            .arg("--media_dir")
            .arg(&self.output_dir)
            .args(["--quality", &self.quality])
            .arg("--disable_caching");
        cmd
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/driver.rs"]
mod tests;

use std::path::{Path, PathBuf};

use crate::foundation::config::PipelineConfig;

/// Finds rendered videos inside the renderer-owned output tree.
///
/// The renderer writes `<root>/<tier>/<scene>.<ext>`, where the tier directory name depends on
/// the requested quality and the renderer version. Tiers are probed in configured order.
#[derive(Clone, Debug)]
pub struct ArtifactLocator {
    root: PathBuf,
    tiers: Vec<String>,
    extension: String,
}

impl ArtifactLocator {
    /// Locator over `root` probing `tiers` in order for `<scene>.<extension>`.
    pub fn new(root: impl Into<PathBuf>, tiers: Vec<String>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            tiers,
            extension: extension.into(),
        }
    }

    /// Locator matching the layout implied by `cfg`.
    pub fn from_config(cfg: &PipelineConfig) -> Self {
        Self::new(
            cfg.artifact_root(),
            cfg.quality_tiers.clone(),
            cfg.video_format.clone(),
        )
    }

    /// Directory the tiers live under.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Every path [`find`](Self::find) would probe for `scene`, in priority order.
    pub fn candidates(&self, scene: &str) -> Vec<PathBuf> {
        let file_name = format!("{scene}.{}", self.extension);
        self.tiers
            .iter()
            .map(|tier| self.root.join(tier).join(&file_name))
            .collect()
    }

    /// First candidate that exists as a regular file.
    pub fn find(&self, scene: &str) -> Option<PathBuf> {
        let found = self.candidates(scene).into_iter().find(|p| p.is_file());
        match &found {
            Some(path) => tracing::debug!(scene, path = %path.display(), "artifact located"),
            None => tracing::debug!(scene, root = %self.root.display(), "no artifact in any tier"),
        }
        found
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/locate.rs"]
mod tests;

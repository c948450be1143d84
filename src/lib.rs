//! scenecast turns generated animation source into a narrated video.
//!
//! The crate owns the part of the system with real process and timing concerns:
//!
//! 1. **Validate**: static checks that the source parses and declares a scene
//! 2. **Name**: give the scene a process-unique identifier and rewrite the source to match
//! 3. **Render**: run the external renderer with a hard timeout, then locate its artifact
//! 4. **Measure**: read durations with `ffprobe`, falling back to defaults on failure
//! 5. **Mux**: combine video and narration with `ffmpeg`, holding the last frame when the
//!    narration runs longer
//! 6. **Sweep**: remove old artifacts from the output tree
//!
//! Every external tool is reached through [`foundation::process::run_with_timeout`], so exit
//! codes and stream contents become [`SceneError`] values at that boundary.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

/// Errors, configuration and process execution.
pub mod foundation;
/// Media probing and muxing.
pub mod media;
/// Orchestration of the full render flow.
pub mod pipeline;
/// Renderer driver and artifact locator.
pub mod render;
/// Artifact retention.
pub mod retention;
/// Scene source validation and naming.
pub mod scene;

pub use crate::foundation::config::PipelineConfig;
pub use crate::foundation::error::{ErrorKind, SceneError, SceneResult};
pub use crate::foundation::process::{ProcessOutput, is_on_path, run_with_timeout};
pub use crate::media::mux::{MuxPlan, Muxer};
pub use crate::media::probe::{MediaArtifact, MediaKind, MediaProber, parse_duration};
pub use crate::pipeline::{RenderRequest, ScenePipeline};
pub use crate::render::driver::{RenderDriver, RenderResult};
pub use crate::render::locate::ArtifactLocator;
pub use crate::retention::sweep::{SweepReport, spawn_sweep, sweep};
pub use crate::scene::naming::{
    SceneIdentifier, declared_scene_name, declared_scene_names, extract_and_uniquify,
    extract_scene_name, rename_class, rewrite_scene_name, select_scene_name, uniquify,
};
pub use crate::scene::validate::{CodeIssue, ValidationReport, validate};

use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

/// Convenience result type used across scenecast.
pub type SceneResult<T> = Result<T, SceneError>;

/// Top-level error taxonomy for the render and sync pipeline.
#[derive(thiserror::Error, Debug)]
pub enum SceneError {
    /// Source code is malformed or structurally incomplete.
    #[error("validation error: {0}")]
    Validation(String),

    /// The external process exceeded its wall-clock budget and was killed.
    #[error("render timeout: process exceeded {}s and was killed", limit.as_secs_f64())]
    Timeout {
        /// Budget that was exceeded.
        limit: Duration,
    },

    /// The external process exited unsuccessfully.
    #[error("render process failed with {status}: {}", failure_detail(stdout, stderr))]
    ProcessFailure {
        /// Exit status reported by the child.
        status: ExitStatus,
        /// Captured standard output, verbatim.
        stdout: String,
        /// Captured standard error, verbatim.
        stderr: String,
    },

    /// The renderer exited cleanly but no artifact exists under any candidate path.
    #[error("artifact missing: no output for scene '{scene}' (searched {})", list_paths(searched))]
    ArtifactMissing {
        /// Scene identifier that was searched for.
        scene: String,
        /// Every candidate path that was probed, in order.
        searched: Vec<PathBuf>,
    },

    /// Media duration could not be measured.
    #[error("probe error: {0}")]
    Probe(String),

    /// Audio/video muxing failed.
    #[error("mux error: {0}")]
    Mux(String),

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Discriminant of a [`SceneError`], for callers that map failures to responses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`SceneError::Validation`].
    Validation,
    /// See [`SceneError::Timeout`].
    Timeout,
    /// See [`SceneError::ProcessFailure`].
    ProcessFailure,
    /// See [`SceneError::ArtifactMissing`].
    ArtifactMissing,
    /// See [`SceneError::Probe`].
    Probe,
    /// See [`SceneError::Mux`].
    Mux,
    /// See [`SceneError::Other`].
    Other,
}

impl SceneError {
    /// Build a [`SceneError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`SceneError::Probe`] value.
    pub fn probe(msg: impl Into<String>) -> Self {
        Self::Probe(msg.into())
    }

    /// Build a [`SceneError::Mux`] value.
    pub fn mux(msg: impl Into<String>) -> Self {
        Self::Mux(msg.into())
    }

    /// The discriminant of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::ProcessFailure { .. } => ErrorKind::ProcessFailure,
            Self::ArtifactMissing { .. } => ErrorKind::ArtifactMissing,
            Self::Probe(_) => ErrorKind::Probe,
            Self::Mux(_) => ErrorKind::Mux,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Whether re-running the same request may plausibly succeed.
    ///
    /// Only timeouts qualify. Process failures carry diagnostics that a caller has to
    /// inspect; they are not classified here.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

fn failure_detail(stdout: &str, stderr: &str) -> String {
    let stdout = stdout.trim();
    let stderr = stderr.trim();
    match (stdout.is_empty(), stderr.is_empty()) {
        (true, true) => "no diagnostics captured".to_string(),
        (true, false) => format!("stderr: {stderr}"),
        (false, true) => format!("stdout: {stdout}"),
        (false, false) => format!("stderr: {stderr}; stdout: {stdout}"),
    }
}

fn list_paths(paths: &[PathBuf]) -> String {
    if paths.is_empty() {
        return "nothing".to_string();
    }
    paths
        .iter()
        .map(|p| format!("'{}'", p.display()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;

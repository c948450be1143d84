use std::sync::LazyLock;

use regex::Regex;
use rustpython_parser::{Mode, parse};
use serde::Serialize;

use crate::foundation::error::{SceneError, SceneResult};
use crate::scene::naming::declared_scene_name;

static LIBRARY_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?m)^[ \t]*(from[ \t]+manim(\.\w+)*[ \t]+import\b|import[ \t]+([\w.]+([ \t]+as[ \t]+\w+)?[ \t]*,[ \t]*)*manim\b)",
    )
    .expect("library import pattern is valid")
});

static CONSTRUCT_METHOD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bdef\s+construct\s*\(").expect("construct pattern is valid")
});

/// A specific reason scene source was rejected.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "issue", content = "detail", rename_all = "snake_case")]
pub enum CodeIssue {
    /// The source does not parse; carries the parser diagnostic.
    Syntax(String),
    /// No import of the animation library.
    MissingImport,
    /// No class deriving from the library's scene type.
    MissingSceneClass,
    /// No `construct` entry-point method.
    MissingConstruct,
}

impl CodeIssue {
    /// Human-readable message, distinct per issue.
    pub fn message(&self) -> String {
        match self {
            Self::Syntax(diag) => format!("Syntax error: {diag}"),
            Self::MissingImport => "Missing Manim import".to_string(),
            Self::MissingSceneClass => "Missing Scene class definition".to_string(),
            Self::MissingConstruct => "Missing construct method".to_string(),
        }
    }
}

/// Outcome of [`validate`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    /// `true` when every check passed.
    pub is_valid: bool,
    /// Actionable description of the outcome.
    pub message: String,
    /// The first failed check, if any.
    pub issue: Option<CodeIssue>,
}

impl ValidationReport {
    fn ok() -> Self {
        Self {
            is_valid: true,
            message: "Code is valid".to_string(),
            issue: None,
        }
    }

    fn rejected(issue: CodeIssue) -> Self {
        Self {
            is_valid: false,
            message: issue.message(),
            issue: Some(issue),
        }
    }

    /// `Ok(())` when valid, otherwise [`SceneError::Validation`] with the report message.
    pub fn into_result(self) -> SceneResult<()> {
        if self.is_valid {
            Ok(())
        } else {
            Err(SceneError::validation(self.message))
        }
    }
}

/// Statically check that `source` parses and looks like a renderable scene.
///
/// Checks run in order (syntax, library import, scene class, `construct` method) and the first
/// failure is reported. Nothing is executed.
pub fn validate(source: &str) -> ValidationReport {
    if let Err(e) = parse(source, Mode::Module, "<scene>") {
        return ValidationReport::rejected(CodeIssue::Syntax(e.to_string()));
    }
    if !LIBRARY_IMPORT.is_match(source) {
        return ValidationReport::rejected(CodeIssue::MissingImport);
    }
    if declared_scene_name(source).is_none() {
        return ValidationReport::rejected(CodeIssue::MissingSceneClass);
    }
    if !CONSTRUCT_METHOD.is_match(source) {
        return ValidationReport::rejected(CodeIssue::MissingConstruct);
    }
    ValidationReport::ok()
}

#[cfg(test)]
#[path = "../../tests/unit/scene/validate.rs"]
mod tests;

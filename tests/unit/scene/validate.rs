use super::*;

const GOOD: &str = r#"from manim import *

class Pythagoras(Scene):
    def construct(self):
        square = Square()
        self.play(Create(square))
        self.wait(1)
"#;

#[test]
fn well_formed_scene_passes() {
    let report = validate(GOOD);
    assert!(report.is_valid, "{}", report.message);
    assert_eq!(report.message, "Code is valid");
    assert!(report.issue.is_none());
    report.into_result().unwrap();
}

#[test]
fn syntax_errors_embed_parser_diagnostic() {
    for src in [
        "from manim import *\nclass A(Scene):\n    def construct(self)\n        pass\n",
        "def broken(:\n",
        "x = (1, 2\n",
        "if True\n    pass\n",
    ] {
        let report = validate(src);
        assert!(!report.is_valid, "accepted: {src:?}");
        assert!(report.message.starts_with("Syntax error: "));
        assert!(report.message.len() > "Syntax error: ".len());
        assert!(matches!(report.issue, Some(CodeIssue::Syntax(_))));
    }
}

#[test]
fn missing_import_is_reported_specifically() {
    let src = GOOD.replace("from manim import *", "import numpy as np");
    let report = validate(&src);
    assert_eq!(report.issue, Some(CodeIssue::MissingImport));
    assert_eq!(report.message, "Missing Manim import");
}

#[test]
fn plain_module_import_is_accepted() {
    let src = GOOD
        .replace("from manim import *", "import manim")
        .replace("(Scene)", "(manim.Scene)");
    assert!(validate(&src).is_valid);
}

#[test]
fn import_mentioned_in_comment_only_is_not_enough() {
    let src = GOOD.replace("from manim import *", "x = 1  # from manim import *");
    assert_eq!(validate(&src).issue, Some(CodeIssue::MissingImport));
}

#[test]
fn class_without_scene_base_is_rejected() {
    let src = GOOD.replace("class Pythagoras(Scene):", "class Pythagoras(object):");
    let report = validate(&src);
    assert_eq!(report.issue, Some(CodeIssue::MissingSceneClass));
    assert_eq!(report.message, "Missing Scene class definition");
}

#[test]
fn scene_subtypes_count_as_scene_classes() {
    let src = GOOD.replace("(Scene)", "(MovingCameraScene)");
    assert!(validate(&src).is_valid);
}

#[test]
fn missing_construct_is_rejected() {
    let src = GOOD.replace("def construct(self):", "def build(self):");
    let report = validate(&src);
    assert_eq!(report.issue, Some(CodeIssue::MissingConstruct));
    let err = report.into_result().unwrap_err();
    assert!(err.to_string().contains("Missing construct method"));
}

#[test]
fn messages_are_distinct_per_issue() {
    let issues = [
        CodeIssue::Syntax("x".to_string()),
        CodeIssue::MissingImport,
        CodeIssue::MissingSceneClass,
        CodeIssue::MissingConstruct,
    ];
    let mut messages: Vec<String> = issues.iter().map(CodeIssue::message).collect();
    messages.sort();
    messages.dedup();
    assert_eq!(messages.len(), issues.len());
}

#[test]
fn manim_anywhere_in_import_list_is_accepted() {
    for import in ["import numpy as np, manim", "import os, manim as mn", "import manim.utils"] {
        let src = GOOD.replace("from manim import *", import);
        assert_eq!(validate(&src).issue, None, "rejected: {import}");
    }
    let src = GOOD.replace("from manim import *", "import numpy, manimlib");
    assert_eq!(validate(&src).issue, Some(CodeIssue::MissingImport));
}

#[test]
fn scene_class_in_comment_only_is_rejected() {
    let src = GOOD.replace(
        "class Pythagoras(Scene):",
        "# class Pythagoras(Scene):\nclass Pythagoras(object):",
    );
    assert_eq!(validate(&src).issue, Some(CodeIssue::MissingSceneClass));
}

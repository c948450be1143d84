use std::collections::HashMap;

use super::*;

#[test]
fn defaults_are_valid_and_match_renderer_layout() {
    let cfg = PipelineConfig::default();
    cfg.validate().unwrap();
    assert_eq!(cfg.render_timeout(), Duration::from_secs(360));
    assert_eq!(cfg.quality_tiers[0], "480p15");
    assert_eq!(
        cfg.artifact_root(),
        PathBuf::from("./output").join("videos").join("animation")
    );
}

#[test]
fn toml_overrides_only_named_keys() {
    let cfg = PipelineConfig::from_toml_str(
        r#"
        output_dir = "/srv/media"
        quality_tiers = ["480p15", "custom"]
        max_video_duration_secs = 120
        "#,
    )
    .unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("/srv/media"));
    assert_eq!(cfg.quality_tiers, vec!["480p15", "custom"]);
    assert_eq!(cfg.render_timeout(), Duration::from_secs(180));
    assert_eq!(cfg.renderer_bin, "manim");
}

#[test]
fn unknown_toml_types_are_validation_errors() {
    let err = PipelineConfig::from_toml_str("max_video_duration_secs = \"long\"").unwrap_err();
    assert!(err.to_string().contains("invalid config"));
}

#[test]
fn env_overrides_apply_and_reject_garbage() {
    let vars: HashMap<&str, &str> = [
        ("MANIM_OUTPUT_DIR", "/tmp/out"),
        ("MAX_VIDEO_DURATION", "42"),
        ("SCENECAST_RETENTION_HOURS", "2"),
    ]
    .into_iter()
    .collect();

    let mut cfg = PipelineConfig::default();
    cfg.apply_overrides_from(|k| vars.get(k).map(|v| v.to_string()))
        .unwrap();
    assert_eq!(cfg.output_dir, PathBuf::from("/tmp/out"));
    assert_eq!(cfg.max_video_duration_secs, 42);
    assert_eq!(cfg.retention_max_age(), Duration::from_secs(7200));

    let mut cfg = PipelineConfig::default();
    let err = cfg
        .apply_overrides_from(|k| (k == "MAX_VIDEO_DURATION").then(|| "soon".to_string()))
        .unwrap_err();
    assert!(err.to_string().contains("MAX_VIDEO_DURATION"));
}

#[test]
fn validate_catches_bad_values() {
    let mut cfg = PipelineConfig {
        quality_tiers: vec![],
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().is_err());

    cfg = PipelineConfig {
        renderer_bin: " ".to_string(),
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().is_err());

    cfg = PipelineConfig {
        max_video_duration_secs: 0,
        processing_overhead_secs: 0,
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().is_err());

    cfg = PipelineConfig {
        fallback_audio_duration_secs: 0.0,
        ..PipelineConfig::default()
    };
    assert!(cfg.validate().is_err());
}

#[test]
fn load_reads_file_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("scenecast.toml");
    std::fs::write(&path, "renderer_bin = \"python3\"\nrenderer_args = [\"-m\", \"manim\"]\n").unwrap();
    let cfg = PipelineConfig::load(&path).unwrap();
    assert_eq!(cfg.renderer_bin, "python3");
    assert_eq!(cfg.renderer_args, vec!["-m", "manim"]);

    assert!(PipelineConfig::load(&dir.path().join("missing.toml")).is_err());
}

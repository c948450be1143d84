use super::*;

fn args_of(cmd: &Command) -> Vec<String> {
    cmd.get_args()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
}

#[test]
fn command_passes_all_renderer_flags() {
    let cfg = PipelineConfig {
        output_dir: PathBuf::from("/srv/out"),
        ..PipelineConfig::default()
    };
    let driver = RenderDriver::from_config(&cfg);
    let cmd = driver.command(Path::new("/tmp/x/animation.py"), "Intro_5");
    assert_eq!(cmd.get_program(), "manim");
    assert_eq!(
        args_of(&cmd),
        vec![
            "/tmp/x/animation.py",
            "Intro_5",
            "--format",
            "mp4",
            "--media_dir",
            "/srv/out",
            "--quality",
            "l",
            "--disable_caching",
        ]
    );
}

#[test]
fn leading_renderer_args_precede_script() {
    let cfg = PipelineConfig {
        renderer_bin: "python3".to_string(),
        renderer_args: vec!["-m".to_string(), "manim".to_string()],
        ..PipelineConfig::default()
    };
    let driver = RenderDriver::from_config(&cfg);
    let args = args_of(&driver.command(Path::new("s.py"), "S_1"));
    assert_eq!(&args[..3], &["-m", "manim", "s.py"]);
}

#[test]
fn timeout_defaults_to_duration_plus_overhead() {
    let driver = RenderDriver::from_config(&PipelineConfig {
        max_video_duration_secs: 100,
        processing_overhead_secs: 20,
        ..PipelineConfig::default()
    });
    assert_eq!(driver.timeout(), Duration::from_secs(120));
    let driver = driver.with_timeout(Duration::from_millis(50));
    assert_eq!(driver.timeout(), Duration::from_millis(50));
}

#[test]
fn missing_renderer_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let driver = RenderDriver::from_config(&PipelineConfig {
        output_dir: dir.path().to_path_buf(),
        renderer_bin: "scenecast-missing-renderer".to_string(),
        ..PipelineConfig::default()
    });
    let scene = SceneIdentifier {
        declared: "S".to_string(),
        unique: "S_1".to_string(),
    };
    let err = driver.render("x = 1", &scene).unwrap_err();
    assert!(err.to_string().contains("failed to spawn"));
}

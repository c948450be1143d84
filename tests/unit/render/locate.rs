use super::*;

fn tiers() -> Vec<String> {
    ["480p15", "720p30", "1080p60"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn touch(path: &Path) {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, b"x").unwrap();
}

#[test]
fn candidates_follow_tier_order() {
    let loc = ArtifactLocator::new("/media/videos/animation", tiers(), "mp4");
    let c = loc.candidates("Intro_7");
    assert_eq!(
        c,
        vec![
            PathBuf::from("/media/videos/animation/480p15/Intro_7.mp4"),
            PathBuf::from("/media/videos/animation/720p30/Intro_7.mp4"),
            PathBuf::from("/media/videos/animation/1080p60/Intro_7.mp4"),
        ]
    );
}

#[test]
fn lowest_fidelity_match_wins() {
    let dir = tempfile::tempdir().unwrap();
    let loc = ArtifactLocator::new(dir.path(), tiers(), "mp4");
    touch(&dir.path().join("1080p60/Intro_7.mp4"));
    assert_eq!(
        loc.find("Intro_7"),
        Some(dir.path().join("1080p60/Intro_7.mp4"))
    );
    touch(&dir.path().join("720p30/Intro_7.mp4"));
    assert_eq!(
        loc.find("Intro_7"),
        Some(dir.path().join("720p30/Intro_7.mp4"))
    );
}

#[test]
fn requires_exact_file_name() {
    let dir = tempfile::tempdir().unwrap();
    let loc = ArtifactLocator::new(dir.path(), tiers(), "mp4");
    touch(&dir.path().join("480p15/Intro_70.mp4"));
    touch(&dir.path().join("480p15/Intro_7.mov"));
    std::fs::create_dir_all(dir.path().join("480p15/Intro_7.mp4.d")).unwrap();
    assert_eq!(loc.find("Intro_7"), None);
}

#[test]
fn directory_with_artifact_name_is_not_a_match() {
    let dir = tempfile::tempdir().unwrap();
    let loc = ArtifactLocator::new(dir.path(), tiers(), "mp4");
    std::fs::create_dir_all(dir.path().join("480p15/Intro_7.mp4")).unwrap();
    assert_eq!(loc.find("Intro_7"), None);
}

#[test]
fn unknown_tiers_come_from_configuration() {
    let dir = tempfile::tempdir().unwrap();
    touch(&dir.path().join("videos/animation/2160p60/S_1.mp4"));
    let cfg = PipelineConfig {
        output_dir: dir.path().to_path_buf(),
        quality_tiers: vec!["480p15".to_string(), "2160p60".to_string()],
        ..PipelineConfig::default()
    };
    let loc = ArtifactLocator::from_config(&cfg);
    assert_eq!(loc.root(), dir.path().join("videos/animation"));
    assert_eq!(
        loc.find("S_1"),
        Some(dir.path().join("videos/animation/2160p60/S_1.mp4"))
    );
}

#[test]
fn missing_root_is_not_found() {
    let loc = ArtifactLocator::new("/definitely/not/here", tiers(), "mp4");
    assert_eq!(loc.find("Intro_7"), None);
}

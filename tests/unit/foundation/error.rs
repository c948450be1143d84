use super::*;

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt as _;
    ExitStatus::from_raw(code << 8)
}

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SceneError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SceneError::probe("x").to_string().contains("probe error:"));
    assert!(SceneError::mux("x").to_string().contains("mux error:"));
    assert!(
        SceneError::Timeout {
            limit: Duration::from_secs(360)
        }
        .to_string()
        .contains("render timeout:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SceneError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.kind(), ErrorKind::Other);
}

#[test]
fn artifact_missing_lists_every_candidate() {
    let err = SceneError::ArtifactMissing {
        scene: "Intro_1".to_string(),
        searched: vec![PathBuf::from("a/480p15/Intro_1.mp4"), PathBuf::from("a/720p30/Intro_1.mp4")],
    };
    let msg = err.to_string();
    assert!(msg.contains("Intro_1"));
    assert!(msg.contains("480p15"));
    assert!(msg.contains("720p30"));
    assert!(!err.is_retryable());
}

#[cfg(unix)]
#[test]
fn process_failure_embeds_both_streams() {
    let err = SceneError::ProcessFailure {
        status: exit_status(2),
        stdout: "rendering frame 3\n".to_string(),
        stderr: "NameError: name 'Circl' is not defined\n".to_string(),
    };
    let msg = err.to_string();
    assert!(msg.contains("NameError"));
    assert!(msg.contains("rendering frame 3"));
    assert_eq!(err.kind(), ErrorKind::ProcessFailure);
    assert!(!err.is_retryable());
}

#[test]
fn only_timeouts_are_retryable() {
    assert!(
        SceneError::Timeout {
            limit: Duration::from_millis(10)
        }
        .is_retryable()
    );
    assert!(!SceneError::validation("x").is_retryable());
}

#[test]
fn kind_serializes_snake_case() {
    let s = serde_json::to_string(&ErrorKind::ArtifactMissing).unwrap();
    assert_eq!(s, "\"artifact_missing\"");
}

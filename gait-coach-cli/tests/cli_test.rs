use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn gait_coach(config: &Path) -> Command {
    let mut cmd = Command::cargo_bin("gait-coach").unwrap();
    cmd.env("GAIT_COACH_CONFIG", config);
    cmd
}

fn landmark(name: &str, x: f64, y: f64) -> serde_json::Value {
    serde_json::json!({ "name": name, "x": x, "y": y, "visibility": 0.99 })
}

/// Upright runner with the front knee bent to about 95 degrees
fn bent_knee_frame(frame_number: u32) -> String {
    let frame = serde_json::json!({
        "frame_number": frame_number,
        "landmarks": [
            landmark("nose", 0.55, 0.2),
            landmark("left_shoulder", 0.45, 0.3),
            landmark("right_shoulder", 0.55, 0.3),
            landmark("left_hip", 0.45, 0.5),
            landmark("right_hip", 0.55, 0.5),
            landmark("left_knee", 0.45, 0.6),
            landmark("right_knee", 0.55, 0.6),
            landmark("left_ankle", 0.45, 0.7),
            landmark("right_ankle", 0.64962, 0.60872),
        ]
    });
    frame.to_string()
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("gait-coach").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Running gait cycle segmentation"))
        .stdout(predicate::str::contains("analyze"))
        .stdout(predicate::str::contains("config"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("gait-coach").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_completions_command() {
    let mut cmd = Command::cargo_bin("gait-coach").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_gait__coach"))
        .stdout(predicate::str::contains("complete -F"));
}

#[test]
fn test_config_init_and_path() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");

    gait_coach(&config)
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.toml"));

    gait_coach(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized"));
    assert!(config.exists());

    gait_coach(&config)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    gait_coach(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[analysis]"));
}

#[test]
fn test_analyze_writes_rows_and_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("easy_run.jsonl");
    let frames: Vec<String> = (1..=10).map(bent_knee_frame).collect();
    fs::write(&input, frames.join("\n")).unwrap();
    let out = dir.path().join("reports");

    gait_coach(&dir.path().join("config.toml"))
        .arg("analyze")
        .arg(&input)
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Front knee"))
        .stdout(predicate::str::contains("10 scored"));

    let rows = fs::read_to_string(out.join("easy_run.rows.jsonl")).unwrap();
    assert_eq!(rows.lines().count(), 10);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("easy_run.summary.json")).unwrap())
            .unwrap();
    assert_eq!(summary["totalFrames"], 10);
    assert_eq!(summary["frontKneePercentage"], 100.0);
    assert_eq!(summary["frontKneeRes"], "Good");
}

#[test]
fn test_analyze_without_rows() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("short.jsonl");
    fs::write(&input, bent_knee_frame(1)).unwrap();

    gait_coach(&dir.path().join("config.toml"))
        .arg("analyze")
        .arg(&input)
        .arg("--no-rows")
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success();

    assert!(!dir.path().join("short.rows.jsonl").exists());
    assert!(dir.path().join("short.summary.json").exists());
}

#[test]
fn test_analyze_empty_video_reports_no_summary() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("nobody.jsonl");
    fs::write(&input, "{\"frame_number\": 1}\n{\"frame_number\": 2}\n").unwrap();

    gait_coach(&dir.path().join("config.toml"))
        .arg("analyze")
        .arg(&input)
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No summary available"));

    assert!(!dir.path().join("nobody.summary.json").exists());
}

#[test]
fn test_analyze_missing_input_fails() {
    let dir = tempfile::tempdir().unwrap();

    gait_coach(&dir.path().join("config.toml"))
        .arg("analyze")
        .arg(dir.path().join("missing.jsonl"))
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing.jsonl"));
}

#[test]
fn test_analyze_corrupt_input_fails() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("corrupt.jsonl");
    fs::write(&input, format!("{}\nnot json\n", bent_knee_frame(1))).unwrap();

    gait_coach(&dir.path().join("config.toml"))
        .arg("analyze")
        .arg(&input)
        .arg("--output-dir")
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn test_analyze_rejects_inputs_sharing_a_name() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = (dir.path().join("a"), dir.path().join("b"));
    fs::create_dir_all(&first).unwrap();
    fs::create_dir_all(&second).unwrap();
    fs::write(first.join("run.jsonl"), bent_knee_frame(1)).unwrap();
    let frames: Vec<String> = (1..=7).map(bent_knee_frame).collect();
    fs::write(second.join("run.jsonl"), frames.join("\n")).unwrap();
    let out = dir.path().join("reports");

    gait_coach(&dir.path().join("config.toml"))
        .arg("analyze")
        .arg(first.join("run.jsonl"))
        .arg(second.join("run.jsonl"))
        .arg("--output-dir")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("run.summary.json"));

    assert!(!out.join("run.summary.json").exists());
}

#[test]
fn test_environment_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("config.toml");
    fs::write(&config, "[analysis.gait]\ndefault_cycle_length = 40\n").unwrap();

    gait_coach(&config)
        .env("GAIT_CYCLE_LENGTH", "30")
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_cycle_length = 30"));

    gait_coach(&config)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("default_cycle_length = 40"));
}

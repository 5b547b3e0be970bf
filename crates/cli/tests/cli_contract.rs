use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

const CALIBRATE_AND_MEASURE_LENGTH: &str = r#"[
    {"command": "begin_calibration"},
    {"pointer": {"down": {"x": 0.0, "y": 0.0}}},
    {"pointer": {"move": {"x": 60.0, "y": 0.0}}},
    {"pointer": {"up": {"x": 100.0, "y": 0.0}}},
    {"command": "begin_measuring"},
    {"pointer": {"down": {"x": 0.0, "y": 0.0}}},
    {"pointer": {"up": {"x": 0.0, "y": 0.0}}},
    {"pointer": {"down": {"x": 30.0, "y": 40.0}}},
    {"pointer": {"up": {"x": 30.0, "y": 40.0}}}
]"#;

fn write_script(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("script.json");
    fs::write(&path, body).expect("script should be written");
    path
}

fn replay(settings_dir: &Path, script: &Path, extra: &[&str]) -> Value {
    let output = cargo_bin_cmd!("measure-cli")
        .arg("--settings-dir")
        .arg(settings_dir)
        .arg("replay")
        .arg(script)
        .args(extra)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    serde_json::from_slice(&output).expect("stdout should contain valid json")
}

#[test]
fn replay_reports_calibrated_length() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(temp.path(), CALIBRATE_AND_MEASURE_LENGTH);

    let report = replay(temp.path(), &script, &[]);

    assert_eq!(report["steps"], 9);
    assert_eq!(report["errors"], Value::Array(Vec::new()));
    assert_eq!(report["state"]["mode"], "idle");
    assert_eq!(report["state"]["scale"], 10.0);
    assert_eq!(report["state"]["reference_label"], "10 cm");
    assert_eq!(report["state"]["result"]["kind"], "length");

    let label = report["state"]["labels"]["length"].as_str().unwrap_or_default();
    insta::assert_snapshot!(label, @"5.0 cm");
}

#[test]
fn replay_collects_engine_errors_per_step() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(
        temp.path(),
        r#"[
            {"command": {"set_known_reference_length": 4.0}},
            {"command": "begin_calibration"},
            {"pointer": {"down": {"x": 0.0, "y": 0.0}}},
            {"pointer": {"up": {"x": 0.0, "y": 40.0}}},
            {"command": {"set_measurement_type": "area"}},
            {"command": "begin_measuring"},
            {"pointer": {"down": {"x": 0.0, "y": 0.0}}},
            {"pointer": {"up": {"x": 0.0, "y": 0.0}}},
            {"pointer": {"down": {"x": 20.0, "y": 0.0}}},
            {"pointer": {"up": {"x": 20.0, "y": 0.0}}},
            {"command": "finish_polygon"}
        ]"#,
    );

    let report = replay(temp.path(), &script, &[]);

    let errors = report["errors"].as_array().expect("errors should be an array");
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0]["step"], 10);
    let message = errors[0]["error"].as_str().unwrap_or_default();
    insta::assert_snapshot!(message, @"measurement needs at least 3 points (have 2)");

    assert_eq!(report["state"]["mode"], "measuring_polygon");
    assert_eq!(report["availability"]["finish_polygon"], false);
}

#[test]
fn replay_uses_fitted_image_size() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let image_path = temp.path().join("pothole.png");
    image::RgbImage::new(1200, 600).save(&image_path).expect("png should be written");
    let script = write_script(temp.path(), "[]");

    let image_arg = image_path.to_string_lossy().into_owned();
    let report = replay(temp.path(), &script, &["--image", &image_arg]);

    assert_eq!(report["display"]["width"], 600.0);
    assert_eq!(report["display"]["height"], 300.0);
    assert_eq!(report["availability"]["begin_calibration"], true);
    assert_eq!(
        report["instructions"],
        "Draw a reference line across an object of known length."
    );
}

#[test]
fn replay_rejects_malformed_script() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(temp.path(), r#"[{"command": "teleport"}]"#);

    cargo_bin_cmd!("measure-cli")
        .arg("--settings-dir")
        .arg(temp.path())
        .arg("replay")
        .arg(&script)
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to parse script"));
}

#[test]
fn replay_rejects_missing_image() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(temp.path(), "[]");

    cargo_bin_cmd!("measure-cli")
        .arg("--settings-dir")
        .arg(temp.path())
        .arg("replay")
        .arg(&script)
        .arg("--image")
        .arg(temp.path().join("missing.jpg"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("image does not exist"));
}

#[test]
fn replay_rejects_empty_display_size() {
    let temp = tempfile::tempdir().expect("temp dir should be created");
    let script = write_script(temp.path(), CALIBRATE_AND_MEASURE_LENGTH);

    cargo_bin_cmd!("measure-cli")
        .arg("--settings-dir")
        .arg(temp.path())
        .arg("replay")
        .arg(&script)
        .args(["--width", "0", "--height", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("display size must be positive"));
}

#[test]
fn settings_set_persists_and_applies_to_replay() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cargo_bin_cmd!("measure-cli")
        .env("MEASURE_SETTINGS_DIR", temp.path())
        .args(["settings", "set", "--unit", "in", "--known-length", "5", "--shape", "elliptical"])
        .assert()
        .success();

    let output = cargo_bin_cmd!("measure-cli")
        .env("MEASURE_SETTINGS_DIR", temp.path())
        .args(["settings", "show"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let settings: Value =
        serde_json::from_slice(&output).expect("stdout should contain valid json");
    assert_eq!(settings["unit"], "inch");
    assert_eq!(settings["known_reference_length"], 5.0);
    assert_eq!(settings["shape_hint"], "elliptical");
    assert_eq!(settings["volume_depth"], 0.0);

    let script = write_script(temp.path(), CALIBRATE_AND_MEASURE_LENGTH);
    let report = replay(temp.path(), &script, &[]);
    let label = report["state"]["labels"]["length"].as_str().unwrap_or_default();
    insta::assert_snapshot!(label, @"2.5 in");
}

#[test]
fn settings_set_rejects_negative_depth() {
    let temp = tempfile::tempdir().expect("temp dir should be created");

    cargo_bin_cmd!("measure-cli")
        .arg("--settings-dir")
        .arg(temp.path())
        .args(["settings", "set", "--depth", "-2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("volume_depth must be zero or greater"));

    assert!(!temp.path().join("settings.json").exists());
}

#[test]
fn version_prints_package_version() {
    cargo_bin_cmd!("measure-cli")
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

//! End-to-end tests driving the compiled binary

use assert_cmd::Command;
use predicates::prelude::*;

#[path = "common/mod.rs"]
mod common;

use common::*;

const SAFRAS: [&str; 5] = ["201901", "201902", "201903", "201904", "201905"];

#[test]
fn test_missing_train_until_is_an_error() {
    let mut cmd = Command::cargo_bin("safra").unwrap();
    cmd.arg("--input")
        .arg("data.csv")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--train-until"));
}

#[test]
fn test_invalid_min_bin_pct_is_rejected() {
    let mut cmd = Command::cargo_bin("safra").unwrap();
    cmd.args([
        "--input",
        "data.csv",
        "--train-until",
        "201903",
        "--min-bin-pct",
        "150",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("between 0.0 and 100.0"));
}

#[test]
fn test_full_run_writes_scorecard() {
    let mut df = scorecard_frame(&SAFRAS, 120);
    let (temp_dir, csv_path) = create_temp_csv(&mut df);
    let output_path = temp_dir.path().join("scorecard.json");

    let mut cmd = Command::cargo_bin("safra").unwrap();
    cmd.arg("--input")
        .arg(&csv_path)
        .args(["--train-until", "201903", "--validate-until", "201904"])
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&output_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();

    assert_eq!(json["metadata"]["train_until"], "201903");
    assert!(json["variables"].as_array().unwrap().len() >= 2);
    assert!(json["model"]["coefficients"].as_array().is_some());
    assert!(!json["performance"].as_array().unwrap().is_empty());
    assert!(json["score_stability"]["entries"].as_array().is_some());
}

#[test]
fn test_bundle_produces_zip_and_removes_json() {
    let mut df = scorecard_frame(&SAFRAS, 120);
    let (temp_dir, csv_path) = create_temp_csv(&mut df);
    let output_path = temp_dir.path().join("scorecard.json");

    let mut cmd = Command::cargo_bin("safra").unwrap();
    cmd.arg("--input")
        .arg(&csv_path)
        .args(["--train-until", "201903", "--bundle"])
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    assert!(temp_dir.path().join("scorecard.zip").exists());
    assert!(!output_path.exists());
}

#[test]
fn test_unknown_boundary_safra_fails() {
    let mut df = scorecard_frame(&SAFRAS, 60);
    let (_temp_dir, csv_path) = create_temp_csv(&mut df);

    let mut cmd = Command::cargo_bin("safra").unwrap();
    cmd.arg("--input")
        .arg(&csv_path)
        .args(["--train-until", "203001"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not present in dataset"));
}

#[test]
fn test_imputation_flag_accepts_median() {
    let mut df = scorecard_frame(&SAFRAS, 120);
    let (temp_dir, csv_path) = create_temp_csv(&mut df);
    let output_path = temp_dir.path().join("scorecard.json");

    let mut cmd = Command::cargo_bin("safra").unwrap();
    cmd.arg("--input")
        .arg(&csv_path)
        .args(["--train-until", "201903", "--impute", "median"])
        .arg("--output")
        .arg(&output_path)
        .assert()
        .success();

    let content = std::fs::read_to_string(&output_path).unwrap();
    let json: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(json["imputation"]["strategy"], "median");
}

use std::path::Path;

use assert_cmd::Command;
use image::{GrayImage, Luma};
use predicates::prelude::*;

fn write_mounted_scan(path: &Path) {
    GrayImage::from_fn(400, 300, |x, y| {
        let inside = (18..382).contains(&x) && (14..286).contains(&y);
        Luma([if inside { 120 } else { 250 }])
    })
    .save(path)
    .expect("write scan");
}

fn frame_bounds() -> Command {
    Command::cargo_bin("frame-bounds").expect("binary built")
}

#[test]
fn crop_writes_default_output_next_to_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("roll1_07.png");
    write_mounted_scan(&input);

    frame_bounds()
        .args(["--log-level", "warn", "crop", "--input"])
        .arg(&input)
        .assert()
        .success();

    let cropped = image::open(dir.path().join("roll1_07_cropped.png")).expect("cropped output");
    assert!(cropped.width() < 400 && cropped.width() > 340);
    assert!(cropped.height() < 300 && cropped.height() > 250);
}

#[test]
fn crop_honours_extension_override() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("scan.png");
    write_mounted_scan(&input);

    frame_bounds()
        .args(["crop", "--ext", "jpg", "--input"])
        .arg(&input)
        .assert()
        .success();

    assert!(dir.path().join("scan_cropped.jpg").is_file());
}

#[test]
fn crop_debug_writes_level_images() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("scan.png");
    let debug_dir = dir.path().join("levels");
    write_mounted_scan(&input);

    frame_bounds()
        .args(["crop", "--debug", "--input"])
        .arg(&input)
        .arg("--debug-dir")
        .arg(&debug_dir)
        .assert()
        .success();

    assert!(debug_dir.join("mask_valid.png").is_file());
    assert!(debug_dir.join("level_120.png").is_file());
}

#[test]
fn missing_input_fails() {
    let dir = tempfile::tempdir().expect("tempdir");
    frame_bounds()
        .args(["crop", "--input"])
        .arg(dir.path().join("nope.png"))
        .assert()
        .code(1)
        .stderr(predicate::str::contains("failed to decode"));
}

#[test]
fn missing_input_flag_exits_1() {
    frame_bounds()
        .arg("crop")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--input"));
}

#[test]
fn unknown_subcommand_exits_1() {
    frame_bounds().arg("shrink").assert().code(1);
}

#[test]
fn help_and_version_exit_0() {
    frame_bounds()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("crop"));
    frame_bounds().arg("--version").assert().success();
}

#[test]
fn blank_scan_reports_no_candidates() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("white.png");
    GrayImage::from_pixel(120, 90, Luma([255]))
        .save(&input)
        .expect("write scan");

    frame_bounds()
        .args(["crop", "--input"])
        .arg(&input)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("no candidate"));
    assert!(!dir.path().join("white_cropped.png").exists());
}

#[test]
fn detect_prints_json_report() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("scan.png");
    write_mounted_scan(&input);

    frame_bounds()
        .args(["detect", "--input"])
        .arg(&input)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"mode\": \"axis_aligned\""))
        .stdout(predicate::str::contains("\"kind\": \"exhausted\""));
}

#[test]
fn invalid_config_fails_before_scanning() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("scan.png");
    let config = dir.path().join("params.json");
    write_mounted_scan(&input);
    std::fs::write(
        &config,
        r#"{ "area_fraction_min": 0.99, "area_fraction_max": 0.9 }"#,
    )
    .expect("write config");

    frame_bounds()
        .args(["crop", "--input"])
        .arg(&input)
        .arg("--config")
        .arg(&config)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("exceeds area_fraction_max"));
}

#[test]
fn annotate_writes_analyzed_jpeg() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = dir.path().join("scan.png");
    write_mounted_scan(&input);

    frame_bounds()
        .args(["annotate", "--input"])
        .arg(&input)
        .assert()
        .success();

    let out = image::open(dir.path().join("scan_analyzed.jpg")).expect("annotated output");
    assert_eq!((out.width(), out.height()), (400, 300));
    assert!(!dir.path().join("scan_analyzed.png").exists());
    assert!(!dir.path().join("scan.png_analyzed.jpg").exists());
}

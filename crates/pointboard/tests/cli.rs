#![cfg(feature = "cli")]

use assert_cmd::Command;
use predicates::prelude::*;
use std::path::{Path, PathBuf};

fn write_frame(dir: &Path, name: &str, dot: Option<(u32, u32)>) -> PathBuf {
    let img = image::RgbImage::from_fn(300, 200, |x, y| match dot {
        Some((cx, cy)) if x.abs_diff(cx) <= 3 && y.abs_diff(cy) <= 3 => image::Rgb([255, 25, 25]),
        _ => image::Rgb([64, 70, 72]),
    });
    let path = dir.join(name);
    img.save(&path).expect("write frame");
    path
}

fn corner_frames(dir: &Path) -> Vec<PathBuf> {
    [(15, 15), (285, 15), (15, 185), (285, 185)]
        .into_iter()
        .enumerate()
        .map(|(i, p)| write_frame(dir, &format!("corner{i}.png"), Some(p)))
        .collect()
}

fn pointboard() -> Command {
    Command::cargo_bin("pointboard").expect("binary")
}

#[test]
fn analyze_prints_the_detected_point() {
    let dir = tempfile::tempdir().expect("tempdir");
    let frame = write_frame(dir.path(), "dot.png", Some((120, 80)));
    pointboard()
        .arg("analyze")
        .arg(&frame)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"x\":").and(predicate::str::contains("\"support\":")));

    let empty = write_frame(dir.path(), "empty.png", None);
    pointboard()
        .arg("analyze")
        .arg(&empty)
        .assert()
        .success()
        .stdout("null\n");
}

#[test]
fn run_calibrates_and_reports_cells() {
    let dir = tempfile::tempdir().expect("tempdir");
    let corners = corner_frames(dir.path());
    let centre = write_frame(dir.path(), "centre.png", Some((200, 140)));
    let dark = write_frame(dir.path(), "dark.png", None);

    let config = dir.path().join("config.json");
    std::fs::write(&config, r#"{"layout":{"rows":2,"cols":2,"labels":["a","b","c","d"]}}"#)
        .expect("write config");
    let saved = dir.path().join("calibration.json");

    pointboard()
        .arg("run")
        .arg("--corners")
        .args(&corners)
        .arg("--config")
        .arg(&config)
        .arg("--save-calibration")
        .arg(&saved)
        .arg(&centre)
        .arg(&dark)
        .assert()
        .success()
        .stdout(
            predicate::str::contains(r#""state":{"state":"ready"}"#)
                .and(predicate::str::contains(r#""status":"on_board""#))
                .and(predicate::str::contains(r#""label":"d""#))
                .and(predicate::str::contains(r#""point":null"#)),
        );

    assert!(saved.exists());
    pointboard()
        .arg("run")
        .arg("--calibration")
        .arg(&saved)
        .arg(&centre)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""status":"on_board""#));
}

#[test]
fn run_fails_when_a_corner_shows_no_light() {
    let dir = tempfile::tempdir().expect("tempdir");
    let mut corners = corner_frames(dir.path());
    corners[2] = write_frame(dir.path(), "missing.png", None);

    pointboard()
        .arg("run")
        .arg("--corners")
        .args(&corners)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no pointer light found"));
}

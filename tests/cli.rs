extern crate assert_cmd;
extern crate image;
extern crate predicates;
extern crate tempfile;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn renders_a_small_png() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("small.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", path.to_str().unwrap(), "-s", "80x60", "--tile", "20x20"])
        .args(&["-i", "100", "-t", "2"])
        .assert()
        .success()
        .stdout(predicate::str::contains("12 tiles rendered"));

    let img = image::open(&path).unwrap().to_rgb8();
    assert_eq!(img.dimensions(), (80, 60));
}

#[test]
fn renders_a_zoomed_ppm() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("zoom.ppm");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&[
            "-o",
            path.to_str().unwrap(),
            "-s",
            "32x32",
            "--tile",
            "16x16",
            "-l",
            "-0.75,0.05",
            "-r",
            "-0.70,0.10",
        ])
        .assert()
        .success();
    assert!(path.exists());
}

#[test]
fn inverted_bounds_are_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("never.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", path.to_str().unwrap(), "-l", "1.0,-1.0", "-r", "-1.0,1.0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid viewport"));
    assert!(!path.exists());
}

#[test]
fn oversized_tiles_are_refused() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("never.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", path.to_str().unwrap(), "-s", "100x100", "--tile", "200x50"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not fit"));
}

#[test]
fn zero_queue_is_refused_by_the_parser() {
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", "unused.png", "-q", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Queue capacity"));
}

#[test]
fn thread_count_defaults_to_the_cpu_count() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("defaults.png");
    Command::cargo_bin("mandel")
        .unwrap()
        .args(&["-o", path.to_str().unwrap(), "-s", "40x40", "--tile", "20x20"])
        .assert()
        .success()
        .stdout(predicate::str::contains("4 tiles rendered"));
}

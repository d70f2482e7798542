//! CLI tests for the `pd` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn pd() -> Command {
    Command::cargo_bin("pd").expect("pd binary")
}

#[test]
fn test_compute_search_pack_hash() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let text = temp.path().join("pi_digits");
    let packed = temp.path().join("pi_packed");

    pd().args(["compute", "--digits", "50", "--chunk-size", "8", "--output-dir"])
        .arg(&text)
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 50 digits"));

    pd().args(["search", "3.14159265", "--input-dir"])
        .arg(&text)
        .assert()
        .success()
        .stdout("1\n");

    pd().args(["pack", "--input-dir"])
        .arg(&text)
        .arg("--output-dir")
        .arg(&packed)
        .assert()
        .success()
        .stdout(predicate::str::contains("pi_digits.bin"));

    pd().args(["search", "3993", "--packed", "--input-dir"])
        .arg(&packed)
        .assert()
        .success()
        .stdout("43\n");

    pd().args(["hash", "--input-dir"]).arg(&text).assert().success();
    pd().args(["hash", "--verify", "--input-dir"])
        .arg(&text)
        .assert()
        .success()
        .stdout(predicate::str::contains("OK"));
}

#[test]
fn test_not_found_exits_nonzero() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let text = temp.path().join("pi_digits");

    pd().args(["compute", "--digits", "20", "--output-dir"])
        .arg(&text)
        .assert()
        .success();

    pd().args(["search", "000000", "--input-dir"])
        .arg(&text)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Not found"));
}

#[test]
fn test_compute_refuses_non_empty_dir() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    fs::write(temp.path().join("keep.txt"), "x").unwrap();

    pd().args(["compute", "--digits", "10", "--output-dir"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not empty"));

    pd().args(["compute", "--digits", "10", "--overwrite", "--output-dir"])
        .arg(temp.path())
        .assert()
        .success();
    assert!(!temp.path().join("keep.txt").exists());
}

#[test]
fn test_compare_match_and_mismatch() {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let text = temp.path().join("pi_digits");
    let good = temp.path().join("good.txt");
    let bad = temp.path().join("bad.txt");
    let normalized = temp.path().join("normalized.txt");

    pd().args(["compute", "--digits", "20", "--chunk-size", "6", "--output-dir"])
        .arg(&text)
        .assert()
        .success();

    fs::write(&good, "Pi to 20 places:\n3.14159 26535 89793 23846\n").unwrap();
    fs::write(&bad, "3.14159265358979323849").unwrap();

    pd().args(["compare", "--input-dir"])
        .arg(&text)
        .arg("--source")
        .arg(&good)
        .arg("--normalize-output")
        .arg(&normalized)
        .assert()
        .success()
        .stdout(predicate::str::contains("MATCH"));
    assert_eq!(fs::read_to_string(&normalized).unwrap(), "14159265358979323846");

    pd().args(["compare", "--input-dir"])
        .arg(&text)
        .arg("--source")
        .arg(&bad)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("at position 20"));
}


use assert_cmd::Command;
use assert_fs::prelude::*;
use assert_fs::TempDir;
use predicates::prelude::*;

#[test]
fn quote() {
    Command::cargo_bin("lre")
        .unwrap()
        .arg("quote")
        .arg("1+1=2?")
        .assert()
        .success()
        .stdout("1\\+1=2\\?\n");
}

#[test]
fn no_arguments() {
    Command::cargo_bin("lre")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage:"));
}

#[test]
fn config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file.write_str("[regex]\ncase_insensitive = true\n").unwrap();

    Command::cargo_bin("lre")
        .unwrap()
        .arg("--config")
        .arg(config_file.path())
        .arg("search")
        .arg("foo")
        .write_stdin("FOO foo")
        .assert()
        .success()
        .stdout("0..3: FOO\n4..7: foo\n");
}

#[test]
fn invalid_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.child("config.toml");

    config_file.write_str("[regex]\nunknown_option = 1\n").unwrap();

    Command::cargo_bin("lre")
        .unwrap()
        .arg("--config")
        .arg(config_file.path())
        .arg("quote")
        .arg("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid config file"));
}

#[test]
fn missing_config_file() {
    Command::cargo_bin("lre")
        .unwrap()
        .arg("--config")
        .arg("does-not-exist.toml")
        .arg("quote")
        .arg("x")
        .assert()
        .failure()
        .stderr(predicate::str::contains("file not found"));
}

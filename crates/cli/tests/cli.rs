//! CLI smoke tests; none of these reach the network

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;

fn cloudfiles(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("cloudfiles").unwrap();
    cmd.env("HOME", home).env_remove("RUST_LOG");
    cmd
}

fn write_config(home: &Path, contents: &str) {
    let dir = home.join(".config").join("cloudfiles");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("config.toml"), contents).unwrap();
}

const VALID_CONFIG: &str = r#"
[account]
username = "testuser"
api_key = "0123456789abcdef"
auth_url = "http://127.0.0.1:9/v1.0"

[storage]
default_container = "backups"
"#;

#[test]
fn test_help_lists_commands() {
    let home = tempfile::tempdir().unwrap();
    cloudfiles(home.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("containers"))
        .stdout(predicate::str::contains("objects"))
        .stdout(predicate::str::contains("cdn"));
}

#[test]
fn test_bash_completion_is_clean_script() {
    let home = tempfile::tempdir().unwrap();
    cloudfiles(home.path())
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_cloudfiles()"))
        .stdout(predicate::str::contains("Installation instructions").not());
}

#[test]
fn test_unsupported_shell() {
    let home = tempfile::tempdir().unwrap();
    cloudfiles(home.path())
        .args(["completion", "tcsh"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unsupported shell"));
}

#[test]
fn test_config_show_without_config() {
    let home = tempfile::tempdir().unwrap();
    cloudfiles(home.path())
        .args(["config", "show"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration file not found"));
}

#[test]
fn test_config_validate() {
    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), VALID_CONFIG);

    cloudfiles(home.path())
        .args(["config", "validate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid configuration"));
}

#[test]
fn test_config_validate_rejects_ttl() {
    let home = tempfile::tempdir().unwrap();
    write_config(
        home.path(),
        &VALID_CONFIG.replace("default_container = \"backups\"", "cdn_ttl = 10"),
    );

    cloudfiles(home.path())
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("CDN TTL"));
}

#[test]
fn test_config_show_masks_api_key() {
    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), VALID_CONFIG);

    cloudfiles(home.path())
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("testuser"))
        .stdout(predicate::str::contains("0123****"))
        .stdout(predicate::str::contains("0123456789abcdef").not());
}

#[test]
fn test_invalid_container_name_fails_before_network() {
    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), VALID_CONFIG);

    cloudfiles(home.path())
        .args(["containers", "create", "bad/name"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid container name"));
}

#[test]
fn test_upload_missing_file() {
    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), VALID_CONFIG);

    cloudfiles(home.path())
        .args(["objects", "upload", "/definitely/not/here.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found"));
}

#[test]
fn test_doctor_check_without_config() {
    let home = tempfile::tempdir().unwrap();
    cloudfiles(home.path())
        .args(["doctor", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration not found"));
}

#[test]
fn test_config_validate_rejects_color() {
    let home = tempfile::tempdir().unwrap();
    write_config(home.path(), &format!("{}\n[output]\ncolor = \"sometimes\"\n", VALID_CONFIG));

    cloudfiles(home.path())
        .args(["config", "validate"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Color must be"));
}

use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use predicates::str::contains;
use tempfile::TempDir;

const FIXTURE: &str = r#"
services:
  com.victronenergy.settings:
    /Settings/System/TimeZone:
      value: Europe/Amsterdam
    /Settings/Relay/Function:
      value: 1
      text: Alarm relay
    /Settings/Relay/Polarity:
      value: []
  com.victronenergy.system:
    /Dc/Battery/Soc:
      value: 87.5
      text: 87.5 %
"#;

fn busmirror_cmd(home: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("busmirror"));
    cmd.env("HOME", home)
        .env("USERPROFILE", home)
        .env("NO_COLOR", "1")
        .env_remove("RUST_LOG");
    cmd
}

fn write_fixture(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("tree.yaml");
    fs::write(&path, FIXTURE).expect("write fixture");
    path
}

#[test]
fn dump_prints_every_path_with_text() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    let assert = busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .arg("dump")
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let lines: Vec<&str> = stdout.lines().collect();

    assert_eq!(
        lines,
        vec![
            "/ = ",
            "/Settings = ",
            "/Settings/Relay = ",
            "/Settings/Relay/Function = Alarm relay",
            "/Settings/Relay/Polarity = []",
            "/Settings/System = ",
            "/Settings/System/TimeZone = Europe/Amsterdam",
        ]
    );
}

#[test]
fn dump_json_reports_value_text_and_validity() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    let assert = busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["--root", "/Settings/Relay", "dump", "--json"])
        .assert()
        .success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let items: serde_json::Value = serde_json::from_str(&stdout).expect("json");
    let items = items.as_array().expect("array");

    assert_eq!(items.len(), 3);
    assert_eq!(items[0]["path"], "/Settings/Relay");
    assert_eq!(items[1]["path"], "/Settings/Relay/Function");
    assert_eq!(items[1]["value"], 1);
    assert_eq!(items[1]["text"], "Alarm relay");
    assert_eq!(items[1]["valid"], true);
    assert_eq!(items[2]["path"], "/Settings/Relay/Polarity");
    assert_eq!(items[2]["valid"], false);
}

#[test]
fn get_reads_value_text_and_validity() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["get", "/Settings/Relay/Function"])
        .assert()
        .success()
        .stdout("1\n");

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["get", "/Settings/Relay/Function", "--text"])
        .assert()
        .success()
        .stdout("Alarm relay\n");

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["get", "/Settings/Relay/Polarity", "--valid"])
        .assert()
        .success()
        .stdout("false\n");
}

#[test]
fn get_unknown_path_fails_with_context() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["get", "/Settings/Relay/Mode"])
        .assert()
        .failure()
        .stderr(contains("no mirrored item at '/Settings/Relay/Mode'"))
        .stderr(contains("no child named 'Mode' under /Settings/Relay"));
}

#[test]
fn root_with_trailing_separator_is_accepted() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["--root", "/Settings/Relay/", "dump"])
        .assert()
        .success()
        .stdout(contains("/Settings/Relay/Function = Alarm relay"))
        .stdout(contains("//").not());
}

#[test]
fn get_outside_root_is_rejected() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["--root", "/Settings/Relay", "get", "/Settings/System/TimeZone"])
        .assert()
        .failure()
        .stderr(contains("is not below the mirror root /Settings/Relay"));
}

#[test]
fn set_reports_the_echoed_change() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["set", "/Settings/Relay/Function", "2"])
        .assert()
        .success()
        .stdout(contains("✓ /Settings/Relay/Function = 2 (2)"));
}

#[test]
fn set_on_an_implicit_object_fails() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["set", "/Settings/Relay", "2"])
        .assert()
        .failure()
        .stderr(contains("failed to set /Settings/Relay"));
}

#[test]
fn add_setting_creates_the_object() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args([
            "add-setting",
            "Settings/Relay",
            "Delay",
            "30",
            "--type",
            "i",
            "--min",
            "0",
            "--max",
            "600",
        ])
        .assert()
        .success()
        .stdout(contains("✓ Added setting /Settings/Relay/Delay = 30"));
}

#[test]
fn service_flag_selects_another_service() {
    let home = TempDir::new().expect("home");
    let fixture = write_fixture(&home);

    busmirror_cmd(home.path())
        .arg("--fixture")
        .arg(&fixture)
        .args(["--service", "com.victronenergy.system", "dump"])
        .assert()
        .success()
        .stdout(contains("/Dc/Battery/Soc = 87.5 %"))
        .stdout(contains("Settings").not());
}

#[test]
fn config_file_supplies_fixture_and_service() {
    let home = TempDir::new().expect("home");
    let config_dir = home.path().join(".busmirror");
    fs::create_dir_all(&config_dir).expect("config dir");
    fs::write(config_dir.join("tree.yaml"), FIXTURE).expect("fixture");
    fs::write(
        config_dir.join("config.yaml"),
        "service: com.victronenergy.system\nfixture: tree.yaml\n",
    )
    .expect("config");

    busmirror_cmd(home.path())
        .args(["get", "/Dc/Battery/Soc"])
        .assert()
        .success()
        .stdout("87.5\n");
}

#[test]
fn missing_fixture_is_reported() {
    let home = TempDir::new().expect("home");

    busmirror_cmd(home.path())
        .arg("dump")
        .assert()
        .failure()
        .stderr(contains("no fixture configured"));
}

#[test]
fn malformed_config_is_reported() {
    let home = TempDir::new().expect("home");
    let config_dir = home.path().join(".busmirror");
    fs::create_dir_all(&config_dir).expect("config dir");
    fs::write(config_dir.join("config.yaml"), "service: [unclosed\n").expect("config");

    busmirror_cmd(home.path())
        .arg("dump")
        .assert()
        .failure()
        .stderr(contains("failed to load"))
        .stderr(contains("config.yaml"));
}

//! End-to-end binary tests that do not touch the network.

use assert_cmd::Command;
use predicates::prelude::*;

fn stratus() -> Command {
    let mut cmd = Command::cargo_bin("stratus").expect("binary");
    // Isolate from the developer's real config and environment.
    cmd.env_remove("STRATUS_TOKEN")
        .env_remove("STRATUS_ENDPOINT")
        .env_remove("STRATUS_OUTPUT_FORMAT")
        .env_remove("STRATUS_PROFILE")
        .env("STRATUS_CONFIG_FILE", "/nonexistent/.stratusrc");
    cmd
}

#[test]
fn help_lists_resource_families() {
    stratus()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("server"))
        .stdout(predicate::str::contains("database"))
        .stdout(predicate::str::contains("cluster"))
        .stdout(predicate::str::contains("firewall"));
}

#[test]
fn version_subcommand_prints_version() {
    stratus()
        .arg("version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_token_is_a_config_error() {
    stratus()
        .args(["server", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no API token"))
        .stderr(predicate::str::contains("stratus config init"));
}

#[test]
fn unknown_subcommand_fails() {
    stratus()
        .arg("teleport")
        .assert()
        .failure()
        .stderr(predicate::str::contains("teleport"));
}

#[test]
fn invalid_region_value_is_rejected_by_clap() {
    stratus()
        .args([
            "vpc", "create", "--name", "n", "--subnet", "10.0.0.0/24", "--region", "mars-1",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("mars-1"));
}

#[test]
fn invalid_filter_fails_before_any_request() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join(".stratusrc");
    std::fs::write(&path, "[default]\ntoken = \"t\"\n").expect("write");
    stratus()
        .env("STRATUS_CONFIG_FILE", &path)
        .args(["server", "list", "-f", "not a filter"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("filter"));
}

#[test]
fn verbose_flag_enables_debug_logging() {
    stratus()
        .args(["-v", "config", "file"])
        .assert()
        .success()
        .stderr(predicate::str::contains("resolved config path"));
}

#[test]
fn config_file_prints_resolved_path() {
    stratus()
        .args(["config", "file"])
        .assert()
        .success()
        .stdout(predicate::str::contains(".stratusrc"));
}

#[test]
fn config_init_and_dump_round_trip() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join(".stratusrc");

    stratus()
        .env("STRATUS_CONFIG_FILE", &path)
        .args(["config", "init", "--token", "secret-token-1234"])
        .assert()
        .success();

    stratus()
        .env("STRATUS_CONFIG_FILE", &path)
        .args(["config", "dump"])
        .assert()
        .success()
        .stdout(predicate::str::contains("1234"))
        .stdout(predicate::str::contains("secret-token").not());
}

#[test]
fn config_init_refuses_to_overwrite() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join(".stratusrc");
    std::fs::write(&path, "[default]\ntoken = \"t\"\n").expect("write");

    stratus()
        .env("STRATUS_CONFIG_FILE", &path)
        .args(["config", "init", "--token", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("refusing to overwrite"));
}

#[test]
fn unknown_profile_is_reported() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join(".stratusrc");
    std::fs::write(&path, "[default]\ntoken = \"t\"\n").expect("write");

    stratus()
        .env("STRATUS_CONFIG_FILE", &path)
        .args(["-p", "prod", "server", "list"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no such profile 'prod'"));
}

#[test]
fn remove_requires_ids() {
    stratus()
        .args(["server", "remove"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

//! Binary-level tests that stop before any network access

use assert_cmd::Command;
use predicates::prelude::*;

fn cmd() -> Command {
    let mut cmd = Command::cargo_bin("get-aws-secret").unwrap();
    cmd.env_remove("GET_AWS_SECRET_OPTIONS")
        .env_remove("GET_AWS_SECRET_ENCODING");
    cmd
}

#[test]
fn test_help_lists_get_command() {
    cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Secrets Manager"))
        .stdout(predicate::str::contains("get"));
}

#[test]
fn test_get_requires_secret_id() {
    cmd().arg("get").assert().code(2);
}

#[test]
fn test_unknown_encoding_is_usage_error() {
    cmd()
        .args(["get", "SECRET_KEY", "--encoding", "ebcdic"])
        .assert()
        .code(2)
        .stderr(predicate::str::contains("ebcdic"));
}

#[test]
fn test_invalid_options_document_is_config_error() {
    cmd()
        .args(["get", "SECRET_KEY", "--options", "{not json"])
        .assert()
        .code(2)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("--options"));
}

#[test]
fn test_options_document_from_environment() {
    cmd()
        .args(["get", "SECRET_KEY"])
        .env("GET_AWS_SECRET_OPTIONS", r#"{"encoding": "klingon"}"#)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("klingon"));
}

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn validate_prints_the_apply_order() {
    let mut cmd = Command::cargo_bin("stack").unwrap();
    cmd.arg("validate")
        .arg("dev")
        .assert()
        .success()
        .stdout(
            predicate::str::contains("1. stackflow-dev-cluster")
                .and(predicate::str::contains("4. stackflow-dev-identity")),
        );
}

#[test]
fn validate_defaults_to_dev() {
    let mut cmd = Command::cargo_bin("stack").unwrap();
    cmd.env_remove("STACK_ENV")
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackflow-dev-cluster"));
}

#[test]
fn env_flag_selects_the_environment() {
    let mut cmd = Command::cargo_bin("stack").unwrap();
    cmd.arg("validate")
        .arg("-e")
        .arg("prod")
        .assert()
        .success()
        .stdout(predicate::str::contains("stackflow-prod-cluster"));
}

#[test]
fn unknown_environment_is_a_configuration_error() {
    let mut cmd = Command::cargo_bin("stack").unwrap();
    cmd.arg("validate")
        .arg("production")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("unknown environment"));
}

#[test]
fn down_aborts_without_confirmation_and_reports_failure() {
    let mut cmd = Command::cargo_bin("stack").unwrap();
    cmd.arg("down")
        .arg("dev")
        .write_stdin("no\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Aborted, nothing was destroyed"));
}

#[test]
fn down_on_protected_environment_announces_double_confirmation() {
    let mut cmd = Command::cargo_bin("stack").unwrap();
    cmd.arg("down")
        .arg("prod")
        .write_stdin("no\n")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("protected environment"));
}

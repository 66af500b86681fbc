//! # tfwheels Dispatch Integration Tests
//!
//! File: cli/tests/dispatch.rs
//!
//! ## Overview
//!
//! Top-level behavior of the binary: help output, forwarding when terraform
//! is missing, and the hidden upgrade command.
//!
mod common;
use common::*;
use predicates::prelude::*;

#[test]
fn test_no_arguments_shows_help_and_fails() {
    let project = project_with(&[]);
    tfwheels_cmd(project.path())
        .assert()
        .failure()
        .code(1)
        .stdout(
            predicate::str::contains("Additional commands:")
                .and(predicate::str::contains("add-aws-cluster"))
                .and(predicate::str::contains("add-package")),
        );
}

#[test]
fn test_help_flag_lists_plugin_commands() {
    let project = project_with(&[]);
    tfwheels_cmd(project.path())
        .arg("-help")
        .assert()
        .failure()
        .stdout(predicate::str::contains(
            "Adds a configuration file to deploy a package from Universe on DC/OS",
        ));
}

#[test]
fn test_forward_without_terraform_is_a_precondition_error() {
    let project = project_with(&[("main.tf", "variable \"region\" {}\n")]);
    tfwheels_cmd(project.path())
        .arg("plan")
        .assert()
        .failure()
        .code(1)
        .stderr(predicate::str::contains("Error:").and(predicate::str::contains("terraform 0.11.x is required")));
}

#[test]
fn test_unparsable_project_is_reported() {
    let project = project_with(&[("main.tf", "resource \"x\" \"y\" {\n  name = \"unterminated\n}\n")]);
    tfwheels_cmd(project.path())
        .arg("plan")
        .assert()
        .failure()
        .stderr(predicate::str::contains("main.tf"));
}

#[test]
fn test_complete_upgrade_removes_backup() {
    let project = project_with(&[("tfwheels.bak", "old binary")]);
    let backup = project.path().join("tfwheels.bak");
    tfwheels_cmd(project.path())
        .arg("tool-complete-upgrade")
        .arg(&backup)
        .assert()
        .success();
    assert!(!backup.exists());
}

#[test]
fn test_complete_upgrade_requires_backup_path() {
    let project = project_with(&[]);
    tfwheels_cmd(project.path())
        .arg("tool-complete-upgrade")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("tool-complete-upgrade <backup-path>"));
}

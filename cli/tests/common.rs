//! # tfwheels Integration Test Common Helpers
//!
//! File: cli/tests/common.rs
//!
//! ## Overview
//!
//! Shared helpers for the integration tests in `cli/tests/`. Every test runs
//! the compiled binary inside its own temporary project directory with a
//! private home (so no user configuration leaks in), offline version lookups
//! and an empty `PATH`, so no real terraform or ssh tooling is ever found.
//!

// Different test files use different helpers.
#![allow(dead_code)]

pub use assert_cmd::Command;
use std::path::Path;
use tempfile::TempDir;

/// A `tfwheels` command running in `project`.
pub fn tfwheels_cmd(project: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tfwheels").expect("Failed to find tfwheels binary for testing");
    cmd.current_dir(project)
        .env("HOME", project.join(".home"))
        .env("XDG_CONFIG_HOME", project.join(".home/config"))
        .env("TFWHEELS_OFFLINE", "1")
        .env("PATH", "")
        .env_remove("RUST_LOG")
        .env_remove("TFWHEELS_LOG");
    cmd
}

/// A temporary project directory holding `files`.
pub fn project_with(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("Failed to create temp project");
    for (name, contents) in files {
        std::fs::write(dir.path().join(name), contents).expect("Failed to write project file");
    }
    dir
}

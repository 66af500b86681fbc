//! # tfwheels Error Types
//!
//! File: cli/src/core/error.rs
//!
//! ## Overview
//!
//! This module defines the error taxonomy used throughout tfwheels. Every
//! failure the user can observe maps onto one `WheelsError` variant, while
//! application code propagates `anyhow::Error` so context can be layered on
//! as the error travels up to `main`.
//!
//! ## Architecture
//!
//! - `WheelsError`: a `thiserror` enum, one variant per failure class
//!   (parsing, schema, merge, filesystem, validation, network downloads,
//!   arguments, preconditions, external tools, registry collisions).
//! - `Result<T>`: alias for `anyhow::Result<T>`.
//!
//! `main` downcasts to `WheelsError::ExternalTool` to surface terraform's own
//! exit status; everything else exits with status 1.
//!
//! ## Examples
//!
//! ```rust
//! if !path.is_dir() {
//!     anyhow::bail!(WheelsError::FileSystem(format!(
//!         "Not a directory: {}",
//!         path.display()
//!     )));
//! }
//!
//! let tool_failed = err
//!     .downcast_ref::<WheelsError>()
//!     .is_some_and(|e| matches!(e, WheelsError::ExternalTool { .. }));
//! ```
//!
use thiserror::Error;

/// Custom error type for tfwheels.
#[derive(Error, Debug)]
pub enum WheelsError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Could not parse {file}: {message}")]
    Parse { file: String, message: String },

    #[error("Unexpected structure for '{resource}': {message}")]
    Schema { resource: String, message: String },

    #[error("Cannot merge '{resource}': {message}")]
    Merge { resource: String, message: String },

    #[error("Filesystem error: {0}")]
    FileSystem(String),

    #[error("{0}")]
    Validation(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("{0}")]
    Argument(String),

    #[error("{0}")]
    Precondition(String),

    #[error("Template rendering error: {source}")]
    Template {
        #[from]
        source: tera::Error,
    },

    #[error("External command '{command}' failed ({})", exit_label(.status))]
    ExternalTool {
        command: String,
        status: Option<i32>,
    },

    #[error("Command '{name}' is provided by both '{first}' and '{second}' plugins")]
    CommandCollision {
        name: String,
        first: String,
        second: String,
    },
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}

/// Type alias for Result using anyhow::Error for broad compatibility.
pub type Result<T> = anyhow::Result<T>;

/// Returns the exit status of a failed external tool buried anywhere in the
/// error chain, if there is one.
pub fn external_exit_status(err: &anyhow::Error) -> Option<Option<i32>> {
    err.chain().find_map(|cause| match cause.downcast_ref::<WheelsError>() {
        Some(WheelsError::ExternalTool { status, .. }) => Some(*status),
        _ => None,
    })
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    #[test]
    fn test_error_display() {
        let parse_err = WheelsError::Parse {
            file: "main.tf".into(),
            message: "line 3: unterminated string".into(),
        };
        assert_eq!(
            parse_err.to_string(),
            "Could not parse main.tf: line 3: unterminated string"
        );

        let tool_err = WheelsError::ExternalTool {
            command: "terraform plan".into(),
            status: Some(2),
        };
        assert_eq!(
            tool_err.to_string(),
            "External command 'terraform plan' failed (exit status 2)"
        );

        let killed = WheelsError::ExternalTool {
            command: "terraform apply".into(),
            status: None,
        };
        assert!(killed.to_string().contains("terminated by signal"));
    }

    #[test]
    fn test_external_exit_status_through_context() {
        let err: anyhow::Error = Err::<(), _>(WheelsError::ExternalTool {
            command: "terraform".into(),
            status: Some(3),
        })
        .context("while forwarding")
        .unwrap_err();
        assert_eq!(external_exit_status(&err), Some(Some(3)));

        let other = anyhow::anyhow!(WheelsError::Validation("nope".into()));
        assert_eq!(external_exit_status(&other), None);
    }
}

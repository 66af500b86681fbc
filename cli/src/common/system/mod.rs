//! # tfwheels System Utilities (`common::system`)
//!
//! File: cli/src/common/system/mod.rs
//!
//! ## Overview
//!
//! Host-level collaborators used by the built-in plugins. Each one is
//! exposed as a small trait so plugins can be exercised against fakes:
//!
//! - **`aws`**: AWS credential validity check and the `maws` refresher.
//! - **`sshagent`**: a private `ssh-agent` bound to a socket in the sandbox.
//! - **`keygen`**: in-process RSA key pair generation (OpenSSH format).
//!
//! The helpers below locate host tools and identify the current user.
//!
pub mod aws;
pub mod keygen;
pub mod sshagent;

use crate::core::error::{Result, WheelsError};
use std::path::PathBuf;

/// Looks `name` up on `PATH`.
pub fn find_tool(name: &str) -> Result<PathBuf> {
    which::which(name).map_err(|_| {
        WheelsError::Precondition(format!("Could not find {} in your system", name)).into()
    })
}

/// Login name of the invoking user, falling back to `$USER`.
pub fn current_username() -> Option<String> {
    #[cfg(unix)]
    {
        if let Ok(Some(user)) = nix::unistd::User::from_uid(nix::unistd::getuid()) {
            return Some(user.name);
        }
    }
    std::env::var("USER").ok().filter(|name| !name.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_tool_reports_missing_binary() {
        let err = find_tool("tfwheels-definitely-not-installed").unwrap_err();
        assert!(err.to_string().contains("Could not find tfwheels-definitely-not-installed"));
    }

    #[test]
    fn test_find_tool_locates_shell() {
        assert!(find_tool("sh").is_ok());
    }
}

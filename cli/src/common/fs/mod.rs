//! # tfwheels Filesystem Utilities
//!
//! File: cli/src/common/fs/mod.rs
//!
//! Filesystem helpers shared by the sandbox and the ssh collaborators.
//! Import from the submodule, e.g. `use crate::common::fs::io::write_file;`.
//!

/// Basic file I/O operations (`ensure_dir_exists`, `write_file`, `move_file`, ...).
pub mod io;

//! # tfwheels Common Utilities (`common`)
//!
//! File: cli/src/common/mod.rs
//!
//! ## Overview
//!
//! Shared collaborators used by the plugins, the dispatcher and the binary.
//! Everything that touches the host (filesystem, processes, terraform,
//! ssh-agent, AWS, the network) lives here, behind small traits where a
//! plugin needs to be tested without the real thing.
//!
//! ## Architecture
//!
//! - **`crypt`**: SHA-512 crypt password hashes.
//! - **`fs`**: file I/O helpers (`io`).
//! - **`network`**: upstream version lookups (`VersionLookup`) and artifact
//!   downloads (`Fetcher`, checksums, archives).
//! - **`process`**: running helper programs and supervising terraform.
//! - **`system`**: AWS credentials, ssh-agent, key pair generation.
//! - **`terraform`**: the `ExternalTool` wrapper and its locator.
//! - **`ui`**: the user-facing output sink.
//! - **`upgrade`**: self-upgrade from the latest release.
//!

/// SHA-512 crypt password hashing.
pub mod crypt;
/// Filesystem helpers.
pub mod fs;
/// Upstream version lookups and downloads.
pub mod network;
/// External process execution.
pub mod process;
/// Host collaborators (AWS credentials, ssh-agent, key pairs).
pub mod system;
/// The terraform wrapper.
pub mod terraform;
/// User-facing output.
pub mod ui;
/// Self-upgrade.
pub mod upgrade;

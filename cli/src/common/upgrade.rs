//! # Self-upgrade
//!
//! File: cli/src/common/upgrade.rs
//!
//! `tfwheels tool-upgrade` looks up the latest GitHub release of tfwheels,
//! and when it is newer than the running binary:
//! 1. renames the running executable to `<exe>.bak`;
//! 2. downloads the release asset built for this OS and extracts the
//!    executable in its place (restoring the backup on failure);
//! 3. starts the new binary as `tfwheels tool-complete-upgrade <exe>.bak`.
//!
//! The running binary cannot delete its predecessor while that process is
//! still alive, which is why the new one removes the backup after a short
//! grace period.
//!
use crate::common::fs::io;
use crate::common::network::{artifact, parse_lenient, Fetcher};
use crate::common::ui::Ui;
use crate::core::error::{Result, WheelsError};
use anyhow::Context;
use semver::Version;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::thread;
use std::time::Duration;
use tracing::debug;

/// Hidden subcommand that finishes an upgrade.
pub const COMPLETE_UPGRADE_COMMAND: &str = "tool-complete-upgrade";
/// Hidden subcommand that checks for and installs a newer release.
pub const UPGRADE_COMMAND: &str = "tool-upgrade";

pub const LATEST_RELEASE_URL: &str =
    "https://api.github.com/repos/mesosphere-incubator/terraform-launch/releases/latest";

const GRACE_PERIOD: Duration = Duration::from_millis(500);

/// A published release and the asset to install for this platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LatestVersion {
    pub version: Version,
    pub url: String,
}

#[derive(Debug, Deserialize)]
struct ReleasePayload {
    tag_name: Option<String>,
    assets: Option<Vec<Asset>>,
}

#[derive(Debug, Deserialize)]
struct Asset {
    browser_download_url: Option<String>,
}

fn invalid(message: impl Into<String>) -> anyhow::Error {
    WheelsError::Validation(message.into()).into()
}

/// Reads a GitHub "latest release" payload. The asset is the first one
/// whose URL mentions `os`.
pub fn parse_latest(payload: &[u8], os: &str) -> Result<LatestVersion> {
    let release: ReleasePayload = serde_json::from_slice(payload)
        .map_err(|e| invalid(format!("error parsing version info: {}", e)))?;
    let tag = release
        .tag_name
        .ok_or_else(|| invalid("invalid version info: missing `tag_name`"))?;
    let raw = tag
        .strip_prefix('v')
        .ok_or_else(|| invalid(format!("invalid tag name '{}'", tag)))?;
    let assets = release
        .assets
        .ok_or_else(|| invalid("invalid version info: missing `assets`"))?;
    let url = assets
        .into_iter()
        .filter_map(|asset| asset.browser_download_url)
        .find(|url| url.contains(os))
        .ok_or_else(|| invalid("could not find a download URL"))?;
    let version = parse_lenient(raw)
        .ok_or_else(|| invalid(format!("Could not parse released version '{}'", raw)))?;
    Ok(LatestVersion { version, url })
}

/// Asks the release API for the latest version.
pub fn latest_version(fetcher: &dyn Fetcher) -> Result<LatestVersion> {
    let payload = fetcher.fetch(LATEST_RELEASE_URL)?;
    parse_latest(&payload, os_tag())
}

/// The name release assets use for this OS.
fn os_tag() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn backup_path(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}

/// Replaces `target` with the executable from `latest`, then starts it with
/// the completion command. Returns the backup path.
pub fn perform_upgrade(fetcher: &dyn Fetcher, latest: &LatestVersion, target: &Path) -> Result<PathBuf> {
    let dir = target
        .parent()
        .ok_or_else(|| invalid(format!("could not find the location of {}", target.display())))?;
    let file_name = target
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| invalid(format!("could not find the location of {}", target.display())))?;
    let backup = backup_path(target);

    io::move_file(target, &backup).context("could not rename old version")?;

    let installed = fetcher.fetch(&latest.url).and_then(|data| {
        let written = artifact::extract_to(&latest.url, &data, dir, Some(&[file_name]))?;
        if written.is_empty() {
            anyhow::bail!(invalid(format!("{} does not contain {}", latest.url, file_name)));
        }
        io::make_executable(target)
    });
    if let Err(e) = installed {
        let _ = io::remove_file_if_exists(target);
        let _ = io::move_file(&backup, target);
        return Err(e.context("could not process file stream"));
    }

    debug!("Starting {} {} {}", target.display(), COMPLETE_UPGRADE_COMMAND, backup.display());
    if let Err(e) = Command::new(target).arg(COMPLETE_UPGRADE_COMMAND).arg(&backup).spawn() {
        let mut check = target.as_os_str().to_os_string();
        check.push(".check");
        let _ = io::move_file(target, &PathBuf::from(check));
        let _ = io::move_file(&backup, target);
        return Err(anyhow::Error::new(e).context("could not run the new version"));
    }
    Ok(backup)
}

/// Upgrades the running executable when a newer release exists. Returns
/// whether an upgrade was installed.
pub fn upgrade_if_newer(fetcher: &dyn Fetcher, current: &Version, target: &Path, ui: &Ui) -> Result<bool> {
    let latest = latest_version(fetcher)?;
    if latest.version <= *current {
        ui.info(format!("You are running the latest version (v{})", current));
        return Ok(false);
    }
    ui.info(format!("Upgrading from v{} to v{}", current, latest.version));
    perform_upgrade(fetcher, &latest, target)?;
    ui.info(format!("Installed v{} at {}", latest.version, target.display()));
    Ok(true)
}

/// Waits for the previous process to exit, then deletes `backup`.
pub fn complete_upgrade(backup: &Path) -> Result<()> {
    thread::sleep(GRACE_PERIOD);
    debug!("Removing previous binary {}", backup.display());
    io::remove_file_if_exists(backup)
}

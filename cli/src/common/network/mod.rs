//! # tfwheels Upstream Version Lookups (`common::network`)
//!
//! File: cli/src/common/network/mod.rs
//!
//! ## Overview
//!
//! Generated cluster files pin the latest released `dcos-terraform` AWS
//! module and the latest DC/OS version. Both are looked up on the network
//! with a short timeout; any failure, or offline mode, yields the configured
//! default so generation never blocks on connectivity.
//!
//! ## Sources
//!
//! - GitHub releases of `dcos-terraform/terraform-aws-dcos` (`tag_name`).
//! - `https://versions.d2iq.com/version`: a map of variant to a list of
//!   `{ "Version": ... }` entries.
//!
//! Versions are compared with `semver` after a lenient normalization
//! (`v` prefix dropped, missing components filled with zero).
//!
//! ## Artifacts
//!
//! Binaries (terraform, new tfwheels releases) are fetched through the
//! `Fetcher` trait. `HttpFetcher` is the real implementation. The `artifact`
//! submodule verifies checksums and unpacks archives.
//!
pub mod artifact;

use crate::core::config::UpstreamConfig;
use crate::core::error::{Result, WheelsError};
use reqwest::blocking::Client;
use semver::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::time::Duration;
use tracing::debug;

pub const MODULE_RELEASES_URL: &str =
    "https://api.github.com/repos/dcos-terraform/terraform-aws-dcos/releases";
pub const DCOS_VERSIONS_URL: &str = "https://versions.d2iq.com/version";

/// Time allowed for a whole artifact download.
pub const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(300);

/// Fetches a URL into memory.
pub trait Fetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Blocking HTTP `Fetcher`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("tfwheels/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WheelsError::Network(format!("Could not build HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

impl Fetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| WheelsError::Network(format!("GET {} failed: {}", url, e)))?;
        let bytes = response
            .bytes()
            .map_err(|e| WheelsError::Network(format!("Reading {} failed: {}", url, e)))?;
        Ok(bytes.to_vec())
    }
}

pub trait VersionLookup {
    fn latest_module_version(&self) -> String;
    fn latest_dcos_version(&self, variant: &str) -> String;
}

#[derive(Debug, Deserialize)]
struct Release {
    tag_name: String,
}

#[derive(Debug, Deserialize)]
struct PackageVersion {
    #[serde(rename = "Version")]
    version: String,
}

/// Parses `v1.2`, `1.2.3` or `2.0.0-beta` into a `semver::Version`.
pub fn parse_lenient(raw: &str) -> Option<Version> {
    let trimmed = raw.trim().trim_start_matches('v');
    if let Ok(version) = Version::parse(trimmed) {
        return Some(version);
    }
    let (core, suffix) = match trimmed.find(['-', '+']) {
        Some(idx) => trimmed.split_at(idx),
        None => (trimmed, ""),
    };
    let mut parts: Vec<&str> = core.split('.').collect();
    if parts.is_empty() || parts.len() > 3 || parts.iter().any(|p| p.is_empty()) {
        return None;
    }
    while parts.len() < 3 {
        parts.push("0");
    }
    Version::parse(&format!("{}{}", parts.join("."), suffix)).ok()
}

/// Latest release in a GitHub releases payload, or `None`.
pub fn latest_release(payload: &str) -> Option<String> {
    let releases: Vec<Release> = serde_json::from_str(payload).ok()?;
    releases
        .iter()
        .filter_map(|release| parse_lenient(&release.tag_name))
        .max()
        .map(|version| version.to_string())
}

/// Latest version of `variant` in a versions.d2iq.com payload, or `None`.
pub fn latest_dcos(payload: &str, variant: &str) -> Option<String> {
    let mut data: BTreeMap<String, Vec<PackageVersion>> = serde_json::from_str(payload).ok()?;
    data.remove(variant)?
        .into_iter()
        .filter_map(|pkg| parse_lenient(&pkg.version).map(|parsed| (parsed, pkg.version)))
        .max_by(|a, b| a.0.cmp(&b.0))
        .map(|(_, raw)| raw)
}

/// Network-backed `VersionLookup`.
#[derive(Debug)]
pub struct UpstreamVersions {
    client: Option<Client>,
    default_module_version: String,
    default_dcos_version: String,
}

impl UpstreamVersions {
    pub fn from_config(config: &UpstreamConfig) -> Self {
        let client = if config.offline {
            debug!("Upstream lookups disabled (offline)");
            None
        } else {
            Client::builder()
                .timeout(Duration::from_secs(config.timeout_secs))
                .user_agent(concat!("tfwheels/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|e| debug!("Could not build HTTP client: {}", e))
                .ok()
        };
        Self {
            client,
            default_module_version: config.default_module_version.clone(),
            default_dcos_version: config.default_dcos_version.clone(),
        }
    }

    fn fetch(&self, url: &str) -> Option<String> {
        let client = self.client.as_ref()?;
        let response = client
            .get(url)
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|e| debug!("GET {} failed: {}", url, e))
            .ok()?;
        response
            .text()
            .map_err(|e| debug!("Reading {} failed: {}", url, e))
            .ok()
    }
}

impl VersionLookup for UpstreamVersions {
    fn latest_module_version(&self) -> String {
        self.fetch(MODULE_RELEASES_URL)
            .and_then(|payload| latest_release(&payload))
            .unwrap_or_else(|| self.default_module_version.clone())
    }

    fn latest_dcos_version(&self, variant: &str) -> String {
        self.fetch(DCOS_VERSIONS_URL)
            .and_then(|payload| latest_dcos(&payload, variant))
            .unwrap_or_else(|| self.default_dcos_version.clone())
    }
}

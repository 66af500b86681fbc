//! # tfwheels Terraform Wrapper
//!
//! File: cli/src/common/terraform.rs
//!
//! ## Overview
//!
//! The wrapped tool is consumed through the `ExternalTool` trait: query its
//! version, add environment variables, invoke it with an argument list. The
//! concrete `TerraformWrapper` runs the binary in the sandbox with inherited
//! stdio.
//!
//! ## Architecture
//!
//! - `ExternalTool`: version / set_env / invoke.
//! - `ToolResolver`: knows how to find a usable binary for a sandbox.
//!   `TerraformLocator` tries, in order: the configured binary, a `terraform`
//!   on `PATH` whose version matches the required prefix, the cached copy
//!   in `.terraform/bin/terraform`, and finally a download of the pinned
//!   upstream release into that cache (checksum-verified, skipped offline).
//! - `ToolHandle`: resolves lazily on first use and keeps the tool (and any
//!   environment set on it) for the rest of the invocation. Plugin commands
//!   that never touch terraform therefore never require it.
//!
use crate::common::fs::io;
use crate::common::network::{artifact, Fetcher, HttpFetcher, DOWNLOAD_TIMEOUT};
use crate::common::process;
use crate::common::ui::Ui;
use crate::core::config::{Config, PROJECT_CONFIG_FILENAME};
use crate::core::error::{Result, WheelsError};
use crate::project::sandbox::{Sandbox, RESERVED_DIR};
use anyhow::Context;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// The terraform release downloaded when none is available locally.
pub const UPSTREAM_TERRAFORM_VERSION: &str = "0.11.14";

/// A downloadable terraform build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TerraformRelease {
    pub version: String,
    pub url: String,
    pub sha256: String,
}

/// The pinned upstream build for `os`/`arch` (as in `std::env::consts`).
pub fn upstream_release(os: &str, arch: &str) -> Result<TerraformRelease> {
    let (platform, sha256) = match (os, arch) {
        ("linux", "x86_64") => (
            "linux_amd64",
            "9b9a4492738c69077b079e595f5b2a9ef1bc4e8fb5596610f69a6f322a8af8dd",
        ),
        ("linux", "x86") => (
            "linux_386",
            "0b6b2c61b80a35646df2cb7d443efeba3f4dedcdecbabab3b2626c2ea8976e87",
        ),
        ("macos", "x86_64") => (
            "darwin_amd64",
            "829bdba148afbd61eab4aafbc6087838f0333d8876624fe2ebc023920cfc2ad5",
        ),
        _ => anyhow::bail!(WheelsError::Precondition(format!(
            "You are running an unsupported OS/Arch combination ({}/{})",
            os, arch
        ))),
    };
    Ok(TerraformRelease {
        version: UPSTREAM_TERRAFORM_VERSION.to_string(),
        url: format!(
            "https://releases.hashicorp.com/terraform/{v}/terraform_{v}_{p}.zip",
            v = UPSTREAM_TERRAFORM_VERSION,
            p = platform
        ),
        sha256: sha256.to_string(),
    })
}

/// The provisioning tool, as seen by the dispatcher and the plugins.
pub trait ExternalTool {
    fn version(&self) -> Result<String>;
    /// Adds an environment variable for subsequent invocations.
    fn set_env(&mut self, key: &str, value: &str);
    /// Runs the tool to completion. A non-zero exit is `WheelsError::ExternalTool`.
    fn invoke(&mut self, args: &[String]) -> Result<()>;
}

/// Finds a usable tool for a sandbox.
pub trait ToolResolver {
    fn resolve(&self, sandbox: &Sandbox) -> Result<Box<dyn ExternalTool>>;
}

/// Extracts `0.11.14` from `Terraform v0.11.14\n...`.
pub fn parse_version(output: &str) -> Option<String> {
    let re = Regex::new(r"Terraform v([0-9\.]+)").ok()?;
    re.captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('.').to_string())
}

#[derive(Debug)]
pub struct TerraformWrapper {
    binary: PathBuf,
    workdir: PathBuf,
    env: BTreeMap<String, String>,
}

impl TerraformWrapper {
    pub fn new(binary: impl Into<PathBuf>, workdir: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            workdir: workdir.into(),
            env: BTreeMap::new(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }
}

impl ExternalTool for TerraformWrapper {
    fn version(&self) -> Result<String> {
        let output = process::run_and_collect(&self.binary, &["--version"], &self.env)?;
        if !output.success() {
            anyhow::bail!(WheelsError::ExternalTool {
                command: format!("{} --version", self.binary.display()),
                status: output.status,
            });
        }
        parse_version(&output.stdout).ok_or_else(|| {
            WheelsError::Precondition(format!(
                "Could not determine the version of {}",
                self.binary.display()
            ))
            .into()
        })
    }

    fn set_env(&mut self, key: &str, value: &str) {
        debug!("terraform env {}={}", key, value);
        self.env.insert(key.to_string(), value.to_string());
    }

    fn invoke(&mut self, args: &[String]) -> Result<()> {
        info!("Invoking {} {}", self.binary.display(), args.join(" "));
        let status = process::run_passthrough(&self.binary, args, &self.env, &self.workdir)?;
        match status {
            Some(0) => Ok(()),
            status => Err(WheelsError::ExternalTool {
                command: format!("terraform {}", args.join(" ")).trim_end().to_string(),
                status,
            }
            .into()),
        }
    }
}

/// Where a missing terraform is downloaded from.
pub struct TerraformDownload {
    pub release: TerraformRelease,
    pub fetcher: Box<dyn Fetcher>,
}

/// Locates terraform the way the configuration asks for.
pub struct TerraformLocator {
    required_prefix: String,
    configured: Option<PathBuf>,
    download: Option<TerraformDownload>,
    ui: Ui,
}

impl TerraformLocator {
    pub fn new(required_prefix: impl Into<String>, configured: Option<PathBuf>, ui: Ui) -> Self {
        Self {
            required_prefix: required_prefix.into(),
            configured,
            download: None,
            ui,
        }
    }

    /// The locator for `config`. Downloads are enabled unless offline or on
    /// a platform without an upstream build.
    pub fn from_config(config: &Config, ui: Ui) -> Self {
        let locator = Self::new(
            config.terraform.required_version_prefix.clone(),
            config.terraform.binary.as_ref().map(PathBuf::from),
            ui,
        );
        if config.upstream.offline {
            debug!("terraform download disabled (offline)");
            return locator;
        }
        let release = upstream_release(std::env::consts::OS, std::env::consts::ARCH);
        match (release, HttpFetcher::new(DOWNLOAD_TIMEOUT)) {
            (Ok(release), Ok(fetcher)) => locator.with_download(TerraformDownload {
                release,
                fetcher: Box::new(fetcher),
            }),
            (Err(e), _) | (_, Err(e)) => {
                debug!("terraform download unavailable: {:#}", e);
                locator
            }
        }
    }

    pub fn with_download(mut self, download: TerraformDownload) -> Self {
        self.download = Some(download);
        self
    }

    fn fetch_into(&self, download: &TerraformDownload, cached: &Path, workdir: &Path) -> Result<TerraformWrapper> {
        let bin_dir = cached.parent().unwrap_or(workdir);
        io::ensure_dir_exists(bin_dir).context("Unable to create terraform directory")?;

        self.ui.info(format!("Downloading terraform v{}", download.release.version));
        let data = download.fetcher.fetch(&download.release.url)?;
        artifact::verify_sha256(&data, &download.release.sha256)
            .with_context(|| format!("Refusing to use {}", download.release.url))?;
        artifact::unzip_to(&data, bin_dir, Some(&["terraform"]))?;
        if !cached.is_file() {
            anyhow::bail!(WheelsError::Validation(format!(
                "{} does not contain a terraform binary",
                download.release.url
            )));
        }
        io::make_executable(cached)?;

        let wrapper = TerraformWrapper::new(cached, workdir);
        let version = wrapper.version().map_err(|_| {
            WheelsError::Precondition(
                "Unable to execute the cached terraform binary. Try deleting .terraform directory and re-run again."
                    .to_string(),
            )
        })?;
        if version != download.release.version {
            anyhow::bail!(WheelsError::Precondition(
                "Unexpected cached terraform version. Try deleting .terraform directory and re-run again"
                    .to_string()
            ));
        }
        self.ui.info(format!("Using project-local terraform v{}", version));
        Ok(wrapper)
    }
}

impl ToolResolver for TerraformLocator {
    fn resolve(&self, sandbox: &Sandbox) -> Result<Box<dyn ExternalTool>> {
        let workdir = sandbox.base_dir();
        if let Some(binary) = &self.configured {
            debug!("Using configured terraform at {}", binary.display());
            return Ok(Box::new(TerraformWrapper::new(binary, workdir)));
        }

        if let Ok(binary) = which::which("terraform") {
            let candidate = TerraformWrapper::new(&binary, workdir);
            match candidate.version() {
                Ok(version) if version.starts_with(&self.required_prefix) => {
                    debug!("Using terraform {} from {}", version, binary.display());
                    return Ok(Box::new(candidate));
                }
                Ok(version) => debug!(
                    "Ignoring terraform {} at {} (need {}x)",
                    version,
                    binary.display(),
                    self.required_prefix
                ),
                Err(e) => debug!("Ignoring terraform at {}: {:#}", binary.display(), e),
            }
        }

        let cached = sandbox.base_dir().join(RESERVED_DIR).join("bin").join("terraform");
        if cached.is_file() {
            debug!("Using cached terraform at {}", cached.display());
            return Ok(Box::new(TerraformWrapper::new(cached, workdir)));
        }

        if let Some(download) = &self.download {
            return Ok(Box::new(self.fetch_into(download, &cached, workdir)?));
        }

        anyhow::bail!(WheelsError::Precondition(format!(
            "terraform {}x is required. Install it on your PATH, set terraform.binary in {}, or place it at {}",
            self.required_prefix,
            PROJECT_CONFIG_FILENAME,
            cached.display()
        )))
    }
}

/// Lazily resolved tool shared by the dispatcher and the plugins.
pub struct ToolHandle {
    resolver: Box<dyn ToolResolver>,
    tool: Option<Box<dyn ExternalTool>>,
}

impl ToolHandle {
    pub fn new(resolver: Box<dyn ToolResolver>) -> Self {
        Self {
            resolver,
            tool: None,
        }
    }

    /// Resolves the tool on first use.
    pub fn get(&mut self, sandbox: &Sandbox) -> Result<&mut dyn ExternalTool> {
        let tool = match self.tool.take() {
            Some(tool) => tool,
            None => self.resolver.resolve(sandbox)?,
        };
        Ok(self.tool.insert(tool).as_mut())
    }
}

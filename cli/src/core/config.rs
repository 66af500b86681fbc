//! # tfwheels Configuration System
//!
//! File: cli/src/core/config.rs
//!
//! ## Overview
//!
//! This module loads, merges and validates the tfwheels configuration. Most
//! users never write one: every setting has a default, and the files only
//! exist to pin a terraform binary, work offline, or change the defaults
//! baked into generated cluster files.
//!
//! ## Architecture
//!
//! Configuration sources (in order of precedence):
//! 1. Project-specific `.tfwheels.toml` in the sandbox root
//! 2. User-specific `<config dir>/tfwheels/config.toml`
//! 3. Default values defined in the code
//!
//! The `TFWHEELS_OFFLINE` environment variable forces `upstream.offline`.
//!
//! ## Examples
//!
//! ```toml
//! [terraform]
//! binary = "~/bin/terraform-0.11.14"
//!
//! [upstream]
//! offline = true
//!
//! [cluster]
//! region = "eu-central-1"
//! expiration = "4h"
//! ```
//!
use crate::core::error::{Result, WheelsError};
use anyhow::{anyhow, Context};
use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Represents the main configuration structure, loaded from TOML files.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub terraform: TerraformConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub cluster: ClusterConfig,
}

/// How the terraform binary is located.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct TerraformConfig {
    /// Version prefix a terraform found on `PATH` must report.
    #[serde(default = "default_version_prefix")]
    pub required_version_prefix: String,
    /// Explicit terraform binary (can use ~). Skips the `PATH` lookup.
    #[serde(default)]
    pub binary: Option<String>,
}

/// Remote version lookups used when generating files.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    #[serde(default)]
    pub offline: bool,
    #[serde(default = "default_module_version")]
    pub default_module_version: String,
    #[serde(default = "default_dcos_version")]
    pub default_dcos_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Defaults for `add-aws-cluster`.
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct ClusterConfig {
    #[serde(default = "default_region")]
    pub region: String,
    /// Base name of the generated SSH key pair (`<key_name>` / `<key_name>.pub`).
    #[serde(default = "default_key_name")]
    pub key_name: String,
    #[serde(default = "default_expiration")]
    pub expiration: String,
}

impl Default for TerraformConfig {
    fn default() -> Self {
        Self {
            required_version_prefix: default_version_prefix(),
            binary: None,
        }
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            offline: false,
            default_module_version: default_module_version(),
            default_dcos_version: default_dcos_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            key_name: default_key_name(),
            expiration: default_expiration(),
        }
    }
}

fn default_version_prefix() -> String {
    "0.11.".to_string()
}
fn default_module_version() -> String {
    "0.2.0".to_string()
}
fn default_dcos_version() -> String {
    "2.0.0".to_string()
}
fn default_timeout_secs() -> u64 {
    5
}
fn default_region() -> String {
    "us-west-2".to_string()
}
fn default_key_name() -> String {
    "cluster-key".to_string()
}
fn default_expiration() -> String {
    "1h".to_string()
}

pub const PROJECT_CONFIG_FILENAME: &str = ".tfwheels.toml";
const OFFLINE_ENV: &str = "TFWHEELS_OFFLINE";

pub fn load_config(sandbox_dir: &Path) -> Result<Config> {
    let user_config = load_user_config()?;
    let project_config = load_project_config(sandbox_dir)?;
    let mut merged_config = merge_configs(user_config.unwrap_or_default(), project_config);
    apply_env_overrides(&mut merged_config);
    expand_config_paths(&mut merged_config).context("Failed to expand paths in configuration")?;
    validate_config(&merged_config).context("Configuration validation failed")?;
    debug!("Final loaded configuration: {:?}", merged_config);
    Ok(merged_config)
}

fn load_user_config() -> Result<Option<Config>> {
    if let Some(proj_dirs) = ProjectDirs::from("io", "tfwheels", "tfwheels") {
        let config_path = proj_dirs.config_dir().join("config.toml");
        if config_path.exists() {
            info!("Loading user configuration from: {}", config_path.display());
            load_config_from_path(&config_path).map(Some)
        } else {
            debug!(
                "User configuration file not found at {}",
                config_path.display()
            );
            Ok(None)
        }
    } else {
        warn!("Could not determine user config directory.");
        Ok(None)
    }
}

fn load_project_config(sandbox_dir: &Path) -> Result<Option<Config>> {
    let path = sandbox_dir.join(PROJECT_CONFIG_FILENAME);
    if path.is_file() {
        info!("Loading project configuration from: {}", path.display());
        load_config_from_path(&path).map(Some)
    } else {
        debug!("No project configuration file at {}", path.display());
        Ok(None)
    }
}

fn load_config_from_path(path: &Path) -> Result<Config> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read configuration file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse TOML from file: {}", path.display()))
}

fn merge_configs(user: Config, project: Option<Config>) -> Config {
    let project_cfg = match project {
        Some(p) => p,
        None => return user,
    };
    let mut merged = Config::default();
    merged.terraform.required_version_prefix =
        if project_cfg.terraform.required_version_prefix != default_version_prefix() {
            project_cfg.terraform.required_version_prefix
        } else {
            user.terraform.required_version_prefix
        };
    merged.terraform.binary = project_cfg.terraform.binary.or(user.terraform.binary);
    merged.upstream.offline = project_cfg.upstream.offline || user.upstream.offline;
    merged.upstream.default_module_version =
        if project_cfg.upstream.default_module_version != default_module_version() {
            project_cfg.upstream.default_module_version
        } else {
            user.upstream.default_module_version
        };
    merged.upstream.default_dcos_version =
        if project_cfg.upstream.default_dcos_version != default_dcos_version() {
            project_cfg.upstream.default_dcos_version
        } else {
            user.upstream.default_dcos_version
        };
    merged.upstream.timeout_secs = if project_cfg.upstream.timeout_secs != default_timeout_secs()
    {
        project_cfg.upstream.timeout_secs
    } else {
        user.upstream.timeout_secs
    };
    merged.cluster.region = if project_cfg.cluster.region != default_region() {
        project_cfg.cluster.region
    } else {
        user.cluster.region
    };
    merged.cluster.key_name = if project_cfg.cluster.key_name != default_key_name() {
        project_cfg.cluster.key_name
    } else {
        user.cluster.key_name
    };
    merged.cluster.expiration = if project_cfg.cluster.expiration != default_expiration() {
        project_cfg.cluster.expiration
    } else {
        user.cluster.expiration
    };
    merged
}

fn apply_env_overrides(config: &mut Config) {
    if let Ok(value) = std::env::var(OFFLINE_ENV) {
        let value = value.trim().to_ascii_lowercase();
        if !value.is_empty() && value != "0" && value != "false" {
            debug!("{} is set, disabling upstream lookups", OFFLINE_ENV);
            config.upstream.offline = true;
        }
    }
}

fn expand_config_paths(config: &mut Config) -> Result<()> {
    if let Some(binary) = config.terraform.binary.as_mut() {
        *binary = shellexpand::tilde(binary.as_str()).into_owned();
        debug!("Expanded terraform binary path: {}", binary);
    }
    Ok(())
}

fn validate_config(config: &Config) -> Result<()> {
    if let Some(binary) = &config.terraform.binary {
        let path = PathBuf::from(binary);
        if !path.is_file() {
            return Err(anyhow!(WheelsError::Config(format!(
                "Configured terraform binary '{}' does not exist or is not a file.",
                path.display()
            ))));
        }
    }
    if config.upstream.timeout_secs == 0 {
        return Err(anyhow!(WheelsError::Config(
            "upstream.timeout_secs must be greater than zero.".to_string()
        )));
    }
    let key_name = &config.cluster.key_name;
    if key_name.is_empty() || key_name.contains('/') || key_name.starts_with('.') {
        return Err(anyhow!(WheelsError::Config(format!(
            "Invalid cluster.key_name '{}': expected a plain, non-hidden file name.",
            key_name
        ))));
    }
    if config.cluster.region.trim().is_empty() {
        return Err(anyhow!(WheelsError::Config(
            "cluster.region cannot be empty.".to_string()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_deserialize_partial_toml() {
        let toml_content = r#"
            [terraform]
            binary = "~/bin/terraform"

            [cluster]
            region = "eu-central-1"
        "#;

        let config: Config = toml::from_str(toml_content).expect("Failed to parse TOML");

        assert_eq!(config.terraform.binary.as_deref(), Some("~/bin/terraform"));
        assert_eq!(config.terraform.required_version_prefix, "0.11.");
        assert_eq!(config.cluster.region, "eu-central-1");
        assert_eq!(config.cluster.key_name, "cluster-key");
        assert_eq!(config.upstream.default_module_version, "0.2.0");
        assert!(!config.upstream.offline);
    }

    #[test]
    fn test_unknown_key_rejected() {
        let result: std::result::Result<Config, _> = toml::from_str("[cluster]\nzone = \"a\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_project_overrides_user() {
        let user = Config {
            cluster: ClusterConfig {
                region: "us-east-1".into(),
                expiration: "8h".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let project = Config {
            cluster: ClusterConfig {
                region: "eu-west-1".into(),
                ..Default::default()
            },
            ..Default::default()
        };

        let merged = merge_configs(user, Some(project));
        assert_eq!(merged.cluster.region, "eu-west-1");
        // Left at default in the project file, so the user value survives.
        assert_eq!(merged.cluster.expiration, "8h");
    }

    #[test]
    fn test_path_expansion() {
        let mut config = Config {
            terraform: TerraformConfig {
                binary: Some("~/tools/terraform".into()),
                ..Default::default()
            },
            ..Default::default()
        };

        expand_config_paths(&mut config).unwrap();

        let home_dir = dirs::home_dir().unwrap();
        assert_eq!(
            config.terraform.binary.unwrap(),
            home_dir.join("tools/terraform").to_string_lossy()
        );
    }

    #[test]
    fn test_load_project_config_from_sandbox() {
        let temp_dir = tempdir().unwrap();
        fs::write(
            temp_dir.path().join(PROJECT_CONFIG_FILENAME),
            "[upstream]\noffline = true\ndefault_dcos_version = \"1.13.4\"\n",
        )
        .unwrap();

        let config = load_project_config(temp_dir.path()).unwrap().unwrap();
        assert!(config.upstream.offline);
        assert_eq!(config.upstream.default_dcos_version, "1.13.4");
    }

    #[test]
    fn test_validate_config_missing_binary() {
        let config = Config {
            terraform: TerraformConfig {
                binary: Some("/definitely/not/here/terraform".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let result = validate_config(&config);
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("does not exist or is not a file"));
    }

    #[test]
    fn test_validate_config_bad_key_name() {
        let config = Config {
            cluster: ClusterConfig {
                key_name: "keys/cluster".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(validate_config(&config).is_err());
        assert!(validate_config(&Config::default()).is_ok());
    }
}

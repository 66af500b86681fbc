//! # AWS Credentials
//!
//! File: cli/src/common/system/aws.rs
//!
//! `AwsCredentialCheck` resolves the default AWS credential chain (env,
//! profile, SSO, instance metadata) with `aws-config` on a private
//! current-thread runtime. The credentials are valid when they resolve, have
//! not expired, and STS `GetCallerIdentity` accepts them, so revoked or
//! mistyped static keys are caught too. `MawsRefresher` renews them through
//! `maws`.
//!
use crate::common::process;
use crate::core::error::{Result, WheelsError};
use anyhow::Context;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_credential_types::provider::ProvideCredentials;
#[cfg(test)]
use aws_credential_types::Credentials;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

pub trait CredentialCheck {
    fn credentials_valid(&self) -> bool;
}

pub trait CredentialRefresher {
    /// True when a refresh could be attempted at all.
    fn is_available(&self) -> bool;
    fn refresh(&self) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct AwsCredentialCheck {
    region: String,
    #[cfg(test)]
    overrides: Option<(String, Credentials)>,
}

impl AwsCredentialCheck {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            #[cfg(test)]
            overrides: None,
        }
    }

    /// Pins the STS endpoint and the credentials instead of the default chain.
    #[cfg(test)]
    fn with_overrides(mut self, endpoint_url: &str, credentials: Credentials) -> Self {
        self.overrides = Some((endpoint_url.to_string(), credentials));
        self
    }

    async fn load(&self) -> SdkConfig {
        let loader =
            aws_config::defaults(BehaviorVersion::latest()).region(Region::new(self.region.clone()));
        #[cfg(test)]
        let loader = match &self.overrides {
            Some((endpoint_url, credentials)) => loader
                .endpoint_url(endpoint_url.clone())
                .credentials_provider(credentials.clone()),
            None => loader,
        };
        loader.load().await
    }

    async fn resolve(&self) -> Result<()> {
        let config = self.load().await;
        let provider = config
            .credentials_provider()
            .context("No AWS credential provider is configured")?;
        let credentials = provider
            .provide_credentials()
            .await
            .context("Could not resolve AWS credentials")?;
        if let Some(expiry) = credentials.expiry() {
            if expiry <= SystemTime::now() {
                anyhow::bail!("AWS credentials expired");
            }
        }
        let identity = aws_sdk_sts::Client::new(&config)
            .get_caller_identity()
            .send()
            .await
            .context("STS rejected the AWS credentials")?;
        debug!("AWS credentials belong to {}", identity.arn().unwrap_or("an unknown identity"));
        Ok(())
    }
}

impl CredentialCheck for AwsCredentialCheck {
    fn credentials_valid(&self) -> bool {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(e) => {
                debug!("Could not start runtime for credential check: {}", e);
                return false;
            }
        };
        match runtime.block_on(self.resolve()) {
            Ok(()) => true,
            Err(e) => {
                debug!("AWS credential check failed: {:#}", e);
                false
            }
        }
    }
}

/// Runs `maws login $AWS_PROFILE`.
#[derive(Debug, Clone, Default)]
pub struct MawsRefresher;

impl MawsRefresher {
    fn binary(&self) -> Option<PathBuf> {
        which::which("maws").ok()
    }

    fn profile(&self) -> Option<String> {
        std::env::var("AWS_PROFILE").ok().filter(|p| !p.is_empty())
    }
}

impl CredentialRefresher for MawsRefresher {
    fn is_available(&self) -> bool {
        self.binary().is_some() && self.profile().is_some()
    }

    fn refresh(&self) -> Result<()> {
        let (Some(binary), Some(profile)) = (self.binary(), self.profile()) else {
            anyhow::bail!(WheelsError::Precondition(
                "maws and AWS_PROFILE are required to refresh credentials".to_string()
            ));
        };
        let status = process::run_passthrough(
            &binary,
            &["login".to_string(), profile.clone()],
            &BTreeMap::new(),
            Path::new("."),
        )?;
        if status != Some(0) {
            anyhow::bail!(WheelsError::ExternalTool {
                command: format!("maws login {}", profile),
                status,
            });
        }
        Ok(())
    }
}

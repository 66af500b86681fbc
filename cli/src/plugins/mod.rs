//! # tfwheels Plugins
//!
//! File: cli/src/plugins/mod.rs
//!
//! ## Overview
//!
//! A plugin is a unit of extension behavior around the wrapped terraform:
//! lifecycle hooks that run around forwarded invocations while the plugin is
//! *used* by the project, plus commands the user can invoke at any time.
//!
//! ## Architecture
//!
//! - `Plugin`: `is_used` / `before_run` / `after_run` / `commands`.
//! - `PluginCommand`: `name` / `description` / `handle`.
//! - `Context`: everything a hook or command may touch for one invocation
//!   (sandbox, lazily resolved tool, configuration, output sink).
//! - `Services`: the host collaborators the built-in plugins need. The real
//!   set comes from `Services::system`; tests substitute fakes.
//! - `Registry`: the fixed, ordered plugin list. Command names must be
//!   unique across plugins; a collision fails registry construction.
//!
//! Built-in plugins, in registry order:
//! 1. `dcos_aws`: AWS credentials and the `add-aws-cluster` command.
//! 2. `dcos_provider`: creates the DC/OS provider when dcos_* resources exist.
//! 3. `ssh_agent`: a private ssh-agent holding the cluster keys.
//! 4. `add_package`: the `add-package` command.
//!
//! Hooks take `&self`; plugins that keep state across the hooks of one
//! invocation use interior mutability.
//!
pub mod add_package;
pub mod aws_flags;
pub mod dcos_aws;
pub mod dcos_provider;
pub mod ssh_agent;
#[cfg(test)]
pub mod testing;

use crate::common::network::{UpstreamVersions, VersionLookup};
use crate::common::system::aws::{
    AwsCredentialCheck, CredentialCheck, CredentialRefresher, MawsRefresher,
};
use crate::common::system::keygen::{KeyPairGenerator, RsaKeygen};
use crate::common::system::sshagent::{OpenSshAgent, SshAgent};
use crate::common::terraform::ToolHandle;
use crate::common::ui::Ui;
use crate::core::config::Config;
use crate::core::error::{Result, WheelsError};
use crate::project::Sandbox;
use std::collections::HashMap;
use tracing::debug;

/// Source glob identifying a DC/OS-on-AWS cluster module.
pub const AWS_CLUSTER_MODULE_SOURCE: &str = "*dcos-terraform/dcos/aws";

/// What hooks and commands operate on during one invocation.
pub struct Context<'a> {
    pub sandbox: &'a mut Sandbox,
    pub tool: &'a mut ToolHandle,
    pub config: &'a Config,
    pub ui: &'a Ui,
    /// How the user invoked us, for help and instructions.
    pub program: &'a str,
}

pub trait PluginCommand {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Runs the command with the tokens following its name.
    fn handle(&self, args: &[String], ctx: &mut Context<'_>) -> Result<()>;
}

pub trait Plugin {
    fn name(&self) -> &str;
    /// Whether the hooks take part in forwarded invocations for this project.
    fn is_used(&self, sandbox: &Sandbox) -> Result<bool>;
    fn before_run(&self, ctx: &mut Context<'_>, init_run: bool) -> Result<()>;
    /// Runs after the tool, whatever its outcome.
    fn after_run(&self, ctx: &mut Context<'_>, tool_error: Option<&anyhow::Error>) -> Result<()>;
    fn commands(&self) -> &[Box<dyn PluginCommand>];
}

/// Host collaborators handed to the built-in plugins.
pub struct Services {
    pub credentials: Box<dyn CredentialCheck>,
    pub refresher: Box<dyn CredentialRefresher>,
    pub agent: Box<dyn SshAgent>,
    pub keygen: Box<dyn KeyPairGenerator>,
    pub versions: Box<dyn VersionLookup>,
}

impl Services {
    /// The real collaborators.
    pub fn system(config: &Config) -> Self {
        Self {
            credentials: Box::new(AwsCredentialCheck::new(config.cluster.region.clone())),
            refresher: Box::new(MawsRefresher),
            agent: Box::new(OpenSshAgent::new()),
            keygen: Box::new(RsaKeygen::default()),
            versions: Box::new(UpstreamVersions::from_config(&config.upstream)),
        }
    }
}

/// The ordered plugin list.
pub struct Registry {
    plugins: Vec<Box<dyn Plugin>>,
}

impl Registry {
    /// Builds a registry, rejecting duplicate command names.
    pub fn new(plugins: Vec<Box<dyn Plugin>>) -> Result<Self> {
        let mut owners: HashMap<&str, &str> = HashMap::new();
        for plugin in &plugins {
            for command in plugin.commands() {
                if let Some(first) = owners.insert(command.name(), plugin.name()) {
                    anyhow::bail!(WheelsError::CommandCollision {
                        name: command.name().to_string(),
                        first: first.to_string(),
                        second: plugin.name().to_string(),
                    });
                }
            }
        }
        Ok(Self { plugins })
    }

    /// The built-in plugins.
    pub fn builtin(services: Services) -> Result<Self> {
        let Services {
            credentials,
            refresher,
            agent,
            keygen,
            versions,
        } = services;
        Self::new(vec![
            Box::new(dcos_aws::DcosAwsPlugin::new(credentials, refresher, versions)),
            Box::new(dcos_provider::DcosProviderPlugin),
            Box::new(ssh_agent::SshAgentPlugin::new(agent, keygen)),
            Box::new(add_package::AddPackagePlugin::new()),
        ])
    }

    pub fn plugins(&self) -> &[Box<dyn Plugin>] {
        &self.plugins
    }

    /// All commands, in registry order.
    pub fn commands(&self) -> impl Iterator<Item = &dyn PluginCommand> {
        self.plugins
            .iter()
            .flat_map(|plugin| plugin.commands().iter().map(|command| command.as_ref()))
    }

    pub fn find_command(&self, name: &str) -> Option<&dyn PluginCommand> {
        self.commands().find(|command| command.name() == name)
    }

    /// Plugins whose hooks apply to `sandbox` right now.
    pub fn active(&self, sandbox: &Sandbox) -> Result<Vec<&dyn Plugin>> {
        let mut active = Vec::new();
        for plugin in &self.plugins {
            if plugin.is_used(sandbox)? {
                active.push(plugin.as_ref());
            }
        }
        debug!(
            "Active plugins: {:?}",
            active.iter().map(|p| p.name()).collect::<Vec<_>>()
        );
        Ok(active)
    }
}

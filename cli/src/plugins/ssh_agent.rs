//! # ssh-agent
//!
//! File: cli/src/plugins/ssh_agent.rs
//!
//! Cluster modules reference a public key file; terraform provisioners need
//! the matching private key. While terraform runs, a private ssh-agent
//! listening on `.terraform/tmp/ssh-agent.socket` holds every such key and
//! its socket is exported to terraform as `SSH_AUTH_SOCK`. Key pairs that
//! are declared inside the project but missing are generated on the spot.
//!
use crate::common::system::keygen::KeyPairGenerator;
use crate::common::system::sshagent::SshAgent;
use crate::core::error::{Result, WheelsError};
use crate::plugins::{Context, Plugin, PluginCommand, AWS_CLUSTER_MODULE_SOURCE};
use crate::project::Sandbox;
use std::cell::RefCell;
use std::path::Path;
use tracing::debug;

pub const AGENT_SOCKET: &str = "tmp/ssh-agent.socket";

const PUBLIC_KEY_FIELD: &str = "ssh_public_key_file";

pub struct SshAgentPlugin {
    agent: RefCell<Box<dyn SshAgent>>,
    keygen: Box<dyn KeyPairGenerator>,
}

impl SshAgentPlugin {
    pub fn new(agent: Box<dyn SshAgent>, keygen: Box<dyn KeyPairGenerator>) -> Self {
        Self {
            agent: RefCell::new(agent),
            keygen,
        }
    }
}

/// `x.pub` pairs with `x`; anything else with `x.key`.
pub fn private_key_name(public_key: &str) -> String {
    match public_key.strip_suffix(".pub") {
        Some(stem) => stem.to_string(),
        None => format!("{}.key", public_key),
    }
}

/// Public key files declared by the cluster modules, in model order.
fn declared_public_keys(sandbox: &Sandbox) -> Result<Vec<String>> {
    Ok(sandbox
        .model()
        .find_by_field_glob("module", "source", AWS_CLUSTER_MODULE_SOURCE)?
        .iter()
        .filter_map(|module| module.get(PUBLIC_KEY_FIELD))
        .filter_map(|value| value.as_str().map(str::to_string))
        .collect())
}

impl Plugin for SshAgentPlugin {
    fn name(&self) -> &str {
        "ssh-agent"
    }

    fn is_used(&self, sandbox: &Sandbox) -> Result<bool> {
        Ok(sandbox
            .model()
            .find_by_field_glob("module", "source", AWS_CLUSTER_MODULE_SOURCE)?
            .iter()
            .any(|module| module.contains_key(PUBLIC_KEY_FIELD)))
    }

    fn before_run(&self, ctx: &mut Context<'_>, _init_run: bool) -> Result<()> {
        let socket = ctx.sandbox.temporary_path(AGENT_SOCKET)?;
        let mut agent = self.agent.borrow_mut();
        let auth_sock = agent.start(&socket)?;
        ctx.tool.get(ctx.sandbox)?.set_env("SSH_AUTH_SOCK", &auth_sock);

        for public_key in declared_public_keys(ctx.sandbox)? {
            let private_key = private_key_name(&public_key);
            if ctx.sandbox.is_file_in_sandbox(Path::new(&public_key))
                && !ctx.sandbox.file_path(&public_key).exists()
            {
                ctx.ui.info(format!(
                    "Found a defined ssh key '{}', but missing from the project directory. Going to create a keypair for you",
                    public_key
                ));
                self.keygen
                    .generate(
                        &ctx.sandbox.file_path(&private_key),
                        &ctx.sandbox.file_path(&public_key),
                    )
                    .map_err(|e| anyhow::anyhow!("Could not create RSA keypair: {:#}", e))?;
            }

            let private_path = ctx.sandbox.file_path(&private_key);
            if !private_path.is_file() {
                anyhow::bail!(WheelsError::FileSystem(format!(
                    "Could not find private key for {} (searching for {})",
                    ctx.ui.bold(&public_key),
                    private_key
                )));
            }
            ctx.ui.info(format!(
                "Loaded private key {} in ssh-agent",
                ctx.ui.bold(&private_key)
            ));
            agent.add_key(&private_path)?;
        }
        debug!("ssh-agent ready at {}", auth_sock);
        Ok(())
    }

    fn after_run(&self, _ctx: &mut Context<'_>, _tool_error: Option<&anyhow::Error>) -> Result<()> {
        self.agent.borrow_mut().stop()
    }

    fn commands(&self) -> &[Box<dyn PluginCommand>] {
        &[]
    }
}

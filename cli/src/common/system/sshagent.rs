//! # ssh-agent
//!
//! File: cli/src/common/system/sshagent.rs
//!
//! A private `ssh-agent` bound to a socket inside the sandbox, so terraform
//! provisioners can reach the cluster keys without touching the user's own
//! agent. The agent is stopped explicitly after the tool ran and again on
//! drop, which covers aborted invocations.
//!
use crate::common::fs::io;
use crate::common::process;
use crate::common::system::find_tool;
use crate::core::error::{Result, WheelsError};
use regex::Regex;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

pub trait SshAgent {
    /// Starts the agent listening on `socket` and returns the socket path to
    /// export as `SSH_AUTH_SOCK`.
    fn start(&mut self, socket: &Path) -> Result<String>;
    fn add_key(&self, private_key: &Path) -> Result<()>;
    /// Stops the agent. Stopping an agent that is not running is a no-op.
    fn stop(&mut self) -> Result<()>;
}

/// Extracts `(SSH_AUTH_SOCK, SSH_AGENT_PID)` from `ssh-agent` shell output.
pub fn parse_agent_output(output: &str) -> Result<(String, u32)> {
    let socket = Regex::new(r"SSH_AUTH_SOCK=([^;]+);")?
        .captures(output)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| WheelsError::Precondition("Could not find ssh-agent socket".to_string()))?;
    let pid = Regex::new(r"SSH_AGENT_PID=(\d+);")?
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| WheelsError::Precondition("Could not find ssh-agent PID".to_string()))?;
    Ok((socket, pid))
}

#[derive(Debug, Default)]
pub struct OpenSshAgent {
    socket: Option<String>,
    pid: Option<u32>,
}

impl OpenSshAgent {
    pub fn new() -> Self {
        Self::default()
    }

    fn agent_env(&self) -> BTreeMap<String, String> {
        let mut envs = BTreeMap::new();
        if let Some(socket) = &self.socket {
            envs.insert("SSH_AUTH_SOCK".to_string(), socket.clone());
        }
        if let Some(pid) = self.pid {
            envs.insert("SSH_AGENT_PID".to_string(), pid.to_string());
        }
        envs
    }
}

impl SshAgent for OpenSshAgent {
    fn start(&mut self, socket: &Path) -> Result<String> {
        let binary = find_tool("ssh-agent")?;
        io::remove_file_if_exists(socket)?;
        let socket_arg = socket.to_string_lossy();
        let output = process::run_and_collect(&binary, &["-a", &socket_arg], &BTreeMap::new())?;
        if !output.success() {
            anyhow::bail!(WheelsError::Precondition(format!(
                "Could not start ssh-agent: {}",
                output.stderr.trim()
            )));
        }
        let (socket, pid) = parse_agent_output(&output.stdout)?;
        debug!("Started ssh-agent (pid={}) on {}", pid, socket);
        self.socket = Some(socket.clone());
        self.pid = Some(pid);
        Ok(socket)
    }

    fn add_key(&self, private_key: &Path) -> Result<()> {
        let binary = find_tool("ssh-add")?;
        let key_arg = private_key.to_string_lossy();
        let output = process::run_and_collect(&binary, &[&key_arg], &self.agent_env())?;
        if !output.success() {
            anyhow::bail!(WheelsError::Precondition(format!(
                "Could not add ssh key {}: {}",
                private_key.display(),
                output.stderr.trim()
            )));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        if self.pid.is_none() {
            return Ok(());
        }
        let binary = find_tool("ssh-agent")?;
        let envs = self.agent_env();
        self.pid = None;
        self.socket = None;
        let output = process::run_and_collect(&binary, &["-k"], &envs)?;
        if !output.success() {
            anyhow::bail!(WheelsError::Precondition(format!(
                "Could not stop ssh-agent: {}",
                output.stderr.trim()
            )));
        }
        debug!("Stopped ssh-agent");
        Ok(())
    }
}

impl Drop for OpenSshAgent {
    fn drop(&mut self) {
        if let Err(e) = self.stop() {
            warn!("Failed to stop ssh-agent: {:#}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_agent_output() -> Result<()> {
        let output = "SSH_AUTH_SOCK=/work/.terraform/tmp/ssh-agent.socket; export SSH_AUTH_SOCK;\n\
                      SSH_AGENT_PID=4242; export SSH_AGENT_PID;\n\
                      echo Agent pid 4242;\n";
        let (socket, pid) = parse_agent_output(output)?;
        assert_eq!(socket, "/work/.terraform/tmp/ssh-agent.socket");
        assert_eq!(pid, 4242);
        Ok(())
    }

    #[test]
    fn test_parse_agent_output_without_pid() {
        let err = parse_agent_output("SSH_AUTH_SOCK=/tmp/sock; export SSH_AUTH_SOCK;").unwrap_err();
        assert!(err.to_string().contains("PID"));
    }

    #[test]
    fn test_stop_without_start_is_noop() -> Result<()> {
        let mut agent = OpenSshAgent::new();
        agent.stop()?;
        Ok(())
    }
}

//! # tfwheels Process Execution
//!
//! File: cli/src/common/process.rs
//!
//! ## Overview
//!
//! Two ways of running an external program:
//!
//! - **`run_and_collect`**: runs to completion and captures stdout/stderr.
//!   Used for short helper calls (`ssh-agent`, `ssh-add`, `maws`,
//!   `terraform --version`).
//! - **`run_passthrough`**: runs with inherited stdio and waits for it on a
//!   current-thread `tokio` runtime while relaying termination signals to the
//!   child. Used for the actual terraform invocation.
//!
//! A Ctrl-C at the terminal already reaches the child through the foreground
//! process group, so SIGINT is only absorbed here (tfwheels keeps waiting and
//! reports the child's status). SIGTERM and SIGHUP, which usually target
//! tfwheels alone, are forwarded with `nix`.
//!
use crate::core::error::{Result, WheelsError};
use anyhow::Context;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use std::process::{Command, Stdio};
use tokio::signal::unix::{signal, SignalKind};
use tracing::{debug, warn};

/// Captured result of `run_and_collect`.
#[derive(Debug, Clone)]
pub struct CollectedOutput {
    pub status: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CollectedOutput {
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }
}

fn describe(program: &OsStr, args: &[&str]) -> String {
    let mut text = program.to_string_lossy().into_owned();
    for arg in args {
        text.push(' ');
        text.push_str(arg);
    }
    text
}

/// Runs `program` to completion, capturing its output.
///
/// Failing to start the program is an error; a non-zero exit is not (check
/// `CollectedOutput::success`).
pub fn run_and_collect(
    program: impl AsRef<OsStr>,
    args: &[&str],
    envs: &BTreeMap<String, String>,
) -> Result<CollectedOutput> {
    let program = program.as_ref();
    debug!("Running {}", describe(program, args));
    let output = Command::new(program)
        .args(args)
        .envs(envs)
        .stdin(Stdio::null())
        .output()
        .with_context(|| format!("Failed to execute {}", describe(program, args)))?;
    Ok(CollectedOutput {
        status: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// Runs `program` in `cwd` with inherited stdio, waiting for it to exit.
///
/// Returns the child's exit code, `None` when it was killed by a signal.
pub fn run_passthrough(
    program: &Path,
    args: &[String],
    envs: &BTreeMap<String, String>,
    cwd: &Path,
) -> Result<Option<i32>> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start the process supervisor runtime")?;
    runtime.block_on(supervise(program, args, envs, cwd))
}

async fn supervise(
    program: &Path,
    args: &[String],
    envs: &BTreeMap<String, String>,
    cwd: &Path,
) -> Result<Option<i32>> {
    let mut child = tokio::process::Command::new(program)
        .args(args)
        .envs(envs)
        .current_dir(cwd)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .spawn()
        .map_err(|e| WheelsError::ExternalTool {
            command: format!("{} ({})", program.display(), e),
            status: None,
        })?;
    let pid = child.id();
    debug!("Started {} (pid {:?})", program.display(), pid);

    let mut interrupts = signal(SignalKind::interrupt())?;
    let mut terminations = signal(SignalKind::terminate())?;
    let mut hangups = signal(SignalKind::hangup())?;

    loop {
        tokio::select! {
            status = child.wait() => {
                let status = status.context("Failed to wait for child process")?;
                debug!("{} exited with {}", program.display(), status);
                return Ok(status.code());
            }
            _ = interrupts.recv() => {
                debug!("Interrupt received, waiting for the child to finish");
            }
            _ = terminations.recv() => forward(pid, Signal::SIGTERM),
            _ = hangups.recv() => forward(pid, Signal::SIGHUP),
        }
    }
}

fn forward(pid: Option<u32>, sig: Signal) {
    let Some(pid) = pid else {
        return;
    };
    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    debug!("Forwarding {:?} to pid {}", sig, pid);
    if let Err(e) = kill(Pid::from_raw(raw), sig) {
        warn!("Failed to forward {:?} to pid {}: {}", sig, pid, e);
    }
}

//! # tfwheels Main Entry Point
//!
//! File: cli/src/main.rs
//!
//! ## Overview
//!
//! tfwheels is a terraform front-end for DC/OS deployments. It is invoked
//! like terraform itself and either runs one of its own plugin commands
//! (`add-aws-cluster`, `add-package`) or forwards the invocation to
//! terraform, with plugins preparing the project around it.
//!
//! ## Architecture
//!
//! `main` is the composition root:
//! 1. configure logging (`RUST_LOG`, else `TFWHEELS_LOG`, else `warn`);
//! 2. run the hidden self-upgrade commands (`tool-upgrade`,
//!    `tool-complete-upgrade`) before anything else;
//! 3. open the current directory as the sandbox and load the configuration;
//! 4. build the plugin registry from the real host services;
//! 5. hand the arguments to the `Dispatcher` and map its result to an exit
//!    code.
//!
//! Exit codes: 0 on success; terraform's own status when terraform failed
//! (1 if it was killed by a signal); 1 for every other error and after help
//! was shown.
//!
//! ## Examples
//!
//! ```bash
//! tfwheels add-aws-cluster --num_masters 3
//! tfwheels plan -out=plan.out
//! TFWHEELS_LOG=debug tfwheels apply plan.out
//! ```
//!
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};

mod common; // Collaborators: process execution, terraform, ssh, AWS, UI, etc.
mod core; // Core infrastructure (errors, config, templating, dispatch)
mod plugins; // Built-in plugins and the registry
mod project; // Parser, resource model and sandbox

use crate::common::network::{HttpFetcher, DOWNLOAD_TIMEOUT};
use crate::common::terraform::{TerraformLocator, ToolHandle};
use crate::common::ui::Ui;
use crate::common::upgrade::{self, COMPLETE_UPGRADE_COMMAND, UPGRADE_COMMAND};
use crate::core::config;
use crate::core::dispatch::{Dispatcher, Outcome};
use crate::core::error::{external_exit_status, Result, WheelsError};
use crate::plugins::{Registry, Services};
use crate::project::Sandbox;

const DEFAULT_PROGRAM: &str = "tfwheels";
const LOG_ENV: &str = "TFWHEELS_LOG";

fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_from_env(LOG_ENV))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn program_name(argv0: Option<&String>) -> String {
    argv0
        .and_then(|arg| Path::new(arg).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_PROGRAM.to_string())
}

fn run(program: &str, args: &[String], ui: &Ui) -> Result<Outcome> {
    let cwd = std::env::current_dir()
        .map_err(|e| WheelsError::FileSystem(format!("Cannot determine current directory: {}", e)))?;
    let sandbox = Sandbox::open(&cwd)?;
    let config = config::load_config(sandbox.base_dir())?;
    let registry = Registry::builtin(Services::system(&config))?;
    let tool = ToolHandle::new(Box::new(TerraformLocator::from_config(&config, ui.clone())));

    let mut dispatcher = Dispatcher::new(registry, sandbox, tool, config, ui.clone(), program);
    dispatcher.run(args)
}

fn self_upgrade(ui: &Ui) -> Result<()> {
    let current = semver::Version::parse(env!("CARGO_PKG_VERSION"))?;
    let target = std::env::current_exe()
        .map_err(|e| WheelsError::FileSystem(format!("could not find the location of the tool: {}", e)))?;
    let fetcher = HttpFetcher::new(DOWNLOAD_TIMEOUT)?;
    upgrade::upgrade_if_newer(&fetcher, &current, &target, ui)?;
    Ok(())
}

/// Runs a hidden command, returning its exit code, or `None` for anything else.
fn hidden_command(program: &str, args: &[String], ui: &Ui) -> Option<i32> {
    let result = match args.first().map(String::as_str) {
        Some(COMPLETE_UPGRADE_COMMAND) => match args.get(1) {
            Some(backup) => upgrade::complete_upgrade(&PathBuf::from(backup)),
            None => {
                ui.error(format!("Usage: {} {} <backup-path>", program, COMPLETE_UPGRADE_COMMAND));
                return Some(1);
            }
        },
        Some(UPGRADE_COMMAND) => self_upgrade(ui),
        _ => return None,
    };
    match result {
        Ok(()) => Some(0),
        Err(e) => {
            ui.error(format!("{:#}", e));
            Some(1)
        }
    }
}

fn main() {
    init_logging();

    let argv: Vec<String> = std::env::args().collect();
    let program = program_name(argv.first());
    let args = argv.get(1..).unwrap_or_default();
    let ui = Ui::stdout();

    if let Some(code) = hidden_command(&program, args, &ui) {
        std::process::exit(code);
    }

    tracing::debug!("Invoked as {} with {:?}", program, args);
    let code = match run(&program, args, &ui) {
        Ok(Outcome::Completed) => 0,
        Ok(Outcome::HelpShown) => 1,
        Err(e) => {
            tracing::debug!("Command execution failed: {:?}", e);
            ui.error(format!("{:#}", e));
            match external_exit_status(&e) {
                Some(status) => status.unwrap_or(1),
                None => 1,
            }
        }
    };
    std::process::exit(code);
}

//! # tfwheels Command Dispatcher
//!
//! File: cli/src/core/dispatch.rs
//!
//! ## Overview
//!
//! Decides what one invocation of tfwheels does with its arguments:
//!
//! 1. **Plugin command**: the first token not starting with `-` names a
//!    plugin command (of any plugin, active or not). The command runs with
//!    the tokens that follow it. If the project had no `.tf` files before the
//!    command and has some afterwards, the model is reloaded and terraform is
//!    initialized once (`init`) with the full hook lifecycle around it.
//! 2. **Help**: no arguments, no bare token, or any argument containing
//!    `help`. Terraform's own help is shown when terraform is available,
//!    followed by the plugin commands. The outcome is `HelpShown`, which the
//!    binary turns into a non-zero exit.
//! 3. **Forward**: everything else goes to terraform verbatim, wrapped by
//!    the `before_run` / `after_run` hooks of the plugins used by the project.
//!
//! ## Hook failures
//!
//! - A `before_run` error aborts the invocation before terraform runs. On
//!   init runs a `Precondition` error is only a warning.
//! - Every `after_run` hook runs, whatever terraform or the other hooks did.
//!   The first hook error is returned. When terraform failed too, its error
//!   is printed so it is not lost.
//!
use crate::common::terraform::ToolHandle;
use crate::common::ui::Ui;
use crate::core::config::Config;
use crate::core::error::{Result, WheelsError};
use crate::plugins::{Context, Registry};
use crate::project::Sandbox;
use tracing::{debug, info};

/// Argument terraform uses to initialize a project.
pub const INIT_COMMAND: &str = "init";

const HELP_TOKEN: &str = "help";

/// How an invocation ended when it did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Completed,
    /// Help was printed instead of doing anything.
    HelpShown,
}

pub struct Dispatcher {
    registry: Registry,
    sandbox: Sandbox,
    tool: ToolHandle,
    config: Config,
    ui: Ui,
    program: String,
}

/// First token that is not a flag, with its position.
fn candidate_command(args: &[String]) -> Option<(usize, &str)> {
    args.iter()
        .enumerate()
        .find(|(_, arg)| !arg.starts_with('-'))
        .map(|(index, arg)| (index, arg.as_str()))
}

fn is_precondition(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        matches!(
            cause.downcast_ref::<WheelsError>(),
            Some(WheelsError::Precondition(_))
        )
    })
}

/// Runs terraform with `args` inside the hook lifecycle of the active plugins.
fn run_lifecycle(
    registry: &Registry,
    ctx: &mut Context<'_>,
    args: &[String],
    init_run: bool,
) -> Result<()> {
    ctx.tool.get(ctx.sandbox)?;
    let active = registry.active(ctx.sandbox)?;

    for plugin in &active {
        if let Err(e) = plugin.before_run(ctx, init_run) {
            if init_run && is_precondition(&e) {
                ctx.ui.warn(format!("{:#}", e));
                continue;
            }
            return Err(e.context(format!("Plugin '{}' failed to prepare the run", plugin.name())));
        }
    }

    debug!("Invoking terraform with {:?}", args);
    let tool_result = ctx
        .tool
        .get(ctx.sandbox)
        .and_then(|tool| tool.invoke(args));

    let mut hook_error: Option<anyhow::Error> = None;
    for plugin in &active {
        if let Err(e) = plugin.after_run(ctx, tool_result.as_ref().err()) {
            let e = e.context(format!("Plugin '{}' failed after the run", plugin.name()));
            if hook_error.is_none() {
                hook_error = Some(e);
            } else {
                ctx.ui.error(format!("{:#}", e));
            }
        }
    }

    match (tool_result, hook_error) {
        (Err(tool_error), Some(hook_error)) => {
            ctx.ui.error(format!("{:#}", tool_error));
            Err(hook_error)
        }
        (Err(tool_error), None) => Err(tool_error),
        (Ok(()), Some(hook_error)) => Err(hook_error),
        (Ok(()), None) => Ok(()),
    }
}

impl Dispatcher {
    pub fn new(
        registry: Registry,
        sandbox: Sandbox,
        tool: ToolHandle,
        config: Config,
        ui: Ui,
        program: impl Into<String>,
    ) -> Self {
        Self {
            registry,
            sandbox,
            tool,
            config,
            ui,
            program: program.into(),
        }
    }

    pub fn sandbox(&self) -> &Sandbox {
        &self.sandbox
    }

    pub fn run(&mut self, args: &[String]) -> Result<Outcome> {
        let candidate = candidate_command(args);
        if let Some((index, name)) = candidate {
            if self.registry.find_command(name).is_some() {
                let name = name.to_string();
                self.run_command(&name, &args[index + 1..])?;
                return Ok(Outcome::Completed);
            }
        }

        if candidate.is_none() || args.iter().any(|arg| arg.contains(HELP_TOKEN)) {
            self.show_help(args);
            return Ok(Outcome::HelpShown);
        }

        let init_run = candidate.is_some_and(|(_, name)| name == INIT_COMMAND);
        let Self {
            registry,
            sandbox,
            tool,
            config,
            ui,
            program,
        } = self;
        let mut ctx = Context {
            sandbox,
            tool,
            config,
            ui,
            program,
        };
        run_lifecycle(registry, &mut ctx, args, init_run)?;
        Ok(Outcome::Completed)
    }

    fn run_command(&mut self, name: &str, args: &[String]) -> Result<()> {
        let Self {
            registry,
            sandbox,
            tool,
            config,
            ui,
            program,
        } = self;
        let had_files = sandbox.has_declarative_files()?;
        let mut ctx = Context {
            sandbox,
            tool,
            config,
            ui,
            program,
        };

        debug!("Running plugin command '{}' with {:?}", name, args);
        let command_result = match registry.find_command(name) {
            Some(command) => command.handle(args, &mut ctx),
            None => Ok(()),
        };

        if had_files || !ctx.sandbox.has_declarative_files()? {
            return command_result;
        }

        info!("Project gained its first terraform files, initializing");
        let init_args = vec![INIT_COMMAND.to_string()];
        let init_result = ctx
            .sandbox
            .reload()
            .and_then(|()| run_lifecycle(registry, &mut ctx, &init_args, true));
        match (command_result, init_result) {
            (Err(command_error), Err(init_error)) => {
                ctx.ui.error(format!("{:#}", init_error));
                Err(command_error)
            }
            (Err(command_error), Ok(())) => Err(command_error),
            (Ok(()), init_result) => init_result,
        }
    }

    fn show_help(&mut self, args: &[String]) {
        let help_args = if args.is_empty() {
            vec!["--help".to_string()]
        } else {
            args.to_vec()
        };
        match self.tool.get(&self.sandbox) {
            Ok(tool) => {
                // terraform exits non-zero after printing its usage
                if let Err(e) = tool.invoke(&help_args) {
                    debug!("terraform help: {:#}", e);
                }
            }
            Err(e) => {
                debug!("terraform unavailable for help: {:#}", e);
                self.ui.line(format!(
                    "{} wraps terraform {}x, which could not be found here, so only its own commands are listed.",
                    self.program, self.config.terraform.required_version_prefix
                ));
                self.ui.line(format!(
                    "Any other command is passed to terraform, e.g. `{} plan`.",
                    self.program
                ));
            }
        }

        self.ui.blank();
        self.ui.line(self.ui.bold("Additional commands:"));
        for command in self.registry.commands() {
            self.ui
                .line(format!("    {:<18} {}", command.name(), command.description()));
        }
    }
}

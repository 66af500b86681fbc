//! # add-package
//!
//! File: cli/src/plugins/add_package.rs
//!
//! ## Overview
//!
//! Provides the `add-package` command, which writes `service-<name>.tf`
//! deploying a Universe package on DC/OS: a package repository resource,
//! the package version and configuration data sources, and the deploy
//! module. The plugin has no lifecycle hooks.
//!
//! ## Package configuration
//!
//! `--config <file>` imports a JSON options file. Every top-level member
//! becomes one or more `section` blocks inside the configuration data
//! source, addressed by their dotted path:
//!
//! - an array of strings becomes `list = [ ... ]`;
//! - the scalar members of an object are collected into `map = { ... }`,
//!   while its nested objects and arrays recurse with `path.key`;
//! - anything else is embedded verbatim as a `json` heredoc.
//!
//! ```text
//! { "service": { "name": "kafka", "security": { "tls": true } } }
//!
//! section {
//!   path = "service.security"
//!   map = {
//!     tls = true,
//!   }
//! }
//!
//! section {
//!   path = "service"
//!   map = {
//!     name = "kafka",
//!   }
//! }
//! ```
//!
use crate::core::error::{Result, WheelsError};
use crate::core::templating::{self, SERVICE};
use crate::core::tfgen::map_key;
use crate::plugins::{Context, Plugin, PluginCommand};
use crate::project::Sandbox;
use anyhow::Context as _;
use clap::error::ErrorKind;
use clap::{CommandFactory, FromArgMatches, Parser};
use serde::Serialize;
use serde_json::Value as Json;
use std::path::PathBuf;
use tracing::debug;

/// Arguments of `add-package`.
#[derive(Parser, Debug)]
#[command(
    about = "This command will generate a service-xxx.tf file in the project directory that describes a deployment of a universe service on DC/OS.",
    disable_version_flag = true
)]
struct AddPackageArgs {
    /// The name of the package to deploy
    #[arg(long)]
    package: Option<String>,

    /// The name of the service to deploy (defaults to the package name)
    #[arg(long)]
    name: Option<String>,

    /// The version of the package to install
    #[arg(long, default_value = "latest")]
    version: String,

    /// The ID of the application to assign when deployed on DC/OS (defaults to the service name)
    #[arg(long)]
    appid: Option<String>,

    /// Optional path to a JSON configuration file to import
    #[arg(long)]
    config: Option<PathBuf>,
}

pub struct AddPackagePlugin {
    commands: Vec<Box<dyn PluginCommand>>,
}

impl AddPackagePlugin {
    pub fn new() -> Self {
        Self {
            commands: vec![Box::new(AddPackageCommand)],
        }
    }
}

impl Default for AddPackagePlugin {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for AddPackagePlugin {
    fn name(&self) -> &str {
        "add-package"
    }

    fn is_used(&self, _sandbox: &Sandbox) -> Result<bool> {
        Ok(false)
    }

    fn before_run(&self, _ctx: &mut Context<'_>, _init_run: bool) -> Result<()> {
        Ok(())
    }

    fn after_run(&self, _ctx: &mut Context<'_>, _tool_error: Option<&anyhow::Error>) -> Result<()> {
        Ok(())
    }

    fn commands(&self) -> &[Box<dyn PluginCommand>] {
        &self.commands
    }
}

#[derive(Serialize)]
struct ServiceTemplate<'a> {
    name: &'a str,
    package: &'a str,
    version: &'a str,
    app_id: &'a str,
    service_account: String,
    config_lines: Vec<String>,
}

pub struct AddPackageCommand;

/// Outcome of parsing the command line.
enum ParsedArgs {
    Args(AddPackageArgs),
    Help(String),
}

impl AddPackageCommand {
    fn parse(&self, program: &str, args: &[String]) -> Result<ParsedArgs> {
        let command = AddPackageArgs::command()
            .name(self.name().to_string())
            .bin_name(format!("{} {}", program, self.name()))
            .no_binary_name(true);
        let matches = match command.try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(e) if e.kind() == ErrorKind::DisplayHelp => {
                return Ok(ParsedArgs::Help(e.render().to_string()))
            }
            Err(e) => anyhow::bail!(WheelsError::Argument(e.render().to_string())),
        };
        AddPackageArgs::from_arg_matches(&matches)
            .map(ParsedArgs::Args)
            .map_err(|e| WheelsError::Argument(e.to_string()).into())
    }
}

impl PluginCommand for AddPackageCommand {
    fn name(&self) -> &str {
        "add-package"
    }

    fn description(&self) -> &str {
        "Adds a configuration file to deploy a package from Universe on DC/OS"
    }

    fn handle(&self, args: &[String], ctx: &mut Context<'_>) -> Result<()> {
        let args = match self.parse(ctx.program, args)? {
            ParsedArgs::Help(text) => {
                ctx.ui.line(text.trim_end());
                return Ok(());
            }
            ParsedArgs::Args(args) => args,
        };

        let package = match args.package.as_deref() {
            Some(package) if !package.is_empty() => package,
            _ => anyhow::bail!(WheelsError::Argument(
                "Please specify the package name with --package".to_string()
            )),
        };
        let name = args.name.as_deref().unwrap_or(package);
        let app_id = args.appid.as_deref().unwrap_or(name);

        let config_lines = match &args.config {
            Some(path) => {
                let path = ctx.sandbox.file_path(&path.to_string_lossy());
                load_config_lines(&path)
                    .with_context(|| format!("Could not load config from {}", path.display()))?
            }
            None => Vec::new(),
        };

        let contents = templating::render(
            &SERVICE,
            &ServiceTemplate {
                name,
                package,
                version: &args.version,
                app_id,
                service_account: app_id.replace('/', "__"),
                config_lines,
            },
        )?;

        let file_name = format!("service-{}.tf", name);
        ctx.ui.info(format!(
            "{}{}{}",
            ctx.ui.bold("Writing "),
            ctx.ui.bold(&file_name),
            ctx.ui.bold(" containing information for deploying a service on top of DC/OS")
        ));
        ctx.sandbox.write_file(&file_name, contents.as_bytes())
    }
}

/// Reads a JSON options file and converts it to `section` blocks.
fn load_config_lines(path: &std::path::Path) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| WheelsError::FileSystem(format!("{}: {}", path.display(), e)))?;
    let config: serde_json::Map<String, Json> = serde_json::from_str(&text)?;
    let mut lines = Vec::new();
    for (key, value) in &config {
        section_lines(value, key, &mut lines)?;
    }
    debug!("Converted {} into {} config lines", path.display(), lines.len());
    Ok(lines)
}

fn json(value: &impl Serialize) -> Result<String> {
    Ok(serde_json::to_string(value)?)
}

/// Appends the `section` blocks describing `value` at `path`.
pub fn section_lines(value: &Json, path: &str, lines: &mut Vec<String>) -> Result<()> {
    match value {
        Json::Array(items) if items.iter().all(Json::is_string) => {
            lines.push(String::new());
            lines.push("section {".to_string());
            lines.push(format!("  path = {}", json(&path)?));
            lines.push("  list = [".to_string());
            for item in items {
                lines.push(format!("    {},", json(item)?));
            }
            lines.push("  ]".to_string());
            lines.push("}".to_string());
        }
        Json::Object(members) => {
            let mut entries = Vec::new();
            for (key, member) in members {
                match member {
                    Json::String(_) | Json::Number(_) | Json::Bool(_) => {
                        entries.push(format!("    {} = {},", map_key(key)?, json(member)?));
                    }
                    _ => section_lines(member, &format!("{}.{}", path, key), lines)?,
                }
            }
            if !entries.is_empty() {
                lines.push(String::new());
                lines.push("section {".to_string());
                lines.push(format!("  path = {}", json(&path)?));
                lines.push("  map = {".to_string());
                lines.extend(entries);
                lines.push("  }".to_string());
                lines.push("}".to_string());
            }
        }
        other => {
            lines.push(String::new());
            lines.push("section {".to_string());
            lines.push(format!("  path = {}", json(&path)?));
            lines.push("  json = <<EOF".to_string());
            lines.push(format!("  {}", json(other)?));
            lines.push("  EOF".to_string());
            lines.push("}".to_string());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::*;
    use crate::project::hcl;
    use serde_json::json;

    fn run(project: &mut TestProject, items: &[&str]) -> Result<()> {
        AddPackageCommand.handle(&args(items), &mut project.ctx())
    }

    #[test]
    fn test_plugin_is_never_used() -> Result<()> {
        let project = TestProject::new(&[("main.tf", CLUSTER_TF)]);
        assert!(!AddPackagePlugin::new().is_used(&project.sandbox)?);
        Ok(())
    }

    #[test]
    fn test_defaults_follow_package_name() -> Result<()> {
        let mut project = TestProject::new(&[]);
        run(&mut project, &["--package", "kafka"])?;
        let text = project.read("service-kafka.tf");
        assert!(text.contains("resource \"dcos_package_repo\" \"kafka\" {"));
        assert!(text.contains("  name    = \"kafka\""));
        assert!(text.contains("  version = \"latest\""));
        assert!(text.contains("  app_id          = \"kafka\""));
        assert!(text.contains("  service_account = \"kafka-principal\""));
        assert!(project
            .output()
            .contains("Info: Writing service-kafka.tf containing information for deploying a service on top of DC/OS"));

        let raw = hcl::parse("service-kafka.tf", &text)?;
        assert!(raw.contains_key("data"));
        Ok(())
    }

    #[test]
    fn test_app_id_slashes_in_service_account() -> Result<()> {
        let mut project = TestProject::new(&[]);
        run(
            &mut project,
            &["--package", "kafka", "--name", "broker", "--appid", "team/data/broker", "--version", "2.9.0"],
        )?;
        let text = project.read("service-broker.tf");
        assert!(text.contains("  app_id          = \"team/data/broker\""));
        assert!(text.contains("  service_account = \"team__data__broker-principal\""));
        assert!(text.contains("  version = \"2.9.0\""));
        Ok(())
    }

    #[test]
    fn test_missing_package_is_an_argument_error() {
        let mut project = TestProject::new(&[]);
        let err = run(&mut project, &["--name", "broker"]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WheelsError>(),
            Some(WheelsError::Argument(msg)) if msg == "Please specify the package name with --package"
        ));
        assert!(!project.dir.path().join("service-broker.tf").exists());
    }

    #[test]
    fn test_help_prints_usage() -> Result<()> {
        let mut project = TestProject::new(&[]);
        run(&mut project, &["--help"])?;
        let out = project.output();
        assert!(out.contains("universe service on DC/OS"));
        assert!(out.contains("--package"));
        assert!(out.contains("tfwheels add-package"));
        Ok(())
    }

    #[test]
    fn test_config_file_becomes_sections() -> Result<()> {
        let config = json!({
            "brokers": { "count": 3, "cpus": 1.5 },
            "service": {
                "name": "kafka",
                "virtual_network_enabled": false,
                "security": { "custom_domain": "" }
            },
            "hosts": ["a", "b"]
        });
        let mut project = TestProject::new(&[("options.json", &config.to_string())]);
        run(&mut project, &["--package", "kafka", "--config", "options.json"])?;
        let text = project.read("service-kafka.tf");
        assert!(text.contains(
            "  version_spec = \"${data.dcos_package_version.kafka.spec}\"\n\
             \n\
             section {\n\
             \x20 path = \"brokers\"\n\
             \x20 map = {\n\
             \x20   count = 3,\n\
             \x20   cpus = 1.5,\n\
             \x20 }\n\
             }\n"
        ));
        assert!(text.contains("  path = \"hosts\"\n  list = [\n    \"a\",\n    \"b\",\n  ]\n"));
        let nested = text.find("path = \"service.security\"").unwrap();
        let parent = text.find("path = \"service\"").unwrap();
        assert!(nested < parent);
        assert!(text.contains("    virtual_network_enabled = false,"));

        // The generated file stays readable by the project model.
        hcl::parse("service-kafka.tf", &text)?;
        Ok(())
    }

    #[test]
    fn test_unsupported_values_become_json_heredocs() -> Result<()> {
        let mut lines = Vec::new();
        section_lines(&json!([1, {"a": null}]), "ports", &mut lines)?;
        assert_eq!(
            lines,
            vec![
                "",
                "section {",
                "  path = \"ports\"",
                "  json = <<EOF",
                "  [1,{\"a\":null}]",
                "  EOF",
                "}",
            ]
        );
        Ok(())
    }

    #[test]
    fn test_unreadable_config_reports_path() {
        let mut project = TestProject::new(&[("broken.json", "{ not json")]);
        let err = run(&mut project, &["--package", "kafka", "--config", "broken.json"]).unwrap_err();
        assert!(format!("{:#}", err).contains("Could not load config from"));
        assert!(!project.dir.path().join("service-kafka.tf").exists());
    }
}

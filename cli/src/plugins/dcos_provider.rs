//! # dcos-provider
//!
//! File: cli/src/plugins/dcos_provider.rs
//!
//! Projects using `dcos_*` data sources or resources need a `dcos`
//! provider. When none is declared, one is written to `provider-dcos.tf`
//! before terraform runs, pointed at the first AWS cluster module when the
//! project has one.
//!
use crate::core::error::Result;
use crate::core::templating::{self, PROVIDER_DCOS};
use crate::plugins::{Context, Plugin, PluginCommand, AWS_CLUSTER_MODULE_SOURCE};
use crate::project::{Sandbox, NAME_KEY};
use serde::Serialize;
use tracing::debug;

pub const PROVIDER_FILE: &str = "provider-dcos.tf";

#[derive(Serialize)]
struct ProviderTemplate {
    /// Empty when there is no cluster module to connect to.
    cluster_module: String,
    enterprise: bool,
}

pub struct DcosProviderPlugin;

impl DcosProviderPlugin {
    fn provider_contents(&self, sandbox: &Sandbox) -> Result<String> {
        let modules = sandbox
            .model()
            .find_by_field_glob("module", "source", AWS_CLUSTER_MODULE_SOURCE)?;
        let template = match modules.first() {
            Some(module) => ProviderTemplate {
                cluster_module: module
                    .get(NAME_KEY)
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                enterprise: module.get("dcos_variant").and_then(|v| v.as_str()) == Some("ee"),
            },
            None => ProviderTemplate {
                cluster_module: String::new(),
                enterprise: false,
            },
        };
        templating::render(&PROVIDER_DCOS, &template)
    }
}

impl Plugin for DcosProviderPlugin {
    fn name(&self) -> &str {
        "dcos-provider"
    }

    fn is_used(&self, sandbox: &Sandbox) -> Result<bool> {
        let model = sandbox.model();
        Ok(!model.find_by_name_glob("data", "dcos_*")?.is_empty()
            || !model.find_by_name_glob("resource", "dcos_*")?.is_empty())
    }

    fn before_run(&self, ctx: &mut Context<'_>, _init_run: bool) -> Result<()> {
        if !ctx.sandbox.model().find_by_name_glob("provider", "dcos")?.is_empty() {
            debug!("DC/OS provider already declared");
            return Ok(());
        }
        let contents = self.provider_contents(ctx.sandbox)?;
        ctx.sandbox.write_file(PROVIDER_FILE, contents.as_bytes())?;
        ctx.ui.info(format!(
            "You are using dcos_ resources but you don't have a DC/OS provider. I created {} for you, please have a look",
            ctx.ui.bold(PROVIDER_FILE)
        ));
        ctx.sandbox.reload()
    }

    fn after_run(&self, _ctx: &mut Context<'_>, _tool_error: Option<&anyhow::Error>) -> Result<()> {
        Ok(())
    }

    fn commands(&self) -> &[Box<dyn PluginCommand>] {
        &[]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugins::testing::*;

    const PACKAGE_TF: &str = r#"
resource "dcos_package_repo" "kafka" {
  name = "Universe"
}

data "dcos_package_version" "kafka" {
  name = "kafka"
}
"#;

    #[test]
    fn test_is_used_by_dcos_resources() -> Result<()> {
        let used = TestProject::new(&[("service-kafka.tf", PACKAGE_TF)]);
        assert!(DcosProviderPlugin.is_used(&used.sandbox)?);
        let unused = TestProject::new(&[("main.tf", CLUSTER_TF)]);
        assert!(!DcosProviderPlugin.is_used(&unused.sandbox)?);
        Ok(())
    }

    #[test]
    fn test_writes_provider_for_cluster_module() -> Result<()> {
        let mut project = TestProject::new(&[("main.tf", CLUSTER_TF), ("service-kafka.tf", PACKAGE_TF)]);
        DcosProviderPlugin.before_run(&mut project.ctx(), false)?;
        assert_eq!(
            project.read(PROVIDER_FILE),
            "// This connects to DC/OS and provides the dcos_* resources\n\
             provider \"dcos\" {\n\
             \x20 dcos_url = \"${module.dcos.masters-loadbalancer}\"\n\
             }\n"
        );
        assert!(project.output().contains("I created provider-dcos.tf for you"));
        // The model was reloaded, so a second run leaves the file alone.
        assert!(project.sandbox.model().get("provider", "dcos").is_some());
        std::fs::write(project.dir.path().join(PROVIDER_FILE), "provider \"dcos\" {}\n")?;
        project.sandbox.reload()?;
        DcosProviderPlugin.before_run(&mut project.ctx(), false)?;
        assert_eq!(project.read(PROVIDER_FILE), "provider \"dcos\" {}\n");
        Ok(())
    }

    #[test]
    fn test_enterprise_variant_adds_bootstrap_credentials() -> Result<()> {
        let cluster = CLUSTER_TF.replace("\"open\"", "\"ee\"");
        let mut project = TestProject::new(&[("main.tf", &cluster), ("service-kafka.tf", PACKAGE_TF)]);
        DcosProviderPlugin.before_run(&mut project.ctx(), false)?;
        let text = project.read(PROVIDER_FILE);
        assert!(text.contains("  user     = \"bootstrapuser\""));
        assert!(text.contains("  password = \"deleteme\""));
        Ok(())
    }

    #[test]
    fn test_provider_without_cluster_module_is_bare() -> Result<()> {
        let mut project = TestProject::new(&[("service-kafka.tf", PACKAGE_TF)]);
        DcosProviderPlugin.before_run(&mut project.ctx(), false)?;
        assert!(!project.read(PROVIDER_FILE).contains("dcos_url"));
        Ok(())
    }
}

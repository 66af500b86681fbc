//! # dcos-aws
//!
//! File: cli/src/plugins/dcos_aws.rs
//!
//! Active whenever the project declares a `dcos-terraform/dcos/aws` module.
//!
//! - Before terraform runs, AWS credentials must be valid. Expired
//!   credentials are refreshed once through `maws` when it is installed and
//!   `AWS_PROFILE` is set.
//! - `add-aws-cluster` writes `cluster-aws.tf` from the flag table in
//!   `aws_flags`, and after the following terraform run the user is told
//!   how to plan and apply it.
//!
use crate::common::crypt;
use crate::common::network::VersionLookup;
use crate::common::system::aws::{CredentialCheck, CredentialRefresher};
use crate::common::system::current_username;
use crate::common::ui::Ui;
use crate::core::error::{Result, WheelsError};
use crate::core::templating::{self, CLUSTER_AWS_BODY, CLUSTER_AWS_POST, CLUSTER_AWS_PRE};
use crate::core::tfgen::{FlagSpec, Parsed, TerraformFileConfig};
use crate::plugins::aws_flags::{AWS_CLUSTER_FLAGS, AWS_LIST_FLAGS, AWS_MAP_FLAGS};
use crate::plugins::{Context, Plugin, PluginCommand, AWS_CLUSTER_MODULE_SOURCE};
use crate::project::Sandbox;
use serde::Serialize;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::debug;

pub const CLUSTER_FILE: &str = "cluster-aws.tf";

const FALLBACK_OWNER: &str = "somebody";

pub struct DcosAwsPlugin {
    credentials: Box<dyn CredentialCheck>,
    refresher: Box<dyn CredentialRefresher>,
    /// File written by `add-aws-cluster` during this process.
    created_file: Rc<RefCell<Option<String>>>,
    commands: Vec<Box<dyn PluginCommand>>,
}

impl DcosAwsPlugin {
    pub fn new(
        credentials: Box<dyn CredentialCheck>,
        refresher: Box<dyn CredentialRefresher>,
        versions: Box<dyn VersionLookup>,
    ) -> Self {
        let created_file = Rc::new(RefCell::new(None));
        Self {
            credentials,
            refresher,
            commands: vec![Box::new(AddAwsClusterCommand {
                versions,
                created_file: Rc::clone(&created_file),
            })],
            created_file,
        }
    }

    fn ensure_credentials(&self, ui: &Ui) -> Result<()> {
        if self.credentials.credentials_valid() {
            return Ok(());
        }
        if self.refresher.is_available() {
            ui.info(format!(
                "Your AWS credentials have expired, going to refresh them using {}",
                ui.bold("maws")
            ));
            if let Err(e) = self.refresher.refresh() {
                debug!("maws refresh failed: {:#}", e);
                anyhow::bail!(WheelsError::Precondition(
                    "Failed to login with `maws`, please retry manually".to_string()
                ));
            }
            if !self.credentials.credentials_valid() {
                anyhow::bail!(WheelsError::Precondition(
                    "Failed to refresh credentials with `maws`, please retry manually".to_string()
                ));
            }
            return Ok(());
        }
        anyhow::bail!(WheelsError::Precondition(
            "Could not find (still valid) AWS credentials in your environment. Use `maws login` and make sure to export the AWS_PROFILE".to_string()
        ))
    }
}

impl Plugin for DcosAwsPlugin {
    fn name(&self) -> &str {
        "dcos-aws"
    }

    fn is_used(&self, sandbox: &Sandbox) -> Result<bool> {
        Ok(!sandbox
            .model()
            .find_by_field_glob("module", "source", AWS_CLUSTER_MODULE_SOURCE)?
            .is_empty())
    }

    fn before_run(&self, ctx: &mut Context<'_>, _init_run: bool) -> Result<()> {
        self.ensure_credentials(ctx.ui)
    }

    fn after_run(&self, ctx: &mut Context<'_>, _tool_error: Option<&anyhow::Error>) -> Result<()> {
        let Some(file) = self.created_file.borrow_mut().take() else {
            return Ok(());
        };
        let ui = ctx.ui;
        ui.blank();
        ui.line(ui.bold("You can now deploy a cluster on Amazon AWS"));
        ui.blank();
        ui.line(format!(
            "The file {} was generated in your project directory and it describes",
            file
        ));
        ui.line("the resources that are needed to be created in order to deploy a DC/OS");
        ui.line("cluster on Amazon. Your next steps are:");
        ui.blank();
        ui.line(format!(
            "  1. {} plan -out=plan.out  # To prepare your deployment",
            ctx.program
        ));
        ui.line(format!(
            "  2. {} apply plan.out      # To create the deployment",
            ctx.program
        ));
        ui.blank();
        Ok(())
    }

    fn commands(&self) -> &[Box<dyn PluginCommand>] {
        &self.commands
    }
}

#[derive(Serialize)]
struct ClusterTemplate<'a> {
    region: &'a str,
    module_version: String,
    dcos_version: String,
    key_name: &'a str,
    static_tags: bool,
    owner: &'a str,
    expiration: &'a str,
}

pub struct AddAwsClusterCommand {
    versions: Box<dyn VersionLookup>,
    created_file: Rc<RefCell<Option<String>>>,
}

impl AddAwsClusterCommand {
    fn file_config(&self, owner: &str, expiration: &str) -> TerraformFileConfig {
        let mut flags: Vec<FlagSpec> = AWS_CLUSTER_FLAGS
            .iter()
            .map(|(name, help)| {
                if AWS_LIST_FLAGS.contains(name) {
                    FlagSpec::list(name, help)
                } else if AWS_MAP_FLAGS.contains(name) {
                    FlagSpec::map(name, help)
                } else {
                    FlagSpec::scalar(name, help)
                }
            })
            .collect();
        flags.push(FlagSpec::ignored(
            "dcos_superuser_password",
            "The plain-text password to encode",
        ));
        flags.push(
            FlagSpec::ignored("owner", "The user-name that owns this cluster").with_default(owner),
        );
        flags.push(
            FlagSpec::ignored(
                "expiration",
                "How long to keep the cluster running before cloud-cleaner tears it down",
            )
            .with_default(expiration),
        );

        TerraformFileConfig {
            command: self.name().to_string(),
            about: format!(
                "This command will generate a '{}' file in the project directory that describes \
                 a deployment of a DC/OS cluster on AWS. A file with sane defaults is created for \
                 you. You can override the values with the following flags:",
                CLUSTER_FILE
            ),
            flags,
            body_prefix: "  ".to_string(),
            ..Default::default()
        }
    }
}

impl PluginCommand for AddAwsClusterCommand {
    fn name(&self) -> &str {
        "add-aws-cluster"
    }

    fn description(&self) -> &str {
        "Adds a configuration file to deploy a DC/OS cluster on AWS"
    }

    fn handle(&self, args: &[String], ctx: &mut Context<'_>) -> Result<()> {
        let default_owner = current_username().unwrap_or_else(|| FALLBACK_OWNER.to_string());
        let mut file = self.file_config(&default_owner, &ctx.config.cluster.expiration);
        let mut values = match file.parse(ctx.program, args)? {
            Parsed::Help(text) => {
                ctx.ui.line(text.trim_end());
                return Ok(());
            }
            Parsed::Values(values) => values,
        };

        if let Some(password) = values
            .value("dcos_superuser_password")
            .filter(|p| !p.is_empty())
            .map(str::to_string)
        {
            values.set("dcos_superuser_password_hash", crypt::hash_password(&password));
        }

        let owner = values.value("owner").unwrap_or(FALLBACK_OWNER).to_string();
        let expiration = values
            .value("expiration")
            .unwrap_or(ctx.config.cluster.expiration.as_str())
            .to_string();
        let static_tags = !values.is_set("tags");
        if !static_tags {
            values.prepend("tags", format!("expiration={}", expiration));
            values.prepend("tags", format!("owner={}", owner));
        }

        let variant = values.value("dcos_variant").unwrap_or("open").to_string();
        let template = ClusterTemplate {
            region: &ctx.config.cluster.region,
            module_version: self.versions.latest_module_version(),
            dcos_version: self.versions.latest_dcos_version(&variant),
            key_name: &ctx.config.cluster.key_name,
            static_tags,
            owner: &owner,
            expiration: &expiration,
        };
        file.pre_lines = templating::render_lines(&CLUSTER_AWS_PRE, &template)?;
        file.body_lines = templating::render_lines(&CLUSTER_AWS_BODY, &template)?;
        file.post_lines = templating::render_lines(&CLUSTER_AWS_POST, &template)?;

        let contents = file.generate(&values)?;
        ctx.ui.info(ctx.ui.bold(&format!(
            "Writing {} containing information for deploying a DC/OS cluster on AWS",
            CLUSTER_FILE
        )));
        ctx.sandbox.write_file(CLUSTER_FILE, contents.as_bytes())?;
        *self.created_file.borrow_mut() = Some(CLUSTER_FILE.to_string());
        Ok(())
    }
}

//! # tfwheels Template System
//!
//! File: cli/src/core/templating.rs
//!
//! ## Overview
//!
//! Renders the `.tf` files tfwheels writes on the user's behalf. The
//! templates live in `cli/templates/` and are embedded into the binary, so
//! the tool never depends on files next to the executable.
//!
//! ## Architecture
//!
//! Each template is an `EmbeddedTemplate` (name + source). Rendering uses
//! Tera with autoescaping disabled, since the output is HCL and not HTML.
//! The context is any `serde::Serialize` value, usually a small struct or
//! map built by the plugin.
//!
//! - `render`: the full text.
//! - `render_lines`: the text split into lines, for the flag-driven
//!   generator which edits the body line by line.
//!
use crate::core::error::{Result, WheelsError};
use anyhow::{anyhow, Context};
use serde::Serialize;
use tera::Tera;
use tracing::debug;

/// A template compiled into the binary.
#[derive(Debug, Clone, Copy)]
pub struct EmbeddedTemplate {
    pub name: &'static str,
    pub source: &'static str,
}

pub const CLUSTER_AWS_PRE: EmbeddedTemplate = EmbeddedTemplate {
    name: "cluster-aws.pre.tf",
    source: include_str!("../../templates/cluster-aws.pre.tf.tera"),
};

pub const CLUSTER_AWS_BODY: EmbeddedTemplate = EmbeddedTemplate {
    name: "cluster-aws.body.tf",
    source: include_str!("../../templates/cluster-aws.body.tf.tera"),
};

pub const CLUSTER_AWS_POST: EmbeddedTemplate = EmbeddedTemplate {
    name: "cluster-aws.post.tf",
    source: include_str!("../../templates/cluster-aws.post.tf.tera"),
};

pub const PROVIDER_DCOS: EmbeddedTemplate = EmbeddedTemplate {
    name: "provider-dcos.tf",
    source: include_str!("../../templates/provider-dcos.tf.tera"),
};

pub const SERVICE: EmbeddedTemplate = EmbeddedTemplate {
    name: "service.tf",
    source: include_str!("../../templates/service.tf.tera"),
};

/// Renders `template` with the given context.
pub fn render<C: Serialize>(template: &EmbeddedTemplate, context: &C) -> Result<String> {
    debug!("Rendering template {}", template.name);
    let tera_context = tera::Context::from_serialize(context).map_err(|e| {
        anyhow!(WheelsError::Template { source: e })
            .context(format!("Failed to build context for {}", template.name))
    })?;
    Tera::one_off(template.source, &tera_context, false)
        .map_err(|e| anyhow!(WheelsError::Template { source: e }))
        .with_context(|| format!("Failed to render template {}", template.name))
}

/// Renders `template` and splits the result into lines (no terminators).
pub fn render_lines<C: Serialize>(template: &EmbeddedTemplate, context: &C) -> Result<Vec<String>> {
    Ok(render(template, context)?
        .lines()
        .map(str::to_string)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_cluster_pre_fills_region_and_version() -> Result<()> {
        let lines = render_lines(
            &CLUSTER_AWS_PRE,
            &json!({ "region": "eu-central-1", "module_version": "0.2.3" }),
        )?;
        assert_eq!(lines[0], "provider \"aws\" {");
        assert!(lines.contains(&"  region = \"eu-central-1\"".to_string()));
        assert!(lines.contains(&"  version = \"~> 0.2.3\"".to_string()));
        assert_eq!(lines.last().map(String::as_str), Some(""));
        Ok(())
    }

    #[test]
    fn test_cluster_post_static_tags_toggle() -> Result<()> {
        let with_tags = render_lines(
            &CLUSTER_AWS_POST,
            &json!({ "static_tags": true, "expiration": "2h", "owner": "alice" }),
        )?;
        assert_eq!(with_tags[0], "");
        assert_eq!(with_tags[1], "  tags = {");
        assert_eq!(with_tags[2], "    \"expiration\" = \"2h\"");
        assert_eq!(with_tags[3], "    \"owner\"      = \"alice\"");
        assert_eq!(with_tags[4], "  }");
        assert_eq!(with_tags[5], "}");

        let without = render_lines(
            &CLUSTER_AWS_POST,
            &json!({ "static_tags": false, "expiration": "2h", "owner": "alice" }),
        )?;
        assert_eq!(without[0], "}");
        assert!(!without.iter().any(|l| l.contains("tags")));
        assert!(without.iter().any(|l| l.contains("${module.dcos.masters-ips}")));
        Ok(())
    }

    #[test]
    fn test_provider_variants() -> Result<()> {
        let bare = render(&PROVIDER_DCOS, &json!({ "cluster_module": "", "enterprise": false }))?;
        assert_eq!(
            bare,
            "// This connects to DC/OS and provides the dcos_* resources\nprovider \"dcos\" {\n}\n"
        );

        let ee = render(&PROVIDER_DCOS, &json!({ "cluster_module": "dcos", "enterprise": true }))?;
        assert_eq!(
            ee,
            "// This connects to DC/OS and provides the dcos_* resources\n\
             provider \"dcos\" {\n\
             \x20 dcos_url = \"${module.dcos.masters-loadbalancer}\"\n\
             \x20 user     = \"bootstrapuser\"\n\
             \x20 password = \"deleteme\"\n\
             }\n"
        );
        Ok(())
    }

    #[test]
    fn test_service_config_lines_are_inlined() -> Result<()> {
        let text = render(
            &SERVICE,
            &json!({
                "name": "kafka",
                "package": "kafka",
                "version": "latest",
                "app_id": "team/kafka",
                "service_account": "team__kafka",
                "config_lines": ["", "section {", "}"],
            }),
        )?;
        assert!(text.contains(
            "  version_spec = \"${data.dcos_package_version.kafka.spec}\"\n\nsection {\n}\n}\n"
        ));
        assert!(text.contains("  service_account = \"team__kafka-principal\""));
        assert!(text.ends_with("}\n"));
        Ok(())
    }
}

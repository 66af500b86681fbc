//! # tfwheels Resource Queries
//!
//! File: cli/src/project/query.rs
//!
//! Glob lookups over the merged `ResourceModel`, used to decide which
//! plugins are active and to find resources that are already declared.
//! Every match is returned as a copy of its fields with the resource name
//! added under `NAME_KEY`. No match (or no resource of that type at all)
//! is an empty result, never an error.
//!
use crate::core::error::{Result, WheelsError};
use crate::project::model::{Fields, ResourceModel, Value};
use glob::Pattern;

/// Reserved field carrying the resource's own name in query results.
pub const NAME_KEY: &str = "_name";

fn compile(pattern: &str) -> Result<Pattern> {
    Pattern::new(pattern).map_err(|e| {
        WheelsError::Validation(format!("Invalid glob pattern '{}': {}", pattern, e)).into()
    })
}

fn decorated(name: &str, fields: &Fields) -> Fields {
    let mut result = fields.clone();
    result.insert(NAME_KEY.to_string(), Value::String(name.to_string()));
    result
}

impl ResourceModel {
    /// Resources of `kind` whose string field `field` matches `pattern`.
    pub fn find_by_field_glob(&self, kind: &str, field: &str, pattern: &str) -> Result<Vec<Fields>> {
        let pattern = compile(pattern)?;
        let Some(named) = self.resources_of(kind) else {
            return Ok(Vec::new());
        };
        Ok(named
            .iter()
            .filter(|(_, fields)| {
                fields
                    .get(field)
                    .and_then(Value::as_str)
                    .is_some_and(|value| pattern.matches(value))
            })
            .map(|(name, fields)| decorated(name, fields))
            .collect())
    }

    /// Resources of `kind` whose name matches `pattern`.
    pub fn find_by_name_glob(&self, kind: &str, pattern: &str) -> Result<Vec<Fields>> {
        let pattern = compile(pattern)?;
        let Some(named) = self.resources_of(kind) else {
            return Ok(Vec::new());
        };
        Ok(named
            .iter()
            .filter(|(name, _)| pattern.matches(name))
            .map(|(name, fields)| decorated(name, fields))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::hcl;

    fn model(sources: &[&str]) -> ResourceModel {
        let mut model = ResourceModel::new();
        for (i, source) in sources.iter().enumerate() {
            model
                .absorb(hcl::parse(&format!("file{}.tf", i), source).unwrap())
                .unwrap();
        }
        model
    }

    #[test]
    fn test_find_by_field_glob() {
        let model = model(&[
            "module \"dcos\" {\n  source = \"dcos-terraform/dcos/aws\"\n}\n",
            "module \"vpc\" {\n  source = \"terraform-aws-modules/vpc/aws\"\n}\n",
        ]);

        let found = model
            .find_by_field_glob("module", "source", "*dcos/aws")
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0][NAME_KEY], Value::String("dcos".into()));
        assert_eq!(
            found[0]["source"],
            Value::String("dcos-terraform/dcos/aws".into())
        );
    }

    #[test]
    fn test_absent_type_is_empty_not_error() {
        let model = model(&["provider \"aws\" {\n  region = \"us-west-2\"\n}\n"]);
        assert!(model
            .find_by_field_glob("module", "source", "*dcos/aws")
            .unwrap()
            .is_empty());
        assert!(model.find_by_name_glob("resource", "dcos_*").unwrap().is_empty());
    }

    #[test]
    fn test_non_string_field_never_matches() {
        let model = model(&["module \"dcos\" {\n  source = 12\n}\n"]);
        assert!(model
            .find_by_field_glob("module", "source", "*")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_find_by_name_glob() {
        let model = model(&[
            "resource \"dcos_package_repo\" \"kafka\" {\n  name = \"Universe\"\n}\n",
            "resource \"aws_instance\" \"web\" {\n  ami = \"x\"\n}\n",
        ]);
        let found = model.find_by_name_glob("resource", "dcos_*").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0][NAME_KEY], Value::String("dcos_package_repo".into()));
    }

    #[test]
    fn test_invalid_pattern_is_validation_error() {
        let model = ResourceModel::new();
        let err = model.find_by_name_glob("module", "[").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WheelsError>(),
            Some(WheelsError::Validation(_))
        ));
    }
}

//! # tfwheels Resource Model
//!
//! File: cli/src/project/model.rs
//!
//! ## Overview
//!
//! The merged, in-memory view of every `.tf` file at the sandbox root:
//! `resource_type -> resource_name -> field -> Value`.
//!
//! ## Architecture
//!
//! The parser (`project::hcl`) produces a *raw* tree per file in the
//! conventional "array of single-key objects" shape:
//!
//! ```text
//! module -> [ { dcos -> [ { source = "...", num_masters = 1 } ] } ]
//! ```
//!
//! `ResourceModel::absorb` checks that shape (schema errors otherwise) and
//! folds each entry into the model with `merge_fields`.
//!
//! Merge policy:
//! - scalars: the later value wins, whatever its scalar type;
//! - lists: the later list replaces the earlier one entirely;
//! - maps: merged key by key, recursively;
//! - a map or list meeting a different kind of value is a conflict.
//!
use crate::core::error::{Result, WheelsError};
use std::collections::BTreeMap;
use std::fmt;

/// Fields of a single resource, ordered by name.
pub type Fields = BTreeMap<String, Value>;

/// A value read from a declarative file.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Number(f64),
    Bool(bool),
    List(Vec<Value>),
    Map(Fields),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Bool(_) => "bool",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::String(s) => write!(f, "{}", s),
            Value::Number(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(map) => {
                write!(f, "{{")?;
                for (i, (k, v)) in map.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} = {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

/// Deep-merges `overlay` into `base`. `path` names the position for error messages.
pub fn merge_value(path: &str, base: &mut Value, overlay: Value) -> std::result::Result<(), String> {
    match (base, overlay) {
        (Value::Map(base_map), Value::Map(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_value(&format!("{}.{}", path, key), existing, value)?,
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
            Ok(())
        }
        (base, overlay) => {
            let both_lists = matches!((&*base, &overlay), (Value::List(_), Value::List(_)));
            if both_lists || (base.is_scalar() && overlay.is_scalar()) {
                *base = overlay;
                Ok(())
            } else {
                Err(format!(
                    "field '{}' is a {} in one file and a {} in another",
                    path,
                    base.kind(),
                    overlay.kind()
                ))
            }
        }
    }
}

/// Merges the fields of one resource occurrence into another.
pub fn merge_fields(resource: &str, base: &mut Fields, overlay: Fields) -> Result<()> {
    for (key, value) in overlay {
        match base.get_mut(&key) {
            Some(existing) => merge_value(&key, existing, value).map_err(|message| {
                WheelsError::Merge {
                    resource: resource.to_string(),
                    message,
                }
            })?,
            None => {
                base.insert(key, value);
            }
        }
    }
    Ok(())
}

/// Canonical three-level model built from all declarative files.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceModel {
    resources: BTreeMap<String, BTreeMap<String, Fields>>,
}

impl ResourceModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds one parsed file (raw shape) into the model.
    pub fn absorb(&mut self, raw: Fields) -> Result<()> {
        for (kind, entries) in raw {
            let Value::List(entries) = entries else {
                anyhow::bail!(WheelsError::Schema {
                    resource: kind,
                    message: "expected a block, found an attribute".to_string(),
                });
            };
            for entry in entries {
                let Value::Map(entry) = entry else {
                    anyhow::bail!(WheelsError::Schema {
                        resource: kind,
                        message: "expected an object keyed by resource name".to_string(),
                    });
                };
                if entry.len() != 1 {
                    anyhow::bail!(WheelsError::Schema {
                        resource: kind,
                        message: format!("expected exactly one name per entry, found {}", entry.len()),
                    });
                }
                for (name, bodies) in entry {
                    let label = format!("{}.{}", kind, name);
                    let Value::List(bodies) = bodies else {
                        anyhow::bail!(WheelsError::Schema {
                            resource: label,
                            message: "expected a list of bodies".to_string(),
                        });
                    };
                    for body in bodies {
                        let Value::Map(fields) = body else {
                            anyhow::bail!(WheelsError::Schema {
                                resource: label,
                                message: "expected a block body".to_string(),
                            });
                        };
                        let target = self
                            .resources
                            .entry(kind.clone())
                            .or_default()
                            .entry(name.clone())
                            .or_default();
                        merge_fields(&label, target, fields)?;
                    }
                }
            }
        }
        Ok(())
    }

    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// All resources of one type, keyed by name.
    pub fn resources_of(&self, kind: &str) -> Option<&BTreeMap<String, Fields>> {
        self.resources.get(kind)
    }

    pub fn get(&self, kind: &str, name: &str) -> Option<&Fields> {
        self.resources.get(kind).and_then(|named| named.get(name))
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::String(v.to_string())
    }

    fn fields(pairs: &[(&str, Value)]) -> Fields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    /// Builds the raw per-file shape for a single `kind "name" { ... }` block.
    fn raw(kind: &str, name: &str, body: Fields) -> Fields {
        let entry: Fields = [(name.to_string(), Value::List(vec![Value::Map(body)]))].into();
        [(kind.to_string(), Value::List(vec![Value::Map(entry)]))].into()
    }

    #[test]
    fn test_disjoint_fields_are_combined() {
        let mut model = ResourceModel::new();
        model
            .absorb(raw("module", "dcos", fields(&[("x", Value::Number(1.0))])))
            .unwrap();
        model
            .absorb(raw("module", "dcos", fields(&[("y", Value::Number(2.0))])))
            .unwrap();

        let merged = model.get("module", "dcos").unwrap();
        assert_eq!(merged.get("x"), Some(&Value::Number(1.0)));
        assert_eq!(merged.get("y"), Some(&Value::Number(2.0)));
    }

    #[test]
    fn test_later_scalar_wins() {
        let mut model = ResourceModel::new();
        model
            .absorb(raw("module", "dcos", fields(&[("x", Value::Number(1.0))])))
            .unwrap();
        model
            .absorb(raw("module", "dcos", fields(&[("x", s("5"))])))
            .unwrap();
        assert_eq!(model.get("module", "dcos").unwrap().get("x"), Some(&s("5")));
    }

    #[test]
    fn test_lists_are_replaced_not_concatenated() {
        let mut base = Value::List(vec![s("a"), s("b")]);
        merge_value("ips", &mut base, Value::List(vec![s("c")])).unwrap();
        assert_eq!(base, Value::List(vec![s("c")]));
    }

    #[test]
    fn test_maps_merge_recursively() {
        let mut base = Value::Map(fields(&[
            ("owner", s("alice")),
            ("nested", Value::Map(fields(&[("a", s("1"))]))),
        ]));
        let overlay = Value::Map(fields(&[
            ("expiration", s("2h")),
            ("nested", Value::Map(fields(&[("b", s("2"))]))),
        ]));
        merge_value("tags", &mut base, overlay).unwrap();

        let map = base.as_map().unwrap();
        assert_eq!(map.get("owner"), Some(&s("alice")));
        assert_eq!(map.get("expiration"), Some(&s("2h")));
        let nested = map.get("nested").and_then(Value::as_map).unwrap();
        assert_eq!(nested.len(), 2);
    }

    #[test]
    fn test_list_versus_map_conflict() {
        let mut model = ResourceModel::new();
        model
            .absorb(raw("module", "dcos", fields(&[("tags", Value::List(vec![]))])))
            .unwrap();
        let err = model
            .absorb(raw("module", "dcos", fields(&[("tags", Value::Map(Fields::new()))])))
            .unwrap_err();
        let typed = err.downcast_ref::<WheelsError>().unwrap();
        assert!(matches!(typed, WheelsError::Merge { resource, .. } if resource == "module.dcos"));
    }

    #[test]
    fn test_attribute_at_top_level_is_schema_error() {
        let mut model = ResourceModel::new();
        let err = model
            .absorb([("region".to_string(), s("us-west-2"))].into())
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WheelsError>(),
            Some(WheelsError::Schema { .. })
        ));
    }

    #[test]
    fn test_merging_twice_is_idempotent() {
        let files = vec![
            raw("module", "dcos", fields(&[("x", Value::Number(1.0))])),
            raw("provider", "aws", fields(&[("region", s("us-west-2"))])),
        ];
        let build = || {
            let mut model = ResourceModel::new();
            for file in files.clone() {
                model.absorb(file).unwrap();
            }
            model
        };
        assert_eq!(build(), build());
    }
}

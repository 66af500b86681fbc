//! # tfwheels Declarative File Parser
//!
//! File: cli/src/project/hcl.rs
//!
//! ## Overview
//!
//! Reads one `.tf` file with the `hcl-rs` parser and converts its `Body` into
//! the raw per-file shape consumed by `ResourceModel::absorb`. Literal
//! values keep their type. Everything terraform evaluates later
//! (interpolated strings, traversals such as `module.dcos.masters-ips`,
//! function calls) is kept as its source text.
//!
//! ## Architecture
//!
//! ```text
//! resource "dcos_package_repo" "kafka" { name = "Universe" }
//!   => resource -> [ { dcos_package_repo -> [ { kafka -> { name = "Universe" } } ] } ]
//! ```
//!
//! The first label is the resource name; further labels nest as maps. A
//! block without labels is stored under the empty name. Nested blocks inside
//! a body become map fields; a repeated unlabeled nested block becomes a list.
//!
use crate::core::error::{Result, WheelsError};
use crate::project::model::{merge_value, Fields, Value};
use ::hcl::expr::{Expression, HeredocStripMode, ObjectKey, TemplateExpr};
use ::hcl::structure::{Block, BlockLabel, Body, Structure};

/// Parses one declarative file into the raw "array of single-key objects" shape.
pub fn parse(file: &str, source: &str) -> Result<Fields> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    let body = ::hcl::parse(source).map_err(|e| WheelsError::Parse {
        file: file.to_string(),
        message: e.to_string(),
    })?;
    Converter { file }.into_raw(body)
}

struct Converter<'a> {
    file: &'a str,
}

impl Converter<'_> {
    fn error(&self, message: impl Into<String>) -> anyhow::Error {
        WheelsError::Parse {
            file: self.file.to_string(),
            message: message.into(),
        }
        .into()
    }

    fn into_raw(&self, body: Body) -> Result<Fields> {
        let mut raw = Fields::new();
        for structure in body {
            match structure {
                Structure::Attribute(attribute) => {
                    let name = attribute.key.to_string();
                    if raw.insert(name.clone(), value_of(attribute.expr)).is_some() {
                        return Err(self.error(format!("duplicate attribute '{}'", name)));
                    }
                }
                Structure::Block(block) => {
                    let (kind, labels, body) = parts(block);
                    let fields = self.body_fields(body)?;
                    let (name, rest) = match labels.split_first() {
                        Some((first, rest)) => (first.clone(), rest),
                        None => (String::new(), &[][..]),
                    };
                    let entry: Fields =
                        [(name, Value::List(vec![Value::Map(nest(rest, fields))]))].into();
                    match raw
                        .entry(kind.clone())
                        .or_insert_with(|| Value::List(Vec::new()))
                    {
                        Value::List(entries) => entries.push(Value::Map(entry)),
                        _ => {
                            return Err(self.error(format!(
                                "'{}' is used both as an attribute and a block",
                                kind
                            )))
                        }
                    }
                }
            }
        }
        Ok(raw)
    }

    fn body_fields(&self, body: Body) -> Result<Fields> {
        let mut fields = Fields::new();
        for structure in body {
            match structure {
                Structure::Attribute(attribute) => {
                    let name = attribute.key.to_string();
                    if fields.contains_key(&name) {
                        return Err(self.error(format!("duplicate attribute '{}'", name)));
                    }
                    fields.insert(name, value_of(attribute.expr));
                }
                Structure::Block(block) => {
                    let (kind, labels, body) = parts(block);
                    let inner = self.body_fields(body)?;
                    match fields.get_mut(&kind) {
                        None => {
                            fields.insert(kind, Value::Map(nest(&labels, inner)));
                        }
                        Some(existing) if !labels.is_empty() => {
                            merge_value(&kind, existing, Value::Map(nest(&labels, inner)))
                                .map_err(|message| self.error(message))?;
                        }
                        Some(existing) => match existing {
                            Value::List(blocks) => blocks.push(Value::Map(inner)),
                            Value::Map(_) => {
                                let first = std::mem::replace(existing, Value::List(Vec::new()));
                                *existing = Value::List(vec![first, Value::Map(inner)]);
                            }
                            _ => {
                                return Err(self.error(format!(
                                    "'{}' is used both as an attribute and a block",
                                    kind
                                )))
                            }
                        },
                    }
                }
            }
        }
        Ok(fields)
    }
}

fn parts(block: Block) -> (String, Vec<String>, Body) {
    let labels = block
        .labels
        .into_iter()
        .map(|label| match label {
            BlockLabel::String(s) => s,
            BlockLabel::Identifier(ident) => ident.to_string(),
        })
        .collect();
    (block.identifier.to_string(), labels, block.body)
}

fn value_of(expr: Expression) -> Value {
    match expr {
        Expression::String(s) => Value::String(s),
        Expression::Bool(b) => Value::Bool(b),
        Expression::Number(n) => match n.as_f64() {
            Some(f) => Value::Number(f),
            None => Value::String(n.to_string()),
        },
        Expression::Array(items) => Value::List(items.into_iter().map(value_of).collect()),
        Expression::Object(object) => Value::Map(
            object
                .into_iter()
                .map(|(key, value)| (key_of(key), value_of(value)))
                .collect(),
        ),
        Expression::TemplateExpr(template) => match *template {
            TemplateExpr::QuotedString(s) => Value::String(s),
            TemplateExpr::Heredoc(heredoc) => {
                let mut text = match heredoc.strip {
                    HeredocStripMode::Indent => dedent(&heredoc.template),
                    HeredocStripMode::None => heredoc.template,
                };
                if !text.ends_with('\n') {
                    text.push('\n');
                }
                Value::String(text)
            }
        },
        other => Value::String(other.to_string()),
    }
}

fn key_of(key: ObjectKey) -> String {
    match key {
        ObjectKey::Identifier(ident) => ident.to_string(),
        ObjectKey::Expression(Expression::String(s)) => s,
        ObjectKey::Expression(expr) => match value_of(expr) {
            Value::String(s) => s,
            other => other.to_string(),
        },
        other => other.to_string(),
    }
}

/// Strips the indentation shared by all non-blank lines, counted in chars.
fn dedent(text: &str) -> String {
    let indent = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .map(|l| l.chars().take_while(|c| c.is_whitespace()).count())
        .min()
        .unwrap_or(0);
    let mut out: Vec<String> = text
        .lines()
        .map(|l| l.chars().skip(indent).collect())
        .collect();
    if text.ends_with('\n') {
        out.push(String::new());
    }
    out.join("\n")
}

/// Wraps `fields` in one map level per label: `["a", "b"]` gives `{a = {b = fields}}`.
fn nest(labels: &[String], fields: Fields) -> Fields {
    match labels.split_first() {
        None => fields,
        Some((first, rest)) => [(first.clone(), Value::Map(nest(rest, fields)))].into(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single(raw: &Fields, kind: &str, name: &str) -> Fields {
        let entries = match raw.get(kind) {
            Some(Value::List(entries)) => entries,
            other => panic!("unexpected shape for {}: {:?}", kind, other),
        };
        let entry = entries[0].as_map().unwrap();
        match entry.get(name) {
            Some(Value::List(bodies)) => bodies[0].as_map().unwrap().clone(),
            other => panic!("unexpected body for {}: {:?}", name, other),
        }
    }

    #[test]
    fn test_parse_module_block() {
        let source = r#"
# Used to determine your public IP for forwarding rules
module "dcos" {
  source  = "dcos-terraform/dcos/aws"
  version = "~> 0.2.0"

  providers = {
    aws = "aws"
  }

  cluster_name_random_string = true
  admin_ips                  = ["${data.http.whatismyip.body}/32"]
  num_masters                = 1
  // dcos_variant = "ee"
}
"#;
        let raw = parse("cluster-aws.tf", source).unwrap();
        let dcos = single(&raw, "module", "dcos");

        assert_eq!(dcos["source"], Value::String("dcos-terraform/dcos/aws".into()));
        assert_eq!(dcos["cluster_name_random_string"], Value::Bool(true));
        assert_eq!(dcos["num_masters"], Value::Number(1.0));
        assert_eq!(
            dcos["admin_ips"],
            Value::List(vec![Value::String("${data.http.whatismyip.body}/32".into())])
        );
        let providers = dcos["providers"].as_map().unwrap();
        assert_eq!(providers["aws"], Value::String("aws".into()));
        assert!(!dcos.contains_key("dcos_variant"));
    }

    #[test]
    fn test_second_label_nests_under_the_name() {
        let source = "resource \"dcos_package_repo\" \"kafka\" {\n  name = \"Universe\"\n}\n";
        let raw = parse("service-kafka.tf", source).unwrap();
        let repo = single(&raw, "resource", "dcos_package_repo");
        let kafka = repo["kafka"].as_map().unwrap();
        assert_eq!(kafka["name"], Value::String("Universe".into()));
    }

    #[test]
    fn test_interpolation_and_repeated_sections() {
        let source = r#"data "dcos_package_config" "kafka" {
  version_spec = "${lookup(var.specs, "kafka")}"
  section {
    path = "service"
    json = <<EOF
{"name": "kafka"}
EOF
  }
  section {
    path = "brokers"
  }
}
"#;
        let raw = parse("service-kafka.tf", source).unwrap();
        let config = single(&raw, "data", "dcos_package_config");
        let kafka = config["kafka"].as_map().unwrap();
        assert_eq!(
            kafka["version_spec"],
            Value::String(r#"${lookup(var.specs, "kafka")}"#.into())
        );
        match &kafka["section"] {
            Value::List(sections) => {
                assert_eq!(sections.len(), 2);
                let first = sections[0].as_map().unwrap();
                assert_eq!(first["json"], Value::String("{\"name\": \"kafka\"}\n".into()));
            }
            other => panic!("expected repeated sections, got {:?}", other),
        }
    }

    #[test]
    fn test_indented_heredoc_is_dedented() {
        let source = "locals {\n  motd = <<-EOT\n    hello\n      world\n    EOT\n}\n";
        let raw = parse("locals.tf", source).unwrap();
        let locals = single(&raw, "locals", "");
        assert_eq!(locals["motd"], Value::String("hello\n  world\n".into()));
    }

    #[test]
    fn test_dedent_counts_chars_not_bytes() {
        let text = "\u{3000}\u{3000}één\n\u{3000}\u{3000}  twee\n";
        assert_eq!(dedent(text), "één\n  twee\n");
        assert_eq!(dedent("a\n  b"), "a\n  b");
    }

    #[test]
    fn test_unlabeled_block_uses_empty_name() {
        let raw = parse("versions.tf", "terraform {\n  required_version = \"> 0.11\"\n}\n").unwrap();
        let body = single(&raw, "terraform", "");
        assert_eq!(body["required_version"], Value::String("> 0.11".into()));
    }

    #[test]
    fn test_bare_expressions_kept_as_text() {
        let source = "output \"ips\" {\n  value = module.dcos.masters-ips\n  key = file(\"./license.txt\")\n}\n";
        let raw = parse("outputs.tf", source).unwrap();
        let out = single(&raw, "output", "ips");
        assert_eq!(out["value"], Value::String("module.dcos.masters-ips".into()));
        assert_eq!(out["key"], Value::String("file(\"./license.txt\")".into()));
    }

    #[test]
    fn test_unterminated_string_names_file() {
        let err = parse("broken.tf", "provider \"aws\" {\n  region = \"us-west-2\n}\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WheelsError>(),
            Some(WheelsError::Parse { file, .. }) if file == "broken.tf"
        ));
        assert!(err.to_string().contains("broken.tf"));
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = parse("dup.tf", "provider \"aws\" {\n  region = \"a\"\n  region = \"b\"\n}\n")
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<WheelsError>(),
            Some(WheelsError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_closing_brace() {
        assert!(parse("open.tf", "module \"dcos\" {\n  source = \"x\"\n").is_err());
    }
}

//! # tfwheels Flag-Driven Template Generator
//!
//! File: cli/src/core/tfgen.rs
//!
//! ## Overview
//!
//! Turns a flag table plus three static line blocks (pre, body, post) into
//! the text of a `.tf` file. The body holds sensible defaults; any flag the
//! user sets replaces the body line that mentions it.
//!
//! ## Architecture
//!
//! Every flag is registered once as a `FlagSpec` carrying its `FlagKind`:
//!
//! - `Scalar`: emitted inline as `name = "<json quoted value>"`.
//! - `List`: repeatable; occurrences accumulate in command-line order and
//!   are emitted as a `name = [ ... ]` block.
//! - `Map`: repeatable `key=value`; emitted as a `name = { ... }` block.
//! - `Ignored`: parsed but never emitted (the handler consumes it).
//!
//! Parsing uses clap's builder API. Only flags whose value came from the
//! command line count as *set*; defaults never touch the body.
//!
//! Generation, for each set flag in lexical order:
//! 1. skip ignored flags;
//! 2. drop the first live body line assigning the flag (comments and
//!    attributes that merely share a prefix are left alone);
//! 3. append scalars to the body, accumulate lists and maps.
//!
//! Output is `pre ++ body ++ list blocks ++ map blocks ++ post`.
//!
//! ## Examples
//!
//! ```rust
//! let config = TerraformFileConfig {
//!     command: "add-aws-cluster".into(),
//!     flags: vec![FlagSpec::scalar("num_masters", "Number of masters")],
//!     body_lines: vec!["  num_masters = 1".into()],
//!     body_prefix: "  ".into(),
//!     ..Default::default()
//! };
//! if let Parsed::Values(values) = config.parse("tfwheels", &args)? {
//!     let text = config.generate(&values)?;
//! }
//! ```
//!
use crate::core::error::{Result, WheelsError};
use clap::error::ErrorKind;
use clap::parser::ValueSource;
use clap::{Arg, ArgAction, Command};
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagKind {
    Scalar,
    List,
    Map,
    Ignored,
}

/// One registered flag.
#[derive(Debug, Clone)]
pub struct FlagSpec {
    pub name: String,
    pub help: String,
    pub default: Option<String>,
    pub kind: FlagKind,
}

impl FlagSpec {
    fn new(name: &str, help: &str, kind: FlagKind) -> Self {
        Self {
            name: name.to_string(),
            help: help.to_string(),
            default: None,
            kind,
        }
    }

    pub fn scalar(name: &str, help: &str) -> Self {
        Self::new(name, help, FlagKind::Scalar)
    }

    pub fn list(name: &str, help: &str) -> Self {
        Self::new(name, help, FlagKind::List)
    }

    pub fn map(name: &str, help: &str) -> Self {
        Self::new(name, help, FlagKind::Map)
    }

    pub fn ignored(name: &str, help: &str) -> Self {
        Self::new(name, help, FlagKind::Ignored)
    }

    pub fn with_default(mut self, default: impl Into<String>) -> Self {
        self.default = Some(default.into());
        self
    }

    fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.name.clone())
            .long(self.name.clone())
            .value_name("VALUE")
            .help(self.help.clone());
        arg = match self.kind {
            FlagKind::List | FlagKind::Map => arg.action(ArgAction::Append),
            FlagKind::Scalar | FlagKind::Ignored => arg.action(ArgAction::Set),
        };
        if self.kind == FlagKind::Map {
            arg = arg.value_name("KEY=VALUE");
        }
        if let Some(default) = &self.default {
            arg = arg.default_value(default.clone());
        }
        arg
    }
}

/// Parsed flag values: explicit occurrences plus defaults.
#[derive(Debug, Default, Clone)]
pub struct FlagValues {
    set: BTreeMap<String, Vec<String>>,
    defaults: BTreeMap<String, String>,
}

impl FlagValues {
    pub fn is_set(&self, name: &str) -> bool {
        self.set.contains_key(name)
    }

    /// Every value given on the command line, in order.
    pub fn occurrences(&self, name: &str) -> &[String] {
        self.set.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The last explicit value, or the default.
    pub fn value(&self, name: &str) -> Option<&str> {
        self.set
            .get(name)
            .and_then(|values| values.last())
            .or_else(|| self.defaults.get(name))
            .map(String::as_str)
    }

    /// Marks `name` as set to exactly `value`, as if given on the command line.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        self.set.insert(name.to_string(), vec![value.into()]);
    }

    /// Adds an occurrence before the user's own. Later occurrences win for
    /// maps, so the user can still override it.
    pub fn prepend(&mut self, name: &str, value: impl Into<String>) {
        self.set
            .entry(name.to_string())
            .or_default()
            .insert(0, value.into());
    }
}

/// Outcome of parsing a command line against the flag table.
#[derive(Debug)]
pub enum Parsed {
    Values(FlagValues),
    /// `-h/--help` was given; the rendered help text.
    Help(String),
}

/// Input of the generator: the flag table and the static line blocks.
#[derive(Debug, Clone, Default)]
pub struct TerraformFileConfig {
    pub command: String,
    /// Text shown above the option list in `--help`.
    pub about: String,
    pub flags: Vec<FlagSpec>,
    pub pre_lines: Vec<String>,
    pub body_lines: Vec<String>,
    pub post_lines: Vec<String>,
    /// Indentation applied to generated lines (they live inside a block).
    pub body_prefix: String,
}

impl TerraformFileConfig {
    /// Rejects flag tables registering the same name twice.
    pub fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for flag in &self.flags {
            if !seen.insert(flag.name.as_str()) {
                anyhow::bail!(WheelsError::Validation(format!(
                    "Flag '{}' is registered more than once for '{}'",
                    flag.name, self.command
                )));
            }
        }
        Ok(())
    }

    pub fn kind_of(&self, name: &str) -> Option<FlagKind> {
        self.flags.iter().find(|f| f.name == name).map(|f| f.kind)
    }

    fn clap_command(&self, program: &str) -> Command {
        Command::new(self.command.clone())
            .bin_name(format!("{} {}", program, self.command))
            .about(self.about.clone())
            .no_binary_name(true)
            .args_override_self(true)
            .disable_version_flag(true)
            .args(self.flags.iter().map(FlagSpec::to_arg))
    }

    /// Parses `args` (the tokens after the command name).
    pub fn parse(&self, program: &str, args: &[String]) -> Result<Parsed> {
        self.validate()?;
        let matches = match self.clap_command(program).try_get_matches_from(args) {
            Ok(matches) => matches,
            Err(e) if e.kind() == ErrorKind::DisplayHelp => {
                return Ok(Parsed::Help(e.render().to_string()))
            }
            Err(e) => anyhow::bail!(WheelsError::Argument(e.render().to_string())),
        };

        let mut values = FlagValues::default();
        for flag in &self.flags {
            let name = flag.name.as_str();
            let given: Vec<String> = matches
                .get_many::<String>(name)
                .map(|vals| vals.cloned().collect())
                .unwrap_or_default();
            match matches.value_source(name) {
                Some(ValueSource::CommandLine) => {
                    values.set.insert(name.to_string(), given);
                }
                _ => {
                    if let Some(default) = given.into_iter().last() {
                        values.defaults.insert(name.to_string(), default);
                    }
                }
            }
        }
        debug!("Flags set for {}: {:?}", self.command, values.set.keys());
        Ok(Parsed::Values(values))
    }

    /// Produces the file contents for the given values.
    pub fn generate(&self, values: &FlagValues) -> Result<String> {
        let prefix = self.body_prefix.as_str();
        let mut body = self.body_lines.clone();
        let mut lists: Vec<(&str, &[String])> = Vec::new();
        let mut maps: Vec<(&str, BTreeMap<&str, &str>)> = Vec::new();

        for (name, occurrences) in &values.set {
            let kind = self.kind_of(name).ok_or_else(|| {
                WheelsError::Argument(format!("Unknown flag '--{}' for '{}'", name, self.command))
            })?;
            if kind == FlagKind::Ignored {
                continue;
            }
            if let Some(index) = body.iter().position(|line| assigns(line, name)) {
                body.remove(index);
            }
            match kind {
                FlagKind::Scalar => {
                    if let Some(value) = occurrences.last() {
                        body.push(format!(
                            "{}{} = {}",
                            prefix,
                            name,
                            serde_json::to_string(value)?
                        ));
                    }
                }
                FlagKind::List => lists.push((name.as_str(), occurrences.as_slice())),
                FlagKind::Map => {
                    let mut entries = BTreeMap::new();
                    for raw in occurrences {
                        let (key, value) = raw
                            .split_once('=')
                            .filter(|(key, _)| !key.is_empty())
                            .ok_or_else(|| {
                                WheelsError::Validation(format!(
                                    "Could not parse '{}' for --{}: expected key=value",
                                    raw, name
                                ))
                            })?;
                        entries.insert(key, value);
                    }
                    maps.push((name.as_str(), entries));
                }
                FlagKind::Ignored => {}
            }
        }

        let mut lines = self.pre_lines.clone();
        lines.extend(body);
        for (name, items) in lists {
            lines.push(String::new());
            lines.push(format!("{}{} = [", prefix, name));
            for item in items {
                lines.push(format!("{}  {},", prefix, serde_json::to_string(item)?));
            }
            lines.push(format!("{}]", prefix));
        }
        for (name, entries) in maps {
            lines.push(String::new());
            lines.push(format!("{}{} = {{", prefix, name));
            for (key, value) in entries {
                lines.push(format!(
                    "{}  {} = {}",
                    prefix,
                    map_key(key)?,
                    serde_json::to_string(value)?
                ));
            }
            lines.push(format!("{}}}", prefix));
        }
        lines.extend(self.post_lines.iter().cloned());

        let mut text = lines.join("\n");
        text.push('\n');
        Ok(text)
    }
}

/// True when `line` is an uncommented `name = ...` attribute.
fn assigns(line: &str, name: &str) -> bool {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') || trimmed.starts_with("//") {
        return false;
    }
    trimmed
        .strip_prefix(name)
        .is_some_and(|rest| rest.trim_start().starts_with('='))
}

/// Bare identifiers stay bare, anything else is quoted.
pub fn map_key(key: &str) -> Result<String> {
    let bare = key.chars().next().is_some_and(|c| c.is_alphabetic() || c == '_')
        && key.chars().all(|c| c.is_alphanumeric() || c == '_' || c == '-');
    if bare {
        Ok(key.to_string())
    } else {
        Ok(serde_json::to_string(key)?)
    }
}

//! # tfwheels Project Sandbox
//!
//! File: cli/src/project/sandbox.rs
//!
//! ## Overview
//!
//! The sandbox is the project directory tfwheels operates in. It owns the
//! base directory and the current `ResourceModel`, and it is the only place
//! that writes generated files.
//!
//! ## Architecture
//!
//! - `open` creates the directory if needed and performs the initial load.
//! - `is_empty` / `has_declarative_files` walk the whole tree (`walkdir`),
//!   ignoring every path with a component starting with `.`. This hides
//!   `.terraform/`, `.tfwheels.toml` and editor droppings.
//! - The model itself is built from the `.tf` files directly in the root,
//!   in lexical order, so a later file wins a scalar conflict.
//! - `reload` rebuilds the model wholesale; it never patches it.
//!
//! Single-process, single-threaded access is assumed. There is no locking.
//!
use crate::common::fs::io;
use crate::core::error::{Result, WheelsError};
use crate::project::{hcl, model::ResourceModel};
use anyhow::Context;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

/// Extension of the declarative files the model is built from.
pub const DECLARATIVE_EXTENSION: &str = "tf";

/// Reserved directory holding the cached terraform binary and runtime files.
pub const RESERVED_DIR: &str = ".terraform";

#[derive(Debug)]
pub struct Sandbox {
    base_dir: PathBuf,
    model: ResourceModel,
}

impl Sandbox {
    /// Opens (creating it if needed) the sandbox at `path` and loads its model.
    pub fn open(path: &Path) -> Result<Self> {
        io::ensure_dir_exists(path)?;
        let base_dir = path
            .canonicalize()
            .map_err(|e| WheelsError::FileSystem(format!("Cannot open {:?}: {}", path, e)))?;
        fs::read_dir(&base_dir)
            .map_err(|e| WheelsError::FileSystem(format!("Cannot read {:?}: {}", base_dir, e)))?;
        let model = load_model(&base_dir)?;
        info!("Opened sandbox at {}", base_dir.display());
        Ok(Self { base_dir, model })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    pub fn model(&self) -> &ResourceModel {
        &self.model
    }

    /// True when no visible regular file exists anywhere under the sandbox.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.visible_files()?.is_empty())
    }

    /// True when some visible file anywhere under the sandbox has the `.tf` extension.
    pub fn has_declarative_files(&self) -> Result<bool> {
        Ok(self
            .visible_files()?
            .iter()
            .any(|path| is_declarative(path)))
    }

    fn visible_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let walker = WalkDir::new(&self.base_dir)
            .into_iter()
            .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry.file_name()));
        for entry in walker {
            let entry = entry.map_err(|e| {
                WheelsError::FileSystem(format!(
                    "Failed to scan {}: {}",
                    self.base_dir.display(),
                    e
                ))
            })?;
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Absolute path of `name` inside the sandbox root.
    pub fn file_path(&self, name: &str) -> PathBuf {
        self.base_dir.join(name)
    }

    pub fn has_file(&self, name: &str) -> bool {
        self.file_path(name).is_file()
    }

    pub fn read_file(&self, name: &str) -> Result<String> {
        io::read_file_to_string(&self.file_path(name))
    }

    /// Writes `contents` to `name` in the sandbox root, overwriting any existing file.
    ///
    /// The model is not reloaded; call `reload` when the new file must be visible.
    pub fn write_file(&self, name: &str, contents: &[u8]) -> Result<()> {
        io::write_file(&self.file_path(name), contents)
    }

    /// Path of `name` under the reserved directory. Parent directories are created.
    pub fn temporary_path(&self, name: &str) -> Result<PathBuf> {
        let path = self.base_dir.join(RESERVED_DIR).join(name);
        if let Some(parent) = path.parent() {
            io::ensure_dir_exists(parent)?;
        }
        Ok(path)
    }

    /// True when `path` (relative paths are taken from the sandbox root)
    /// lies inside the sandbox.
    pub fn is_file_in_sandbox(&self, path: &Path) -> bool {
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        };
        normalize(&absolute).starts_with(&self.base_dir)
    }

    /// Rebuilds the model from disk, replacing the current one.
    pub fn reload(&mut self) -> Result<()> {
        self.model = load_model(&self.base_dir)?;
        debug!("Reloaded project model");
        Ok(())
    }
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

fn is_declarative(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext == DECLARATIVE_EXTENSION)
}

/// Resolves `.` and `..` lexically, without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Parses every visible `.tf` file in the root of `dir` and merges them in lexical order.
pub fn load_model(dir: &Path) -> Result<ResourceModel> {
    let mut paths = Vec::new();
    let entries = fs::read_dir(dir).with_context(|| format!("Failed to list {:?}", dir))?;
    for entry in entries {
        let entry = entry.with_context(|| format!("Failed to list {:?}", dir))?;
        let path = entry.path();
        if path.is_file() && is_declarative(&path) && !is_hidden(&entry.file_name()) {
            paths.push(path);
        }
    }
    paths.sort();

    let mut model = ResourceModel::new();
    for path in paths {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        debug!("Parsing {}", name);
        let source = io::read_file_to_string(&path)?;
        model.absorb(hcl::parse(&name, &source)?)?;
    }
    Ok(model)
}

//! # tfwheels Project Model
//!
//! File: cli/src/project/mod.rs
//!
//! ## Overview
//!
//! Everything tfwheels knows about the project directory: the parser for the
//! declarative files, the merged resource model, glob queries over it, and
//! the sandbox that owns the directory.
//!
//! ## Architecture
//!
//! - `hcl`: parses one `.tf` file with `hcl-rs` and converts it to the raw
//!   per-file shape.
//! - `model`: the `Value` type, deep merge and the `ResourceModel`.
//! - `query`: `find_by_field_glob` / `find_by_name_glob`.
//! - `sandbox`: directory ownership, file operations, reloads.
//!
pub mod hcl;
pub mod model;
pub mod query;
pub mod sandbox;

pub use model::{Fields, ResourceModel, Value};
pub use query::NAME_KEY;
pub use sandbox::Sandbox;

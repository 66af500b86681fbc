//! # tfwheels Core Infrastructure
//!
//! File: cli/src/core/mod.rs
//!
//! ## Overview
//!
//! The pieces every other module leans on, plus the dispatcher that ties
//! them together for one invocation.
//!
//! ## Architecture
//!
//! - `config`: configuration loading, merging and validation
//! - `error`: the `WheelsError` taxonomy and the crate-wide `Result`
//! - `templating`: embedded Tera templates for generated `.tf` files
//! - `tfgen`: the flag-driven generator behind `add-aws-cluster`
//! - `dispatch`: plugin commands, help, and forwarding to terraform
//!
//! ```rust
//! use crate::core::config; // For loading configuration
//! use crate::core::error::{Result, WheelsError}; // For error handling
//! use crate::core::templating; // For rendering generated files
//! ```
//!
pub mod config;
pub mod dispatch;
pub mod error;
pub mod templating;
pub mod tfgen;

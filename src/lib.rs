//! Kairos image provisioning engine.
//!
//! Turns a generic Linux base image into a Kairos immutable OS image by
//! applying a fixed, ordered set of features against the detected system.
//!
//! The public API is organised into layers:
//!
//! - **[`system`]**: detect distro, family, version and architecture
//! - **[`packages`]**: version constraints, name templates and table resolution
//! - **[`config`]**: target-root layout and embedded package tables
//! - **[`resources`]**: idempotent file, link, unit and package primitives
//! - **[`features`]**: the provisioning steps themselves
//! - **[`commands`]**: subcommand orchestration and the feature scheduler
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod features;
pub mod logging;
pub mod packages;
pub mod resources;
pub mod system;
pub mod validator;

//! This crate provides the command-line front end of the `stdsync` application:
//! argument parsing, environment configuration, interactive selection and the
//! command handlers.
//!
//! The main entry point is the [`run`] function. Connection settings come from
//! `CODACY_*` environment variables (see [`stdsync_api::settings`]); the
//! organization comes from `--organization` or `CODACY_ORGANIZATION`.
//!
//! Logs go to stderr and are filtered through `RUST_LOG` (default `warn`), so
//! stdout carries only command output.

mod app;
pub mod cli;
mod commands;
mod picker;

pub use app::run;

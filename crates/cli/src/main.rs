//! Command-line interface for the `stdsync` application.
//!
//! This crate serves as the main entry point for the executable, delegating
//! its core functionality to the `stdsync-app` crate.

fn main() -> anyhow::Result<()> {
    stdsync_app::run()
}

//! cli
//!
//! Command-line interface layer for git-revise.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments
//! - Resolve configuration and turn flags into a revise request
//! - Delegate to the engine and report the outcome
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and hands a fully
//! resolved [`crate::engine::ReviseRequest`] to [`crate::engine::run_cycle`].
//! All repository changes happen in the engine.

pub mod args;
pub mod commands;

pub use args::Cli;

use crate::engine;
use anyhow::Result;

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let ctx = engine::Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::revise(&cli, &ctx)
}

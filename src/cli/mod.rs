//! cli
//!
//! Command-line interface layer for bindery.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Resolve the workspace root exactly once, up front
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap, resolves the
//! [`WorkspaceRoot`] (from `--workspace` or by marker discovery), wires
//! the cancellation flag to Ctrl-C, and dispatches. Command handlers
//! receive everything through [`Context`]; nothing below this layer
//! looks up the workspace ambiently.

pub mod args;
pub mod commands;

pub use args::Cli;

use std::env;

use anyhow::Result;

use crate::core::paths::WorkspaceRoot;
use crate::install::CancelFlag;
use crate::ui::output::{self, Verbosity};

use args::Command;

/// Everything a command handler needs.
pub struct Context {
    /// The resolved workspace root, threaded through every call.
    pub workspace: WorkspaceRoot,
    /// Output verbosity from the global flags.
    pub verbosity: Verbosity,
    /// Cooperative cancellation, wired to Ctrl-C.
    pub cancel: CancelFlag,
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    let verbosity = Verbosity::from_flags(cli.quiet, cli.debug);

    // init creates the workspace marker the other commands require
    if let Command::Init = cli.command {
        let target = match cli.workspace {
            Some(path) => path,
            None => env::current_dir()?,
        };
        return commands::init::run(&target, verbosity);
    }

    let workspace = match &cli.workspace {
        Some(path) => WorkspaceRoot::explicit(path)?,
        None => WorkspaceRoot::discover(env::current_dir()?)?,
    };

    let cancel = CancelFlag::new();
    {
        let cancel = cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || cancel.cancel()) {
            output::debug(format!("could not install Ctrl-C handler: {e}"), verbosity);
        }
    }

    let ctx = Context {
        workspace,
        verbosity,
        cancel,
    };
    commands::dispatch(cli.command, &ctx)
}

//! cli::commands
//!
//! Command handlers. Each handler is a thin function taking the
//! [`Context`](crate::cli::Context) plus its own arguments; all real
//! work happens in the core, feed, cache, install, and optimize layers.

pub mod feeds;
pub mod index;
pub mod init;
pub mod packages;

use anyhow::Result;

use super::args::{Command, FeedsCommand, PackagesCommand};
use super::Context;

/// Dispatch a parsed command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        // Reached only with an already-resolved workspace, where
        // re-initialization is a no-op.
        Command::Init => init::run(ctx.workspace.root(), ctx.verbosity),

        Command::Index { facts } => index::run(ctx, &facts),

        Command::Packages { command } => match command {
            PackagesCommand::List => packages::list(ctx),
            PackagesCommand::Use { name, version } => packages::use_package(ctx, &name, &version),
            PackagesCommand::Install => packages::install(ctx),
        },

        Command::Feeds { command } => match command {
            FeedsCommand::Add { url } => feeds::add(ctx, &url),
            FeedsCommand::List => feeds::list(ctx),
        },
    }
}

//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--workspace <path>`: Use an explicit workspace root
//! - `--debug`: Enable debug output
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// bindery - Multi-repository build-dependency manager
#[derive(Parser, Debug)]
#[command(name = "bnd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Use this workspace root instead of discovering it from the
    /// current directory
    #[arg(long, global = true)]
    pub workspace: Option<PathBuf>,

    /// Enable debug output
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize a workspace in the current (or given) directory
    #[command(
        name = "init",
        long_about = "Initialize a bindery workspace.\n\n\
            Creates the .bindery admin directory with an empty dependency \
            graph, the package cache, and the install root. Re-running \
            against an existing workspace is harmless."
    )]
    Init,

    /// Rebuild the dependency graph from scan facts
    #[command(
        name = "index",
        long_about = "Rebuild the dependency graph from workspace scan facts.\n\n\
            Reads the scanner's output (one record per discovered build \
            descriptor), folds it into the persisted graph, checks \
            referential consistency, installs every referenced package, \
            runs the optimizer passes, and persists the result.\n\n\
            Consistency violations (a project referencing an unknown or \
            self id) abort before anything is persisted.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Re-index after pulling repository changes
    bnd index --facts .bindery/scan.json

    # Rebuild quietly, e.g. from a build server
    bnd -q index --facts scan.json"
    )]
    Index {
        /// Scan facts file produced by the workspace scanner
        #[arg(long, value_name = "FILE")]
        facts: PathBuf,
    },

    /// Inspect and manage packages
    Packages {
        #[command(subcommand)]
        command: PackagesCommand,
    },

    /// Inspect and manage package feeds
    Feeds {
        #[command(subcommand)]
        command: FeedsCommand,
    },
}

/// Package subcommands.
#[derive(Subcommand, Debug)]
pub enum PackagesCommand {
    /// List every package in the graph with its pinned version
    List,

    /// Pin a package version ('*' resolves the latest across feeds)
    #[command(
        long_about = "Pin a package version in the dependency graph.\n\n\
            Passing '*' as the version queries every configured feed and \
            pins the newest published version. Pinning never downgrades: \
            a version lower than the recorded one is ignored."
    )]
    Use {
        /// Package name
        name: String,
        /// Version to pin, or '*' for the latest across feeds
        version: String,
    },

    /// Download and install every package in the graph
    Install,
}

/// Feed subcommands.
#[derive(Subcommand, Debug)]
pub enum FeedsCommand {
    /// Register a feed (probes and pins its protocol version)
    Add {
        /// Feed base URL
        url: String,
    },

    /// List configured feeds in search order
    List,
}

//! cli::commands::init
//!
//! Workspace initialization.

use std::path::Path;

use anyhow::{Context as _, Result};

use crate::core::paths::WorkspaceRoot;
use crate::ui::output::{self, Verbosity};

/// Create the admin directory layout under `target`.
pub fn run(target: &Path, verbosity: Verbosity) -> Result<()> {
    let workspace = WorkspaceRoot::init(target)
        .with_context(|| format!("failed to initialize workspace at {}", target.display()))?;
    output::print(
        format!("initialized workspace at {}", workspace.root().display()),
        verbosity,
    );
    Ok(())
}

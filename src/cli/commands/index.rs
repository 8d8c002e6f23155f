//! cli::commands::index
//!
//! The index command: rebuild the dependency graph from scan facts.
//!
//! # Pipeline
//!
//! 1. Load the persisted anthology (the merge base)
//! 2. Fold the scanner's facts into a fresh graph
//! 3. Merge base and fresh graph (per-key, overlay wins)
//! 4. Verify referential consistency — violations abort here, before
//!    anything is persisted
//! 5. Install every package the graph references
//! 6. Run the optimizer passes
//! 7. Persist the optimized graph

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::cache::layout::InstalledPackages;
use crate::cache::PackageCache;
use crate::core::anthology::Anthology;
use crate::core::config::WorkspaceConfig;
use crate::core::scan;
use crate::core::store::AnthologyStore;
use crate::feed;
use crate::install::Installer;
use crate::optimize;
use crate::ui::output;

use super::Context;

pub fn run(ctx: &Context, facts_path: &Path) -> Result<()> {
    let store = AnthologyStore::new(ctx.workspace.admin_dir());
    let base = store.load()?;

    let facts = scan::load_facts(facts_path)
        .with_context(|| format!("failed to load scan facts from {}", facts_path.display()))?;
    output::print(
        format!("indexing {} project(s)", facts.len()),
        ctx.verbosity,
    );

    let (fresh, warnings) = scan::fold_facts(&Anthology::new(), &facts);
    for warning in &warnings {
        output::warn(warning, ctx.verbosity);
    }

    let merged = base.merge(&fresh);
    merged.verify().context("dependency graph is inconsistent")?;
    store.save(&merged)?;

    // Guarantee local availability before the optimizer inspects
    // package contents.
    let config = WorkspaceConfig::load(&ctx.workspace.config_file())?;
    let aggregator = Arc::new(feed::create_aggregator(&config.feeds, ctx.verbosity));
    let cache = Arc::new(PackageCache::new(ctx.workspace.cache_dir()));
    let installer = Installer::new(
        aggregator,
        cache,
        ctx.workspace.package_dir(),
        ctx.verbosity,
        ctx.cancel.clone(),
    );

    output::print("installing packages", ctx.verbosity);
    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(installer.install_all(merged.packages()));
    for (package, error) in &report.failures {
        output::error(format!("{package}: {error}"));
    }
    if report.cancelled {
        bail!("index cancelled");
    }
    if !report.failures.is_empty() {
        bail!("{} package(s) failed to install", report.failures.len());
    }

    output::print("optimizing dependency graph", ctx.verbosity);
    let installed = InstalledPackages::new(ctx.workspace.package_dir());
    let outcome = optimize::optimize(&merged, &installed);
    for warning in &outcome.warnings {
        output::warn(warning, ctx.verbosity);
    }

    outcome
        .anthology
        .verify()
        .context("optimized graph is inconsistent")?;
    store.save(&outcome.anthology)?;

    output::print(
        format!(
            "indexed {} project(s), {} binary(ies), {} package(s)",
            outcome.anthology.projects().len(),
            outcome.anthology.binaries().len(),
            outcome.anthology.packages().len()
        ),
        ctx.verbosity,
    );
    Ok(())
}

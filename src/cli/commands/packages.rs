//! cli::commands::packages
//!
//! Package listing, pinning, and installation.

use std::sync::Arc;

use anyhow::{anyhow, bail, Result};

use crate::cache::PackageCache;
use crate::core::anthology::Package;
use crate::core::config::WorkspaceConfig;
use crate::core::store::AnthologyStore;
use crate::core::types::PackageName;
use crate::feed;
use crate::install::{InstallReport, Installer};
use crate::ui::output;

use super::Context;

/// List every package in the graph with its pinned version.
pub fn list(ctx: &Context) -> Result<()> {
    let store = AnthologyStore::new(ctx.workspace.admin_dir());
    let graph = store.load()?;
    for package in graph.packages() {
        println!("{package}");
    }
    Ok(())
}

/// Pin a package version; `*` resolves the latest across feeds.
///
/// Pinning applies the monotonic-max rule: a version lower than the
/// recorded one leaves the graph unchanged. The package is installed
/// immediately after pinning.
pub fn use_package(ctx: &Context, name: &str, version: &str) -> Result<()> {
    let name = PackageName::new(name)?;
    let store = AnthologyStore::new(ctx.workspace.admin_dir());
    let graph = store.load()?;
    let config = WorkspaceConfig::load(&ctx.workspace.config_file())?;

    let runtime = tokio::runtime::Runtime::new()?;
    let aggregator = Arc::new(feed::create_aggregator(&config.feeds, ctx.verbosity));

    let version = if version == "*" {
        let metadata = runtime
            .block_on(aggregator.get_latest_version(&name))
            .ok_or_else(|| anyhow!("package {name} not found on any configured feed"))?;
        metadata.version
    } else {
        version.to_string()
    };

    output::print(format!("using package {name} version {version}"), ctx.verbosity);
    let graph = graph.add_or_update_package(Package::new(name.clone(), version.clone()));
    store.save(&graph)?;

    // Force installation so the workspace is usable right away.
    let pinned = graph
        .package(&name)
        .cloned()
        .ok_or_else(|| anyhow!("package {name} missing after pinning"))?;
    let installer = build_installer(ctx, aggregator);
    let report = runtime.block_on(installer.install_all(&[pinned]));
    check_report(report)
}

/// Download and install every package in the graph.
pub fn install(ctx: &Context) -> Result<()> {
    let store = AnthologyStore::new(ctx.workspace.admin_dir());
    let graph = store.load()?;
    let config = WorkspaceConfig::load(&ctx.workspace.config_file())?;

    output::print("installing packages", ctx.verbosity);
    let aggregator = Arc::new(feed::create_aggregator(&config.feeds, ctx.verbosity));
    let installer = build_installer(ctx, aggregator);
    let runtime = tokio::runtime::Runtime::new()?;
    let report = runtime.block_on(installer.install_all(graph.packages()));
    check_report(report)
}

fn build_installer(ctx: &Context, aggregator: Arc<feed::FeedAggregator>) -> Installer {
    Installer::new(
        aggregator,
        Arc::new(PackageCache::new(ctx.workspace.cache_dir())),
        ctx.workspace.package_dir(),
        ctx.verbosity,
        ctx.cancel.clone(),
    )
}

fn check_report(report: InstallReport) -> Result<()> {
    for (package, error) in &report.failures {
        output::error(format!("{package}: {error}"));
    }
    if report.cancelled {
        bail!("install cancelled");
    }
    if !report.failures.is_empty() {
        bail!("{} package(s) failed to install", report.failures.len());
    }
    Ok(())
}

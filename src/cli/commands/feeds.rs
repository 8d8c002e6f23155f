//! cli::commands::feeds
//!
//! Feed registration and listing.

use anyhow::{Context as _, Result};

use crate::core::config::WorkspaceConfig;
use crate::feed;
use crate::ui::output;

use super::Context;

/// Register a feed, probing and pinning its protocol version.
///
/// An unsupported feed is a fatal configuration error; nothing is
/// persisted in that case.
pub fn add(ctx: &Context, url: &str) -> Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let protocol = runtime
        .block_on(feed::detect_protocol(url))
        .with_context(|| format!("failed to establish the protocol of feed {url}"))?;

    let config_path = ctx.workspace.config_file();
    let mut config = WorkspaceConfig::load(&config_path)?;
    if config.add_feed(url, protocol) {
        config.save(&config_path)?;
        output::print(format!("added feed {url} ({protocol})"), ctx.verbosity);
    } else {
        output::print(format!("feed {url} already configured"), ctx.verbosity);
    }
    Ok(())
}

/// List configured feeds in search order.
pub fn list(ctx: &Context) -> Result<()> {
    let config = WorkspaceConfig::load(&ctx.workspace.config_file())?;
    for feed in &config.feeds {
        println!("{} ({})", feed.url, feed.protocol);
    }
    Ok(())
}

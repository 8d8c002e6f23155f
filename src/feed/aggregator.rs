//! feed::aggregator
//!
//! Multi-feed search across the configured feeds.
//!
//! # Design
//!
//! The aggregator holds feeds in configured order and implements the two
//! search policies:
//!
//! - **Pinned version**: feeds are queried in order and the first hit
//!   wins. Feed order is priority order, not a quality ranking.
//! - **Latest version**: *every* feed is queried; among the hits, the
//!   one with the newest publication timestamp wins. A timestamp tie
//!   breaks to the earliest-configured feed so the result is
//!   deterministic.
//!
//! A feed that errors is reported as a warning and skipped — one dead
//! feed never blocks resolution against the others. When every feed
//! misses or fails, the aggregate result is simply "not found".

use crate::core::anthology::Package;
use crate::core::types::PackageName;
use crate::ui::output::{self, Verbosity};

use super::traits::{PackageFeed, PackageMetadata};

/// Ordered collection of configured feeds.
pub struct FeedAggregator {
    feeds: Vec<Box<dyn PackageFeed>>,
    verbosity: Verbosity,
}

impl FeedAggregator {
    /// Create an aggregator over feeds in configured order.
    pub fn new(feeds: Vec<Box<dyn PackageFeed>>, verbosity: Verbosity) -> Self {
        Self { feeds, verbosity }
    }

    /// Number of configured feeds.
    pub fn len(&self) -> usize {
        self.feeds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.feeds.is_empty()
    }

    /// Find a package at its pinned version: first feed that has it wins.
    pub async fn get_version(&self, package: &Package) -> Option<PackageMetadata> {
        for feed in &self.feeds {
            match feed.get_version(package).await {
                Ok(Some(metadata)) => return Some(metadata),
                Ok(None) => {}
                Err(e) => {
                    output::warn(
                        format!("feed {} failed for {package}: {e}", feed.url()),
                        self.verbosity,
                    );
                }
            }
        }
        None
    }

    /// Find the newest hosted version of a package across all feeds.
    pub async fn get_latest_version(&self, name: &PackageName) -> Option<PackageMetadata> {
        let mut best: Option<PackageMetadata> = None;
        for feed in &self.feeds {
            match feed.get_latest_version(name).await {
                Ok(Some(candidate)) => {
                    // Strictly-newer wins; a tie keeps the earlier feed.
                    let newer = best
                        .as_ref()
                        .map(|b| candidate.published > b.published)
                        .unwrap_or(true);
                    if newer {
                        best = Some(candidate);
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    output::warn(
                        format!("feed {} failed for {name}: {e}", feed.url()),
                        self.verbosity,
                    );
                }
            }
        }
        best
    }
}

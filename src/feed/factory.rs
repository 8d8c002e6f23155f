//! feed::factory
//!
//! Feed creation from workspace configuration.
//!
//! # Design
//!
//! Commands create feeds through this factory rather than importing the
//! client type directly; the protocol number pinned in config selects
//! the client behavior. An aggregator is built over all configured
//! feeds, preserving configuration order (which is search priority).

use crate::core::config::FeedConfig;
use crate::ui::output::Verbosity;

use super::aggregator::FeedAggregator;
use super::remote::RemoteFeed;
use super::traits::PackageFeed;

/// Create a client for one configured feed.
pub fn create_feed(config: &FeedConfig) -> Box<dyn PackageFeed> {
    Box::new(RemoteFeed::new(&config.url, config.protocol))
}

/// Create an aggregator over every configured feed, in order.
pub fn create_aggregator(configs: &[FeedConfig], verbosity: Verbosity) -> FeedAggregator {
    let feeds = configs.iter().map(create_feed).collect();
    FeedAggregator::new(feeds, verbosity)
}

//! feed
//!
//! Querying remote package feeds.
//!
//! # Architecture
//!
//! The `PackageFeed` trait defines the interface for querying a single
//! feed. Commands build feeds through the [`create_aggregator`] factory,
//! which wraps every configured feed in a [`FeedAggregator`] — the only
//! type callers search against.
//!
//! Not-found is a first-class value throughout this layer: a feed that
//! does not carry a package answers `Ok(None)`, and the aggregator keeps
//! searching. Errors are reserved for operational failures, which the
//! aggregator reports and skips — one dead feed never blocks the rest.
//!
//! # Modules
//!
//! - `traits`: the `PackageFeed` trait, metadata and protocol types
//! - [`entry`]: feed response parsing
//! - [`remote`]: the HTTP client for both protocol versions
//! - [`probe`]: `$metadata` protocol discovery
//! - [`aggregator`]: ordered multi-feed search
//! - [`mock`]: in-memory implementation for deterministic testing
//! - `factory`: feed creation from configuration

pub mod aggregator;
pub mod entry;
mod factory;
pub mod mock;
pub mod probe;
pub mod remote;
mod traits;

pub use aggregator::FeedAggregator;
pub use factory::{create_aggregator, create_feed};
pub use probe::detect_protocol;
pub use traits::*;

//! feed::traits
//!
//! Feed trait definition for querying remote package feeds.
//!
//! # Design
//!
//! The `PackageFeed` trait is async because feed operations involve
//! network I/O. A package or version that a feed does not carry is a
//! *negative result*, not a failure: both query methods return
//! `Ok(None)` for it, so a multi-feed search can keep going. `Err` is
//! reserved for operational failures (network, unexpected status).
//!
//! # Example
//!
//! ```ignore
//! use bindery::core::anthology::Package;
//! use bindery::feed::{PackageFeed, FeedError};
//!
//! async fn resolve(feed: &dyn PackageFeed, pkg: &Package) -> Result<(), FeedError> {
//!     match feed.get_version(pkg).await? {
//!         Some(meta) => println!("{} -> {}", pkg, meta.content_url),
//!         None => println!("{} not on this feed", pkg),
//!     }
//!     Ok(())
//! }
//! ```

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::anthology::Package;
use crate::core::types::PackageName;

/// Errors from feed operations.
#[derive(Debug, Clone, Error)]
pub enum FeedError {
    /// Network or connection error.
    #[error("network error: {0}")]
    Network(String),

    /// The feed answered with an unexpected HTTP status.
    #[error("feed returned status {status} for {url}")]
    Status { status: u16, url: String },

    /// The feed's protocol could not be established. This is a fatal
    /// configuration error: an unrecognized feed is never silently
    /// defaulted to some protocol.
    #[error("unsupported feed at {url}: {reason}")]
    UnsupportedFeed { url: String, reason: String },
}

/// Feed protocol version, discovered once via the `$metadata` probe and
/// pinned in the workspace config.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum FeedProtocol {
    V1,
    V2,
}

impl FeedProtocol {
    /// The protocol number as carried in config files.
    pub fn number(&self) -> u8 {
        match self {
            FeedProtocol::V1 => 1,
            FeedProtocol::V2 => 2,
        }
    }
}

impl TryFrom<u8> for FeedProtocol {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        match n {
            1 => Ok(FeedProtocol::V1),
            2 => Ok(FeedProtocol::V2),
            other => Err(format!("unsupported feed protocol {other}")),
        }
    }
}

impl From<FeedProtocol> for u8 {
    fn from(p: FeedProtocol) -> Self {
        p.number()
    }
}

impl std::fmt::Display for FeedProtocol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.number())
    }
}

/// A dependency declared by a hosted package: a pinned (name, version)
/// pair. No range semantics — the feed reports the version the package
/// was built against and that is the version taken.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageDependency {
    pub name: PackageName,
    pub version: String,
}

/// Feed query result: everything a feed knows about one hosted package
/// version. Transient — never persisted, re-fetched on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct PackageMetadata {
    /// Package id as spelled by the feed.
    pub name: PackageName,
    /// Hosted version string.
    pub version: String,
    /// Where the archive downloads from.
    pub content_url: String,
    /// Archive size in bytes.
    pub size: u64,
    /// Content hash as reported by the feed. Carried for consumers;
    /// not verified locally.
    pub hash: String,
    /// Whether the feed marks this as the absolute latest version.
    pub is_latest: bool,
    /// Publication timestamp.
    pub published: DateTime<Utc>,
    /// Declared dependencies, when the feed exposes them.
    pub dependencies: Vec<PackageDependency>,
}

/// The `PackageFeed` trait for querying a single remote feed.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; acquisition runs queries from
/// worker tasks.
///
/// # Timeouts
///
/// Every implementation carries its own request timeout so a feed that
/// never responds cannot stall a multi-feed search indefinitely.
#[async_trait]
pub trait PackageFeed: Send + Sync {
    /// The feed's base URL, for reporting.
    fn url(&self) -> &str;

    /// Look up a package at a pinned version.
    ///
    /// Returns `Ok(None)` when the feed does not carry that (name,
    /// version) pair, or when its response cannot be parsed.
    ///
    /// # Errors
    ///
    /// [`FeedError::Network`] / [`FeedError::Status`] for operational
    /// failures.
    async fn get_version(&self, package: &Package) -> Result<Option<PackageMetadata>, FeedError>;

    /// Look up the latest hosted version of a package.
    ///
    /// Returns `Ok(None)` when the feed does not carry the package at
    /// all, or when its response cannot be parsed.
    ///
    /// # Errors
    ///
    /// [`FeedError::Network`] / [`FeedError::Status`] for operational
    /// failures.
    async fn get_latest_version(
        &self,
        name: &PackageName,
    ) -> Result<Option<PackageMetadata>, FeedError>;
}

//! feed::mock
//!
//! Mock feed implementation for deterministic testing.
//!
//! # Design
//!
//! The mock feed stores canned metadata in memory, records every query
//! it receives, and can be configured to fail a specific operation for
//! error-path testing.
//!
//! # Example
//!
//! ```
//! use bindery::core::anthology::Package;
//! use bindery::core::types::PackageName;
//! use bindery::feed::mock::MockFeed;
//! use bindery::feed::{PackageFeed, PackageMetadata};
//! use chrono::{TimeZone, Utc};
//!
//! # tokio_test::block_on(async {
//! let feed = MockFeed::new("http://feed");
//! feed.add_version(PackageMetadata {
//!     name: PackageName::new("Castle.Core").unwrap(),
//!     version: "3.3.3".into(),
//!     content_url: "http://feed/package/Castle.Core/3.3.3".into(),
//!     size: 864855,
//!     hash: "hash".into(),
//!     is_latest: true,
//!     published: Utc.with_ymd_and_hms(2015, 1, 18, 10, 0, 0).unwrap(),
//!     dependencies: vec![],
//! });
//!
//! let pkg = Package::new(PackageName::new("Castle.Core").unwrap(), "3.3.3");
//! let found = feed.get_version(&pkg).await.unwrap();
//! assert!(found.is_some());
//! # });
//! ```

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::core::anthology::Package;
use crate::core::types::PackageName;

use super::traits::{FeedError, PackageFeed, PackageMetadata};

/// Mock feed for testing.
///
/// Thread-safe via internal `Arc<Mutex<...>>` wrapping; clones share
/// state.
#[derive(Debug, Clone)]
pub struct MockFeed {
    url: String,
    inner: Arc<Mutex<MockFeedInner>>,
}

#[derive(Debug)]
struct MockFeedInner {
    /// Canned metadata keyed by (name, version).
    versions: HashMap<(PackageName, String), PackageMetadata>,
    /// Canned "latest" answer per package name.
    latest: HashMap<PackageName, PackageMetadata>,
    /// Operation to fail, if configured.
    fail_on: Option<FailOn>,
    /// Recorded queries for verification.
    queries: Vec<FeedQuery>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail `get_version` with the given error.
    GetVersion(FeedError),
    /// Fail `get_latest_version` with the given error.
    GetLatestVersion(FeedError),
}

/// Recorded query for test verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedQuery {
    Version { name: PackageName, version: String },
    Latest { name: PackageName },
}

impl MockFeed {
    /// Create an empty mock feed.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            inner: Arc::new(Mutex::new(MockFeedInner {
                versions: HashMap::new(),
                latest: HashMap::new(),
                fail_on: None,
                queries: Vec::new(),
            })),
        }
    }

    /// Add canned metadata for its (name, version) pair.
    pub fn add_version(&self, metadata: PackageMetadata) {
        let mut inner = self.inner.lock().expect("mock feed lock poisoned");
        inner
            .versions
            .insert((metadata.name.clone(), metadata.version.clone()), metadata);
    }

    /// Set the canned "latest" answer for a package name.
    pub fn set_latest(&self, metadata: PackageMetadata) {
        let mut inner = self.inner.lock().expect("mock feed lock poisoned");
        inner.latest.insert(metadata.name.clone(), metadata);
    }

    /// Make a specific operation fail.
    pub fn fail_on(&self, fail: FailOn) {
        let mut inner = self.inner.lock().expect("mock feed lock poisoned");
        inner.fail_on = Some(fail);
    }

    /// All queries received so far.
    pub fn queries(&self) -> Vec<FeedQuery> {
        self.inner
            .lock()
            .expect("mock feed lock poisoned")
            .queries
            .clone()
    }
}

#[async_trait]
impl PackageFeed for MockFeed {
    fn url(&self) -> &str {
        &self.url
    }

    async fn get_version(&self, package: &Package) -> Result<Option<PackageMetadata>, FeedError> {
        let mut inner = self.inner.lock().expect("mock feed lock poisoned");
        inner.queries.push(FeedQuery::Version {
            name: package.name().clone(),
            version: package.version().to_string(),
        });
        if let Some(FailOn::GetVersion(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        Ok(inner
            .versions
            .get(&(package.name().clone(), package.version().to_string()))
            .cloned())
    }

    async fn get_latest_version(
        &self,
        name: &PackageName,
    ) -> Result<Option<PackageMetadata>, FeedError> {
        let mut inner = self.inner.lock().expect("mock feed lock poisoned");
        inner.queries.push(FeedQuery::Latest { name: name.clone() });
        if let Some(FailOn::GetLatestVersion(err)) = &inner.fail_on {
            return Err(err.clone());
        }
        Ok(inner.latest.get(name).cloned())
    }
}

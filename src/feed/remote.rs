//! feed::remote
//!
//! HTTP feed client for both feed protocol versions.
//!
//! # Design
//!
//! The two feed protocols share the response format and the pinned-
//! version query; they differ in how "latest version" is asked for:
//!
//! - v1: `Packages(Id='{name}',IsLatestVersion=true)`
//! - v2: `FindPackagesById()?id='{name}'&$filter=IsAbsoluteLatestVersion`
//!
//! One client covers both, dispatching on the pinned
//! [`FeedProtocol`]. Protocol discovery itself lives in
//! [`probe`](super::probe).
//!
//! # Status handling
//!
//! `404` is how feeds answer a miss, so it maps to `Ok(None)`. Any other
//! non-success status is an operational failure. Every request carries
//! its own timeout so a dead feed cannot stall a multi-feed search.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use crate::core::anthology::Package;
use crate::core::types::PackageName;

use super::entry::parse_feed_entries;
use super::traits::{FeedError, FeedProtocol, PackageFeed, PackageMetadata};

/// Default per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client for a single configured feed.
#[derive(Debug, Clone)]
pub struct RemoteFeed {
    url: String,
    protocol: FeedProtocol,
    client: Client,
    timeout: Duration,
}

impl RemoteFeed {
    /// Create a client for `url` speaking the given protocol.
    pub fn new(url: impl Into<String>, protocol: FeedProtocol) -> Self {
        Self::with_timeout(url, protocol, REQUEST_TIMEOUT)
    }

    /// Create a client with a custom per-request timeout.
    pub fn with_timeout(
        url: impl Into<String>,
        protocol: FeedProtocol,
        timeout: Duration,
    ) -> Self {
        Self {
            url: url.into(),
            protocol,
            client: Client::new(),
            timeout,
        }
    }

    pub fn protocol(&self) -> FeedProtocol {
        self.protocol
    }

    /// Absolute query URL under the feed base.
    fn query_url(&self, query: &str) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), query)
    }

    fn version_query(package: &Package) -> String {
        format!(
            "Packages(Id='{}',Version='{}')",
            package.name(),
            package.version()
        )
    }

    fn latest_query(&self, name: &PackageName) -> String {
        match self.protocol {
            FeedProtocol::V1 => format!("Packages(Id='{name}',IsLatestVersion=true)"),
            FeedProtocol::V2 => {
                format!("FindPackagesById()?id='{name}'&$filter=IsAbsoluteLatestVersion")
            }
        }
    }

    /// GET a query URL and parse whatever entries come back.
    async fn fetch_entries(&self, url: &str) -> Result<Vec<PackageMetadata>, FeedError> {
        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(FeedError::Status {
                status: response.status().as_u16(),
                url: url.to_string(),
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| FeedError::Network(e.to_string()))?;
        Ok(parse_feed_entries(&body))
    }
}

#[async_trait]
impl PackageFeed for RemoteFeed {
    fn url(&self) -> &str {
        &self.url
    }

    async fn get_version(&self, package: &Package) -> Result<Option<PackageMetadata>, FeedError> {
        let url = self.query_url(&Self::version_query(package));
        let entries = self.fetch_entries(&url).await?;
        Ok(entries.into_iter().next())
    }

    async fn get_latest_version(
        &self,
        name: &PackageName,
    ) -> Result<Option<PackageMetadata>, FeedError> {
        let url = self.query_url(&self.latest_query(name));
        let entries = self.fetch_entries(&url).await?;
        Ok(entries
            .into_iter()
            .filter(|e| e.is_latest)
            .max_by_key(|e| e.published))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anthology::Package;

    fn castle() -> Package {
        Package::new(PackageName::new("Castle.Core").unwrap(), "3.3.3")
    }

    #[test]
    fn version_query_shape() {
        assert_eq!(
            RemoteFeed::version_query(&castle()),
            "Packages(Id='Castle.Core',Version='3.3.3')"
        );
    }

    #[test]
    fn latest_query_differs_by_protocol() {
        let name = PackageName::new("Castle.Core").unwrap();

        let v1 = RemoteFeed::new("http://feed", FeedProtocol::V1);
        assert_eq!(
            v1.latest_query(&name),
            "Packages(Id='Castle.Core',IsLatestVersion=true)"
        );

        let v2 = RemoteFeed::new("http://feed", FeedProtocol::V2);
        assert_eq!(
            v2.latest_query(&name),
            "FindPackagesById()?id='Castle.Core'&$filter=IsAbsoluteLatestVersion"
        );
    }

    #[test]
    fn query_url_handles_trailing_slash() {
        let feed = RemoteFeed::new("http://feed/api/", FeedProtocol::V1);
        assert_eq!(feed.query_url("Packages()"), "http://feed/api/Packages()");

        let no_slash = RemoteFeed::new("http://feed/api", FeedProtocol::V1);
        assert_eq!(
            no_slash.query_url("Packages()"),
            "http://feed/api/Packages()"
        );
    }
}

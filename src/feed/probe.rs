//! feed::probe
//!
//! Feed protocol discovery.
//!
//! # Design
//!
//! A feed's protocol version is discovered exactly once, when the feed
//! is added to the workspace: fetch the feed's `$metadata` schema
//! document, find the first `EntityType` element, and map its `Name`
//! attribute to a protocol version (`Package` → v1, `V2FeedPackage` →
//! v2). Anything else — including a schema with no `EntityType` at all —
//! is a fatal configuration error. A feed is never silently assumed to
//! speak some default protocol.

use std::time::Duration;

use reqwest::Client;
use roxmltree::Document;

use super::traits::{FeedError, FeedProtocol};

/// Probe timeout; schema documents are small.
const PROBE_TIMEOUT: Duration = Duration::from_secs(30);

/// Discover the protocol a feed speaks.
///
/// # Errors
///
/// - [`FeedError::Network`] / [`FeedError::Status`] when the schema
///   document cannot be fetched
/// - [`FeedError::UnsupportedFeed`] when the schema is unreadable or
///   names an unknown entity type (fatal, never defaulted)
pub async fn detect_protocol(url: &str) -> Result<FeedProtocol, FeedError> {
    let metadata_url = format!("{}/$metadata", url.trim_end_matches('/'));

    let response = Client::new()
        .get(&metadata_url)
        .timeout(PROBE_TIMEOUT)
        .send()
        .await
        .map_err(|e| FeedError::Network(e.to_string()))?;

    if !response.status().is_success() {
        return Err(FeedError::Status {
            status: response.status().as_u16(),
            url: metadata_url,
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| FeedError::Network(e.to_string()))?;

    protocol_from_schema(url, &body)
}

/// Map a `$metadata` schema document to a protocol version.
pub(crate) fn protocol_from_schema(url: &str, schema: &str) -> Result<FeedProtocol, FeedError> {
    let doc = Document::parse(schema).map_err(|e| FeedError::UnsupportedFeed {
        url: url.to_string(),
        reason: format!("unreadable schema document: {e}"),
    })?;

    let entity_type = doc
        .descendants()
        .find(|n| n.is_element() && n.tag_name().name() == "EntityType")
        .ok_or_else(|| FeedError::UnsupportedFeed {
            url: url.to_string(),
            reason: "schema has no EntityType element".to_string(),
        })?;

    match entity_type.attribute("Name") {
        Some("Package") => Ok(FeedProtocol::V1),
        Some("V2FeedPackage") => Ok(FeedProtocol::V2),
        Some(other) => Err(FeedError::UnsupportedFeed {
            url: url.to_string(),
            reason: format!("unknown entity type '{other}'"),
        }),
        None => Err(FeedError::UnsupportedFeed {
            url: url.to_string(),
            reason: "EntityType element has no Name attribute".to_string(),
        }),
    }
}

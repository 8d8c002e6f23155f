//! core::config
//!
//! Workspace configuration schema and persistence.
//!
//! # Location
//!
//! `.bindery/config.toml` in the workspace admin directory.
//!
//! # Example
//!
//! ```toml
//! [[feeds]]
//! url = "https://feed.example.com/api"
//! protocol = 2
//!
//! [[repos]]
//! name = "core-services"
//! url = "https://git.example.com/core-services"
//! ```
//!
//! # Validation
//!
//! Values are validated after parsing: feed urls must be http(s), the
//! protocol number must be a known one. An unsupported protocol is a
//! fatal configuration error, never silently defaulted.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::FeedProtocol;

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but is not valid TOML.
    #[error("failed to parse config: {0}")]
    Parse(String),

    /// The config could not be serialized.
    #[error("failed to serialize config: {0}")]
    Serialize(String),

    /// A value failed validation.
    #[error("invalid config value: {0}")]
    InvalidValue(String),

    /// Filesystem failure.
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A configured package feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FeedConfig {
    /// Feed base URL.
    pub url: String,

    /// Feed protocol version, pinned when the feed was added.
    pub protocol: FeedProtocol,
}

/// A source repository registered in the workspace.
///
/// Cloning and scanning are handled by external collaborators; the
/// config only records the registration so listings and scans know which
/// directories belong to the workspace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepoConfig {
    /// Directory name under the workspace root.
    pub name: String,

    /// Source-control URL, if registered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

/// Workspace configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WorkspaceConfig {
    /// Package feeds, in search order.
    pub feeds: Vec<FeedConfig>,

    /// Registered source repositories.
    pub repos: Vec<RepoConfig>,
}

impl WorkspaceConfig {
    /// Load configuration from `path`. A missing file yields defaults.
    ///
    /// # Errors
    ///
    /// - [`ConfigError::Parse`] for malformed TOML
    /// - [`ConfigError::InvalidValue`] when validation fails
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(ConfigError::Io(e)),
        };
        let config: Self = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Persist configuration to `path`.
    ///
    /// # Errors
    ///
    /// Propagates serialization and filesystem failures.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let text =
            toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, text)?;
        Ok(())
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] on the first invalid value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for feed in &self.feeds {
            if !feed.url.starts_with("http://") && !feed.url.starts_with("https://") {
                return Err(ConfigError::InvalidValue(format!(
                    "feed url '{}' must be http(s)",
                    feed.url
                )));
            }
        }
        for repo in &self.repos {
            if repo.name.is_empty() {
                return Err(ConfigError::InvalidValue("repo name cannot be empty".into()));
            }
        }
        Ok(())
    }

    /// Register a feed if its url is not already present.
    ///
    /// Returns whether the feed was added.
    pub fn add_feed(&mut self, url: impl Into<String>, protocol: FeedProtocol) -> bool {
        let url = url.into();
        if self.feeds.iter().any(|f| f.url == url) {
            return false;
        }
        self.feeds.push(FeedConfig { url, protocol });
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = WorkspaceConfig::load(&dir.path().join("config.toml")).unwrap();
        assert!(config.feeds.is_empty());
        assert!(config.repos.is_empty());
    }

    #[test]
    fn save_then_load_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = WorkspaceConfig::default();
        config.add_feed("https://feed.example.com/api", FeedProtocol::V2);
        config.repos.push(RepoConfig {
            name: "core-services".into(),
            url: Some("https://git.example.com/core-services".into()),
        });
        config.save(&path).unwrap();

        assert_eq!(WorkspaceConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn duplicate_feed_urls_are_not_added_twice() {
        let mut config = WorkspaceConfig::default();
        assert!(config.add_feed("https://feed.example.com", FeedProtocol::V1));
        assert!(!config.add_feed("https://feed.example.com", FeedProtocol::V1));
        assert_eq!(config.feeds.len(), 1);
    }

    #[test]
    fn non_http_feed_url_rejected() {
        let config = WorkspaceConfig {
            feeds: vec![FeedConfig {
                url: "ftp://feed.example.com".into(),
                protocol: FeedProtocol::V1,
            }],
            repos: vec![],
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue(_))
        ));
    }

    #[test]
    fn unknown_protocol_number_rejected_at_parse() {
        let toml = r#"
            [[feeds]]
            url = "https://feed.example.com"
            protocol = 7
        "#;
        assert!(toml::from_str::<WorkspaceConfig>(toml).is_err());
    }

    #[test]
    fn unknown_keys_rejected() {
        let toml = r#"
            frobnicate = true
        "#;
        assert!(toml::from_str::<WorkspaceConfig>(toml).is_err());
    }

    #[test]
    fn protocol_serializes_as_a_number() {
        let mut config = WorkspaceConfig::default();
        config.add_feed("https://feed.example.com", FeedProtocol::V2);
        let text = toml::to_string_pretty(&config).unwrap();
        assert!(text.contains("protocol = 2"));
    }
}

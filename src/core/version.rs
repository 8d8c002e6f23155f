//! core::version
//!
//! Package version parsing and ordering.
//!
//! # Design
//!
//! Versions follow semantic versioning, with one tolerance: some package
//! ecosystems still publish legacy 4-component versions (`1.2.3.4`). When
//! a direct parse fails, the final dot-separated component is stripped and
//! the parse retried once. If both attempts fail the version is invalid
//! and the caller must treat the package reference as invalid — never as
//! the lowest possible version.
//!
//! # Example
//!
//! ```
//! use bindery::core::version::PackageVersion;
//!
//! let stable = PackageVersion::parse("1.1.24").unwrap();
//! let beta = PackageVersion::parse("1.1.24-beta2").unwrap();
//! assert!(stable > beta);
//!
//! // Legacy 4-component scheme parses as its 3-component prefix
//! let legacy = PackageVersion::parse("1.2.3.4").unwrap();
//! assert_eq!(legacy, PackageVersion::parse("1.2.3").unwrap());
//!
//! assert!(PackageVersion::parse("42bb").is_err());
//! ```

use std::cmp::Ordering;

use semver::Version;
use thiserror::Error;

/// Error from version parsing.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid version '{raw}': {reason}")]
pub struct VersionError {
    /// The string that failed to parse.
    pub raw: String,
    /// Why it failed.
    pub reason: String,
}

/// A parsed package version.
///
/// Ordering follows semantic-version precedence: numeric components
/// compare numerically, then pre-release tags compare (a pre-release
/// sorts below its release).
#[derive(Debug, Clone)]
pub struct PackageVersion {
    raw: String,
    parsed: Version,
}

impl PackageVersion {
    /// Parse a version string, tolerating the legacy 4-component scheme.
    ///
    /// # Errors
    ///
    /// Returns [`VersionError`] when neither the string itself nor the
    /// string with its final dot-component stripped is a valid semantic
    /// version.
    pub fn parse(raw: &str) -> Result<Self, VersionError> {
        match Version::parse(raw) {
            Ok(parsed) => Ok(Self {
                raw: raw.to_string(),
                parsed,
            }),
            Err(first) => {
                // Legacy scheme: drop the 4th component and retry once.
                let Some(idx) = raw.rfind('.') else {
                    return Err(VersionError {
                        raw: raw.to_string(),
                        reason: first.to_string(),
                    });
                };
                let trimmed = &raw[..idx];
                Version::parse(trimmed)
                    .map(|parsed| Self {
                        raw: raw.to_string(),
                        parsed,
                    })
                    .map_err(|_| VersionError {
                        raw: raw.to_string(),
                        reason: first.to_string(),
                    })
            }
        }
    }

    /// The version string as originally given (legacy components intact).
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// The effective semantic version used for comparison.
    pub fn semver(&self) -> &Version {
        &self.parsed
    }
}

impl PartialEq for PackageVersion {
    fn eq(&self, other: &Self) -> bool {
        self.parsed == other.parsed
    }
}

impl Eq for PackageVersion {}

impl PartialOrd for PackageVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackageVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        self.parsed.cmp(&other.parsed)
    }
}

impl std::fmt::Display for PackageVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// Compare two version strings, treating unparseable ones as absent.
///
/// Returns `None` when either side fails to parse. Callers deciding
/// whether a write supersedes an existing record use this to make
/// invalid versions lose: an unparseable incoming version never
/// supersedes, and an unparseable stored version is always superseded by
/// a valid one.
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    let a = PackageVersion::parse(a).ok()?;
    let b = PackageVersion::parse(b).ok()?;
    Some(a.cmp(&b))
}

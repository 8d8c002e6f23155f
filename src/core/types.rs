//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`ProjectId`] - Unique project identifier (128-bit)
//! - [`AssemblyName`] - Case-insensitive assembly name
//! - [`PackageName`] - Case-insensitive package name
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, preventing entire classes of bugs.
//!
//! # Case insensitivity
//!
//! Assembly and package names compare, hash, and sort without regard to
//! ASCII case while preserving their original spelling for display and
//! serialization. `Castle.Core` and `castle.core` are the same identity.
//!
//! # Examples
//!
//! ```
//! use bindery::core::types::{AssemblyName, PackageName, ProjectId};
//!
//! let a = AssemblyName::new("Castle.Core").unwrap();
//! let b = AssemblyName::new("castle.core").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(a.as_str(), "Castle.Core");
//!
//! assert!(AssemblyName::new("").is_err());
//! assert!(PackageName::new("bad/name").is_err());
//!
//! let id = ProjectId::parse("6db78f14-5c67-4b09-a1b3-2b6f7a3e9d01").unwrap();
//! assert_eq!(id.to_string(), "6db78f14-5c67-4b09-a1b3-2b6f7a3e9d01");
//! ```

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid assembly name: {0}")]
    InvalidAssemblyName(String),

    #[error("invalid package name: {0}")]
    InvalidPackageName(String),

    #[error("invalid project id: {0}")]
    InvalidProjectId(String),
}

/// A unique project identifier.
///
/// Projects are identified by a 128-bit id carried in their build
/// descriptor. The id is the project's identity for the whole lifetime of
/// the graph; paths and assembly names may repeat across repositories,
/// ids may not.
///
/// # Example
///
/// ```
/// use bindery::core::types::ProjectId;
///
/// let id = ProjectId::parse("6db78f14-5c67-4b09-a1b3-2b6f7a3e9d01").unwrap();
/// assert!(ProjectId::parse("not-a-uuid").is_err());
///
/// // Fresh ids are unique
/// assert_ne!(ProjectId::generate(), ProjectId::generate());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(Uuid);

impl ProjectId {
    /// Parse a project id from its canonical hyphenated form.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidProjectId` if the string is not a valid
    /// 128-bit id.
    pub fn parse(s: &str) -> Result<Self, TypeError> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| TypeError::InvalidProjectId(format!("{s}: {e}")))
    }

    /// Generate a fresh random id.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying uuid.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for ProjectId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ProjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validate an assembly or package name.
///
/// Names must be non-empty, contain no path separators, and no ASCII
/// control characters. They are filesystem-visible (cache files, install
/// directories), so anything that could escape a directory is rejected.
fn validate_name(name: &str) -> Result<(), String> {
    if name.is_empty() {
        return Err("name cannot be empty".into());
    }
    if name.contains('/') || name.contains('\\') {
        return Err("name cannot contain path separators".into());
    }
    if name == "." || name == ".." {
        return Err("name cannot be a relative path component".into());
    }
    for c in name.chars() {
        if c.is_ascii_control() {
            return Err("name cannot contain control characters".into());
        }
    }
    Ok(())
}

macro_rules! case_insensitive_name {
    ($name:ident, $err:ident) => {
        impl $name {
            /// Create a new validated name.
            ///
            /// # Errors
            ///
            /// Returns a [`TypeError`] if the name is empty, contains path
            /// separators, or contains control characters.
            pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
                let name = name.into();
                validate_name(&name).map_err(TypeError::$err)?;
                Ok(Self(name))
            }

            /// Get the name as originally spelled.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Case-insensitive equality against a raw string.
            pub fn matches(&self, other: &str) -> bool {
                self.0.eq_ignore_ascii_case(other)
            }
        }

        impl PartialEq for $name {
            fn eq(&self, other: &Self) -> bool {
                self.0.eq_ignore_ascii_case(&other.0)
            }
        }

        impl Eq for $name {}

        impl Hash for $name {
            fn hash<H: Hasher>(&self, state: &mut H) {
                for b in self.0.bytes() {
                    state.write_u8(b.to_ascii_lowercase());
                }
            }
        }

        impl PartialOrd for $name {
            fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
                Some(self.cmp(other))
            }
        }

        impl Ord for $name {
            fn cmp(&self, other: &Self) -> Ordering {
                let lhs = self.0.bytes().map(|b| b.to_ascii_lowercase());
                let rhs = other.0.bytes().map(|b| b.to_ascii_lowercase());
                lhs.cmp(rhs)
            }
        }

        impl TryFrom<String> for $name {
            type Error = TypeError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(name: $name) -> Self {
                name.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// A validated assembly name.
///
/// The identity of a binary reference. Comparison is case-insensitive;
/// the original spelling is preserved.
///
/// # Example
///
/// ```
/// use bindery::core::types::AssemblyName;
///
/// let name = AssemblyName::new("Newtonsoft.Json").unwrap();
/// assert!(name.matches("newtonsoft.json"));
/// assert!(!name.is_framework());
///
/// let system = AssemblyName::new("System.Xml").unwrap();
/// assert!(system.is_framework());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssemblyName(String);

case_insensitive_name!(AssemblyName, InvalidAssemblyName);

impl AssemblyName {
    /// Whether this assembly is expected to resolve from the runtime or
    /// framework rather than a recorded location (`System*` names).
    pub fn is_framework(&self) -> bool {
        let lower = self.0.to_ascii_lowercase();
        lower == "system" || lower.starts_with("system.")
    }
}

/// A validated package name.
///
/// The identity of a package. Comparison is case-insensitive; the
/// original spelling is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PackageName(String);

case_insensitive_name!(PackageName, InvalidPackageName);

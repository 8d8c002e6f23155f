//! core::paths
//!
//! Workspace root resolution and well-known directories.
//!
//! # Design
//!
//! The workspace root is resolved exactly once at process start — from
//! an explicit `--workspace` flag or by walking parent directories for
//! the `.bindery` marker — and the resulting [`WorkspaceRoot`] value is
//! threaded through every call that needs a path. Nothing re-discovers
//! the root ambiently mid-algorithm.
//!
//! # Layout
//!
//! ```text
//! <root>/
//!   .bindery/              admin directory (marker)
//!     anthology.json       persisted dependency graph
//!     config.toml          feeds + repositories
//!     cache/               downloaded package archives
//!     pkgs/                extracted (installed) packages
//! ```

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Name of the admin directory that marks a workspace root.
pub const ADMIN_DIR: &str = ".bindery";

/// Errors from workspace resolution.
#[derive(Debug, Error)]
pub enum WorkspaceError {
    /// No `.bindery` marker was found in `start` or any ancestor.
    #[error("no workspace found at or above {} (missing {ADMIN_DIR} directory); run 'bnd init' first", .start.display())]
    NotFound { start: PathBuf },

    /// The explicit workspace path does not contain a marker.
    #[error("{} is not a workspace (missing {ADMIN_DIR} directory)", .path.display())]
    NotAWorkspace { path: PathBuf },
}

/// A resolved workspace root.
///
/// # Example
///
/// ```no_run
/// use bindery::core::paths::WorkspaceRoot;
///
/// let ws = WorkspaceRoot::discover(std::env::current_dir().unwrap())?;
/// println!("caching into {}", ws.cache_dir().display());
/// # Ok::<(), bindery::core::paths::WorkspaceError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceRoot(PathBuf);

impl WorkspaceRoot {
    /// Resolve the root by walking up from `start` until a directory
    /// containing the `.bindery` marker is found.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NotFound`] when no ancestor carries the
    /// marker.
    pub fn discover(start: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let start = start.into();
        let mut current: &Path = &start;
        loop {
            if current.join(ADMIN_DIR).is_dir() {
                return Ok(Self(current.to_path_buf()));
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => return Err(WorkspaceError::NotFound { start }),
            }
        }
    }

    /// Use an explicitly named root. The marker must already exist.
    ///
    /// # Errors
    ///
    /// Returns [`WorkspaceError::NotAWorkspace`] when `path` has no
    /// `.bindery` directory.
    pub fn explicit(path: impl Into<PathBuf>) -> Result<Self, WorkspaceError> {
        let path = path.into();
        if path.join(ADMIN_DIR).is_dir() {
            Ok(Self(path))
        } else {
            Err(WorkspaceError::NotAWorkspace { path })
        }
    }

    /// Create the admin directory structure under `path` and return the
    /// root. Re-initializing an existing workspace is a no-op.
    ///
    /// # Errors
    ///
    /// Propagates filesystem failures.
    pub fn init(path: impl Into<PathBuf>) -> std::io::Result<Self> {
        let root = Self(path.into());
        std::fs::create_dir_all(root.cache_dir())?;
        std::fs::create_dir_all(root.package_dir())?;
        Ok(root)
    }

    /// The workspace root directory.
    pub fn root(&self) -> &Path {
        &self.0
    }

    /// The admin directory (`.bindery/`).
    pub fn admin_dir(&self) -> PathBuf {
        self.0.join(ADMIN_DIR)
    }

    /// Where downloaded package archives live.
    pub fn cache_dir(&self) -> PathBuf {
        self.admin_dir().join("cache")
    }

    /// Where extracted packages live, one subdirectory per package name.
    pub fn package_dir(&self) -> PathBuf {
        self.admin_dir().join("pkgs")
    }

    /// The workspace config file.
    pub fn config_file(&self) -> PathBuf {
        self.admin_dir().join("config.toml")
    }
}

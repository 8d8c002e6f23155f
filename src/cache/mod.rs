//! cache
//!
//! Content cache and package installation.
//!
//! # Architecture
//!
//! Downloaded package archives live in the workspace cache directory,
//! one file per (name, version): `{name}.{version}.pkg.zip`. Installing
//! extracts the cached archive into `{package_root}/{name}/`, replacing
//! whatever was there.
//!
//! # Corruption recovery
//!
//! Corruption is an expected failure mode (truncated download, full
//! disk). The cache check is existence-only; integrity surfaces at
//! extraction time. When extraction fails the cache entry is purged so
//! the bad artifact is never reused, and [`CacheError::CorruptArchive`]
//! tells the caller to re-download and retry inside its own bounded
//! retry envelope.
//!
//! # Moniker normalization
//!
//! Archives encode `+` in framework-moniker directory names as `%2B`
//! (e.g. `net45%2Bwp8`). After extraction every such directory is
//! renamed to the decoded form, recursively: downstream consumers key
//! folders on decoded moniker names, so this is part of installing, not
//! optional cleanup.
//!
//! # Modules
//!
//! - [`layout`] - Inspecting installed packages' `lib/` layout

pub mod layout;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use reqwest::Client;
use thiserror::Error;

use crate::core::anthology::Package;
use crate::core::reliability::{retry, retry_async, RetryError};

use crate::feed::PackageMetadata;

/// Archive file extension, without the leading dot.
pub const ARCHIVE_EXT: &str = "pkg.zip";

/// Attempts for install-directory teardown (transient file locks).
const TEARDOWN_ATTEMPTS: u32 = 3;

/// Attempts per download (transient network blips).
const DOWNLOAD_ATTEMPTS: u32 = 3;

/// Errors from cache operations.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The cached archive could not be extracted. The cache entry has
    /// already been purged; re-download and retry.
    #[error("corrupt archive for {package}; cache entry purged")]
    CorruptArchive { package: String },

    /// The download failed or answered with a non-success status.
    #[error("download failed for {url}: {reason}")]
    Download { url: String, reason: String },

    /// Filesystem failure outside the corruption path.
    #[error("cache I/O error at {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },
}

/// The local package cache.
#[derive(Debug, Clone)]
pub struct PackageCache {
    cache_dir: PathBuf,
    client: Client,
}

impl PackageCache {
    /// Create a cache rooted at `cache_dir`.
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            client: Client::new(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Cache file for a package: `{name}.{version}.pkg.zip`.
    pub fn archive_path(&self, package: &Package) -> PathBuf {
        self.cache_dir.join(format!(
            "{}.{}.{ARCHIVE_EXT}",
            package.name(),
            package.version()
        ))
    }

    /// Whether an archive for this package is present.
    ///
    /// Existence only — the file is not validated here; a corrupt entry
    /// is detected (and purged) at install time.
    pub fn is_cached(&self, package: &Package) -> bool {
        self.archive_path(package).is_file()
    }

    /// Remove a cache entry. Removing an absent entry is a no-op.
    pub fn evict(&self, package: &Package) {
        let _ = fs::remove_file(self.archive_path(package));
    }

    /// Download the archive into the cache unless already present.
    ///
    /// Streams the content straight into the cache path. Transient
    /// network failures are retried a bounded number of times; each
    /// attempt recreates the file, so a partial write never survives
    /// into the next attempt. A partial file left by the *last* failed
    /// attempt is caught later by the corruption path.
    ///
    /// # Errors
    ///
    /// [`CacheError::Download`] for network failures or non-success
    /// statuses after retries, [`CacheError::Io`] for filesystem
    /// failures.
    pub async fn ensure_downloaded(
        &self,
        package: &Package,
        metadata: &PackageMetadata,
    ) -> Result<(), CacheError> {
        if self.is_cached(package) {
            return Ok(());
        }

        fs::create_dir_all(&self.cache_dir).map_err(|source| CacheError::Io {
            path: self.cache_dir.clone(),
            source,
        })?;

        retry_async(DOWNLOAD_ATTEMPTS, || self.download(package, metadata))
            .await
            .map_err(|e| match e {
                RetryError::Exhausted { source, .. } => source,
                RetryError::InvalidAttempts => unreachable!("attempts constant is non-zero"),
            })
    }

    /// One download attempt, truncating any previous partial file.
    async fn download(
        &self,
        package: &Package,
        metadata: &PackageMetadata,
    ) -> Result<(), CacheError> {
        let url = &metadata.content_url;
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CacheError::Download {
                url: url.clone(),
                reason: e.to_string(),
            })?;

        if !response.status().is_success() {
            return Err(CacheError::Download {
                url: url.clone(),
                reason: format!("status {}", response.status()),
            });
        }

        let path = self.archive_path(package);
        let mut file = fs::File::create(&path).map_err(|source| CacheError::Io {
            path: path.clone(),
            source,
        })?;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| CacheError::Download {
                url: url.clone(),
                reason: e.to_string(),
            })?
        {
            file.write_all(&chunk).map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;
        }
        Ok(())
    }

    /// Extract the cached archive into `{package_root}/{name}/`.
    ///
    /// Any pre-existing install directory is deleted first (full
    /// replace, not merge); teardown is retried for transient locks.
    /// After extraction, `%2B`-encoded directory names are decoded
    /// throughout the tree.
    ///
    /// # Errors
    ///
    /// [`CacheError::CorruptArchive`] when the archive cannot be read or
    /// extracted — the cache entry is purged before returning, so the
    /// caller can re-download and retry.
    pub fn install_from_cache(
        &self,
        package: &Package,
        package_root: &Path,
    ) -> Result<(), CacheError> {
        let install_dir = package_root.join(package.name().as_str());

        let teardown = retry(TEARDOWN_ATTEMPTS, || remove_dir_if_present(&install_dir));
        match teardown {
            Ok(()) => {}
            Err(RetryError::Exhausted { source, .. }) => {
                return Err(CacheError::Io {
                    path: install_dir,
                    source,
                });
            }
            Err(RetryError::InvalidAttempts) => unreachable!("attempts constant is non-zero"),
        }

        fs::create_dir_all(&install_dir).map_err(|source| CacheError::Io {
            path: install_dir.clone(),
            source,
        })?;

        if let Err(_corrupt) = self.extract(package, &install_dir) {
            self.evict(package);
            return Err(CacheError::CorruptArchive {
                package: package.to_string(),
            });
        }

        decode_plus_dirs(&install_dir).map_err(|source| CacheError::Io {
            path: install_dir,
            source,
        })?;
        Ok(())
    }

    /// Open and extract the archive. Any failure counts as corruption.
    fn extract(&self, package: &Package, install_dir: &Path) -> Result<(), ()> {
        let file = fs::File::open(self.archive_path(package)).map_err(|_| ())?;
        let mut archive = zip::ZipArchive::new(file).map_err(|_| ())?;
        archive.extract(install_dir).map_err(|_| ())
    }
}

fn remove_dir_if_present(dir: &Path) -> io::Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

/// Decode `%2B` in a directory name, if present.
fn decode_plus(name: &str) -> Option<String> {
    if name.contains("%2B") || name.contains("%2b") {
        Some(name.replace("%2B", "+").replace("%2b", "+"))
    } else {
        None
    }
}

/// Rename `%2B`-encoded directories to their decoded form, recursively.
fn decode_plus_dirs(dir: &Path) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let mut path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        if let Some(decoded) = decode_plus(&name) {
            let renamed = dir.join(decoded);
            fs::rename(&path, &renamed)?;
            path = renamed;
        }
        decode_plus_dirs(&path)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::PackageName;
    use std::io::Write as _;

    fn castle() -> Package {
        Package::new(PackageName::new("Castle.Core").unwrap(), "3.3.3")
    }

    /// Write a zip archive with the given (path, contents) entries.
    fn write_zip(path: &Path, files: &[(&str, &[u8])]) {
        let file = fs::File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    fn cache_with_archive(files: &[(&str, &[u8])]) -> (tempfile::TempDir, PackageCache) {
        let dir = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(dir.path().join("cache"));
        fs::create_dir_all(cache.cache_dir()).unwrap();
        write_zip(&cache.archive_path(&castle()), files);
        (dir, cache)
    }

    #[test]
    fn archive_naming() {
        let cache = PackageCache::new("/tmp/cache");
        assert_eq!(
            cache.archive_path(&castle()).file_name().unwrap(),
            "Castle.Core.3.3.3.pkg.zip"
        );
    }

    #[test]
    fn is_cached_checks_existence_only() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(dir.path());
        assert!(!cache.is_cached(&castle()));

        // A zero-byte file still counts as cached — validation happens
        // at install time.
        fs::write(cache.archive_path(&castle()), b"").unwrap();
        assert!(cache.is_cached(&castle()));
    }

    #[test]
    fn install_extracts_the_archive() {
        let (dir, cache) = cache_with_archive(&[
            ("lib/net45/Castle.Core.dll", b"dll bytes" as &[u8]),
            ("Castle.Core.manifest.xml", b"<package/>"),
        ]);
        let pkgs = dir.path().join("pkgs");

        cache.install_from_cache(&castle(), &pkgs).unwrap();

        assert!(pkgs.join("Castle.Core/lib/net45/Castle.Core.dll").is_file());
        assert!(pkgs.join("Castle.Core/Castle.Core.manifest.xml").is_file());
    }

    #[test]
    fn install_replaces_any_existing_directory() {
        let (dir, cache) = cache_with_archive(&[("lib/net45/Castle.Core.dll", b"new" as &[u8])]);
        let pkgs = dir.path().join("pkgs");

        let stale = pkgs.join("Castle.Core/lib/old");
        fs::create_dir_all(&stale).unwrap();
        fs::write(stale.join("stale.dll"), b"old").unwrap();

        cache.install_from_cache(&castle(), &pkgs).unwrap();

        assert!(!pkgs.join("Castle.Core/lib/old").exists());
        assert!(pkgs.join("Castle.Core/lib/net45/Castle.Core.dll").is_file());
    }

    #[test]
    fn corrupt_archive_purges_the_cache_entry() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(dir.path().join("cache"));
        fs::create_dir_all(cache.cache_dir()).unwrap();

        // Zero-byte archive: cached but unreadable
        fs::write(cache.archive_path(&castle()), b"").unwrap();
        assert!(cache.is_cached(&castle()));

        let err = cache
            .install_from_cache(&castle(), &dir.path().join("pkgs"))
            .unwrap_err();
        assert!(matches!(err, CacheError::CorruptArchive { .. }));

        // The bad entry is gone, so a re-download can replace it
        assert!(!cache.is_cached(&castle()));
    }

    #[test]
    fn truncated_archive_is_also_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(dir.path().join("cache"));
        fs::create_dir_all(cache.cache_dir()).unwrap();
        fs::write(cache.archive_path(&castle()), b"PK\x03\x04 not really a zip").unwrap();

        let err = cache
            .install_from_cache(&castle(), &dir.path().join("pkgs"))
            .unwrap_err();
        assert!(matches!(err, CacheError::CorruptArchive { .. }));
        assert!(!cache.is_cached(&castle()));
    }

    #[test]
    fn encoded_plus_directories_are_decoded() {
        let (dir, cache) = cache_with_archive(&[
            ("lib/net45%2Bwp8/Castle.Core.dll", b"dll" as &[u8]),
            ("lib/portable-net40%2bsl50/nested%2Bdir/Castle.Core.dll", b"dll"),
        ]);
        let pkgs = dir.path().join("pkgs");

        cache.install_from_cache(&castle(), &pkgs).unwrap();

        let lib = pkgs.join("Castle.Core/lib");
        assert!(lib.join("net45+wp8/Castle.Core.dll").is_file());
        assert!(lib.join("portable-net40+sl50/nested+dir/Castle.Core.dll").is_file());
        assert!(!lib.join("net45%2Bwp8").exists());
    }

    #[test]
    fn evict_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let cache = PackageCache::new(dir.path());
        cache.evict(&castle());
        fs::write(cache.archive_path(&castle()), b"x").unwrap();
        cache.evict(&castle());
        assert!(!cache.is_cached(&castle()));
    }
}

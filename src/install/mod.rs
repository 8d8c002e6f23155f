//! install
//!
//! The per-package acquisition engine.
//!
//! # Architecture
//!
//! Acquisition of one package — feed query, cache check, download,
//! extract — is independent of every other package, so packages run on
//! a bounded pool of tokio tasks. The anthology itself is never touched
//! from workers; results fold into a report sequentially as tasks
//! finish.
//!
//! # Corruption retry
//!
//! Install failures caused by a corrupt archive purge the cache entry
//! (see [`crate::cache`]); the engine then re-downloads and retries
//! inside a bounded envelope. A package still corrupt after the last
//! attempt is reported as failed.
//!
//! # Locking
//!
//! Two concurrent installs of *different* packages share the cache
//! directory safely (disjoint files and install subdirectories). An
//! install of the *same* package must not race itself — a per-package
//! lock file in the cache directory serializes that, including across
//! processes.
//!
//! # Cancellation
//!
//! Coarse-grained: the engine checks a [`CancelFlag`] between packages.
//! An in-flight download or extract either completes or fails into the
//! corruption-recovery path; no partial-package cancellation exists.

use std::collections::{HashSet, VecDeque};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use fs2::FileExt;
use thiserror::Error;
use tokio::task::JoinSet;

use crate::cache::{CacheError, PackageCache};
use crate::core::anthology::Package;
use crate::core::types::PackageName;
use crate::feed::{FeedAggregator, PackageDependency, PackageMetadata};
use crate::ui::output::{self, Verbosity};

/// Worker pool cap; the pool never outgrows the package count.
const MAX_CONCURRENT_INSTALLS: usize = 8;

/// Total install attempts per package (first try + corruption retries).
const INSTALL_ATTEMPTS: u32 = 3;

/// Errors from acquiring a single package.
#[derive(Debug, Error)]
pub enum InstallError {
    /// No configured feed carries the pinned (name, version) pair.
    #[error("package {0} not found on any configured feed")]
    NotFound(String),

    /// The archive kept failing extraction after re-downloads.
    #[error("package {package} still corrupt after {attempts} attempt(s)")]
    Corrupt { package: String, attempts: u32 },

    /// Cache or download failure outside the corruption path.
    #[error(transparent)]
    Cache(#[from] CacheError),

    /// The per-package lock could not be taken.
    #[error("install lock failed for {package}: {source}")]
    Lock { package: String, source: io::Error },

    /// A worker task died.
    #[error("install task failed: {0}")]
    Task(String),
}

/// Cooperative cancellation flag, checked between packages.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Safe to call from a signal handler.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Outcome of an [`Installer::install_all`] run.
#[derive(Debug, Default)]
pub struct InstallReport {
    /// Packages installed (or already present) this run.
    pub installed: Vec<Package>,
    /// Failed packages (by display name), with their final error.
    pub failures: Vec<(String, InstallError)>,
    /// Whether the run stopped early on cancellation.
    pub cancelled: bool,
}

impl InstallReport {
    /// Whether every requested package ended up installed.
    pub fn success(&self) -> bool {
        self.failures.is_empty() && !self.cancelled
    }
}

/// The acquisition engine.
#[derive(Clone)]
pub struct Installer {
    aggregator: Arc<FeedAggregator>,
    cache: Arc<PackageCache>,
    package_root: PathBuf,
    verbosity: Verbosity,
    cancel: CancelFlag,
}

impl Installer {
    pub fn new(
        aggregator: Arc<FeedAggregator>,
        cache: Arc<PackageCache>,
        package_root: impl Into<PathBuf>,
        verbosity: Verbosity,
        cancel: CancelFlag,
    ) -> Self {
        Self {
            aggregator,
            cache,
            package_root: package_root.into(),
            verbosity,
            cancel,
        }
    }

    /// Guarantee local availability of every given package, plus the
    /// pinned dependencies their feed metadata declares.
    ///
    /// Dependencies are followed with a visited set keyed by package
    /// name — the first-seen version wins; no version solving happens
    /// here.
    pub async fn install_all(&self, packages: &[Package]) -> InstallReport {
        let mut report = InstallReport::default();
        let mut visited: HashSet<PackageName> = HashSet::new();
        let mut queue: VecDeque<Package> = VecDeque::new();
        for package in packages {
            if visited.insert(package.name().clone()) {
                queue.push_back(package.clone());
            }
        }

        let mut active: JoinSet<(Package, Result<Vec<PackageDependency>, InstallError>)> =
            JoinSet::new();

        loop {
            while active.len() < MAX_CONCURRENT_INSTALLS && !self.cancel.is_cancelled() {
                let Some(package) = queue.pop_front() else {
                    break;
                };
                output::print(format!("  {package}"), self.verbosity);
                let engine = self.clone();
                active.spawn(async move {
                    let result = engine.install_one(&package).await;
                    (package, result)
                });
            }

            let Some(joined) = active.join_next().await else {
                break;
            };

            match joined {
                Ok((package, Ok(dependencies))) => {
                    for dependency in dependencies {
                        if visited.insert(dependency.name.clone()) {
                            queue.push_back(Package::new(dependency.name, dependency.version));
                        }
                    }
                    report.installed.push(package);
                }
                Ok((package, Err(error))) => {
                    report.failures.push((package.to_string(), error));
                }
                Err(join_error) => {
                    // The task never returned its package; attribute the
                    // failure generically rather than dropping it.
                    report.failures.push((
                        "install worker".to_string(),
                        InstallError::Task(join_error.to_string()),
                    ));
                }
            }
        }

        if self.cancel.is_cancelled() && !queue.is_empty() {
            report.cancelled = true;
        }
        report
    }

    /// Guarantee local availability of one package.
    ///
    /// Returns the pinned dependencies learned from feed metadata, when
    /// a feed was consulted (a cache hit installs without a query and
    /// reports no dependencies — they were installed when the archive
    /// first entered the cache).
    pub async fn install_one(
        &self,
        package: &Package,
    ) -> Result<Vec<PackageDependency>, InstallError> {
        let _lock = self.acquire_lock(package)?;

        let mut metadata: Option<PackageMetadata> = None;
        if !self.cache.is_cached(package) {
            let found = self.resolve(package).await?;
            self.cache.ensure_downloaded(package, &found).await?;
            metadata = Some(found);
        }

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.cache.install_from_cache(package, &self.package_root) {
                Ok(()) => break,
                Err(CacheError::CorruptArchive { .. }) if attempt < INSTALL_ATTEMPTS => {
                    output::debug(
                        format!("re-downloading {package} (archive was corrupt)"),
                        self.verbosity,
                    );
                    let found = match metadata.take() {
                        Some(found) => found,
                        None => self.resolve(package).await?,
                    };
                    self.cache.ensure_downloaded(package, &found).await?;
                    metadata = Some(found);
                }
                Err(CacheError::CorruptArchive { .. }) => {
                    return Err(InstallError::Corrupt {
                        package: package.to_string(),
                        attempts: attempt,
                    });
                }
                Err(other) => return Err(other.into()),
            }
        }

        Ok(metadata.map(|m| m.dependencies).unwrap_or_default())
    }

    async fn resolve(&self, package: &Package) -> Result<PackageMetadata, InstallError> {
        self.aggregator
            .get_version(package)
            .await
            .ok_or_else(|| InstallError::NotFound(package.to_string()))
    }

    /// Take the per-package lock file, creating the cache directory if
    /// needed. The lock releases when the returned file drops.
    fn acquire_lock(&self, package: &Package) -> Result<fs::File, InstallError> {
        let lock_err = |source| InstallError::Lock {
            package: package.to_string(),
            source,
        };
        fs::create_dir_all(self.cache.cache_dir()).map_err(lock_err)?;
        let lock_path = self
            .cache
            .cache_dir()
            .join(format!("{}.lock", package.name()));
        let file = fs::File::create(lock_path).map_err(lock_err)?;
        file.lock_exclusive().map_err(lock_err)?;
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::mock::MockFeed;
    use crate::feed::PackageFeed;
    use std::io::Write as _;

    fn castle() -> Package {
        Package::new(PackageName::new("Castle.Core").unwrap(), "3.3.3")
    }

    fn write_archive(cache: &PackageCache, package: &Package, files: &[(&str, &[u8])]) {
        fs::create_dir_all(cache.cache_dir()).unwrap();
        let file = fs::File::create(cache.archive_path(package)).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, data) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(data).unwrap();
        }
        zip.finish().unwrap();
    }

    fn installer(dir: &std::path::Path, feeds: Vec<Box<dyn PackageFeed>>) -> Installer {
        Installer::new(
            Arc::new(FeedAggregator::new(feeds, Verbosity::Quiet)),
            Arc::new(PackageCache::new(dir.join("cache"))),
            dir.join("pkgs"),
            Verbosity::Quiet,
            CancelFlag::new(),
        )
    }

    #[tokio::test]
    async fn cached_package_installs_without_any_feed() {
        let dir = tempfile::tempdir().unwrap();
        let engine = installer(dir.path(), vec![]);
        write_archive(
            &engine.cache,
            &castle(),
            &[("lib/net45/Castle.Core.dll", b"dll" as &[u8])],
        );

        let deps = engine.install_one(&castle()).await.unwrap();
        assert!(deps.is_empty());
        assert!(dir
            .path()
            .join("pkgs/Castle.Core/lib/net45/Castle.Core.dll")
            .is_file());
    }

    #[tokio::test]
    async fn corrupt_cache_with_no_feeds_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let engine = installer(dir.path(), vec![]);
        fs::create_dir_all(engine.cache.cache_dir()).unwrap();
        fs::write(engine.cache.archive_path(&castle()), b"").unwrap();

        // First install purges the corrupt entry, then resolution fails
        let err = engine.install_one(&castle()).await.unwrap_err();
        assert!(matches!(err, InstallError::NotFound(_)));
        assert!(!engine.cache.is_cached(&castle()));
    }

    #[tokio::test]
    async fn missing_package_reports_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let empty_feed = MockFeed::new("http://feed");
        let engine = installer(dir.path(), vec![Box::new(empty_feed)]);

        let report = engine.install_all(&[castle()]).await;
        assert!(!report.success());
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(report.failures[0].1, InstallError::NotFound(_)));
    }

    #[tokio::test]
    async fn install_all_deduplicates_by_name() {
        let dir = tempfile::tempdir().unwrap();
        let engine = installer(dir.path(), vec![]);
        write_archive(
            &engine.cache,
            &castle(),
            &[("lib/net45/Castle.Core.dll", b"dll" as &[u8])],
        );

        let report = engine
            .install_all(&[castle(), castle(), castle()])
            .await;
        assert!(report.success());
        assert_eq!(report.installed.len(), 1);
    }

    #[tokio::test]
    async fn cancelled_run_installs_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let cancel = CancelFlag::new();
        cancel.cancel();
        let engine = Installer::new(
            Arc::new(FeedAggregator::new(vec![], Verbosity::Quiet)),
            Arc::new(PackageCache::new(dir.path().join("cache"))),
            dir.path().join("pkgs"),
            Verbosity::Quiet,
            cancel,
        );

        let report = engine.install_all(&[castle()]).await;
        assert!(report.cancelled);
        assert!(report.installed.is_empty());
    }

    #[test]
    fn cancel_flag_is_shared_across_clones() {
        let flag = CancelFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_cancelled());
        flag.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn report_success_requires_no_failures_and_no_cancel() {
        let ok = InstallReport::default();
        assert!(ok.success());

        let failed = InstallReport {
            failures: vec![(
                castle().to_string(),
                InstallError::NotFound("Castle.Core".into()),
            )],
            ..Default::default()
        };
        assert!(!failed.success());

        let cancelled = InstallReport {
            cancelled: true,
            ..Default::default()
        };
        assert!(!cancelled.success());
    }
}

//! cache::layout
//!
//! Inspecting installed packages' `lib/` layout.
//!
//! # Design
//!
//! A package "contributes" every assembly found anywhere under its
//! extracted `lib/` tree. This module walks that tree and feeds the
//! optimizer's [`AssemblySource`] capability:
//!
//! - package directory missing → not installed (`None`)
//! - package directory present, no assemblies under `lib/` → empty
//!   package (`Some` of an empty list), which the optimizer drops

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::types::{AssemblyName, PackageName};
use crate::optimize::AssemblySource;

/// Assembly source backed by the extracted packages on disk.
#[derive(Debug, Clone)]
pub struct InstalledPackages {
    package_root: PathBuf,
}

impl InstalledPackages {
    /// Create an inspector over `{package_root}/{name}/...` trees.
    pub fn new(package_root: impl Into<PathBuf>) -> Self {
        Self {
            package_root: package_root.into(),
        }
    }

    /// Directory an installed package occupies.
    pub fn package_dir(&self, name: &PackageName) -> PathBuf {
        self.package_root.join(name.as_str())
    }
}

impl AssemblySource for InstalledPackages {
    fn assemblies(&self, package: &PackageName) -> Option<Vec<AssemblyName>> {
        let dir = self.package_dir(package);
        if !dir.is_dir() {
            return None;
        }

        let mut found = BTreeSet::new();
        let lib = dir.join("lib");
        if lib.is_dir() {
            collect_assemblies(&lib, &mut found);
        }
        Some(found.into_iter().collect())
    }
}

/// Gather assembly stems from every `.dll`/`.exe` under `dir`.
fn collect_assemblies(dir: &Path, found: &mut BTreeSet<AssemblyName>) {
    let Ok(entries) = fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_assemblies(&path, found);
            continue;
        }
        let is_assembly = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("dll") || e.eq_ignore_ascii_case("exe"))
            .unwrap_or(false);
        if !is_assembly {
            continue;
        }
        if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
            if let Ok(name) = AssemblyName::new(stem) {
                found.insert(name);
            }
        }
    }
}

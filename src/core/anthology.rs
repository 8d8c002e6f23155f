//! core::anthology
//!
//! The anthology: a unified graph of projects, binaries, and packages.
//!
//! # Architecture
//!
//! The anthology is the single source of truth for "what must be
//! resolvable" across every repository in the workspace:
//! - Projects are compiled units keyed by a unique id
//! - Binaries are raw assembly references keyed by assembly name
//! - Packages are versioned dependencies keyed by package name
//!
//! # Invariants
//!
//! - Each collection holds at most one entry per identity
//! - Collections materialize in a stable sort order (projects by id,
//!   binaries by assembly name, packages by name) so persisted snapshots
//!   stay diff-friendly
//! - A package's stored version only moves forward (monotonic max)
//! - A project never references its own id, and every project reference
//!   must resolve — [`Anthology::verify`] enforces both before a graph
//!   may be persisted
//!
//! # Value semantics
//!
//! Every mutator returns a *new* anthology; an old reference is never
//! observed to change. Callers thread the returned value forward.
//!
//! # Example
//!
//! ```
//! use bindery::core::anthology::{Anthology, Package};
//! use bindery::core::types::PackageName;
//!
//! let graph = Anthology::new();
//! let castle = PackageName::new("Castle.Core").unwrap();
//!
//! let graph = graph.add_or_update_package(Package::new(castle.clone(), "1.0.0"));
//! // A downgrade is a silent no-op
//! let graph = graph.add_or_update_package(Package::new(castle.clone(), "0.9.0"));
//! assert_eq!(graph.package(&castle).unwrap().version(), "1.0.0");
//! ```

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::types::{AssemblyName, PackageName, ProjectId};
use super::version;

/// Errors from graph consistency verification.
///
/// Both variants are fatal: a dangling or self-referential edge corrupts
/// every downstream consumer, so verification halts before persisting.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConsistencyError {
    /// A project lists its own id among its project references.
    #[error("project '{path}' references itself ({id})")]
    SelfReference { path: String, id: ProjectId },

    /// A project references an id with no matching project in the graph.
    #[error("project '{path}' references unknown project {target}")]
    DanglingReference { path: String, target: ProjectId },
}

/// What a project compiles to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    /// A library (`.dll`).
    Library,
    /// An executable (`.exe`).
    Executable,
}

impl OutputKind {
    /// The output file extension, dot included.
    pub fn extension(&self) -> &'static str {
        match self {
            OutputKind::Library => ".dll",
            OutputKind::Executable => ".exe",
        }
    }
}

/// Replace platform path separators with `/`.
///
/// Snapshots are shared across machines; paths are stored with unix
/// separators regardless of where the scan ran.
fn to_unix_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// A compiled unit discovered in the workspace.
///
/// Identity, file path, output assembly, kind, and framework target are
/// fixed at creation. Rewrite passes may only add or remove references,
/// always receiving a new `Project` value back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    id: ProjectId,
    path: String,
    assembly: AssemblyName,
    kind: OutputKind,
    framework: String,
    #[serde(default)]
    project_refs: Vec<ProjectId>,
    #[serde(default)]
    binary_refs: Vec<AssemblyName>,
    #[serde(default)]
    package_refs: Vec<PackageName>,
}

impl Project {
    /// Create a project. Reference lists are deduplicated and sorted;
    /// the path is normalized to unix separators.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: ProjectId,
        path: impl Into<String>,
        assembly: AssemblyName,
        kind: OutputKind,
        framework: impl Into<String>,
        project_refs: Vec<ProjectId>,
        binary_refs: Vec<AssemblyName>,
        package_refs: Vec<PackageName>,
    ) -> Self {
        Self {
            id,
            path: to_unix_separators(&path.into()),
            assembly,
            kind,
            framework: framework.into(),
            project_refs: dedup_sorted(project_refs),
            binary_refs: dedup_sorted(binary_refs),
            package_refs: dedup_sorted(package_refs),
        }
    }

    pub fn id(&self) -> ProjectId {
        self.id
    }

    /// Workspace-relative descriptor path, unix separators.
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn assembly(&self) -> &AssemblyName {
        &self.assembly
    }

    pub fn kind(&self) -> OutputKind {
        self.kind
    }

    /// Target-framework moniker.
    pub fn framework(&self) -> &str {
        &self.framework
    }

    pub fn project_refs(&self) -> &[ProjectId] {
        &self.project_refs
    }

    pub fn binary_refs(&self) -> &[AssemblyName] {
        &self.binary_refs
    }

    pub fn package_refs(&self) -> &[PackageName] {
        &self.package_refs
    }

    /// Add a project reference (deduplicated).
    pub fn with_project_ref(&self, target: ProjectId) -> Self {
        let mut refs = self.project_refs.clone();
        refs.push(target);
        Self {
            project_refs: dedup_sorted(refs),
            ..self.clone()
        }
    }

    /// Remove a binary reference by assembly name.
    pub fn without_binary_ref(&self, name: &AssemblyName) -> Self {
        Self {
            binary_refs: self
                .binary_refs
                .iter()
                .filter(|b| *b != name)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }

    /// Add a package reference (deduplicated).
    pub fn with_package_ref(&self, name: PackageName) -> Self {
        let mut refs = self.package_refs.clone();
        refs.push(name);
        Self {
            package_refs: dedup_sorted(refs),
            ..self.clone()
        }
    }

    /// Remove a package reference by name.
    pub fn without_package_ref(&self, name: &PackageName) -> Self {
        Self {
            package_refs: self
                .package_refs
                .iter()
                .filter(|p| *p != name)
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

fn dedup_sorted<T: Ord + Clone>(mut items: Vec<T>) -> Vec<T> {
    items.sort();
    items.dedup();
    items
}

/// A raw assembly reference not resolved through a package.
///
/// No hint path means the assembly is expected to resolve from the
/// runtime or framework.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Binary {
    name: AssemblyName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    hint_path: Option<String>,
}

impl Binary {
    pub fn new(name: AssemblyName, hint_path: Option<String>) -> Self {
        Self {
            name,
            hint_path: hint_path.map(|p| to_unix_separators(&p)),
        }
    }

    pub fn name(&self) -> &AssemblyName {
        &self.name
    }

    /// Recorded filesystem location of the physical assembly, if any.
    pub fn hint_path(&self) -> Option<&str> {
        self.hint_path.as_deref()
    }
}

/// A versioned package dependency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Package {
    name: PackageName,
    version: String,
}

impl Package {
    pub fn new(name: PackageName, version: impl Into<String>) -> Self {
        Self {
            name,
            version: version.into(),
        }
    }

    pub fn name(&self) -> &PackageName {
        &self.name
    }

    pub fn version(&self) -> &str {
        &self.version
    }
}

impl std::fmt::Display for Package {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.version)
    }
}

/// Serialized shape: three top-level arrays in stable sort order.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Collections {
    #[serde(default)]
    projects: Vec<Project>,
    #[serde(default)]
    binaries: Vec<Binary>,
    #[serde(default)]
    packages: Vec<Package>,
}

/// The dependency graph aggregate.
///
/// See the module docs for invariants. Construct with [`Anthology::new`]
/// (empty) or [`Anthology::from_parts`] (normalizing).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Collections", into = "Collections")]
pub struct Anthology {
    projects: Vec<Project>,
    binaries: Vec<Binary>,
    packages: Vec<Package>,
}

impl From<Collections> for Anthology {
    fn from(c: Collections) -> Self {
        Anthology::from_parts(c.projects, c.binaries, c.packages)
    }
}

impl From<Anthology> for Collections {
    fn from(a: Anthology) -> Self {
        Collections {
            projects: a.projects,
            binaries: a.binaries,
            packages: a.packages,
        }
    }
}

impl Anthology {
    /// Create an empty anthology.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an anthology from raw collections, restoring the uniqueness
    /// and sort invariants. Later duplicates win.
    pub fn from_parts(
        projects: Vec<Project>,
        binaries: Vec<Binary>,
        packages: Vec<Package>,
    ) -> Self {
        let projects: BTreeMap<ProjectId, Project> =
            projects.into_iter().map(|p| (p.id(), p)).collect();
        let binaries: BTreeMap<AssemblyName, Binary> =
            binaries.into_iter().map(|b| (b.name().clone(), b)).collect();
        let packages: BTreeMap<PackageName, Package> =
            packages.into_iter().map(|p| (p.name().clone(), p)).collect();

        Self {
            projects: projects.into_values().collect(),
            binaries: binaries.into_values().collect(),
            packages: packages.into_values().collect(),
        }
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn binaries(&self) -> &[Binary] {
        &self.binaries
    }

    pub fn packages(&self) -> &[Package] {
        &self.packages
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty() && self.binaries.is_empty() && self.packages.is_empty()
    }

    /// Look up a project by id.
    pub fn project(&self, id: ProjectId) -> Option<&Project> {
        self.projects.iter().find(|p| p.id() == id)
    }

    /// Look up a binary by assembly name (case-insensitive).
    pub fn binary(&self, name: &AssemblyName) -> Option<&Binary> {
        self.binaries.iter().find(|b| b.name() == name)
    }

    /// Look up a package by name (case-insensitive).
    pub fn package(&self, name: &PackageName) -> Option<&Package> {
        self.packages.iter().find(|p| p.name() == name)
    }

    /// Insert or replace a project, keyed by id.
    pub fn add_or_update_project(&self, project: Project) -> Self {
        let mut projects: Vec<Project> = self
            .projects
            .iter()
            .filter(|p| p.id() != project.id())
            .cloned()
            .collect();
        projects.push(project);
        Self::from_parts(projects, self.binaries.clone(), self.packages.clone())
    }

    /// Insert or replace a binary, keyed by assembly name.
    pub fn add_or_update_binary(&self, binary: Binary) -> Self {
        let mut binaries: Vec<Binary> = self
            .binaries
            .iter()
            .filter(|b| b.name() != binary.name())
            .cloned()
            .collect();
        binaries.push(binary);
        Self::from_parts(self.projects.clone(), binaries, self.packages.clone())
    }

    /// Insert a package, or raise an existing one's version.
    ///
    /// The stored version is a monotonic max: a write with a lower or
    /// equal version is a silent no-op. An incoming version that fails to
    /// parse never supersedes; a stored version that fails to parse is
    /// superseded by any valid incoming one.
    pub fn add_or_update_package(&self, package: Package) -> Self {
        if let Some(existing) = self.package(package.name()) {
            let supersedes = match version::compare(package.version(), existing.version()) {
                Some(Ordering::Greater) => true,
                Some(_) => false,
                None => {
                    version::PackageVersion::parse(package.version()).is_ok()
                        && version::PackageVersion::parse(existing.version()).is_err()
                }
            };
            if !supersedes {
                return self.clone();
            }
            let mut packages: Vec<Package> = self
                .packages
                .iter()
                .filter(|p| p.name() != package.name())
                .cloned()
                .collect();
            packages.push(package);
            Self::from_parts(self.projects.clone(), self.binaries.clone(), packages)
        } else {
            let mut packages = self.packages.clone();
            packages.push(package);
            Self::from_parts(self.projects.clone(), self.binaries.clone(), packages)
        }
    }

    /// Remove a project by id. Removing an absent id is a no-op.
    pub fn remove_project(&self, id: ProjectId) -> Self {
        Self {
            projects: self
                .projects
                .iter()
                .filter(|p| p.id() != id)
                .cloned()
                .collect(),
            binaries: self.binaries.clone(),
            packages: self.packages.clone(),
        }
    }

    /// Remove a binary by assembly name. Removing an absent name is a no-op.
    pub fn remove_binary(&self, name: &AssemblyName) -> Self {
        Self {
            projects: self.projects.clone(),
            binaries: self
                .binaries
                .iter()
                .filter(|b| b.name() != name)
                .cloned()
                .collect(),
            packages: self.packages.clone(),
        }
    }

    /// Remove a package by name. Removing an absent name is a no-op.
    pub fn remove_package(&self, name: &PackageName) -> Self {
        Self {
            projects: self.projects.clone(),
            binaries: self.binaries.clone(),
            packages: self
                .packages
                .iter()
                .filter(|p| p.name() != name)
                .cloned()
                .collect(),
        }
    }

    /// Reconcile this graph (the previously persisted base) with a
    /// freshly scanned overlay.
    ///
    /// Policy is per-key replace: any identity present in the overlay
    /// fully replaces the base entry; entries only in the base are
    /// retained (their source repositories were not re-scanned this
    /// pass). This is intentionally coarse — no field-level merge, no
    /// three-way diff. `base.merge(&base) == base` for any valid graph.
    pub fn merge(&self, overlay: &Anthology) -> Self {
        let mut projects: BTreeMap<ProjectId, Project> =
            self.projects.iter().map(|p| (p.id(), p.clone())).collect();
        for p in &overlay.projects {
            projects.insert(p.id(), p.clone());
        }

        let mut binaries: BTreeMap<AssemblyName, Binary> = self
            .binaries
            .iter()
            .map(|b| (b.name().clone(), b.clone()))
            .collect();
        for b in &overlay.binaries {
            binaries.insert(b.name().clone(), b.clone());
        }

        let mut packages: BTreeMap<PackageName, Package> = self
            .packages
            .iter()
            .map(|p| (p.name().clone(), p.clone()))
            .collect();
        for p in &overlay.packages {
            packages.insert(p.name().clone(), p.clone());
        }

        Self {
            projects: projects.into_values().collect(),
            binaries: binaries.into_values().collect(),
            packages: packages.into_values().collect(),
        }
    }

    /// Check referential consistency.
    ///
    /// # Errors
    ///
    /// Returns the first [`ConsistencyError`] found: a project
    /// referencing itself or referencing an id absent from the graph.
    /// Callers must not persist a graph that fails this check.
    pub fn verify(&self) -> Result<(), ConsistencyError> {
        for project in &self.projects {
            for target in project.project_refs() {
                if *target == project.id() {
                    return Err(ConsistencyError::SelfReference {
                        path: project.path().to_string(),
                        id: project.id(),
                    });
                }
                if self.project(*target).is_none() {
                    return Err(ConsistencyError::DanglingReference {
                        path: project.path().to_string(),
                        target: *target,
                    });
                }
            }
        }
        Ok(())
    }
}

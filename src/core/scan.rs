//! core::scan
//!
//! Folding workspace scan facts into the anthology.
//!
//! # Design
//!
//! Descriptor parsing is an external collaborator's job. It emits one
//! [`ProjectFacts`] record per discovered build descriptor; this module
//! consumes those records as already-parsed input and folds them into
//! the graph:
//!
//! - the project itself is added or replaced,
//! - a [`Binary`] is recorded per binary reference,
//! - package references are recorded with monotonic-max versioning,
//! - hint paths of the shape `.../packages/{Name}.{version}/lib/...`
//!   contribute derived package references,
//! - binary references with no hint path and a non-framework name are
//!   reported as warnings (they usually indicate a broken project
//!   reference) but never abort the fold.

use std::fs;
use std::io;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use super::anthology::{Anthology, Binary, OutputKind, Package, Project};
use super::types::{AssemblyName, PackageName, ProjectId};
use super::version::PackageVersion;

/// Errors from reading scan facts.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The facts file could not be read.
    #[error("failed to read scan facts: {0}")]
    Io(#[from] io::Error),

    /// The facts file is not valid JSON or fails type validation.
    #[error("failed to parse scan facts: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Non-fatal findings produced while folding facts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanWarning {
    /// A binary reference with no hint path that is not a framework
    /// assembly — usually a broken project reference.
    SpuriousBinaryReference {
        assembly: AssemblyName,
        project: String,
    },
}

impl std::fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScanWarning::SpuriousBinaryReference { assembly, project } => {
                write!(f, "spurious assembly reference {assembly} in project {project}")
            }
        }
    }
}

/// A binary reference as reported by the scanner.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BinaryFact {
    /// Referenced assembly name.
    pub name: AssemblyName,
    /// Recorded location of the physical assembly, if any.
    #[serde(default)]
    pub hint_path: Option<String>,
}

/// A package reference as reported by the scanner.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PackageFact {
    pub name: PackageName,
    /// Version as pinned in the descriptor; validated later by the
    /// monotonic-max rule, not here.
    pub version: String,
}

/// One scanned build descriptor.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectFacts {
    pub id: ProjectId,
    /// Workspace-relative descriptor path.
    pub path: String,
    pub assembly: AssemblyName,
    pub kind: OutputKind,
    /// Target-framework moniker.
    pub framework: String,
    #[serde(default)]
    pub project_refs: Vec<ProjectId>,
    #[serde(default)]
    pub binary_refs: Vec<BinaryFact>,
    #[serde(default)]
    pub package_refs: Vec<PackageFact>,
}

/// Load scan facts from a JSON file (an array of records).
///
/// # Errors
///
/// Returns [`ScanError`] when the file is unreadable or malformed.
pub fn load_facts(path: &Path) -> Result<Vec<ProjectFacts>, ScanError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// A package candidate derived from a hint path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintPackage {
    pub name: PackageName,
    /// Absent when the hint path carries no version segment.
    pub version: Option<String>,
}

/// Derive a package from a hint path of the form
/// `.../packages/{Name}.{version}/lib/...`.
///
/// The name ends at the first `.<digit>` boundary. A hint path without a
/// version segment yields a versionless candidate; a version segment
/// that fails to parse (even with the legacy fallback) yields no package
/// at all — never an error.
pub fn package_from_hint_path(hint: &str) -> Option<HintPackage> {
    let normalized = hint.replace('\\', "/");
    let lower = normalized.to_ascii_lowercase();

    const PACKAGES: &str = "/packages/";
    let packages_idx = lower.find(PACKAGES)?;
    let name_start = packages_idx + PACKAGES.len();
    let lib_idx = lower[name_start..].find("/lib/").map(|i| i + name_start)?;

    let segment = &normalized[name_start..lib_idx];
    let version_idx = first_version_boundary(segment);

    match version_idx {
        None => {
            let name = PackageName::new(segment).ok()?;
            Some(HintPackage {
                name,
                version: None,
            })
        }
        Some(idx) => {
            let name = PackageName::new(&segment[..idx]).ok()?;
            let version = &segment[idx + 1..];
            PackageVersion::parse(version).ok()?;
            Some(HintPackage {
                name,
                version: Some(version.to_string()),
            })
        }
    }
}

/// Index of the first `.` that is followed by an ASCII digit.
fn first_version_boundary(segment: &str) -> Option<usize> {
    let bytes = segment.as_bytes();
    (0..bytes.len().saturating_sub(1))
        .find(|&i| bytes[i] == b'.' && bytes[i + 1].is_ascii_digit())
}

/// Fold scan facts into the anthology.
///
/// Returns the updated graph and any warnings. Warnings never abort the
/// fold; consistency is checked separately after merge.
pub fn fold_facts(
    anthology: &Anthology,
    facts: &[ProjectFacts],
) -> (Anthology, Vec<ScanWarning>) {
    let mut graph = anthology.clone();
    let mut warnings = Vec::new();

    for record in facts {
        let mut package_refs: Vec<PackageName> =
            record.package_refs.iter().map(|p| p.name.clone()).collect();

        for binary in &record.binary_refs {
            match binary.hint_path.as_deref() {
                None if !binary.name.is_framework() => {
                    warnings.push(ScanWarning::SpuriousBinaryReference {
                        assembly: binary.name.clone(),
                        project: record.path.clone(),
                    });
                }
                Some(hint) => {
                    if let Some(derived) = package_from_hint_path(hint) {
                        if let Some(version) = derived.version {
                            package_refs.push(derived.name.clone());
                            graph = graph
                                .add_or_update_package(Package::new(derived.name, version));
                        }
                    }
                }
                None => {}
            }
        }

        let project = Project::new(
            record.id,
            record.path.clone(),
            record.assembly.clone(),
            record.kind,
            record.framework.clone(),
            record.project_refs.clone(),
            record.binary_refs.iter().map(|b| b.name.clone()).collect(),
            package_refs,
        );
        graph = graph.add_or_update_project(project);

        for binary in &record.binary_refs {
            graph = graph.add_or_update_binary(Binary::new(
                binary.name.clone(),
                binary.hint_path.clone(),
            ));
        }

        for package in &record.package_refs {
            graph = graph.add_or_update_package(Package::new(
                package.name.clone(),
                package.version.clone(),
            ));
        }
    }

    (graph, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod hint_paths {
        use super::*;

        #[test]
        fn parses_expected_hint_path() {
            let hint =
                "../packages/Connectivity.Services.Model.1.1.24/lib/net45/Connectivity.Services.Model.dll";
            let pkg = package_from_hint_path(hint).unwrap();
            assert_eq!(pkg.name.as_str(), "Connectivity.Services.Model");
            assert_eq!(pkg.version.as_deref(), Some("1.1.24"));
        }

        #[test]
        fn parses_hint_path_with_missing_version() {
            let hint = "../packages/Microsoft.Data.Services.Client/lib/portable-net45+wp8+win8+wpa/zh-Hant/Microsoft.Data.Services.Client.resources.dll";
            let pkg = package_from_hint_path(hint).unwrap();
            assert_eq!(pkg.name.as_str(), "Microsoft.Data.Services.Client");
            assert_eq!(pkg.version, None);
        }

        #[test]
        fn parses_prerelease_version() {
            let hint =
                "../packages/Connectivity.Services.Model.1.1.24-beta2/lib/net45/Connectivity.Services.Model.dll";
            let pkg = package_from_hint_path(hint).unwrap();
            assert_eq!(pkg.name.as_str(), "Connectivity.Services.Model");
            assert_eq!(pkg.version.as_deref(), Some("1.1.24-beta2"));
        }

        #[test]
        fn invalid_version_yields_no_package() {
            let hint =
                "../packages/Connectivity.Services.Model.42bb/lib/net45/Connectivity.Services.Model.dll";
            assert_eq!(package_from_hint_path(hint), None);
        }

        #[test]
        fn non_package_path_yields_no_package() {
            let hint = "../../References/Adomd.net/100/Microsoft.AnalysisServices.AdomdClient.dll";
            assert_eq!(package_from_hint_path(hint), None);
        }

        #[test]
        fn backslash_paths_are_tolerated() {
            let hint = r"..\packages\Castle.Core.3.3.3\lib\net45\Castle.Core.dll";
            let pkg = package_from_hint_path(hint).unwrap();
            assert_eq!(pkg.name.as_str(), "Castle.Core");
            assert_eq!(pkg.version.as_deref(), Some("3.3.3"));
        }

        #[test]
        fn legacy_four_component_version_accepted() {
            let hint = "../packages/Moq.4.2.1402.2112/lib/net40/Moq.dll";
            let pkg = package_from_hint_path(hint).unwrap();
            assert_eq!(pkg.name.as_str(), "Moq");
            assert_eq!(pkg.version.as_deref(), Some("4.2.1402.2112"));
        }
    }

    mod folding {
        use super::*;

        fn facts_json() -> &'static str {
            r#"[{
                "id": "6db78f14-5c67-4b09-a1b3-2b6f7a3e9d01",
                "path": "core/src/Acme.Core.csproj",
                "assembly": "Acme.Core",
                "kind": "library",
                "framework": "v4.5",
                "project_refs": [],
                "binary_refs": [
                    {"name": "System.Xml"},
                    {"name": "Orphan.Assembly"},
                    {"name": "Castle.Core",
                     "hint_path": "../packages/Castle.Core.3.3.3/lib/net45/Castle.Core.dll"}
                ],
                "package_refs": [
                    {"name": "NUnit", "version": "2.6.4"}
                ]
            }]"#
        }

        fn parse_facts() -> Vec<ProjectFacts> {
            serde_json::from_str(facts_json()).unwrap()
        }

        #[test]
        fn facts_deserialize() {
            let facts = parse_facts();
            assert_eq!(facts.len(), 1);
            assert_eq!(facts[0].binary_refs.len(), 3);
        }

        #[test]
        fn fold_records_project_binaries_and_packages() {
            let (graph, _) = fold_facts(&Anthology::new(), &parse_facts());

            assert_eq!(graph.projects().len(), 1);
            assert_eq!(graph.binaries().len(), 3);

            // NUnit from the descriptor, Castle.Core derived from the hint path
            let names: Vec<_> = graph.packages().iter().map(|p| p.name().as_str()).collect();
            assert_eq!(names, vec!["Castle.Core", "NUnit"]);
        }

        #[test]
        fn hint_derived_package_becomes_a_project_reference() {
            let (graph, _) = fold_facts(&Anthology::new(), &parse_facts());
            let project = &graph.projects()[0];
            assert!(project
                .package_refs()
                .iter()
                .any(|p| p.matches("Castle.Core")));
        }

        #[test]
        fn spurious_binary_reference_warns_once() {
            let (_, warnings) = fold_facts(&Anthology::new(), &parse_facts());
            assert_eq!(warnings.len(), 1);
            match &warnings[0] {
                ScanWarning::SpuriousBinaryReference { assembly, project } => {
                    assert!(assembly.matches("Orphan.Assembly"));
                    assert_eq!(project, "core/src/Acme.Core.csproj");
                }
            }
        }

        #[test]
        fn framework_references_do_not_warn() {
            let (_, warnings) = fold_facts(&Anthology::new(), &parse_facts());
            assert!(warnings
                .iter()
                .all(|w| !matches!(w, ScanWarning::SpuriousBinaryReference { assembly, .. }
                    if assembly.matches("System.Xml"))));
        }

        #[test]
        fn refold_replaces_the_project_record() {
            let facts = parse_facts();
            let (graph, _) = fold_facts(&Anthology::new(), &facts);
            let (again, _) = fold_facts(&graph, &facts);
            assert_eq!(graph, again);
        }

        #[test]
        fn package_versions_fold_monotonically() {
            let facts = parse_facts();
            let (graph, _) = fold_facts(&Anthology::new(), &facts);

            // A second scan pinning an older NUnit does not downgrade
            let mut older = facts;
            older[0].package_refs[0].version = "2.5.0".into();
            let (merged, _) = fold_facts(&graph, &older);
            let nunit = PackageName::new("NUnit").unwrap();
            assert_eq!(merged.package(&nunit).unwrap().version(), "2.6.4");
        }
    }
}

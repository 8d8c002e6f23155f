//! optimize
//!
//! Graph-rewriting passes that remove redundancy from the anthology.
//!
//! # Architecture
//!
//! A fixed, order-dependent pipeline; each pass consumes the graph the
//! previous one produced:
//!
//! 1. [`remove_binaries_shadowed_by_packages`] - a package supersedes an
//!    equivalent raw binary reference
//! 2. [`prefer_package_over_binary`] - remaining binary references are
//!    rewritten to the most specific package contributing that assembly
//! 3. [`promote_binary_to_project`] - a binary matching a project's
//!    output becomes a direct project reference
//! 4. [`promote_package_to_project`] - same for packages
//! 5. [`remove_empty_packages`] - packages contributing no assemblies
//!    are dropped
//! 6. [`remove_unused`] - packages and binaries no project references
//!    are dropped
//!
//! The pipeline runs once in this exact order — predictability over
//! maximal reduction. Running it a second time changes nothing; that
//! idempotence is a tested property.
//!
//! # Ambiguity
//!
//! Promotion with more than one candidate project is never guessed at:
//! the pass emits one warning naming every candidate and leaves the
//! reference untouched. The graph stays conservative but correct.
//!
//! # Package contents
//!
//! What assemblies a package contributes comes from an
//! [`AssemblySource`] — in production the installed packages' `lib/`
//! layout ([`crate::cache::layout::InstalledPackages`]), in tests an
//! in-memory [`StaticAssemblySource`].

use std::collections::{BTreeSet, HashMap};

use crate::core::anthology::Anthology;
use crate::core::types::{AssemblyName, PackageName, ProjectId};

/// Provider of the package → contributed assemblies relation.
pub trait AssemblySource {
    /// Assemblies a package contributes, or `None` when the package is
    /// not installed (passes skip uninstalled packages rather than
    /// treating them as empty).
    fn assemblies(&self, package: &PackageName) -> Option<Vec<AssemblyName>>;
}

/// In-memory assembly source for tests.
#[derive(Debug, Default)]
pub struct StaticAssemblySource {
    map: HashMap<PackageName, Vec<AssemblyName>>,
}

impl StaticAssemblySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a package's contributed assemblies.
    pub fn insert(&mut self, package: PackageName, assemblies: Vec<AssemblyName>) {
        self.map.insert(package, assemblies);
    }
}

impl AssemblySource for StaticAssemblySource {
    fn assemblies(&self, package: &PackageName) -> Option<Vec<AssemblyName>> {
        self.map.get(package).cloned()
    }
}

/// Non-fatal findings from the optimizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptimizeWarning {
    /// More than one project produces the binary's assembly; promotion
    /// was skipped.
    AmbiguousBinaryPromotion {
        binary: AssemblyName,
        candidates: Vec<(ProjectId, String)>,
    },

    /// More than one project produces an assembly the package
    /// contributes; promotion was skipped.
    AmbiguousPackagePromotion {
        package: PackageName,
        candidates: Vec<(ProjectId, String)>,
    },
}

impl std::fmt::Display for OptimizeWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizeWarning::AmbiguousBinaryPromotion { binary, candidates } => {
                write!(
                    f,
                    "too many candidate projects to promote binary {binary}: {}",
                    format_candidates(candidates)
                )
            }
            OptimizeWarning::AmbiguousPackagePromotion { package, candidates } => {
                write!(
                    f,
                    "too many candidate projects to promote package {package}: {}",
                    format_candidates(candidates)
                )
            }
        }
    }
}

fn format_candidates(candidates: &[(ProjectId, String)]) -> String {
    candidates
        .iter()
        .map(|(id, path)| format!("{path} ({id})"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// The optimized graph plus any warnings the passes produced.
#[derive(Debug)]
pub struct OptimizeOutcome {
    pub anthology: Anthology,
    pub warnings: Vec<OptimizeWarning>,
}

/// Run the full pipeline.
pub fn optimize(anthology: &Anthology, source: &dyn AssemblySource) -> OptimizeOutcome {
    let mut warnings = Vec::new();
    let graph = remove_binaries_shadowed_by_packages(anthology, source);
    let graph = prefer_package_over_binary(&graph, source);
    let graph = promote_binary_to_project(&graph, &mut warnings);
    let graph = promote_package_to_project(&graph, source, &mut warnings);
    let graph = remove_empty_packages(&graph, source);
    let graph = remove_unused(&graph);
    OptimizeOutcome {
        anthology: graph,
        warnings,
    }
}

/// Pass 1: drop each project's binary references whose assembly is
/// already contributed by one of its referenced packages.
pub fn remove_binaries_shadowed_by_packages(
    anthology: &Anthology,
    source: &dyn AssemblySource,
) -> Anthology {
    let mut graph = anthology.clone();
    for project in anthology.projects() {
        let shadowed: BTreeSet<AssemblyName> = project
            .package_refs()
            .iter()
            .filter_map(|p| source.assemblies(p))
            .flatten()
            .collect();
        if shadowed.is_empty() {
            continue;
        }

        let mut updated = project.clone();
        for assembly in &shadowed {
            updated = updated.without_binary_ref(assembly);
        }
        if updated != *project {
            graph = graph.add_or_update_project(updated);
        }
    }
    graph
}

/// Pass 2: rewrite each remaining binary reference to the installed
/// package that contributes its assembly. The package contributing the
/// fewest assemblies wins (most specific); a count tie breaks
/// lexicographically on package name.
pub fn prefer_package_over_binary(
    anthology: &Anthology,
    source: &dyn AssemblySource,
) -> Anthology {
    let mut catalog: Vec<(PackageName, Vec<AssemblyName>)> = anthology
        .packages()
        .iter()
        .filter_map(|p| source.assemblies(p.name()).map(|a| (p.name().clone(), a)))
        .collect();
    catalog.sort_by(|a, b| a.1.len().cmp(&b.1.len()).then_with(|| a.0.cmp(&b.0)));

    let mut graph = anthology.clone();
    for project in anthology.projects() {
        let mut updated = project.clone();
        for binary in project.binary_refs() {
            let winner = catalog
                .iter()
                .find(|(_, assemblies)| assemblies.contains(binary));
            if let Some((package, _)) = winner {
                updated = updated
                    .without_binary_ref(binary)
                    .with_package_ref(package.clone());
            }
        }
        if updated != *project {
            graph = graph.add_or_update_project(updated);
        }
    }
    graph
}

/// Pass 3: a binary whose assembly matches exactly one project's output
/// becomes a direct reference to that project in every referrer. More
/// than one matching project is ambiguous: warn and skip, never guess.
pub fn promote_binary_to_project(
    anthology: &Anthology,
    warnings: &mut Vec<OptimizeWarning>,
) -> Anthology {
    let mut graph = anthology.clone();
    for binary in anthology.binaries() {
        let candidates: Vec<(ProjectId, String)> = graph
            .projects()
            .iter()
            .filter(|p| p.assembly() == binary.name())
            .map(|p| (p.id(), p.path().to_string()))
            .collect();

        match candidates.len() {
            0 => {}
            1 => {
                let target = candidates[0].0;
                for project in graph.projects().to_vec() {
                    if !project.binary_refs().contains(binary.name()) {
                        continue;
                    }
                    // A project cannot reference itself; leave a
                    // self-matching referrer untouched.
                    if project.id() == target {
                        continue;
                    }
                    let updated = project
                        .without_binary_ref(binary.name())
                        .with_project_ref(target);
                    graph = graph.add_or_update_project(updated);
                }
            }
            _ => warnings.push(OptimizeWarning::AmbiguousBinaryPromotion {
                binary: binary.name().clone(),
                candidates,
            }),
        }
    }
    graph
}

/// Pass 4: a package contributing an assembly that matches exactly one
/// project's output becomes a direct reference to that project in every
/// referrer. Same ambiguity rule as pass 3.
pub fn promote_package_to_project(
    anthology: &Anthology,
    source: &dyn AssemblySource,
    warnings: &mut Vec<OptimizeWarning>,
) -> Anthology {
    let mut graph = anthology.clone();
    for package in anthology.packages() {
        let Some(assemblies) = source.assemblies(package.name()) else {
            continue;
        };

        let candidates: Vec<(ProjectId, String)> = graph
            .projects()
            .iter()
            .filter(|p| assemblies.contains(p.assembly()))
            .map(|p| (p.id(), p.path().to_string()))
            .collect();

        match candidates.len() {
            0 => {}
            1 => {
                let target = candidates[0].0;
                for project in graph.projects().to_vec() {
                    if !project.package_refs().contains(package.name()) {
                        continue;
                    }
                    if project.id() == target {
                        continue;
                    }
                    let updated = project
                        .without_package_ref(package.name())
                        .with_project_ref(target);
                    graph = graph.add_or_update_project(updated);
                }
            }
            _ => warnings.push(OptimizeWarning::AmbiguousPackagePromotion {
                package: package.name().clone(),
                candidates,
            }),
        }
    }
    graph
}

/// Pass 5: drop packages that are installed but contribute zero
/// assemblies, along with every reference to them. Uninstalled packages
/// are left alone.
pub fn remove_empty_packages(anthology: &Anthology, source: &dyn AssemblySource) -> Anthology {
    let empty: Vec<PackageName> = anthology
        .packages()
        .iter()
        .filter(|p| matches!(source.assemblies(p.name()), Some(a) if a.is_empty()))
        .map(|p| p.name().clone())
        .collect();
    if empty.is_empty() {
        return anthology.clone();
    }

    let mut graph = anthology.clone();
    for project in anthology.projects() {
        let mut updated = project.clone();
        for package in &empty {
            updated = updated.without_package_ref(package);
        }
        if updated != *project {
            graph = graph.add_or_update_project(updated);
        }
    }
    for package in &empty {
        graph = graph.remove_package(package);
    }
    graph
}

/// Pass 6: drop packages and binaries no project references anymore.
pub fn remove_unused(anthology: &Anthology) -> Anthology {
    let used_packages: BTreeSet<&PackageName> = anthology
        .projects()
        .iter()
        .flat_map(|p| p.package_refs())
        .collect();
    let used_binaries: BTreeSet<&AssemblyName> = anthology
        .projects()
        .iter()
        .flat_map(|p| p.binary_refs())
        .collect();

    let unused_packages: Vec<PackageName> = anthology
        .packages()
        .iter()
        .filter(|p| !used_packages.contains(p.name()))
        .map(|p| p.name().clone())
        .collect();
    let unused_binaries: Vec<AssemblyName> = anthology
        .binaries()
        .iter()
        .filter(|b| !used_binaries.contains(b.name()))
        .map(|b| b.name().clone())
        .collect();

    let mut graph = anthology.clone();
    for package in &unused_packages {
        graph = graph.remove_package(package);
    }
    for binary in &unused_binaries {
        graph = graph.remove_binary(binary);
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::anthology::{Binary, OutputKind, Package, Project};

    fn pid(n: u8) -> ProjectId {
        ProjectId::parse(&format!("00000000-0000-0000-0000-0000000000{n:02x}")).unwrap()
    }

    fn asm(name: &str) -> AssemblyName {
        AssemblyName::new(name).unwrap()
    }

    fn pkg(name: &str) -> PackageName {
        PackageName::new(name).unwrap()
    }

    fn project(n: u8, assembly: &str) -> Project {
        Project::new(
            pid(n),
            format!("repo/p{n}/p{n}.csproj"),
            asm(assembly),
            OutputKind::Library,
            "v4.5",
            vec![],
            vec![],
            vec![],
        )
    }

    fn project_with_refs(
        n: u8,
        assembly: &str,
        binaries: Vec<AssemblyName>,
        packages: Vec<PackageName>,
    ) -> Project {
        Project::new(
            pid(n),
            format!("repo/p{n}/p{n}.csproj"),
            asm(assembly),
            OutputKind::Library,
            "v4.5",
            vec![],
            binaries,
            packages,
        )
    }

    #[test]
    fn shadowed_binaries_are_removed() {
        let mut source = StaticAssemblySource::new();
        source.insert(pkg("Castle.Core"), vec![asm("Castle.Core")]);

        let graph = Anthology::new()
            .add_or_update_project(project_with_refs(
                1,
                "App",
                vec![asm("Castle.Core"), asm("Unrelated")],
                vec![pkg("Castle.Core")],
            ))
            .add_or_update_binary(Binary::new(asm("Castle.Core"), None))
            .add_or_update_binary(Binary::new(asm("Unrelated"), None))
            .add_or_update_package(Package::new(pkg("Castle.Core"), "3.3.3"));

        let result = remove_binaries_shadowed_by_packages(&graph, &source);
        let refs = result.projects()[0].binary_refs();
        assert_eq!(refs.len(), 1);
        assert!(refs[0].matches("Unrelated"));
    }

    #[test]
    fn shadowing_only_applies_to_the_referencing_project() {
        let mut source = StaticAssemblySource::new();
        source.insert(pkg("Castle.Core"), vec![asm("Castle.Core")]);

        // Project 2 references the binary but not the package
        let graph = Anthology::new()
            .add_or_update_project(project_with_refs(
                1,
                "App",
                vec![asm("Castle.Core")],
                vec![pkg("Castle.Core")],
            ))
            .add_or_update_project(project_with_refs(
                2,
                "Other",
                vec![asm("Castle.Core")],
                vec![],
            ))
            .add_or_update_package(Package::new(pkg("Castle.Core"), "3.3.3"));

        let result = remove_binaries_shadowed_by_packages(&graph, &source);
        assert!(result.project(pid(1)).unwrap().binary_refs().is_empty());
        assert_eq!(result.project(pid(2)).unwrap().binary_refs().len(), 1);
    }

    #[test]
    fn binary_rewritten_to_most_specific_package() {
        let mut source = StaticAssemblySource::new();
        source.insert(
            pkg("Big.Bundle"),
            vec![asm("Castle.Core"), asm("Other.One"), asm("Other.Two")],
        );
        source.insert(pkg("Castle.Core"), vec![asm("Castle.Core")]);

        let graph = Anthology::new()
            .add_or_update_project(project_with_refs(1, "App", vec![asm("Castle.Core")], vec![]))
            .add_or_update_binary(Binary::new(asm("Castle.Core"), None))
            .add_or_update_package(Package::new(pkg("Big.Bundle"), "1.0.0"))
            .add_or_update_package(Package::new(pkg("Castle.Core"), "3.3.3"));

        let result = prefer_package_over_binary(&graph, &source);
        let app = result.project(pid(1)).unwrap();
        assert!(app.binary_refs().is_empty());
        assert_eq!(app.package_refs(), &[pkg("Castle.Core")]);
    }

    #[test]
    fn package_preference_tie_breaks_on_name() {
        let mut source = StaticAssemblySource::new();
        source.insert(pkg("Zeta.Pack"), vec![asm("Shared")]);
        source.insert(pkg("Alpha.Pack"), vec![asm("Shared")]);

        let graph = Anthology::new()
            .add_or_update_project(project_with_refs(1, "App", vec![asm("Shared")], vec![]))
            .add_or_update_binary(Binary::new(asm("Shared"), None))
            .add_or_update_package(Package::new(pkg("Zeta.Pack"), "1.0.0"))
            .add_or_update_package(Package::new(pkg("Alpha.Pack"), "1.0.0"));

        let result = prefer_package_over_binary(&graph, &source);
        assert_eq!(
            result.project(pid(1)).unwrap().package_refs(),
            &[pkg("Alpha.Pack")]
        );
    }

    #[test]
    fn uninstalled_packages_cannot_win_binaries() {
        let source = StaticAssemblySource::new();
        let graph = Anthology::new()
            .add_or_update_project(project_with_refs(1, "App", vec![asm("Castle.Core")], vec![]))
            .add_or_update_package(Package::new(pkg("Castle.Core"), "3.3.3"));

        let result = prefer_package_over_binary(&graph, &source);
        assert_eq!(result.project(pid(1)).unwrap().binary_refs().len(), 1);
    }

    #[test]
    fn binary_promoted_to_unique_project() {
        let graph = Anthology::new()
            .add_or_update_project(project(1, "Acme.Core"))
            .add_or_update_project(project_with_refs(
                2,
                "Acme.App",
                vec![asm("Acme.Core")],
                vec![],
            ))
            .add_or_update_binary(Binary::new(asm("Acme.Core"), None));

        let mut warnings = Vec::new();
        let result = promote_binary_to_project(&graph, &mut warnings);

        assert!(warnings.is_empty());
        let app = result.project(pid(2)).unwrap();
        assert!(app.binary_refs().is_empty());
        assert_eq!(app.project_refs(), &[pid(1)]);
    }

    #[test]
    fn ambiguous_binary_promotion_warns_and_skips() {
        // Two distinct projects both produce assembly Foo
        let graph = Anthology::new()
            .add_or_update_project(project(1, "Foo"))
            .add_or_update_project(project(2, "Foo"))
            .add_or_update_project(project_with_refs(3, "App", vec![asm("Foo")], vec![]))
            .add_or_update_binary(Binary::new(asm("Foo"), None));

        let mut warnings = Vec::new();
        let result = promote_binary_to_project(&graph, &mut warnings);

        // Untouched reference, exactly one warning naming both candidates
        assert_eq!(result.project(pid(3)).unwrap().binary_refs().len(), 1);
        assert_eq!(warnings.len(), 1);
        match &warnings[0] {
            OptimizeWarning::AmbiguousBinaryPromotion { binary, candidates } => {
                assert!(binary.matches("Foo"));
                let ids: Vec<_> = candidates.iter().map(|(id, _)| *id).collect();
                assert_eq!(ids, vec![pid(1), pid(2)]);
            }
            other => panic!("unexpected warning: {other:?}"),
        }
    }

    #[test]
    fn self_matching_referrer_is_left_alone() {
        // The project referencing binary Foo is the one producing Foo
        let graph = Anthology::new()
            .add_or_update_project(project_with_refs(1, "Foo", vec![asm("Foo")], vec![]))
            .add_or_update_binary(Binary::new(asm("Foo"), None));

        let mut warnings = Vec::new();
        let result = promote_binary_to_project(&graph, &mut warnings);
        let p = result.project(pid(1)).unwrap();
        assert!(p.project_refs().is_empty());
        assert_eq!(p.binary_refs().len(), 1);
    }

    #[test]
    fn package_promoted_to_unique_project() {
        let mut source = StaticAssemblySource::new();
        source.insert(pkg("Acme.Core.Pkg"), vec![asm("Acme.Core")]);

        let graph = Anthology::new()
            .add_or_update_project(project(1, "Acme.Core"))
            .add_or_update_project(project_with_refs(
                2,
                "Acme.App",
                vec![],
                vec![pkg("Acme.Core.Pkg")],
            ))
            .add_or_update_package(Package::new(pkg("Acme.Core.Pkg"), "1.0.0"));

        let mut warnings = Vec::new();
        let result = promote_package_to_project(&graph, &source, &mut warnings);

        assert!(warnings.is_empty());
        let app = result.project(pid(2)).unwrap();
        assert!(app.package_refs().is_empty());
        assert_eq!(app.project_refs(), &[pid(1)]);
    }

    #[test]
    fn ambiguous_package_promotion_warns_and_skips() {
        let mut source = StaticAssemblySource::new();
        source.insert(pkg("Multi"), vec![asm("Foo"), asm("Bar")]);

        let graph = Anthology::new()
            .add_or_update_project(project(1, "Foo"))
            .add_or_update_project(project(2, "Bar"))
            .add_or_update_project(project_with_refs(3, "App", vec![], vec![pkg("Multi")]))
            .add_or_update_package(Package::new(pkg("Multi"), "1.0.0"));

        let mut warnings = Vec::new();
        let result = promote_package_to_project(&graph, &source, &mut warnings);

        assert_eq!(result.project(pid(3)).unwrap().package_refs().len(), 1);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            OptimizeWarning::AmbiguousPackagePromotion { .. }
        ));
    }

    #[test]
    fn empty_packages_are_dropped_with_their_references() {
        let mut source = StaticAssemblySource::new();
        source.insert(pkg("Empty.Pkg"), vec![]);
        source.insert(pkg("Real.Pkg"), vec![asm("Real")]);

        let graph = Anthology::new()
            .add_or_update_project(project_with_refs(
                1,
                "App",
                vec![],
                vec![pkg("Empty.Pkg"), pkg("Real.Pkg")],
            ))
            .add_or_update_package(Package::new(pkg("Empty.Pkg"), "1.0.0"))
            .add_or_update_package(Package::new(pkg("Real.Pkg"), "1.0.0"));

        let result = remove_empty_packages(&graph, &source);
        assert!(result.package(&pkg("Empty.Pkg")).is_none());
        assert!(result.package(&pkg("Real.Pkg")).is_some());
        assert_eq!(result.project(pid(1)).unwrap().package_refs(), &[pkg("Real.Pkg")]);
    }

    #[test]
    fn uninstalled_packages_are_not_treated_as_empty() {
        let source = StaticAssemblySource::new();
        let graph = Anthology::new()
            .add_or_update_project(project_with_refs(1, "App", vec![], vec![pkg("Pending")]))
            .add_or_update_package(Package::new(pkg("Pending"), "1.0.0"));

        let result = remove_empty_packages(&graph, &source);
        assert!(result.package(&pkg("Pending")).is_some());
    }

    #[test]
    fn unused_entities_are_dropped() {
        let graph = Anthology::new()
            .add_or_update_project(project_with_refs(
                1,
                "App",
                vec![asm("Used.Binary")],
                vec![pkg("Used.Pkg")],
            ))
            .add_or_update_binary(Binary::new(asm("Used.Binary"), None))
            .add_or_update_binary(Binary::new(asm("Orphan.Binary"), None))
            .add_or_update_package(Package::new(pkg("Used.Pkg"), "1.0.0"))
            .add_or_update_package(Package::new(pkg("Orphan.Pkg"), "1.0.0"));

        let result = remove_unused(&graph);
        assert!(result.binary(&asm("Orphan.Binary")).is_none());
        assert!(result.package(&pkg("Orphan.Pkg")).is_none());
        assert!(result.binary(&asm("Used.Binary")).is_some());
        assert!(result.package(&pkg("Used.Pkg")).is_some());
    }

    #[test]
    fn pipeline_is_idempotent() {
        let mut source = StaticAssemblySource::new();
        source.insert(pkg("Castle.Core"), vec![asm("Castle.Core")]);
        source.insert(pkg("Empty.Pkg"), vec![]);
        source.insert(pkg("Promotable"), vec![asm("Acme.Core")]);

        let graph = Anthology::new()
            .add_or_update_project(project(1, "Acme.Core"))
            .add_or_update_project(project_with_refs(
                2,
                "Acme.App",
                vec![asm("Castle.Core"), asm("Acme.Core")],
                vec![pkg("Empty.Pkg"), pkg("Promotable")],
            ))
            .add_or_update_binary(Binary::new(asm("Castle.Core"), None))
            .add_or_update_binary(Binary::new(asm("Acme.Core"), None))
            .add_or_update_package(Package::new(pkg("Castle.Core"), "3.3.3"))
            .add_or_update_package(Package::new(pkg("Empty.Pkg"), "1.0.0"))
            .add_or_update_package(Package::new(pkg("Promotable"), "1.0.0"));

        let once = optimize(&graph, &source);
        let twice = optimize(&once.anthology, &source);
        assert_eq!(once.anthology, twice.anthology);
        assert!(twice.warnings.is_empty());
    }

    #[test]
    fn pipeline_resolves_binary_through_package_then_promotion() {
        // App references binary Acme.Core; package Promotable contributes
        // Acme.Core; project 1 produces Acme.Core. Pass 2 turns the
        // binary into a package reference, pass 4 promotes the package
        // to a project reference, pass 6 sweeps the leftovers.
        let mut source = StaticAssemblySource::new();
        source.insert(pkg("Promotable"), vec![asm("Acme.Core")]);

        let graph = Anthology::new()
            .add_or_update_project(project(1, "Acme.Core"))
            .add_or_update_project(project_with_refs(
                2,
                "Acme.App",
                vec![asm("Acme.Core")],
                vec![],
            ))
            .add_or_update_binary(Binary::new(asm("Acme.Core"), None))
            .add_or_update_package(Package::new(pkg("Promotable"), "1.0.0"));

        let result = optimize(&graph, &source);
        let app = result.anthology.project(pid(2)).unwrap();
        assert_eq!(app.project_refs(), &[pid(1)]);
        assert!(app.binary_refs().is_empty());
        assert!(app.package_refs().is_empty());
        assert!(result.anthology.binaries().is_empty());
        assert!(result.anthology.packages().is_empty());
    }

    #[test]
    fn warning_messages_name_every_candidate() {
        let warning = OptimizeWarning::AmbiguousBinaryPromotion {
            binary: asm("Foo"),
            candidates: vec![
                (pid(1), "repo/p1/p1.csproj".into()),
                (pid(2), "repo/p2/p2.csproj".into()),
            ],
        };
        let text = warning.to_string();
        assert!(text.contains("Foo"));
        assert!(text.contains("repo/p1/p1.csproj"));
        assert!(text.contains("repo/p2/p2.csproj"));
    }
}

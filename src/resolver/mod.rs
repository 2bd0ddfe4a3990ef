//! Dependency population.
//!
//! The [`Populator`] walks a project's apps and libs depth-first, fetches
//! every remote dependency into `<root>/dependencies/<name>`, checks the
//! fetched project's version against the dependency's `release` constraint
//! and recurses into it. Each location is fetched and expanded at most once
//! per run; the [`ResolveMemo`] carried by the run's [`ResolveGraph`] is the
//! only state shared across branches.

pub mod errors;
pub mod graph;
pub mod memo;

use std::collections::HashMap;
use std::path::PathBuf;

pub use errors::PopulateError;
pub use graph::{DependencyEdge, ResolveGraph, ResolvedProject};
pub use memo::{ResolveMemo, Resolved};

use crate::builder::BuildEmitter;
use crate::core::location::{self, LocationKind};
use crate::core::workspace::MANIFEST_NAME;
use crate::core::{manifest, Dependency, Object, Project, VersionConstraint};
use crate::sources::{RemoteApi, SourceControl};
use crate::util::config::DEFAULT_JOBS;
use crate::util::fs::remove_dir_all_if_exists;

/// Recursively fetches and validates a project's dependency graph.
pub struct Populator<'a> {
    source_control: &'a dyn SourceControl,
    remote: &'a dyn RemoteApi,
    emitter: &'a dyn BuildEmitter,
    jobs: u32,
}

/// Mutable state of one populate run.
struct Run {
    graph: ResolveGraph,
    /// Locations currently being expanded, outermost first.
    stack: Vec<String>,
    /// Checkout directories claimed so far and the location each holds.
    checkouts: HashMap<PathBuf, String>,
}

impl<'a> Populator<'a> {
    pub fn new(
        source_control: &'a dyn SourceControl,
        remote: &'a dyn RemoteApi,
        emitter: &'a dyn BuildEmitter,
    ) -> Self {
        Populator {
            source_control,
            remote,
            emitter,
            jobs: DEFAULT_JOBS,
        }
    }

    /// Parallel jobs passed to clones.
    pub fn jobs(mut self, jobs: u32) -> Self {
        self.jobs = jobs;
        self
    }

    /// Populate `project` and everything it transitively depends on.
    pub fn populate(&self, project: &Project) -> Result<ResolveGraph, PopulateError> {
        tracing::info!("Populating project {}", project.name());

        let mut run = Run {
            graph: ResolveGraph::new(project),
            stack: Vec::new(),
            checkouts: HashMap::new(),
        };
        self.populate_project(project, "", &mut run)?;
        Ok(run.graph)
    }

    /// Like [`populate`](Self::populate), reporting failure as `false` with
    /// the cause logged.
    pub fn populate_ok(&self, project: &Project) -> bool {
        match self.populate(project) {
            Ok(_) => true,
            Err(e) => {
                tracing::error!("{:#}", anyhow::Error::new(e));
                false
            }
        }
    }

    fn populate_project(
        &self,
        project: &Project,
        location: &str,
        run: &mut Run,
    ) -> Result<(), PopulateError> {
        let deps_dir = project.dependencies_dir();
        std::fs::create_dir_all(&deps_dir).map_err(|e| PopulateError::Io {
            message: format!("failed to create directory {}: {}", deps_dir.display(), e),
        })?;

        tracing::debug!("populating project {}", project.name());

        for object in project.buildable() {
            for dep in object.dependencies() {
                self.populate_dependency(project, location, object, dep, run)?;
            }
        }

        self.emitter
            .emit(project, run.graph.memo())
            .map_err(|e| PopulateError::Emit {
                project: project.name().to_string(),
                message: format!("{:#}", e),
            })
    }

    fn populate_dependency(
        &self,
        project: &Project,
        location: &str,
        object: &Object,
        dep: &Dependency,
        run: &mut Run,
    ) -> Result<(), PopulateError> {
        let dep_location = dep.location();
        tracing::debug!(
            "populating dependency {} from {}",
            dep.name(),
            if dep.is_sibling() { "local" } else { dep_location }
        );

        if dep.is_sibling() {
            return Ok(());
        }

        if run.stack.iter().any(|l| l == dep_location) {
            let mut path = run.stack.clone();
            path.push(dep_location.to_string());
            return Err(PopulateError::Cycle { path });
        }

        if run.graph.memo().contains(dep_location) {
            run.graph
                .add_edge(location, dep_location, object.name(), dep.name());
            return Ok(());
        }

        if location::classify(dep_location) != LocationKind::GitHubShorthand {
            return Err(PopulateError::Unresolvable {
                dependency: dep.name().to_string(),
                location: dep_location.to_string(),
            });
        }
        let (org, repo) = (location::org(dep_location), location::repo(dep_location));

        let dest = project.dependencies_dir().join(dep.name());
        if let Some(claimed) = run.checkouts.get(&dest) {
            return Err(PopulateError::Fetch {
                location: dep_location.to_string(),
                message: format!(
                    "{} already holds `{}`; give dependency `{}` a distinct name",
                    dest.display(),
                    claimed,
                    dep.name()
                ),
            });
        }
        run.checkouts.insert(dest.clone(), dep_location.to_string());

        let fetched = if dest.exists() {
            self.source_control.pull(&dest)
        } else {
            let reference = if dep.tag().is_empty() {
                self.remote.default_branch(org, repo)
            } else {
                Ok(dep.tag().to_string())
            };
            reference.and_then(|reference| {
                tracing::debug!("Cloning {} with branch {}", dep_location, reference);
                let cloned = self
                    .source_control
                    .clone_github(org, repo, &reference, self.jobs, &dest);
                // A partial checkout would be pulled instead of cloned next time.
                if cloned.is_err() {
                    if let Err(e) = remove_dir_all_if_exists(&dest) {
                        tracing::warn!("{:#}", e);
                    }
                }
                cloned
            })
        };
        fetched.map_err(|e| PopulateError::Fetch {
            location: dep_location.to_string(),
            message: format!("{:#}", e),
        })?;

        tracing::info!("Grabbing dependency location {}", dep_location);
        let nested = manifest::load(&dest.join(MANIFEST_NAME)).map_err(|e| {
            PopulateError::Manifest {
                location: dep_location.to_string(),
                source: Box::new(e),
            }
        })?;

        run.graph
            .memo_mut()
            .insert(dep_location, nested.name(), nested.root());
        run.graph.add_project(dep_location, &nested);
        run.graph
            .add_edge(location, dep_location, object.name(), dep.name());

        if !dep.release().is_empty() {
            let constraint =
                VersionConstraint::parse(dep.release()).map_err(|source| PopulateError::Constraint {
                    dependency: dep.name().to_string(),
                    source,
                })?;
            if !constraint.test(nested.version()) {
                return Err(PopulateError::VersionMismatch {
                    dependency: dep.name().to_string(),
                    project: nested.name().to_string(),
                    found: nested.version().to_string(),
                    constraint: dep.release().to_string(),
                });
            }
        }

        run.stack.push(dep_location.to_string());
        let result = self.populate_project(&nested, dep_location, run);
        run.stack.pop();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::*;
    use tempfile::TempDir;

    struct Setup {
        _tmp: TempDir,
        project: Project,
    }

    fn setup(manifest: &str) -> Setup {
        let tmp = TempDir::new().unwrap();
        let path = write_manifest(tmp.path(), manifest);
        let project = manifest::load(&path).unwrap();
        Setup { _tmp: tmp, project }
    }

    #[test]
    fn test_populate_fetches_and_emits() {
        let s = setup(FULL_MANIFEST);
        let git = MockSourceControl::new().with_repo("larryk85/dune", &library_manifest("dune", "2.1.0"));
        let api = MockRemoteApi::new().with_default_branch("larryk85/dune", "develop");
        let emitter = RecordingEmitter::new();

        let graph = Populator::new(&git, &api, &emitter).populate(&s.project).unwrap();

        assert_eq!(
            git.calls()[0],
            SourceCall::Clone {
                repo: "larryk85/dune".to_string(),
                reference: "develop".to_string(),
                dest: s.project.dependencies_dir().join("dune"),
            }
        );
        // Depth-first: the dependency is emitted before its declarer.
        assert_eq!(emitter.emitted(), vec!["dune", "hello"]);
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.memo().get("larryk85/dune").unwrap().name, "dune");
        assert_eq!(graph.deps("")[0].1.object, "greeter");
    }

    #[test]
    fn test_tag_skips_default_branch_query() {
        let s = setup(&diamond_root_manifest(&[]).replace(
            "[[libraries]]",
            "[[apps.depends]]\nfrom = \"o/dep\"\ntag = \"v1.0\"\n\n[[libraries]]",
        ));
        let git = MockSourceControl::new().with_repo("o/dep", &library_manifest("dep", "1.0.0"));
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();

        Populator::new(&git, &api, &emitter).populate(&s.project).unwrap();
        assert!(api.queries().is_empty());
        assert!(matches!(
            &git.calls()[0],
            SourceCall::Clone { reference, .. } if reference == "v1.0"
        ));
    }

    #[test]
    fn test_diamond_dependency_fetched_once() {
        let s = setup(&diamond_root_manifest(&["o/b", "o/c"]));
        let git = MockSourceControl::new()
            .with_repo("o/b", &library_manifest_with_deps("b", "1.0.0", &["o/d"]))
            .with_repo("o/c", &library_manifest_with_deps("c", "1.0.0", &["o/d"]))
            .with_repo("o/d", &library_manifest("d", "1.0.0"));
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();

        let graph = Populator::new(&git, &api, &emitter).populate(&s.project).unwrap();

        // b, c and d, each once, although app and lib both name b and c.
        assert_eq!(git.clones(), 3);
        assert_eq!(git.pulls(), 0);
        assert_eq!(emitter.emitted(), vec!["d", "b", "c", "root"]);
        assert_eq!(graph.len(), 4);
        assert_eq!(graph.dependents("o/d").len(), 2);
    }

    #[test]
    fn test_rerun_pulls_instead_of_cloning() {
        let s = setup(FULL_MANIFEST);
        let git = MockSourceControl::new().with_repo("larryk85/dune", &library_manifest("dune", "2.1.0"));
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();
        let populator = Populator::new(&git, &api, &emitter);

        assert!(populator.populate_ok(&s.project));
        git.clear_calls();
        assert!(populator.populate_ok(&s.project));

        assert_eq!(git.clones(), 0);
        assert_eq!(git.pulls(), 1);
    }

    #[test]
    fn test_version_mismatch() {
        let s = setup(&diamond_root_manifest(&[]).replace(
            "[[libraries]]",
            "[[apps.depends]]\nfrom = \"o/old\"\nrelease = \">=2.0\"\n\n[[libraries]]",
        ));
        let git = MockSourceControl::new().with_repo("o/old", &library_manifest("old", "1.9.0"));
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();

        let err = Populator::new(&git, &api, &emitter)
            .populate(&s.project)
            .unwrap_err();
        match err {
            PopulateError::VersionMismatch { found, constraint, .. } => {
                assert_eq!(found, "1.9.0");
                assert_eq!(constraint, ">=2.0");
            }
            other => panic!("unexpected error: {}", other),
        }
        // The fetched directory stays in place.
        assert!(s.project.dependencies_dir().join("old").is_dir());
        assert!(emitter.emitted().is_empty());
    }

    #[test]
    fn test_non_shorthand_rejected_before_network() {
        let s = setup(
            r#"project = "p"
version = "1.0.0"

[[apps]]
name = "a"

[[apps.depends]]
name = "z"
from = "https://example.com/z.tar.gz"
"#,
        );
        let git = MockSourceControl::new();
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();

        let err = Populator::new(&git, &api, &emitter)
            .populate(&s.project)
            .unwrap_err();
        assert!(matches!(err, PopulateError::Unresolvable { .. }));
        assert!(git.calls().is_empty());
        assert!(api.queries().is_empty());
    }

    #[test]
    fn test_fetch_failure() {
        let s = setup(FULL_MANIFEST);
        let git = MockSourceControl::new().failing("larryk85/dune");
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();

        let populator = Populator::new(&git, &api, &emitter);
        let err = populator.populate(&s.project).unwrap_err();
        assert!(matches!(err, PopulateError::Fetch { ref location, .. } if location == "larryk85/dune"));
        assert!(!s.project.dependencies_dir().join("dune").exists());

        // Still a clone, not a pull, on the next attempt.
        assert!(!populator.populate_ok(&s.project));
        assert_eq!(git.clones(), 2);
        assert_eq!(git.pulls(), 0);
    }

    #[test]
    fn test_nested_manifest_error() {
        let s = setup(FULL_MANIFEST);
        let git = MockSourceControl::new().with_repo("larryk85/dune", "project = \"dune\"\nbogus = 1\n");
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();

        let err = Populator::new(&git, &api, &emitter)
            .populate(&s.project)
            .unwrap_err();
        assert!(matches!(err, PopulateError::Manifest { .. }));
    }

    #[test]
    fn test_cycle_detected() {
        let s = setup(&diamond_root_manifest(&["o/a"]));
        let git = MockSourceControl::new()
            .with_repo("o/a", &library_manifest_with_deps("a", "1.0.0", &["o/b"]))
            .with_repo("o/b", &library_manifest_with_deps("b", "1.0.0", &["o/a"]));
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();

        let err = Populator::new(&git, &api, &emitter)
            .populate(&s.project)
            .unwrap_err();
        match err {
            PopulateError::Cycle { path } => assert_eq!(path, vec!["o/a", "o/b", "o/a"]),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_same_name_from_two_locations() {
        let mut manifest = diamond_root_manifest(&[]).replace(
            "[[libraries]]",
            "[[apps.depends]]\nfrom = \"alpha/util\"\n\n[[libraries]]",
        );
        manifest.push_str("\n[[libraries.depends]]\nfrom = \"beta/util\"\n");
        let s = setup(&manifest);
        let git = MockSourceControl::new()
            .with_repo("alpha/util", &library_manifest("alpha_util", "1.0.0"))
            .with_repo("beta/util", &library_manifest("beta_util", "5.0.0"));
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();

        let err = Populator::new(&git, &api, &emitter)
            .populate(&s.project)
            .unwrap_err();
        match err {
            PopulateError::Fetch { location, message } => {
                assert_eq!(location, "beta/util");
                assert!(message.contains("alpha/util"), "{}", message);
            }
            other => panic!("unexpected error: {}", other),
        }
        // beta/util never lands in alpha/util's checkout.
        assert_eq!(git.clones(), 1);
        assert_eq!(git.pulls(), 0);
    }

    #[test]
    fn test_renamed_dependency_gets_own_checkout() {
        let mut manifest = diamond_root_manifest(&[]).replace(
            "[[libraries]]",
            "[[apps.depends]]\nfrom = \"alpha/util\"\n\n[[libraries]]",
        );
        manifest.push_str("\n[[libraries.depends]]\nname = \"beta_util\"\nfrom = \"beta/util\"\n");
        let s = setup(&manifest);
        let git = MockSourceControl::new()
            .with_repo("alpha/util", &library_manifest("alpha_util", "1.0.0"))
            .with_repo("beta/util", &library_manifest("beta_util", "5.0.0"));
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new();

        let graph = Populator::new(&git, &api, &emitter).populate(&s.project).unwrap();
        assert_eq!(git.clones(), 2);
        assert_eq!(graph.memo().get("alpha/util").unwrap().name, "alpha_util");
        assert_eq!(graph.memo().get("beta/util").unwrap().name, "beta_util");
        assert_eq!(
            graph.memo().get("beta/util").unwrap().root,
            s.project.dependencies_dir().join("beta_util")
        );
    }

    #[test]
    fn test_emit_failure() {
        let s = setup(&diamond_root_manifest(&[]));
        let git = MockSourceControl::new();
        let api = MockRemoteApi::new();
        let emitter = RecordingEmitter::new().failing_for("root");

        let err = Populator::new(&git, &api, &emitter)
            .populate(&s.project)
            .unwrap_err();
        assert!(matches!(err, PopulateError::Emit { .. }));
    }
}

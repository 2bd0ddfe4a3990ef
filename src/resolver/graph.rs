//! ResolveGraph - the projects a populate run materialized.
//!
//! Nodes are projects keyed by the location they were fetched from (the
//! root project uses the empty location). An edge `a -> b` means some object
//! of `a` depends on `b`.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::{EdgeRef, Topo};

use crate::core::{Project, Version};
use crate::resolver::memo::ResolveMemo;

/// A project reached during population.
#[derive(Debug, Clone)]
pub struct ResolvedProject {
    pub location: String,
    pub name: String,
    pub version: Version,
    pub root: PathBuf,
}

/// The object-level reason for an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyEdge {
    pub object: String,
    pub dependency: String,
}

/// The resolved project graph plus the memo that produced it.
#[derive(Debug, Clone)]
pub struct ResolveGraph {
    graph: DiGraph<ResolvedProject, DependencyEdge>,
    by_location: HashMap<String, NodeIndex>,
    memo: ResolveMemo,
}

impl ResolveGraph {
    /// A graph holding only `root`.
    pub fn new(root: &Project) -> Self {
        let mut graph = ResolveGraph {
            graph: DiGraph::new(),
            by_location: HashMap::new(),
            memo: ResolveMemo::new(root.name(), root.root()),
        };
        graph.add_project("", root);
        graph
    }

    pub fn memo(&self) -> &ResolveMemo {
        &self.memo
    }

    pub(crate) fn memo_mut(&mut self) -> &mut ResolveMemo {
        &mut self.memo
    }

    /// Add the project fetched from `location`. Adding a location twice is a
    /// no-op.
    pub fn add_project(&mut self, location: &str, project: &Project) {
        if self.by_location.contains_key(location) {
            return;
        }
        let node = self.graph.add_node(ResolvedProject {
            location: location.to_string(),
            name: project.name().to_string(),
            version: project.version().clone(),
            root: project.root().to_path_buf(),
        });
        self.by_location.insert(location.to_string(), node);
    }

    /// Record that `object` in the project at `from` depends on `to`.
    pub fn add_edge(&mut self, from: &str, to: &str, object: &str, dependency: &str) {
        if let (Some(&from_node), Some(&to_node)) =
            (self.by_location.get(from), self.by_location.get(to))
        {
            let edge = DependencyEdge {
                object: object.to_string(),
                dependency: dependency.to_string(),
            };
            let exists = self
                .graph
                .edges_connecting(from_node, to_node)
                .any(|e| *e.weight() == edge);
            if !exists {
                self.graph.add_edge(from_node, to_node, edge);
            }
        }
    }

    pub fn project(&self, location: &str) -> Option<&ResolvedProject> {
        self.by_location.get(location).map(|&n| &self.graph[n])
    }

    pub fn root(&self) -> Option<&ResolvedProject> {
        self.project("")
    }

    pub fn contains(&self, location: &str) -> bool {
        self.by_location.contains_key(location)
    }

    /// Iterate over all projects in insertion order.
    pub fn projects(&self) -> impl Iterator<Item = &ResolvedProject> {
        self.graph.node_weights()
    }

    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Direct dependencies of the project at `location`, with the edge that
    /// introduced each.
    pub fn deps(&self, location: &str) -> Vec<(&ResolvedProject, &DependencyEdge)> {
        let Some(&node) = self.by_location.get(location) else {
            return Vec::new();
        };
        let mut deps: Vec<_> = self
            .graph
            .edges(node)
            .map(|e| (&self.graph[e.target()], e.weight()))
            .collect();
        deps.sort_by(|a, b| (&a.1.object, &a.1.dependency).cmp(&(&b.1.object, &b.1.dependency)));
        deps
    }

    /// Projects that depend on the project at `location`.
    pub fn dependents(&self, location: &str) -> Vec<&ResolvedProject> {
        match self.by_location.get(location) {
            Some(&node) => self
                .graph
                .neighbors_directed(node, petgraph::Direction::Incoming)
                .map(|n| &self.graph[n])
                .collect(),
            None => Vec::new(),
        }
    }

    /// Every project reachable from `location`, excluding itself.
    pub fn transitive_deps(&self, location: &str) -> HashSet<String> {
        let mut visited = HashSet::new();
        let mut stack = vec![location.to_string()];

        while let Some(current) = stack.pop() {
            if visited.insert(current.clone()) {
                for (dep, _) in self.deps(&current) {
                    stack.push(dep.location.clone());
                }
            }
        }

        visited.remove(location);
        visited
    }

    /// Projects with dependencies before dependents.
    pub fn topological_order(&self) -> Vec<&ResolvedProject> {
        let mut topo = Topo::new(&self.graph);
        let mut order = Vec::new();
        while let Some(node) = topo.next(&self.graph) {
            order.push(&self.graph[node]);
        }
        // Edges point from dependent to dependency.
        order.reverse();
        order
    }

    /// Root directory of the project at `location`.
    pub fn root_of(&self, location: &str) -> Option<&Path> {
        self.project(location).map(|p| p.root.as_path())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn project(name: &str, version: &str, root: &str) -> Project {
        Project::new(name, Version::new(version)).with_path(Path::new(root).join("project.toml"))
    }

    #[test]
    fn test_graph_basic() {
        let root = project("hello", "1.0.0", "/w/hello");
        let mut graph = ResolveGraph::new(&root);
        graph.add_project("larryk85/dune", &project("dune", "2.1.0", "/w/hello/dependencies/dune"));
        graph.add_edge("", "larryk85/dune", "greeter", "dune");
        graph.add_edge("", "larryk85/dune", "greeter", "dune");

        assert_eq!(graph.len(), 2);
        assert_eq!(graph.root().unwrap().name, "hello");
        let deps = graph.deps("");
        assert_eq!(deps.len(), 1);
        assert_eq!(deps[0].0.name, "dune");
        assert_eq!(deps[0].1.object, "greeter");
        assert_eq!(graph.dependents("larryk85/dune")[0].name, "hello");
        assert_eq!(
            graph.root_of("larryk85/dune"),
            Some(Path::new("/w/hello/dependencies/dune"))
        );
    }

    #[test]
    fn test_topological_order() {
        let mut graph = ResolveGraph::new(&project("a", "1.0.0", "/w/a"));
        graph.add_project("o/b", &project("b", "1.0.0", "/w/a/dependencies/b"));
        graph.add_project("o/c", &project("c", "1.0.0", "/w/a/dependencies/b/dependencies/c"));
        graph.add_edge("", "o/b", "app", "b");
        graph.add_edge("o/b", "o/c", "lib", "c");

        let order: Vec<_> = graph.topological_order().iter().map(|p| p.name.clone()).collect();
        assert_eq!(order, vec!["c", "b", "a"]);

        let all = graph.transitive_deps("");
        assert!(all.contains("o/b") && all.contains("o/c"));
    }
}

//! The per-run dedup memo.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::Dependency;

/// Where a location was materialized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    /// Name of the project found at the location.
    pub name: String,
    /// Root directory of that project on disk.
    pub root: PathBuf,
}

/// Maps each dependency location to the project it resolved to.
///
/// One memo lives for exactly one populate run. It is seeded with the root
/// project under the empty location so sibling dependencies resolve to it.
#[derive(Debug, Clone, Default)]
pub struct ResolveMemo {
    entries: BTreeMap<String, Resolved>,
}

impl ResolveMemo {
    pub fn new(root_name: impl Into<String>, root_dir: impl Into<PathBuf>) -> Self {
        let mut memo = ResolveMemo::default();
        memo.entries.insert(
            String::new(),
            Resolved {
                name: root_name.into(),
                root: root_dir.into(),
            },
        );
        memo
    }

    pub fn contains(&self, location: &str) -> bool {
        self.entries.contains_key(location)
    }

    pub fn get(&self, location: &str) -> Option<&Resolved> {
        self.entries.get(location)
    }

    /// Record `location`. A location already mapped keeps its first entry;
    /// returns false if that entry names a different project.
    pub fn insert(&mut self, location: &str, name: &str, root: &Path) -> bool {
        match self.entries.get(location) {
            Some(existing) => existing.name == name,
            None => {
                self.entries.insert(
                    location.to_string(),
                    Resolved {
                        name: name.to_string(),
                        root: root.to_path_buf(),
                    },
                );
                true
            }
        }
    }

    /// Build target name for `dep`: `<resolved project>-<dependency name>`.
    pub fn target_name(&self, dep: &Dependency) -> Option<String> {
        self.get(dep.location())
            .map(|resolved| format!("{}-{}", resolved.name, dep.name()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fetched locations, excluding the root's empty-location entry.
    pub fn fetched(&self) -> impl Iterator<Item = (&str, &Resolved)> {
        self.entries
            .iter()
            .filter(|(location, _)| !location.is_empty())
            .map(|(location, resolved)| (location.as_str(), resolved))
    }
}

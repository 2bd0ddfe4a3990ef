//! Test utilities and mocks for trellis unit tests.
//!
//! The populator only reaches the outside world through [`SourceControl`],
//! [`RemoteApi`] and [`BuildEmitter`]; the mocks here stand in for all three
//! so population can be exercised against a temporary directory.
//!
//! # Example
//!
//! ```rust,ignore
//! use trellis::test_support::{MockSourceControl, MockRemoteApi, RecordingEmitter};
//!
//! #[test]
//! fn test_example() {
//!     let git = MockSourceControl::new().with_repo("larryk85/dune", &library_manifest("dune", "2.1.0"));
//!     let api = MockRemoteApi::new();
//!     let emitter = RecordingEmitter::new();
//!     // Populator::new(&git, &api, &emitter).populate(&project)
//! }
//! ```

pub mod fixtures;

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::{bail, Result};

use crate::builder::BuildEmitter;
use crate::core::location::GITHUB_URL_PREFIX;
use crate::core::workspace::MANIFEST_NAME;
use crate::core::Project;
use crate::resolver::ResolveMemo;
use crate::sources::{RemoteApi, SourceControl};

// Re-export fixtures for convenience
pub use fixtures::*;

/// A call made against [`MockSourceControl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceCall {
    Clone {
        repo: String,
        reference: String,
        dest: PathBuf,
    },
    Pull {
        dest: PathBuf,
    },
}

/// Mock source control serving manifests from memory.
///
/// A clone of a known `org/repo` creates the destination directory and
/// writes the registered manifest into it.
#[derive(Debug, Clone, Default)]
pub struct MockSourceControl {
    repos: HashMap<String, String>,
    failing: HashSet<String>,
    calls: Arc<Mutex<Vec<SourceCall>>>,
}

impl MockSourceControl {
    pub fn new() -> Self {
        MockSourceControl::default()
    }

    /// Serve `manifest` for `org/repo`.
    pub fn with_repo(mut self, repo: &str, manifest: &str) -> Self {
        self.repos.insert(repo.to_string(), manifest.to_string());
        self
    }

    /// Make every clone of `org/repo` fail after creating the destination.
    pub fn failing(mut self, repo: &str) -> Self {
        self.failing.insert(repo.to_string());
        self
    }

    /// All calls so far, in order.
    pub fn calls(&self) -> Vec<SourceCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clones(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SourceCall::Clone { .. }))
            .count()
    }

    pub fn pulls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, SourceCall::Pull { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

impl SourceControl for MockSourceControl {
    fn clone_url(&self, url: &str, reference: &str, _jobs: u32, dest: &Path) -> Result<()> {
        let repo = url
            .strip_prefix(GITHUB_URL_PREFIX)
            .unwrap_or(url)
            .trim_end_matches(".git")
            .to_string();

        self.calls.lock().unwrap().push(SourceCall::Clone {
            repo: repo.clone(),
            reference: reference.to_string(),
            dest: dest.to_path_buf(),
        });

        if self.failing.contains(&repo) {
            // Leave a partial checkout behind, as an interrupted clone would.
            std::fs::create_dir_all(dest)?;
            bail!("mock clone of `{}` failed", repo);
        }
        let Some(manifest) = self.repos.get(&repo) else {
            bail!("repository `{}` not found", repo);
        };
        std::fs::create_dir_all(dest)?;
        std::fs::write(dest.join(MANIFEST_NAME), manifest)?;
        Ok(())
    }

    fn pull(&self, dest: &Path) -> Result<()> {
        self.calls.lock().unwrap().push(SourceCall::Pull {
            dest: dest.to_path_buf(),
        });
        if !dest.is_dir() {
            bail!("`{}` is not a checkout", dest.display());
        }
        Ok(())
    }
}

/// Mock remote API with configurable default branches.
#[derive(Debug, Clone, Default)]
pub struct MockRemoteApi {
    branches: HashMap<String, String>,
    unreachable: HashSet<String>,
    queries: Arc<Mutex<Vec<String>>>,
}

impl MockRemoteApi {
    pub fn new() -> Self {
        MockRemoteApi::default()
    }

    /// Report `branch` as the default branch of `org/repo` (otherwise `main`).
    pub fn with_default_branch(mut self, repo: &str, branch: &str) -> Self {
        self.branches.insert(repo.to_string(), branch.to_string());
        self
    }

    pub fn unreachable(mut self, repo: &str) -> Self {
        self.unreachable.insert(repo.to_string());
        self
    }

    /// Repositories queried for their default branch.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

impl RemoteApi for MockRemoteApi {
    fn default_branch(&self, org: &str, repo: &str) -> Result<String> {
        let key = format!("{}/{}", org, repo);
        self.queries.lock().unwrap().push(key.clone());
        if self.unreachable.contains(&key) {
            bail!("repository not found");
        }
        Ok(self
            .branches
            .get(&key)
            .cloned()
            .unwrap_or_else(|| "main".to_string()))
    }

    fn is_reachable(&self, location: &str) -> bool {
        !self.unreachable.contains(location)
    }
}

/// Build emitter that records which projects it was asked to emit.
#[derive(Debug, Clone, Default)]
pub struct RecordingEmitter {
    emitted: Arc<Mutex<Vec<String>>>,
    fail_for: Option<String>,
}

impl RecordingEmitter {
    pub fn new() -> Self {
        RecordingEmitter::default()
    }

    /// Fail when asked to emit the project named `name`.
    pub fn failing_for(mut self, name: &str) -> Self {
        self.fail_for = Some(name.to_string());
        self
    }

    /// Project names in emission order.
    pub fn emitted(&self) -> Vec<String> {
        self.emitted.lock().unwrap().clone()
    }
}

impl BuildEmitter for RecordingEmitter {
    fn emit(&self, project: &Project, _memo: &ResolveMemo) -> Result<()> {
        if self.fail_for.as_deref() == Some(project.name()) {
            bail!("mock emission failure");
        }
        self.emitted
            .lock()
            .unwrap()
            .push(project.name().to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_mock_clone_writes_manifest() {
        let tmp = TempDir::new().unwrap();
        let git = MockSourceControl::new().with_repo("larryk85/dune", "project = \"dune\"\n");
        let dest = tmp.path().join("dune");

        git.clone_github("larryk85", "dune", "main", 4, &dest).unwrap();
        assert!(dest.join(MANIFEST_NAME).is_file());
        assert_eq!(git.clones(), 1);

        git.pull(&dest).unwrap();
        assert_eq!(git.pulls(), 1);
    }

    #[test]
    fn test_mock_clone_unknown_repo() {
        let tmp = TempDir::new().unwrap();
        let git = MockSourceControl::new();
        assert!(git
            .clone_github("nobody", "nothing", "main", 1, tmp.path())
            .is_err());
    }

    #[test]
    fn test_mock_remote_api() {
        let api = MockRemoteApi::new().with_default_branch("o/r", "develop");
        assert_eq!(api.default_branch("o", "r").unwrap(), "develop");
        assert_eq!(api.default_branch("o", "x").unwrap(), "main");
        assert_eq!(api.queries(), vec!["o/r", "o/x"]);
    }
}

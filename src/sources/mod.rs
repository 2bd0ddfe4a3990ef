//! Dependency sources.
//!
//! The populator talks to the outside world through two capabilities:
//! [`SourceControl`] materializes a repository on disk and [`RemoteApi`]
//! answers questions about a hosted repository without cloning it.

use std::path::Path;

use anyhow::Result;

use crate::util::config::{Config, GitBackend};

pub mod git;
pub mod github;
pub mod libgit;

pub use git::GitCli;
pub use github::GitHubApi;
pub use libgit::LibGit;

/// Clone and update repositories.
pub trait SourceControl {
    /// Shallow, single-branch clone of a GitHub repository at `reference`.
    fn clone_github(
        &self,
        org: &str,
        repo: &str,
        reference: &str,
        jobs: u32,
        dest: &Path,
    ) -> Result<()> {
        self.clone_url(&github_clone_url(org, repo), reference, jobs, dest)
    }

    /// Shallow, single-branch clone of an arbitrary repository URL.
    fn clone_url(&self, url: &str, reference: &str, jobs: u32, dest: &Path) -> Result<()>;

    /// Update an existing checkout in place.
    fn pull(&self, dest: &Path) -> Result<()>;
}

/// Query a remote repository host.
pub trait RemoteApi {
    /// Name of the repository's default branch.
    fn default_branch(&self, org: &str, repo: &str) -> Result<String>;

    /// Whether `location` (a URL or `org/repo`) names an existing repository.
    fn is_reachable(&self, location: &str) -> bool;
}

/// HTTPS clone URL for a GitHub repository.
pub fn github_clone_url(org: &str, repo: &str) -> String {
    format!("{}{}/{}.git", crate::core::location::GITHUB_URL_PREFIX, org, repo)
}

/// Source control backend selected by configuration.
pub fn source_control(config: &Config) -> Result<Box<dyn SourceControl>> {
    match config.git_backend() {
        GitBackend::Cli => Ok(Box::new(GitCli::new(config.git_executable()?))),
        GitBackend::LibGit2 => Ok(Box::new(LibGit::new())),
    }
}

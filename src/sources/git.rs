//! Git source control through the `git` executable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::sources::SourceControl;
use crate::util::fs::ensure_dir;
use crate::util::process::ProcessBuilder;

/// Runs `git` as a subprocess for every operation.
#[derive(Debug, Clone)]
pub struct GitCli {
    git: PathBuf,
}

impl GitCli {
    pub fn new(git: impl Into<PathBuf>) -> Self {
        GitCli { git: git.into() }
    }

    fn git(&self) -> ProcessBuilder {
        ProcessBuilder::new(&self.git)
    }

    /// The full clone command line, without running it.
    pub fn clone_command(&self, url: &str, reference: &str, jobs: u32, dest: &Path) -> ProcessBuilder {
        self.git()
            .args(["clone", "--depth", "1", "--single-branch", "--branch"])
            .arg(reference)
            .arg("--jobs")
            .arg(jobs.max(1).to_string())
            .arg(url)
            .arg(dest)
    }

    fn update_submodules(&self, dest: &Path) -> Result<()> {
        self.git()
            .cwd(dest)
            .args(["submodule", "sync", "--recursive"])
            .exec_and_check()?;
        self.git()
            .cwd(dest)
            .args(["submodule", "update", "--init", "--recursive"])
            .exec_and_check()?;
        Ok(())
    }
}

impl SourceControl for GitCli {
    fn clone_url(&self, url: &str, reference: &str, jobs: u32, dest: &Path) -> Result<()> {
        tracing::info!("Cloning {} ({}) into {}", url, reference, dest.display());

        if let Some(parent) = dest.parent() {
            ensure_dir(parent)?;
        }

        self.clone_command(url, reference, jobs, dest)
            .exec_and_check()
            .with_context(|| format!("failed to clone {}", url))?;

        self.update_submodules(dest)
            .with_context(|| format!("failed to update submodules of {}", dest.display()))
    }

    fn pull(&self, dest: &Path) -> Result<()> {
        tracing::info!("Updating {}", dest.display());

        self.git()
            .arg("-C")
            .arg(dest)
            .arg("pull")
            .exec_and_check()
            .with_context(|| format!("failed to pull {}", dest.display()))?;

        self.update_submodules(dest)
            .with_context(|| format!("failed to update submodules of {}", dest.display()))
    }
}

//! Workspace - the on-disk layout of a project.
//!
//! A project root holds `project.toml` and the fixed directories `apps`,
//! `libs`, `tests` and `include`, plus `dependencies` for fetched projects and
//! `build` for generated build files.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;

use crate::core::manifest;
use crate::core::project::Project;

/// Manifest file name.
pub const MANIFEST_NAME: &str = "project.toml";

/// Directory fetched dependencies are cloned into.
pub const DEPENDENCIES_DIR: &str = "dependencies";

/// Directory generated build files are written to.
pub const BUILD_DIR: &str = "build";

/// Source directories every project has.
pub const PROJECT_DIRS: &[&str] = &["apps", "include", "libs", "tests"];

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("could not find `project.toml` in `{}` or any parent directory", .dir.display())]
    NotFound { dir: PathBuf },
}

/// Walk up from `start` to the first directory containing a manifest.
///
/// If `start` names a file it is returned as is when it exists.
pub fn find_manifest(start: &Path) -> Result<PathBuf, WorkspaceError> {
    if start.is_file() {
        return Ok(start.to_path_buf());
    }

    let mut current = start.to_path_buf();
    loop {
        let candidate = current.join(MANIFEST_NAME);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !current.pop() {
            return Err(WorkspaceError::NotFound {
                dir: start.to_path_buf(),
            });
        }
    }
}

/// Create the project root and its fixed directories. Existing directories
/// are left alone.
pub fn init_dirs(root: &Path) -> Result<()> {
    std::fs::create_dir_all(root)
        .with_context(|| format!("failed to create directory: {}", root.display()))?;
    for dir in PROJECT_DIRS.iter().chain(&[DEPENDENCIES_DIR]) {
        let path = root.join(dir);
        std::fs::create_dir_all(&path)
            .with_context(|| format!("failed to create directory: {}", path.display()))?;
    }
    Ok(())
}

/// A located project root.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
    manifest_path: PathBuf,
}

impl Workspace {
    /// Locate the workspace containing `start`.
    pub fn discover(start: &Path) -> Result<Self> {
        let manifest_path = find_manifest(start)?;
        Ok(Workspace::from_manifest_path(manifest_path))
    }

    /// The workspace rooted at `root`, whether or not its manifest exists yet.
    pub fn at(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Workspace {
            manifest_path: root.join(MANIFEST_NAME),
            root,
        }
    }

    fn from_manifest_path(manifest_path: PathBuf) -> Self {
        let root = manifest_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Workspace {
            root,
            manifest_path,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn dependencies_dir(&self) -> PathBuf {
        self.root.join(DEPENDENCIES_DIR)
    }

    pub fn build_dir(&self) -> PathBuf {
        self.root.join(BUILD_DIR)
    }

    /// `.trellis` directory holding project-local configuration.
    pub fn config_dir(&self) -> PathBuf {
        self.root.join(".trellis")
    }

    pub fn load_project(&self) -> Result<Project> {
        let project = manifest::load(&self.manifest_path)?;
        Ok(project)
    }

    pub fn save_project(&self, project: &Project) -> Result<()> {
        let mut project = project.clone();
        project.set_path(&self.manifest_path);
        manifest::save(&project)?;
        Ok(())
    }
}

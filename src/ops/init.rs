//! Implementation of `trellis init`.

use std::path::Path;

use anyhow::{bail, Context, Result};

use crate::core::workspace::{self, Workspace, MANIFEST_NAME};
use crate::core::{Project, Version};

/// Options for creating a new project.
#[derive(Debug, Clone)]
pub struct InitOptions {
    /// Project name
    pub name: String,

    /// Version stored in the manifest
    pub version: String,
}

impl InitOptions {
    pub fn new(name: impl Into<String>) -> Self {
        InitOptions {
            name: name.into(),
            version: "0.0.0".to_string(),
        }
    }
}

/// Create the directory tree and manifest of a new project at `path`.
///
/// The directory may already exist, but must not hold a manifest.
pub fn init_project(path: &Path, opts: &InitOptions) -> Result<Project> {
    if opts.name.trim().is_empty() {
        bail!("project name must not be empty");
    }

    let manifest_path = path.join(MANIFEST_NAME);
    if manifest_path.exists() {
        bail!(
            "`{}` already exists in `{}`",
            MANIFEST_NAME,
            path.display()
        );
    }

    workspace::init_dirs(path)?;

    let ws = Workspace::at(path);
    let project =
        Project::new(&opts.name, Version::new(&opts.version)).with_path(ws.manifest_path());
    ws.save_project(&project)
        .with_context(|| format!("failed to write {}", MANIFEST_NAME))?;

    tracing::info!("Created project {} at {}", opts.name, path.display());
    Ok(project)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest;
    use crate::core::workspace::{DEPENDENCIES_DIR, PROJECT_DIRS};
    use tempfile::TempDir;

    #[test]
    fn test_init_project() {
        let tmp = TempDir::new().unwrap();
        let root = tmp.path().join("hello");

        let opts = InitOptions {
            name: "hello".to_string(),
            version: "1.0.0".to_string(),
        };
        init_project(&root, &opts).unwrap();

        for dir in PROJECT_DIRS.iter().chain(&[DEPENDENCIES_DIR]) {
            assert!(root.join(dir).is_dir(), "missing {}", dir);
        }

        let content = std::fs::read_to_string(root.join(MANIFEST_NAME)).unwrap();
        assert!(manifest::has_marker(&content));

        let project = manifest::load(&root.join(MANIFEST_NAME)).unwrap();
        assert_eq!(project.name(), "hello");
        assert_eq!(project.version().to_string(), "1.0.0");
        assert_eq!(project.objects().count(), 0);
    }

    #[test]
    fn test_init_default_version() {
        let tmp = TempDir::new().unwrap();
        let project = init_project(tmp.path(), &InitOptions::new("hello")).unwrap();
        assert_eq!(project.version().to_string(), "0.0.0");
    }

    #[test]
    fn test_init_refuses_existing_manifest() {
        let tmp = TempDir::new().unwrap();
        init_project(tmp.path(), &InitOptions::new("hello")).unwrap();

        let err = init_project(tmp.path(), &InitOptions::new("other")).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_init_empty_name() {
        let tmp = TempDir::new().unwrap();
        assert!(init_project(tmp.path(), &InitOptions::new("  ")).is_err());
        assert!(!tmp.path().join(MANIFEST_NAME).exists());
    }
}

//! Implementation of `trellis validate`.

use std::collections::BTreeSet;

use anyhow::{bail, Result};

use crate::core::{Project, Workspace};
use crate::ops::workspace_config;
use crate::sources::{GitHubApi, RemoteApi};

/// Options for validating a project.
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Skip checking that remote dependencies exist
    pub offline: bool,
}

/// Load and check the project at `ws`, returning it on success.
pub fn validate(ws: &Workspace, opts: &ValidateOptions) -> Result<Project> {
    let project = ws.load_project()?;

    if opts.offline {
        validate_project(&project, None)?;
    } else {
        let config = workspace_config(ws);
        let api = GitHubApi::new(&config)?;
        validate_project(&project, Some(&api))?;
    }

    Ok(project)
}

/// Check object names and dependencies, and with `remote`, that every
/// remote location is reachable. Each distinct location is queried once.
pub fn validate_project(project: &Project, remote: Option<&dyn RemoteApi>) -> Result<()> {
    project.validate()?;
    tracing::debug!("{} has a valid manifest", project.name());

    let Some(remote) = remote else {
        return Ok(());
    };

    let locations: BTreeSet<&str> = project
        .objects()
        .flat_map(|o| o.dependencies())
        .filter(|d| !d.is_sibling())
        .map(|d| d.location())
        .collect();

    let unreachable: Vec<&str> = locations
        .into_iter()
        .filter(|location| {
            tracing::debug!("checking {}", location);
            !remote.is_reachable(location)
        })
        .collect();

    if !unreachable.is_empty() {
        bail!(
            "project `{}` has unreachable dependencies: {}",
            project.name(),
            unreachable.join(", ")
        );
    }
    Ok(())
}

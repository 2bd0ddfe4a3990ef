//! Implementation of `trellis populate`.

use anyhow::Result;

use crate::builder::CMakeEmitter;
use crate::core::{Project, Workspace};
use crate::ops::workspace_config;
use crate::resolver::{Populator, ResolveGraph};
use crate::sources::{self, GitHubApi};

/// Options for populating a project.
#[derive(Debug, Clone, Default)]
pub struct PopulateOptions {
    /// Overwrite build files that were not generated by trellis
    pub force: bool,
}

/// Fetch every dependency of the project at `ws` and emit its build files.
pub fn populate(ws: &Workspace, opts: &PopulateOptions) -> Result<ResolveGraph> {
    let project = ws.load_project()?;
    let config = workspace_config(ws);

    let source_control = sources::source_control(&config)?;
    let api = GitHubApi::new(&config)?;
    let emitter = CMakeEmitter::new().force(opts.force);
    let populator = Populator::new(source_control.as_ref(), &api, &emitter).jobs(config.jobs());

    populate_with(&project, &populator)
}

/// Validate `project`, then populate it with `populator`.
pub fn populate_with(project: &Project, populator: &Populator<'_>) -> Result<ResolveGraph> {
    project.validate()?;
    let graph = populator.populate(project)?;
    tracing::info!(
        "Populated {} with {} fetched project(s)",
        project.name(),
        graph.len() - 1
    );
    Ok(graph)
}

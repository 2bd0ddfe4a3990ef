//! Build-file generation.
//!
//! After a project's dependency graph is populated, a [`BuildEmitter`] turns
//! the project into build-system configuration under `<root>/build`.

use anyhow::Result;

use crate::core::Project;
use crate::resolver::ResolveMemo;

pub mod cmake;

pub use cmake::CMakeEmitter;

/// Produces build configuration for one project.
pub trait BuildEmitter {
    /// Emit build files for `project`. `memo` maps each fetched dependency
    /// location to the project it resolved to.
    fn emit(&self, project: &Project, memo: &ResolveMemo) -> Result<()>;
}

//! High-level operations.
//!
//! This module contains the implementation of trellis commands.

pub mod dependency;
pub mod init;
pub mod object;
pub mod populate;
pub mod tree;
pub mod validate;

pub use dependency::{
    add_dependency, remove_dependency, update_dependency, AddDependencyOptions,
    UpdateDependencyOptions,
};
pub use init::{init_project, InitOptions};
pub use object::{add_object, remove_object, update_object, AddObjectOptions, UpdateObjectOptions};
pub use populate::{populate, populate_with, PopulateOptions};
pub use tree::{format_tree, TreeOptions};
pub use validate::{validate, validate_project, ValidateOptions};

use crate::core::Workspace;
use crate::util::config::{global_config_path, load_config, project_config_path, Config};

/// Configuration for `ws`: the global file overridden by the project's.
pub fn workspace_config(ws: &Workspace) -> Config {
    load_config(
        global_config_path().as_deref(),
        &project_config_path(ws.root()),
    )
}

//! Trellis - a project manager for C and C++ projects built with CMake
//!
//! This crate provides the core library functionality for trellis: the
//! `project.toml` model, version constraints, recursive dependency
//! population from GitHub, and CMake generation.

pub mod builder;
pub mod core;
pub mod ops;
pub mod resolver;
pub mod sources;
pub mod util;

/// Test utilities and mocks for trellis unit tests.
///
/// This module is only available when compiling with `--cfg test` or
/// running tests. It provides in-memory source control, remote API and
/// build emitter implementations plus manifest fixtures.
#[cfg(test)]
pub mod test_support;

pub use core::{
    dependency::Dependency, object::Object, project::Project, version::Version,
    workspace::Workspace,
};

pub use resolver::{Populator, PopulateError, ResolveGraph};
pub use util::config::Config;

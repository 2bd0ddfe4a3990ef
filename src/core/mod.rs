//! Core data structures for trellis.
//!
//! This module contains the foundational types used throughout trellis:
//! - Versions, semantic versions and version constraints
//! - Dependency locations and dependencies
//! - Objects (apps, libraries, tests) and projects
//! - The project.toml manifest and the workspace layout

pub mod constraint;
pub mod dependency;
pub mod errors;
pub mod location;
pub mod manifest;
pub mod object;
pub mod project;
pub mod semver;
pub mod version;
pub mod workspace;

pub use constraint::{ConstraintError, Relation, VersionConstraint};
pub use dependency::Dependency;
pub use errors::ValidationError;
pub use location::LocationKind;
pub use manifest::{ManifestError, ManifestErrorKind};
pub use object::{BuildInfo, Language, Object, ObjectKind, ObjectType};
pub use project::Project;
pub use semver::SemVer;
pub use version::{Version, VersionError};
pub use workspace::{find_manifest, Workspace, DEPENDENCIES_DIR, MANIFEST_NAME};

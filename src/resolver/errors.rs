//! Population error types and diagnostics.

use thiserror::Error;

use crate::core::{ConstraintError, ManifestError};
use crate::util::diagnostic::{suggestions, Diagnostic};

/// Error while populating a project's dependency graph.
#[derive(Debug, Error)]
pub enum PopulateError {
    #[error("dependency `{dependency}` has location `{location}`, which is not an `org/repo` shorthand")]
    Unresolvable { dependency: String, location: String },

    #[error("failed to fetch `{location}`: {message}")]
    Fetch { location: String, message: String },

    #[error("failed to load the manifest fetched from `{location}`")]
    Manifest {
        location: String,
        #[source]
        source: Box<ManifestError>,
    },

    #[error("`{project}` {found} does not satisfy `{constraint}` required by dependency `{dependency}`")]
    VersionMismatch {
        dependency: String,
        project: String,
        found: String,
        constraint: String,
    },

    #[error("dependency `{dependency}` has an invalid release constraint")]
    Constraint {
        dependency: String,
        #[source]
        source: ConstraintError,
    },

    #[error("failed to emit build files for `{project}`: {message}")]
    Emit { project: String, message: String },

    #[error("{message}")]
    Io { message: String },

    #[error("dependency cycle detected: {}", .path.join(" -> "))]
    Cycle { path: Vec<String> },
}

impl PopulateError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            PopulateError::Unresolvable { .. } => diag
                .with_context("only GitHub `org/repo` dependencies can be fetched")
                .with_suggestion("Use the GitHub shorthand, e.g. `from = \"larryk85/dune\"`"),

            PopulateError::Fetch { .. } => diag
                .with_suggestion(suggestions::FETCH_FAILED)
                .with_suggestion(suggestions::API_TOKEN),

            PopulateError::Manifest { source, .. } => diag.with_context(source.to_string()),

            PopulateError::VersionMismatch { .. } => {
                diag.with_suggestion(suggestions::VERSION_MISMATCH)
            }

            PopulateError::Constraint { source, .. } => diag
                .with_context(source.to_string())
                .with_context("example: `>= 2.0, < 3.0 | 3.1.4`"),

            PopulateError::Emit { .. } => diag.with_suggestion(suggestions::FORCE_EMIT),

            PopulateError::Io { .. } => diag,

            PopulateError::Cycle { .. } => diag.with_suggestion(
                "Break the cycle by removing or restructuring dependencies",
            ),
        }
    }
}

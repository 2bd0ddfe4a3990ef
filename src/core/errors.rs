//! Validation errors for the project model.

use thiserror::Error;

use crate::core::constraint::ConstraintError;
use crate::core::location::LocationKind;
use crate::util::diagnostic::Diagnostic;

/// A cross-field rule violation on a single dependency or object.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("dependency `{dependency}` sets both `{first}` and `{second}`")]
    ContradictoryPins {
        dependency: String,
        first: &'static str,
        second: &'static str,
    },

    #[error("dependency `{dependency}` has unsupported location `{location}` ({kind})")]
    InvalidLocation {
        dependency: String,
        location: String,
        kind: LocationKind,
    },

    #[error("`{object}` depends on unknown library `{dependency}`")]
    UnknownSibling { object: String, dependency: String },

    #[error("invalid object name `{0}`")]
    InvalidObjectName(String),

    #[error("dependency `{dependency}` has invalid hash `{hash}`")]
    InvalidDigest { dependency: String, hash: String },

    #[error("dependency `{dependency}` has invalid release: {source}")]
    InvalidRelease {
        dependency: String,
        #[source]
        source: ConstraintError,
    },
}

impl ValidationError {
    /// Convert to a user-friendly diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.to_string());
        match self {
            ValidationError::ContradictoryPins { first, second, .. } => diag
                .with_context(format!("`{}` and `{}` select different pinning strategies", first, second))
                .with_suggestion(format!("Remove either `{}` or `{}`", first, second)),
            ValidationError::InvalidLocation { .. } => diag
                .with_context("supported locations: `org/repo`, `https://github.com/org/repo`, archive URLs")
                .with_suggestion("Use the GitHub shorthand `org/repo`"),
            ValidationError::UnknownSibling { .. } => diag
                .with_suggestion("Add the library with `trellis add lib <name>`")
                .with_suggestion("Or give the dependency a `from` location"),
            ValidationError::InvalidObjectName(_) => diag
                .with_context("names must match [_A-Za-z][_A-Za-z0-9]*"),
            ValidationError::InvalidDigest { .. } => diag
                .with_context("expected 64 hexadecimal characters (SHA-256)"),
            ValidationError::InvalidRelease { .. } => diag
                .with_context("example: `>= 2.0, < 3.0 | 3.1.4`"),
        }
    }
}

//! Dependencies between projects.
//!
//! A Dependency names another project's artifact and says where to fetch it
//! and how to pin it: a `tag` (commit or branch), a `release` constraint, or,
//! for archives, a content `hash`.

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::core::constraint::{ConstraintError, VersionConstraint};
use crate::core::errors::ValidationError;
use crate::core::location::{self, LocationKind};

/// A dependency of an app, lib or test object.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependency {
    /// Key within the owning object's dependency map
    name: String,

    /// Remote reference, or empty for a sibling object
    location: String,

    /// Commit or branch
    tag: String,

    /// Version constraint string
    release: String,

    /// Archive content digest
    hash: String,

    /// Sorted, duplicate-free
    patch_files: BTreeSet<PathBuf>,
}

impl Dependency {
    /// Create a dependency from its location, naming it after the
    /// location's final path segment.
    pub fn new(location: &str) -> Self {
        let mut dep = Dependency::default();
        dep.set("", location, "", "", "");
        dep
    }

    /// Create a dependency on a sibling library of the same project.
    pub fn sibling(name: impl Into<String>) -> Self {
        Dependency {
            name: name.into(),
            ..Dependency::default()
        }
    }

    /// Replace every field at once.
    ///
    /// GitHub URLs are stored as `org/repo`. An empty `name` defaults to the
    /// repository part of the location. Supplying both `tag` and `release` is
    /// contradictory: the tag is kept only when it looks like a commit digest,
    /// otherwise the release wins. Patch files are cleared.
    pub fn set(&mut self, name: &str, location: &str, tag: &str, release: &str, hash: &str) {
        self.location = location::normalize(location);
        self.name = if name.is_empty() {
            location::repo(&self.location).to_string()
        } else {
            name.to_string()
        };
        self.tag = tag.to_string();
        self.release = release.to_string();
        self.hash = hash.to_string();
        self.patch_files.clear();

        if !self.tag.is_empty() && !self.release.is_empty() {
            if is_commit_digest(&self.tag) {
                warn!(
                    "dependency `{}` has both tag `{}` and release `{}`; discarding release",
                    self.name, self.tag, self.release
                );
                self.release.clear();
            } else {
                warn!(
                    "dependency `{}` has both tag `{}` and release `{}`; discarding tag",
                    self.name, self.tag, self.release
                );
                self.tag.clear();
            }
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = tag.into();
        self
    }

    pub fn with_release(mut self, release: impl Into<String>) -> Self {
        self.release = release.into();
        self
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.hash = hash.into();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: &str) {
        self.location = location::normalize(location);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn set_tag(&mut self, tag: impl Into<String>) {
        self.tag = tag.into();
    }

    pub fn release(&self) -> &str {
        &self.release
    }

    pub fn set_release(&mut self, release: impl Into<String>) {
        self.release = release.into();
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn set_hash(&mut self, hash: impl Into<String>) {
        self.hash = hash.into();
    }

    /// True when neither a tag nor a release is set.
    pub fn is_unpinned(&self) -> bool {
        self.tag.is_empty() && self.release.is_empty()
    }

    /// True when this dependency names a sibling object.
    pub fn is_sibling(&self) -> bool {
        self.location.is_empty()
    }

    pub fn is_archive(&self) -> bool {
        location::is_archive(&self.location)
    }

    /// Parse `release` as a constraint.
    pub fn release_constraint(&self) -> Result<VersionConstraint, ConstraintError> {
        VersionConstraint::parse(&self.release)
    }

    pub fn patch_files(&self) -> impl Iterator<Item = &Path> {
        self.patch_files.iter().map(PathBuf::as_path)
    }

    /// Add a patch file. Returns false if it was already present.
    pub fn patch_add(&mut self, path: impl Into<PathBuf>) -> bool {
        self.patch_files.insert(path.into())
    }

    /// Remove a patch file. Returns false if it was not present.
    pub fn patch_remove(&mut self, path: &Path) -> bool {
        self.patch_files.remove(path)
    }

    /// Check this dependency's location and pins.
    pub fn validate(&self) -> Result<LocationKind, ValidationError> {
        let kind = validate_location(&self.name, &self.location, &self.tag, &self.release, &self.hash)?;
        if let Err(source) = self.release_constraint() {
            return Err(ValidationError::InvalidRelease {
                dependency: self.name.clone(),
                source,
            });
        }
        Ok(kind)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        if !self.location.is_empty() {
            write!(f, " ({})", self.location)?;
        }
        if !self.tag.is_empty() {
            write!(f, " @ {}", self.tag)?;
        } else if !self.release.is_empty() {
            write!(f, " {}", self.release)?;
        }
        Ok(())
    }
}

/// Classify `location` and reject pin combinations that contradict each other.
///
/// `tag` with `release` and `tag` with `hash` are both rejected. A `hash` must
/// be a SHA-256 digest in hex. Only siblings, archives and GitHub locations
/// are accepted.
pub fn validate_location(
    name: &str,
    location: &str,
    tag: &str,
    release: &str,
    hash: &str,
) -> Result<LocationKind, ValidationError> {
    if !tag.is_empty() {
        if !release.is_empty() {
            return Err(ValidationError::ContradictoryPins {
                dependency: name.to_string(),
                first: "tag",
                second: "release",
            });
        }
        if !hash.is_empty() {
            return Err(ValidationError::ContradictoryPins {
                dependency: name.to_string(),
                first: "tag",
                second: "hash",
            });
        }
    }

    if !hash.is_empty() && !is_valid_digest(hash) {
        return Err(ValidationError::InvalidDigest {
            dependency: name.to_string(),
            hash: hash.to_string(),
        });
    }

    let kind = location::classify(location);
    if kind == LocationKind::Local {
        return Err(ValidationError::InvalidLocation {
            dependency: name.to_string(),
            location: location.to_string(),
            kind,
        });
    }
    if !hash.is_empty() && kind != LocationKind::Archive {
        warn!("dependency `{}`: `hash` only applies to archive locations", name);
    }
    Ok(kind)
}

/// A SHA-256 digest written as 64 hex characters.
pub fn is_valid_digest(hash: &str) -> bool {
    hex::decode(hash).map_or(false, |bytes| bytes.len() == 32)
}

/// A full git commit id (SHA-1) or a SHA-256 digest in hex.
pub fn is_commit_digest(tag: &str) -> bool {
    hex::decode(tag).map_or(false, |bytes| bytes.len() == 20 || bytes.len() == 32)
}

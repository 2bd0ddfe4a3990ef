//! Project versions.
//!
//! A [`Version`] keeps the text it was created from verbatim and, when that
//! text is a semantic version, its parsed [`SemVer`] form. Comparison uses
//! semantic precedence when both sides parsed and falls back to a segment-wise
//! raw comparison otherwise.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::core::semver::{compare_numeric, SemVer};

/// Errors produced while building versions.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum VersionError {
    #[error("`{0}` is not a semantic version")]
    NotSemantic(String),

    #[error("invalid pre-release or build identifier list `{0}`")]
    InvalidIdentifier(String),
}

/// A printable version with an optional semantic interpretation.
#[derive(Debug, Clone, Default)]
pub struct Version {
    raw: String,
    semver: Option<SemVer>,
}

impl Version {
    /// Create a version from arbitrary text.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let semver = SemVer::parse(&raw);
        Version { raw, semver }
    }

    /// Create a version from a semantic version.
    pub fn from_semver(sv: SemVer) -> Self {
        Version {
            raw: sv.to_string(),
            semver: Some(sv),
        }
    }

    /// The text this version was created from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// True only if the raw text matched the semantic grammar.
    pub fn is_semver(&self) -> bool {
        self.semver.is_some()
    }

    pub fn semver(&self) -> Option<&SemVer> {
        self.semver.as_ref()
    }

    pub fn major(&self) -> u64 {
        self.semver.as_ref().map_or(0, SemVer::major)
    }

    pub fn minor(&self) -> u64 {
        self.semver.as_ref().map_or(0, SemVer::minor)
    }

    pub fn patch(&self) -> u64 {
        self.semver.as_ref().map_or(0, SemVer::patch)
    }

    /// Compare two versions.
    pub fn compare(&self, other: &Version) -> Ordering {
        match (&self.semver, &other.semver) {
            (Some(l), Some(r)) => l.compare(r),
            _ => raw_compare(&self.raw, &other.raw),
        }
    }
}

impl From<SemVer> for Version {
    fn from(sv: SemVer) -> Self {
        Version::from_semver(sv)
    }
}

impl From<&str> for Version {
    fn from(s: &str) -> Self {
        Version::new(s)
    }
}

impl FromStr for Version {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Version::new(s))
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Compare two non-semantic version strings.
///
/// Both strings are split on any of `. , - + ;`. Segments that are digits on
/// both sides compare numerically; otherwise the leading digits compare
/// numerically first and the remainders bytewise. If every shared segment is
/// equal, the string with more segments is greater.
pub fn raw_compare(lhs: &str, rhs: &str) -> Ordering {
    if lhs == rhs {
        return Ordering::Equal;
    }

    let is_sep = |c: char| matches!(c, '.' | ',' | '-' | '+' | ';');
    let left: Vec<&str> = lhs.split(is_sep).collect();
    let right: Vec<&str> = rhs.split(is_sep).collect();

    for (l, r) in left.iter().zip(&right) {
        if l == r {
            continue;
        }
        let ord = compare_segment(l, r);
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len())
}

fn compare_segment(l: &str, r: &str) -> Ordering {
    let (l_digits, l_rest) = split_numeric_prefix(l);
    let (r_digits, r_rest) = split_numeric_prefix(r);

    if l_rest.is_empty() && r_rest.is_empty() {
        return compare_numeric(l_digits, r_digits);
    }

    compare_numeric(l_digits, r_digits).then_with(|| l_rest.as_bytes().cmp(r_rest.as_bytes()))
}

fn split_numeric_prefix(s: &str) -> (&str, &str) {
    let end = s
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(s.len());
    s.split_at(end)
}

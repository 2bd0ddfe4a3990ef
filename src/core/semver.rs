//! Semantic version parsing and precedence.
//!
//! The grammar is `x[.y[.z]][-pre][+build]` with two deliberate allowances:
//! a leading `v`/`V` is skipped, and a pre-release may be introduced by a
//! bare `rc` without the leading dash (`1.2.0rc1`).
//!
//! Precedence follows the usual rules for the numeric core and pre-release.
//! Build metadata is *also* ordered, using the same identifier rule, except
//! that an empty build sorts before a non-empty one.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::core::version::VersionError;

/// A parsed semantic version.
#[derive(Debug, Clone, Default)]
pub struct SemVer {
    major: u64,
    minor: u64,
    patch: u64,
    pre_release: String,
    build: String,
}

impl SemVer {
    /// Create a version from its numeric core with no pre-release or build.
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        SemVer {
            major,
            minor,
            patch,
            pre_release: String::new(),
            build: String::new(),
        }
    }

    /// Parse a version string, returning `None` if it doesn't match the grammar.
    pub fn parse(text: &str) -> Option<SemVer> {
        let text = text.trim();
        let mut rest = text
            .strip_prefix('v')
            .or_else(|| text.strip_prefix('V'))
            .unwrap_or(text);

        let mut build = String::new();
        if let Some(pos) = rest.find('+') {
            build = rest[pos + 1..].to_string();
            if !is_valid_identifier_list(&build) {
                return None;
            }
            rest = &rest[..pos];
        }

        let mut pre_release = String::new();
        if let Some(pos) = rest.find('-') {
            pre_release = rest[pos + 1..].to_string();
            if !is_valid_identifier_list(&pre_release) {
                return None;
            }
            rest = &rest[..pos];
        } else if let Some(pos) = rest.find("rc") {
            pre_release = rest[pos..].to_string();
            if !is_valid_identifier_list(&pre_release) {
                return None;
            }
            rest = &rest[..pos];
        }

        let groups: Vec<&str> = rest.split('.').collect();
        if groups.is_empty() || groups.len() > 3 {
            return None;
        }

        let mut core = [0u64; 3];
        for (slot, group) in core.iter_mut().zip(&groups) {
            if group.is_empty() || !group.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            *slot = group.parse().ok()?;
        }

        Some(SemVer {
            major: core[0],
            minor: core[1],
            patch: core[2],
            pre_release,
            build,
        })
    }

    /// Attach a pre-release string, validating its identifiers.
    pub fn with_pre_release(mut self, pre: &str) -> Result<Self, VersionError> {
        if !pre.is_empty() && !is_valid_identifier_list(pre) {
            return Err(VersionError::InvalidIdentifier(pre.to_string()));
        }
        self.pre_release = pre.to_string();
        Ok(self)
    }

    /// Attach build metadata, validating its identifiers.
    pub fn with_build(mut self, build: &str) -> Result<Self, VersionError> {
        if !build.is_empty() && !is_valid_identifier_list(build) {
            return Err(VersionError::InvalidIdentifier(build.to_string()));
        }
        self.build = build.to_string();
        Ok(self)
    }

    pub fn major(&self) -> u64 {
        self.major
    }

    pub fn minor(&self) -> u64 {
        self.minor
    }

    pub fn patch(&self) -> u64 {
        self.patch
    }

    pub fn pre_release(&self) -> &str {
        &self.pre_release
    }

    pub fn build(&self) -> &str {
        &self.build
    }

    /// Compare two versions by precedence.
    pub fn compare(&self, other: &SemVer) -> Ordering {
        self.major
            .cmp(&other.major)
            .then(self.minor.cmp(&other.minor))
            .then(self.patch.cmp(&other.patch))
            .then_with(|| compare_pre_release(&self.pre_release, &other.pre_release))
            .then_with(|| compare_build(&self.build, &other.build))
    }
}

impl PartialEq for SemVer {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for SemVer {}

impl PartialOrd for SemVer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SemVer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)?;
        if !self.pre_release.is_empty() {
            write!(f, "-{}", self.pre_release)?;
        }
        if !self.build.is_empty() {
            write!(f, "+{}", self.build)?;
        }
        Ok(())
    }
}

impl FromStr for SemVer {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SemVer::parse(s).ok_or_else(|| VersionError::NotSemantic(s.to_string()))
    }
}

/// A release (empty pre-release) outranks any pre-release.
fn compare_pre_release(lhs: &str, rhs: &str) -> Ordering {
    match (lhs.is_empty(), rhs.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => compare_identifiers(lhs, rhs),
    }
}

/// Empty build metadata sorts before any non-empty build.
fn compare_build(lhs: &str, rhs: &str) -> Ordering {
    match (lhs.is_empty(), rhs.is_empty()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => compare_identifiers(lhs, rhs),
    }
}

/// Compare dot-separated identifier lists.
///
/// Numeric identifiers compare numerically, a non-numeric identifier outranks
/// a numeric one, and two non-numeric identifiers compare bytewise. When every
/// shared identifier is equal, the longer list wins.
pub(crate) fn compare_identifiers(lhs: &str, rhs: &str) -> Ordering {
    let left: Vec<&str> = lhs.split('.').collect();
    let right: Vec<&str> = rhs.split('.').collect();

    for (l, r) in left.iter().zip(&right) {
        if l == r {
            continue;
        }
        let ord = match (is_numeric(l), is_numeric(r)) {
            (true, true) => compare_numeric(l, r),
            (false, true) => Ordering::Greater,
            (true, false) => Ordering::Less,
            (false, false) => l.as_bytes().cmp(r.as_bytes()),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }

    left.len().cmp(&right.len())
}

fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Compare two all-digit strings by value without overflowing.
pub(crate) fn compare_numeric(lhs: &str, rhs: &str) -> Ordering {
    let l = lhs.trim_start_matches('0');
    let r = rhs.trim_start_matches('0');
    l.len().cmp(&r.len()).then_with(|| l.cmp(r))
}

fn is_valid_identifier_list(s: &str) -> bool {
    !s.is_empty()
        && s.split('.').all(|ident| {
            !ident.is_empty()
                && ident
                    .bytes()
                    .all(|b| b.is_ascii_alphanumeric() || b == b'-')
        })
}

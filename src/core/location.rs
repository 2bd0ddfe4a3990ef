//! Dependency location classification.
//!
//! A location string is one of:
//! - empty: the dependency names a sibling object of the same project
//! - an archive URL (`.tar.gz`, `.tgz`, `.tar.bz2`, `.tar.xz`, `.tar.zst`)
//! - a GitHub repository URL (`https://github.com/org/repo`)
//! - a GitHub shorthand (`org/repo`)
//! - anything else, treated as a local path

use std::fmt;

use url::Url;

pub const GITHUB_URL_PREFIX: &str = "https://github.com/";

const ARCHIVE_SUFFIXES: &[&str] = &[".tar.gz", ".tgz", ".tar.bz2", ".tar.xz", ".tar.zst"];

/// The kind of a location string.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationKind {
    Sibling,
    Archive,
    GitHubUrl,
    GitHubShorthand,
    Local,
}

impl fmt::Display for LocationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocationKind::Sibling => "sibling",
            LocationKind::Archive => "archive",
            LocationKind::GitHubUrl => "github url",
            LocationKind::GitHubShorthand => "github shorthand",
            LocationKind::Local => "local path",
        };
        write!(f, "{}", s)
    }
}

/// Classify a location. Every string maps to exactly one kind.
pub fn classify(location: &str) -> LocationKind {
    if location.is_empty() {
        LocationKind::Sibling
    } else if is_archive(location) {
        LocationKind::Archive
    } else if is_github_url(location) {
        LocationKind::GitHubUrl
    } else if is_github_shorthand(location) {
        LocationKind::GitHubShorthand
    } else {
        LocationKind::Local
    }
}

pub fn is_archive(location: &str) -> bool {
    ARCHIVE_SUFFIXES.iter().any(|suffix| location.ends_with(suffix))
}

/// A `https://github.com/<org>/<repo>` URL that is not an archive download.
pub fn is_github_url(location: &str) -> bool {
    if !location.starts_with(GITHUB_URL_PREFIX) || is_archive(location) {
        return false;
    }
    match Url::parse(location) {
        Ok(url) => url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).count() >= 2)
            .unwrap_or(false),
        Err(_) => false,
    }
}

/// An `org/repo` pair: exactly one `/`, both halves non-empty and made of
/// characters GitHub permits in account and repository names.
pub fn is_github_shorthand(location: &str) -> bool {
    let Some((org, repo)) = location.split_once('/') else {
        return false;
    };
    let valid = |part: &str| {
        !matches!(part, "" | "." | "..")
            && part
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
    };
    valid(org) && valid(repo) && !repo.contains('/')
}

/// Rewrite a GitHub repository URL to its `org/repo` shorthand. Other
/// locations are returned unchanged.
pub fn normalize(location: &str) -> String {
    let location = location.trim();
    if !is_github_url(location) {
        return location.to_string();
    }
    let stripped = &location[GITHUB_URL_PREFIX.len()..];
    let stripped = stripped.trim_end_matches('/');
    let stripped = stripped.strip_suffix(".git").unwrap_or(stripped);
    stripped.to_string()
}

/// The organization half of a shorthand (everything before the last `/`).
pub fn org(location: &str) -> &str {
    location.rsplit_once('/').map_or("", |(org, _)| org)
}

/// The repository half of a location (its final path segment).
pub fn repo(location: &str) -> &str {
    let trimmed = location.trim_end_matches('/');
    let last = trimmed.rsplit_once('/').map_or(trimmed, |(_, repo)| repo);
    last.strip_suffix(".git").unwrap_or(last)
}

//! Configuration file support for trellis.
//!
//! trellis reads two configuration file locations:
//! - Global: `~/.trellis/config.toml` - User-wide defaults
//! - Project: `.trellis/config.toml` - Project-specific overrides
//!
//! Project config takes precedence over global config. Missing files and
//! unknown keys are ignored; a malformed file is reported and skipped.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::util::process::find_executable;

pub const DEFAULT_API_URL: &str = "https://api.github.com";
pub const DEFAULT_USER_AGENT: &str = "trellis";
pub const DEFAULT_JOBS: u32 = 4;

/// Environment variable that overrides `net.token`.
pub const TOKEN_ENV: &str = "GITHUB_TOKEN";

/// trellis configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote API settings
    pub net: NetConfig,

    /// Source-control settings
    pub git: GitConfig,
}

/// Network-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetConfig {
    /// Base URL of the GitHub REST API
    pub api_url: Option<String>,

    /// Bearer token for API requests
    pub token: Option<String>,

    /// User-Agent header sent with API requests
    pub user_agent: Option<String>,
}

/// Git-related configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GitConfig {
    /// `cli` or `libgit2`
    pub backend: Option<String>,

    /// Parallel jobs for submodule fetches during clone
    pub jobs: Option<u32>,

    /// git executable to run for the `cli` backend
    pub executable: Option<PathBuf>,
}

/// How repositories are cloned and pulled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GitBackend {
    /// Shell out to the `git` executable
    #[default]
    Cli,
    /// Use libgit2 in-process
    LibGit2,
}

impl FromStr for GitBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "cli" | "git" => Ok(GitBackend::Cli),
            "libgit2" | "git2" => Ok(GitBackend::LibGit2),
            other => bail!("unknown git backend `{}` (expected `cli` or `libgit2`)", other),
        }
    }
}

impl Config {
    /// Load configuration from a file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config file: {}", path.display()))
    }

    /// Load configuration with fallback to defaults if file doesn't exist.
    pub fn load_or_default(path: &Path) -> Self {
        if path.exists() {
            Self::load(path).unwrap_or_else(|e| {
                tracing::warn!("Failed to load config from {}: {:#}", path.display(), e);
                Self::default()
            })
        } else {
            Self::default()
        }
    }

    /// Merge another config into this one (other takes precedence).
    pub fn merge(&mut self, other: Config) {
        if other.net.api_url.is_some() {
            self.net.api_url = other.net.api_url;
        }
        if other.net.token.is_some() {
            self.net.token = other.net.token;
        }
        if other.net.user_agent.is_some() {
            self.net.user_agent = other.net.user_agent;
        }

        if other.git.backend.is_some() {
            self.git.backend = other.git.backend;
        }
        if other.git.jobs.is_some() {
            self.git.jobs = other.git.jobs;
        }
        if other.git.executable.is_some() {
            self.git.executable = other.git.executable;
        }
    }

    pub fn api_url(&self) -> &str {
        self.net
            .api_url
            .as_deref()
            .unwrap_or(DEFAULT_API_URL)
            .trim_end_matches('/')
    }

    pub fn user_agent(&self) -> &str {
        self.net.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT)
    }

    /// API token, with `GITHUB_TOKEN` taking precedence over the file.
    pub fn token(&self) -> Option<String> {
        self.token_with_env(std::env::var(TOKEN_ENV).ok())
    }

    fn token_with_env(&self, env: Option<String>) -> Option<String> {
        env.filter(|t| !t.is_empty())
            .or_else(|| self.net.token.clone())
    }

    /// Parse the git backend, falling back to the CLI on unknown values.
    pub fn git_backend(&self) -> GitBackend {
        match self.git.backend.as_deref().map(str::parse) {
            Some(Ok(backend)) => backend,
            Some(Err(e)) => {
                tracing::warn!("{:#}; using `cli`", e);
                GitBackend::Cli
            }
            None => GitBackend::default(),
        }
    }

    pub fn jobs(&self) -> u32 {
        self.git.jobs.filter(|j| *j > 0).unwrap_or(DEFAULT_JOBS)
    }

    /// Resolve the git executable through PATH.
    pub fn git_executable(&self) -> Result<PathBuf> {
        let name = self
            .git
            .executable
            .clone()
            .unwrap_or_else(|| PathBuf::from("git"));
        if name.is_absolute() {
            return Ok(name);
        }
        find_executable(&name.to_string_lossy())
            .with_context(|| format!("`{}` not found in PATH", name.display()))
    }
}

/// Load merged configuration from global and project locations.
///
/// Order of precedence (highest to lowest):
/// 1. Project config (.trellis/config.toml)
/// 2. Global config (~/.trellis/config.toml)
/// 3. Defaults
pub fn load_config(global_path: Option<&Path>, project_path: &Path) -> Config {
    let mut config = Config::default();

    if let Some(global_path) = global_path {
        config.merge(Config::load_or_default(global_path));
    }

    config.merge(Config::load_or_default(project_path));

    config
}

/// Get the global trellis config directory (~/.trellis).
pub fn global_config_dir() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".trellis"))
}

/// Get the global config path (~/.trellis/config.toml).
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("config.toml"))
}

/// Get the project config path (.trellis/config.toml).
pub fn project_config_path(project_root: &Path) -> PathBuf {
    project_root.join(".trellis").join("config.toml")
}

//! GitHub REST API client.

use anyhow::{bail, Context, Result};
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use serde::Deserialize;

use crate::core::location::{self, LocationKind};
use crate::sources::RemoteApi;
use crate::util::config::Config;

/// The subset of `GET /repos/{org}/{repo}` trellis reads.
#[derive(Debug, Clone, Deserialize)]
pub struct RepoInfo {
    pub full_name: String,
    pub default_branch: String,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    message: String,
}

/// Blocking GitHub API client.
pub struct GitHubApi {
    client: Client,
    api_url: String,
}

impl GitHubApi {
    pub fn new(config: &Config) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        if let Some(token) = config.token() {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token))
                .context("API token contains invalid header characters")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = Client::builder()
            .user_agent(config.user_agent())
            .default_headers(headers)
            .build()
            .context("failed to create HTTP client")?;

        Ok(GitHubApi {
            client,
            api_url: config.api_url().to_string(),
        })
    }

    fn repo_url(&self, org: &str, repo: &str) -> String {
        format!("{}/repos/{}/{}", self.api_url, org, repo)
    }

    /// Fetch repository metadata.
    pub fn repo_info(&self, org: &str, repo: &str) -> Result<RepoInfo> {
        let url = self.repo_url(org, repo);
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .with_context(|| format!("failed to query {}", url))?;
        let status = response.status();
        let body = response
            .text()
            .with_context(|| format!("failed to read response from {}", url))?;

        if !status.is_success() {
            bail!(
                "GitHub API request for `{}/{}` failed: HTTP {}{}",
                org,
                repo,
                status,
                api_message(&body)
                    .map(|m| format!(" ({})", m))
                    .unwrap_or_default()
            );
        }

        parse_repo_info(&body).with_context(|| format!("unexpected response from {}", url))
    }
}

impl RemoteApi for GitHubApi {
    fn default_branch(&self, org: &str, repo: &str) -> Result<String> {
        let info = self.repo_info(org, repo)?;
        tracing::debug!("{} default branch is `{}`", info.full_name, info.default_branch);
        Ok(info.default_branch)
    }

    fn is_reachable(&self, location: &str) -> bool {
        let location = location::normalize(location);
        match location::classify(&location) {
            LocationKind::GitHubShorthand => {
                let (org, repo) = (location::org(&location), location::repo(&location));
                match self.repo_info(org, repo) {
                    Ok(_) => true,
                    Err(e) => {
                        tracing::debug!("{} is not reachable: {:#}", location, e);
                        false
                    }
                }
            }
            LocationKind::Archive => self
                .client
                .head(location.as_str())
                .send()
                .map(|r| r.status().is_success())
                .unwrap_or(false),
            _ => false,
        }
    }
}

/// Decode a repository response, treating `"message": "Not Found"` as absent.
pub fn parse_repo_info(body: &str) -> Result<RepoInfo> {
    if let Some(message) = api_message(body) {
        if message == "Not Found" {
            bail!("repository not found");
        }
    }
    serde_json::from_str(body).context("missing `default_branch` in repository response")
}

fn api_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiMessage>(body)
        .ok()
        .map(|m| m.message)
}

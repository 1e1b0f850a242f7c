use crate::error::{HamError, Result};
use crate::repository::{ReleaseRepository, ReleaseSource, UpstreamRelease};
use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use serde::de::DeserializeOwned;
use std::time::Duration;

const GITHUB_API: &str = "https://api.github.com";

/// Release client for the GitHub REST API
pub struct GitHubReleaseClient {
    client: Client,
    api_base: String,
    token: Option<String>,
}

impl GitHubReleaseClient {
    pub fn new(token: Option<String>) -> Result<Self> {
        Self::with_api_base(GITHUB_API, token)
    }

    /// Point the client at another API root (GitHub Enterprise).
    pub fn with_api_base(api_base: &str, token: Option<String>) -> Result<Self> {
        let client = Self::build_client()?;
        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    fn latest_release_url(&self, repository: &ReleaseRepository) -> String {
        format!(
            "{}/repos/{}/{}/releases/latest",
            self.api_base, repository.owner, repository.name
        )
    }

    fn releases_url(&self, repository: &ReleaseRepository) -> String {
        format!(
            "{}/repos/{}/{}/releases",
            self.api_base, repository.owner, repository.name
        )
    }

    fn get_json<T: DeserializeOwned>(&self, repository: &ReleaseRepository, url: &str) -> Result<T> {
        let fetch_error = |reason: String| HamError::UpstreamFetch {
            repository: repository.to_string(),
            reason,
        };

        if std::env::var("HAM_VERBOSE").is_ok() {
            eprintln!("[VERBOSE] Fetching: {}", url);
        }

        let mut request = self
            .client
            .get(url)
            .header(ACCEPT, "application/vnd.github+json");
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().map_err(|e| fetch_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            if std::env::var("HAM_VERBOSE").is_ok() {
                eprintln!("[VERBOSE] HTTP {}: {}", status, url);
            }
            return Err(fetch_error(format!("HTTP {} from {}", status, url)));
        }

        response
            .json::<T>()
            .map_err(|e| fetch_error(format!("unexpected response body: {}", e)))
    }

    fn build_client() -> Result<Client> {
        // Upstream requests block until answered.
        Client::builder()
            .timeout(None::<Duration>)
            .user_agent("ham")
            .build()
            .map_err(|e| HamError::Io(std::io::Error::other(e)))
    }
}

impl ReleaseSource for GitHubReleaseClient {
    fn latest_release(&self, repository: &ReleaseRepository) -> Result<UpstreamRelease> {
        let url = self.latest_release_url(repository);
        self.get_json(repository, &url)
    }

    fn releases(&self, repository: &ReleaseRepository) -> Result<Vec<UpstreamRelease>> {
        let url = self.releases_url(repository);
        self.get_json(repository, &url)
    }
}

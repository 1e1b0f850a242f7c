use crate::error::{HamError, Result};
use serde::Deserialize;
use std::fmt;
use url::Url;

pub mod factory;
pub mod github;

pub use factory::ReleaseSourceFactory;
pub use github::GitHubReleaseClient;

/// An upstream repository that publishes releases, e.g. `home-assistant/docker-base`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseRepository {
    pub owner: String,
    pub name: String,
}

impl ReleaseRepository {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    /// Parses a web URL such as `https://github.com/owner/name` (optionally ending in `.git`).
    pub fn from_url(raw: &str) -> Result<Self> {
        let invalid = |reason: &str| HamError::InvalidRepositoryUrl {
            url: raw.to_string(),
            reason: reason.to_string(),
        };

        let parsed = Url::parse(raw.trim()).map_err(|e| invalid(&e.to_string()))?;

        match parsed.scheme() {
            "https" | "http" => {}
            _ => return Err(invalid("only http(s) URLs are supported")),
        }

        match parsed.host_str() {
            Some(host)
                if host.eq_ignore_ascii_case("github.com")
                    || host.eq_ignore_ascii_case("www.github.com") => {}
            _ => return Err(invalid("host must be github.com")),
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|part| !part.is_empty()).collect())
            .unwrap_or_default();

        match segments.as_slice() {
            [owner, name, ..] => {
                let name = name.strip_suffix(".git").unwrap_or(*name);
                if name.is_empty() {
                    return Err(invalid("missing repository name"));
                }
                Ok(Self::new(*owner, name))
            }
            _ => Err(invalid("expected https://github.com/<owner>/<name>")),
        }
    }
}

impl fmt::Display for ReleaseRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// The parts of a published release the reconciliation cares about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct UpstreamRelease {
    pub tag_name: String,
    #[serde(default)]
    pub prerelease: bool,
}

#[cfg(test)]
impl UpstreamRelease {
    pub fn new(tag_name: impl Into<String>) -> Self {
        Self {
            tag_name: tag_name.into(),
            prerelease: false,
        }
    }
}

pub trait ReleaseSource: Send + Sync {
    /// The canonical "latest" release (never a pre-release).
    fn latest_release(&self, repository: &ReleaseRepository) -> Result<UpstreamRelease>;

    /// Every published release, newest first.
    fn releases(&self, repository: &ReleaseRepository) -> Result<Vec<UpstreamRelease>>;

    fn fetch_release(
        &self,
        repository: &ReleaseRepository,
        include_prerelease: bool,
    ) -> Result<UpstreamRelease> {
        if !include_prerelease {
            return self.latest_release(repository);
        }

        self.releases(repository)?
            .into_iter()
            .next()
            .ok_or_else(|| HamError::UpstreamFetch {
                repository: repository.to_string(),
                reason: "no releases published".to_string(),
            })
    }
}

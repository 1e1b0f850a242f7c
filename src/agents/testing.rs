//! In-memory collaborators for exercising update runs without git or the network.

use crate::agents::update::interaction::PushConfirmation;
use crate::agents::version_control::VersionControl;
use crate::error::{HamError, Result};
use crate::repository::{ReleaseRepository, ReleaseSource, UpstreamRelease};
use std::collections::HashMap;
use std::sync::Mutex;

/// Records every git call as a short string and keeps a fake commit list.
#[derive(Debug, Default)]
pub struct RecordingVcs {
    pub calls: Vec<String>,
    pub branches: Vec<String>,
    pub commits: Vec<String>,
    fail_on: Option<String>,
}

impl RecordingVcs {
    pub fn with_branches(branches: &[&str]) -> Self {
        Self {
            branches: branches.iter().map(|b| b.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn failing_on(call: &str) -> Self {
        Self {
            fail_on: Some(call.to_string()),
            ..Self::default()
        }
    }

    fn record(&mut self, call: String) -> Result<()> {
        let fails = self.fail_on.as_deref().is_some_and(|f| call.starts_with(f));
        self.calls.push(call.clone());
        if fails {
            return Err(HamError::GitOperation(format!("{call} failed: simulated")));
        }
        Ok(())
    }
}

impl VersionControl for RecordingVcs {
    fn checkout(&mut self, branch: &str) -> Result<()> {
        self.record(format!("checkout {branch}"))
    }

    fn pull(&mut self) -> Result<()> {
        self.record("pull".to_string())
    }

    fn local_branches(&mut self, prefix: &str) -> Result<Vec<String>> {
        self.record(format!("branches {prefix}"))?;
        Ok(self
            .branches
            .iter()
            .filter(|b| b.starts_with(prefix))
            .cloned()
            .collect())
    }

    fn delete_branches(&mut self, branches: &[String], force: bool) -> Result<()> {
        let flag = if force { "-D" } else { "-d" };
        self.record(format!("delete {flag} {}", branches.join(" ")))?;
        self.branches.retain(|b| !branches.contains(b));
        Ok(())
    }

    fn create_and_checkout(&mut self, branch: &str) -> Result<()> {
        self.record(format!("create {branch}"))?;
        self.branches.push(branch.to_string());
        Ok(())
    }

    fn hard_reset(&mut self) -> Result<()> {
        self.record("reset --hard".to_string())
    }

    fn stage(&mut self, paths: &[&str]) -> Result<()> {
        self.record(format!("stage {}", paths.join(" ")))
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        self.record(format!("commit {message}"))?;
        self.commits.push(message.to_string());
        Ok(())
    }

    fn log(&mut self, from: &str, to: &str) -> Result<Vec<String>> {
        self.record(format!("log {from}..{to}"))?;
        Ok(self.commits.iter().rev().cloned().collect())
    }

    fn push(&mut self, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
        if set_upstream {
            self.record(format!("push -u {remote} {branch}"))
        } else {
            self.record(format!("push {remote} {branch}"))
        }
    }
}

/// Answers the push prompt with a fixed reply and counts how often it was asked.
#[derive(Debug)]
pub struct ScriptedConfirm {
    answer: bool,
    pub prompts: usize,
    pub shown: Vec<String>,
}

impl ScriptedConfirm {
    pub fn answering(answer: bool) -> Self {
        Self {
            answer,
            prompts: 0,
            shown: Vec::new(),
        }
    }
}

impl PushConfirmation for ScriptedConfirm {
    fn confirm_push(&mut self, _branch: &str, commits: &[String]) -> Result<bool> {
        self.prompts += 1;
        self.shown = commits.to_vec();
        Ok(self.answer)
    }
}

/// Serves canned releases keyed by `owner/name`.
#[derive(Debug, Default)]
pub struct StaticReleaseSource {
    latest: HashMap<String, String>,
    listings: HashMap<String, Vec<String>>,
    pub requests: Mutex<Vec<String>>,
}

impl StaticReleaseSource {
    pub fn with_latest(mut self, repository: &str, tag: &str) -> Self {
        self.latest.insert(repository.to_string(), tag.to_string());
        self
    }

    pub fn with_listing(mut self, repository: &str, tags: &[&str]) -> Self {
        self.listings.insert(
            repository.to_string(),
            tags.iter().map(|t| t.to_string()).collect(),
        );
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().map(|r| r.len()).unwrap_or_default()
    }

    fn log(&self, request: String) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request);
        }
    }
}

impl ReleaseSource for StaticReleaseSource {
    fn latest_release(&self, repository: &ReleaseRepository) -> Result<UpstreamRelease> {
        self.log(format!("latest {repository}"));
        self.latest
            .get(&repository.to_string())
            .map(UpstreamRelease::new)
            .ok_or_else(|| HamError::UpstreamFetch {
                repository: repository.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            })
    }

    fn releases(&self, repository: &ReleaseRepository) -> Result<Vec<UpstreamRelease>> {
        self.log(format!("list {repository}"));
        self.listings
            .get(&repository.to_string())
            .map(|tags| tags.iter().map(UpstreamRelease::new).collect())
            .ok_or_else(|| HamError::UpstreamFetch {
                repository: repository.to_string(),
                reason: "HTTP 404 Not Found".to_string(),
            })
    }
}

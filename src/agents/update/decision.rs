use std::fmt;

/// How an addon's pinned tag relates to the latest upstream tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// Tags are byte-identical
    UpToDate,
    /// Tags differ, no application-version change was proven, and patches are not allowed
    PatchIgnored,
    /// Tags differ without a distinguishing application version
    Patch,
    /// Extracted application versions differ
    Minor,
}

impl ChangeKind {
    pub fn is_change(&self) -> bool {
        matches!(self, ChangeKind::Patch | ChangeKind::Minor)
    }

    pub fn bump(&self) -> Option<VersionBump> {
        match self {
            ChangeKind::Patch => Some(VersionBump::Patch),
            ChangeKind::Minor => Some(VersionBump::Minor),
            ChangeKind::UpToDate | ChangeKind::PatchIgnored => None,
        }
    }
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeKind::UpToDate => "up-to-date",
            ChangeKind::PatchIgnored => "patch ignored",
            ChangeKind::Patch => "patch",
            ChangeKind::Minor => "minor",
        };
        f.write_str(label)
    }
}

/// Increment applied to the addon's own version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionBump {
    Minor,
    Patch,
}

impl VersionBump {
    /// Standard increment. A pre-release that already sits on the target
    /// version is released as-is instead of skipping past it.
    pub fn apply(&self, version: &semver::Version) -> semver::Version {
        let pre_release = !version.pre.is_empty();
        match self {
            VersionBump::Minor if pre_release && version.patch == 0 => {
                semver::Version::new(version.major, version.minor, 0)
            }
            VersionBump::Minor => semver::Version::new(version.major, version.minor + 1, 0),
            VersionBump::Patch if pre_release => {
                semver::Version::new(version.major, version.minor, version.patch)
            }
            VersionBump::Patch => {
                semver::Version::new(version.major, version.minor, version.patch + 1)
            }
        }
    }
}

impl fmt::Display for VersionBump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VersionBump::Minor => f.write_str("minor"),
            VersionBump::Patch => f.write_str("patch"),
        }
    }
}

/// Outcome of comparing one addon against upstream. Lives for a single run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDecision {
    pub kind: ChangeKind,
    pub local_tag: String,
    pub upstream_tag: String,
    pub local_token: String,
    pub upstream_token: String,
}

impl ChangeDecision {
    /// The tag to pin to, when the decision is an update.
    pub fn new_tag(&self) -> Option<&str> {
        self.kind.is_change().then_some(self.upstream_tag.as_str())
    }

    pub fn is_minor(&self) -> bool {
        self.kind == ChangeKind::Minor
    }
}

/// Classifies tag differences and applies the patch-level policy gate.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateDecisionEngine {
    allow_patch: bool,
}

impl UpdateDecisionEngine {
    pub fn new(allow_patch: bool) -> Self {
        Self { allow_patch }
    }

    /// Tokens are empty when no pattern captured anything.
    pub fn decide(
        &self,
        local_tag: &str,
        upstream_tag: &str,
        local_token: &str,
        upstream_token: &str,
    ) -> ChangeDecision {
        // Raw tag identity, not semantic equality.
        let kind = if local_tag == upstream_tag {
            ChangeKind::UpToDate
        } else {
            let is_minor =
                !local_token.is_empty() && !upstream_token.is_empty() && local_token != upstream_token;

            if is_minor {
                ChangeKind::Minor
            } else if self.allow_patch {
                ChangeKind::Patch
            } else {
                ChangeKind::PatchIgnored
            }
        };

        ChangeDecision {
            kind,
            local_tag: local_tag.to_string(),
            upstream_tag: upstream_tag.to_string(),
            local_token: local_token.to_string(),
            upstream_token: upstream_token.to_string(),
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HamError {
    #[error("Project validation failed: {0}")]
    ProjectValidation(String),

    #[error("No config found for addon '{0}'")]
    DescriptorMissing(String),

    #[error("Version format for addon '{addon}' not supported: {version}")]
    DescriptorInvalidVersion { addon: String, version: String },

    #[error("No valid maintenance section found for addon '{0}'")]
    PolicyAbsent(String),

    #[error("Cannot determine pinned tag for addon '{addon}': {reason}")]
    InvalidPin { addon: String, reason: String },

    #[error("Invalid extraction pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid upstream repository URL '{url}': {reason}")]
    InvalidRepositoryUrl { url: String, reason: String },

    #[error("Failed to fetch release for {repository}: {reason}")]
    UpstreamFetch { repository: String, reason: String },

    #[error("Git operation failed: {0}")]
    GitOperation(String),

    #[error("Build execution failed: {0}")]
    BuildExecution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl HamError {
    /// Errors that only concern a single addon; the run reports them and moves on.
    pub fn is_addon_skip(&self) -> bool {
        matches!(
            self,
            HamError::DescriptorMissing(_)
                | HamError::DescriptorInvalidVersion { .. }
                | HamError::PolicyAbsent(_)
                | HamError::InvalidPin { .. }
                | HamError::InvalidPattern { .. }
                | HamError::InvalidRepositoryUrl { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, HamError>;

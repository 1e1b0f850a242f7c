use crate::error::Result;
use crate::utils::PathValidator;
use std::path::{Path, PathBuf};

/// ProjectScannerAgent validates the addon repository root
pub struct ProjectScannerAgent {
    project_path: PathBuf,
}

impl ProjectScannerAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Validates the repository root
    pub fn validate(&self) -> Result<ProjectInfo> {
        let root = PathValidator::validate_root_path(&self.project_path)?;

        // Check for Git repository
        let git_dir = root.join(".git");
        let has_git = git_dir.exists() && git_dir.is_dir();

        Ok(ProjectInfo {
            readme_path: root.join("README.md"),
            root,
            has_git,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ProjectInfo {
    pub root: PathBuf,
    pub readme_path: PathBuf,
    pub has_git: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::HamError;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn detects_git_repository() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();

        let info = ProjectScannerAgent::new(dir.path()).validate().unwrap();
        assert!(info.has_git);
        assert!(info.root.is_absolute());
        assert_eq!(info.readme_path, info.root.join("README.md"));
    }

    #[test]
    fn plain_directory_has_no_git() {
        let dir = tempdir().unwrap();
        let info = ProjectScannerAgent::new(dir.path()).validate().unwrap();
        assert!(!info.has_git);
    }

    #[test]
    fn git_file_is_not_a_repository() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join(".git"), "gitdir: elsewhere").unwrap();
        let info = ProjectScannerAgent::new(dir.path()).validate().unwrap();
        assert!(!info.has_git);
    }

    #[test]
    fn missing_root_is_rejected() {
        let dir = tempdir().unwrap();
        let err = ProjectScannerAgent::new(dir.path().join("nope"))
            .validate()
            .unwrap_err();
        assert!(matches!(err, HamError::ProjectValidation(_)));
    }
}

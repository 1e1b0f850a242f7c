use crate::error::{HamError, Result};
use std::path::{Path, PathBuf};

/// Path checks for the repository root and for anything handed to git.
pub struct PathValidator;

/// Roots an addon repository can never live under.
const SYSTEM_DIRS: [&str; 5] = ["/etc", "/sys", "/proc", "/dev", "/boot"];

impl PathValidator {
    /// Canonicalises the repository root and refuses system directories.
    pub fn validate_root_path(path: impl AsRef<Path>) -> Result<PathBuf> {
        let root = canonical(path.as_ref())?;

        if !root.is_dir() {
            return Err(HamError::ProjectValidation(format!(
                "Path '{}' is not a directory",
                root.display()
            )));
        }

        // Both sides resolved, so symlinks on either end cannot slip through
        let inside = |dir: &&str| {
            root.starts_with(dir)
                || Path::new(dir)
                    .canonicalize()
                    .is_ok_and(|resolved| root.starts_with(resolved))
        };
        if let Some(dir) = SYSTEM_DIRS.into_iter().find(inside) {
            return Err(HamError::ProjectValidation(format!(
                "Repository root '{}' is inside system directory '{}'",
                root.display(),
                dir
            )));
        }

        Ok(root)
    }

    /// Ensures `path` resolves to somewhere inside `base_dir`.
    pub fn validate_inside(path: impl AsRef<Path>, base_dir: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let resolved = canonical(path)?;

        if !resolved.starts_with(canonical(base_dir.as_ref())?) {
            return Err(HamError::ProjectValidation(format!(
                "Path '{}' is outside the repository",
                path.display()
            )));
        }

        Ok(resolved)
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize().map_err(|e| {
        HamError::ProjectValidation(format!("Invalid path '{}': {e}", path.display()))
    })
}

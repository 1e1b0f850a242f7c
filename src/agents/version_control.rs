use crate::error::{HamError, Result};
use crate::utils::path_validator::PathValidator;
use jiff::Zoned;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub const UPDATE_BRANCH_PREFIX: &str = "updates-";

/// The git operations an update run needs. Implemented by the system-git
/// agent and by in-memory fakes in tests.
pub trait VersionControl {
    fn checkout(&mut self, branch: &str) -> Result<()>;
    fn pull(&mut self) -> Result<()>;
    fn local_branches(&mut self, prefix: &str) -> Result<Vec<String>>;
    fn delete_branches(&mut self, branches: &[String], force: bool) -> Result<()>;
    fn create_and_checkout(&mut self, branch: &str) -> Result<()>;
    fn hard_reset(&mut self) -> Result<()>;
    fn stage(&mut self, paths: &[&str]) -> Result<()>;
    fn commit(&mut self, message: &str) -> Result<()>;
    /// Subject lines of the commits reachable from `to` but not from `from`.
    fn log(&mut self, from: &str, to: &str) -> Result<Vec<String>>;
    fn push(&mut self, remote: &str, branch: &str, set_upstream: bool) -> Result<()>;
}

/// VersionControlAgent drives the system `git` binary with hardened input validation.
pub struct VersionControlAgent {
    project_path: PathBuf,
}

impl VersionControlAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Result<Self> {
        let project_path = Self::validate_git_path(project_path.as_ref())?;
        Ok(Self { project_path })
    }

    fn run_git(&self, args: &[&str]) -> Result<Output> {
        if std::env::var("HAM_VERBOSE").is_ok() {
            eprintln!("[VERBOSE] git {}", args.join(" "));
        }

        Command::new("git")
            .current_dir(&self.project_path)
            .args(args)
            .output()
            .map_err(|e| {
                HamError::GitOperation(format!(
                    "Failed to execute git command '{}': {e}",
                    args.join(" ")
                ))
            })
    }

    fn run_checked(&self, args: &[&str], command: &str) -> Result<Output> {
        let output = self.run_git(args)?;
        Self::ensure_success(&output, command)?;
        Ok(output)
    }

    fn ensure_success(output: &Output, command: &str) -> Result<()> {
        if output.status.success() {
            return Ok(());
        }

        Err(HamError::GitOperation(format!(
            "{} failed: {}",
            command,
            String::from_utf8_lossy(&output.stderr)
        )))
    }

    fn validate_git_path(path: &Path) -> Result<PathBuf> {
        let dangerous = [';', '|', '&', '$', '`', '\n', '\r'];
        let path_str = path.to_string_lossy();
        if let Some(ch) = dangerous.iter().find(|c| path_str.contains(**c)) {
            return Err(HamError::GitOperation(format!(
                "Path contains dangerous character: '{}'",
                ch
            )));
        }

        if !path.is_absolute() {
            return Err(HamError::GitOperation(
                "Only absolute paths are allowed for Git operations".to_string(),
            ));
        }

        PathValidator::validate_root_path(path)
            .map_err(|err| HamError::GitOperation(format!("Invalid Git path: {}", err)))
    }

    fn validate_ref(name: &str) -> Result<()> {
        if name.is_empty() || name.starts_with('-') || name.chars().any(char::is_whitespace) {
            return Err(HamError::GitOperation(format!(
                "Refusing to use unsafe ref name '{name}'"
            )));
        }
        Ok(())
    }
}

impl VersionControl for VersionControlAgent {
    fn checkout(&mut self, branch: &str) -> Result<()> {
        Self::validate_ref(branch)?;
        self.run_checked(&["checkout", branch], "git checkout")?;
        Ok(())
    }

    fn pull(&mut self) -> Result<()> {
        self.run_checked(&["pull"], "git pull")?;
        Ok(())
    }

    fn local_branches(&mut self, prefix: &str) -> Result<Vec<String>> {
        let pattern = format!("{prefix}*");
        let output = self.run_checked(
            &["branch", "--list", "--format=%(refname:short)", &pattern],
            "git branch --list",
        )?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .map(str::trim)
            .filter(|name| name.starts_with(prefix))
            .map(str::to_string)
            .collect())
    }

    fn delete_branches(&mut self, branches: &[String], force: bool) -> Result<()> {
        if branches.is_empty() {
            return Ok(());
        }

        let flag = if force { "-D" } else { "-d" };
        let mut args = vec!["branch", flag];
        for branch in branches {
            Self::validate_ref(branch)?;
            args.push(branch);
        }

        self.run_checked(&args, "git branch -d")?;
        Ok(())
    }

    fn create_and_checkout(&mut self, branch: &str) -> Result<()> {
        Self::validate_ref(branch)?;
        self.run_checked(&["checkout", "-b", branch], "git checkout -b")?;
        Ok(())
    }

    fn hard_reset(&mut self) -> Result<()> {
        self.run_checked(&["reset", "--hard"], "git reset --hard")?;
        Ok(())
    }

    fn stage(&mut self, paths: &[&str]) -> Result<()> {
        let mut args = vec!["add", "--"];
        for path in paths {
            PathValidator::validate_inside(self.project_path.join(path), &self.project_path)
                .map_err(|err| {
                    HamError::GitOperation(format!("Refusing to stage unsafe path: {err}"))
                })?;
            args.push(path);
        }

        self.run_checked(&args, "git add")?;
        Ok(())
    }

    fn commit(&mut self, message: &str) -> Result<()> {
        self.run_checked(&["commit", "-m", message], "git commit")?;
        Ok(())
    }

    fn log(&mut self, from: &str, to: &str) -> Result<Vec<String>> {
        Self::validate_ref(from)?;
        Self::validate_ref(to)?;
        let range = format!("{from}..{to}");
        let output = self.run_checked(&["log", "--format=%s", &range], "git log")?;

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect())
    }

    fn push(&mut self, remote: &str, branch: &str, set_upstream: bool) -> Result<()> {
        Self::validate_ref(remote)?;
        Self::validate_ref(branch)?;
        let mut args = vec!["push"];
        if set_upstream {
            args.push("-u");
        }
        args.push(remote);
        args.push(branch);

        self.run_checked(&args, "git push")?;
        Ok(())
    }
}

/// `updates-<YYYY-MM-DD>` for today's local date.
pub fn todays_update_branch() -> String {
    let date = Zoned::now().strftime("%Y-%m-%d").to_string();
    update_branch_name(&date)
}

pub fn update_branch_name(date: &str) -> String {
    let mut branch_name = format!("{UPDATE_BRANCH_PREFIX}{date}");

    branch_name = branch_name
        .chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' | '/' => c,
            _ => '-',
        })
        .collect();

    if branch_name.len() > 50 {
        branch_name.truncate(50);
    }

    branch_name
}

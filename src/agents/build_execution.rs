use crate::error::{HamError, Result};
use colored::Colorize;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const BUILDER_IMAGE: &str = "homeassistant/amd64-builder:latest";
const BUILDER_CONTAINER: &str = "ham-builder";

/// Options for one containerised addon build.
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Explicit target architectures; the descriptor's list is used when empty
    pub arch: Vec<String>,
    pub test: bool,
    pub check: bool,
    pub docker_user: Option<String>,
    pub docker_password: Option<String>,
    pub docker_hub: Option<String>,
}

/// BuildExecutionAgent runs the add-on builder container for one addon
pub struct BuildExecutionAgent {
    docker_path: PathBuf,
    project_path: PathBuf,
}

impl BuildExecutionAgent {
    pub fn new<P: AsRef<Path>>(project_path: P) -> Self {
        Self {
            docker_path: PathBuf::from("docker"),
            project_path: project_path.as_ref().to_path_buf(),
        }
    }

    /// Uses a different container CLI binary (e.g. `podman`).
    #[cfg(test)]
    pub fn with_docker<P: AsRef<Path>>(mut self, docker_path: P) -> Self {
        self.docker_path = docker_path.as_ref().to_path_buf();
        self
    }

    /// Builds `addon` for the given architectures (falling back to `default_arch`).
    pub fn build(&self, addon: &str, default_arch: &[String], options: &BuildOptions) -> Result<()> {
        let args = build_args(&self.project_path, addon, default_arch, options)?;
        self.execute_docker_command(&args)
    }

    /// Execute a docker command with live output streaming
    fn execute_docker_command(&self, args: &[String]) -> Result<()> {
        println!(
            "{} {} {}",
            "Executing:".cyan(),
            self.docker_path.display(),
            redact_password(args).join(" ")
        );

        let mut command = Command::new(&self.docker_path);
        command
            .current_dir(&self.project_path)
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit());

        let mut child = command
            .spawn()
            .map_err(|e| HamError::BuildExecution(format!("Failed to spawn process: {}", e)))?;

        // Stream stdout
        if let Some(stdout) = child.stdout.take() {
            let reader = BufReader::new(stdout);
            for line in reader.lines().map_while(std::result::Result::ok) {
                println!("{}", line);
            }
        }

        let status = child
            .wait()
            .map_err(|e| HamError::BuildExecution(format!("Failed to wait for process: {}", e)))?;

        if !status.success() {
            return Err(HamError::BuildExecution(format!(
                "builder failed with exit code: {}",
                status.code().unwrap_or(-1)
            )));
        }

        Ok(())
    }
}

/// Arguments for `docker run` with the add-on builder image.
pub fn build_args(
    root: &Path,
    addon: &str,
    default_arch: &[String],
    options: &BuildOptions,
) -> Result<Vec<String>> {
    let arch = if options.arch.is_empty() {
        default_arch
    } else {
        options.arch.as_slice()
    };

    if arch.is_empty() {
        return Err(HamError::BuildExecution(format!(
            "no architectures configured for addon '{addon}'"
        )));
    }

    let mut args: Vec<String> = [
        "run",
        "--rm",
        "--privileged",
        "-v",
        "/var/run/docker.sock:/var/run/docker.sock:rw",
        "-v",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect();

    args.push(format!("{}:/data:ro", root.display()));
    args.extend(
        ["--name", BUILDER_CONTAINER, BUILDER_IMAGE, "--addon"]
            .iter()
            .map(|s| s.to_string()),
    );
    args.extend(arch.iter().map(|a| format!("--{}", a.trim_start_matches('-'))));
    args.push("-t".to_string());
    args.push(format!("/data/{addon}"));

    if options.test {
        args.push("--test".to_string());
    }

    if let (Some(user), Some(password)) = (&options.docker_user, &options.docker_password) {
        args.extend([
            "--docker-user".to_string(),
            user.clone(),
            "--docker-password".to_string(),
            password.clone(),
        ]);
    }

    if options.check {
        if let Some(namespace) = &options.docker_hub {
            args.extend([
                "--docker-hub".to_string(),
                namespace.clone(),
                "--docker-hub-check".to_string(),
            ]);
        }
    }

    Ok(args)
}

fn redact_password(args: &[String]) -> Vec<String> {
    let mut redacted = args.to_vec();
    for i in 1..redacted.len() {
        if redacted[i - 1] == "--docker-password" {
            redacted[i] = "****".to_string();
        }
    }
    redacted
}

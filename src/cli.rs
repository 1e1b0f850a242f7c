use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ham",
    about = "Home Assistant addon maintenance - keeps addon base images and releases up to date",
    version,
    author
)]
pub struct Cli {
    /// Path to the addon repository (defaults to current directory)
    #[arg(short, long, default_value = ".")]
    pub path: String,

    /// Enable verbose output for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check every addon against its upstream releases and apply updates
    Update {
        /// Also apply patch-level updates (tag changed, application version did not)
        #[arg(short = 'P', long)]
        patch: bool,

        /// Skip Git operations (don't create branch, commit or push)
        #[arg(short = 'n', long)]
        no_git: bool,

        /// Branch the update branch is cut from
        #[arg(long, default_value = "master")]
        base_branch: String,

        /// Remote the update branch is pushed to
        #[arg(long, default_value = "origin")]
        remote: String,

        /// Record upstream fetch failures and continue with the next addon
        #[arg(long)]
        keep_going: bool,

        /// Token for the GitHub release API
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        github_token: Option<String>,
    },

    /// Build an addon with the containerised add-on builder
    Build {
        /// Addon directory name
        addon: String,

        /// Skip the Docker Hub existence check
        #[arg(long)]
        no_check: bool,

        /// Push the images instead of a test build
        #[arg(long)]
        no_test: bool,

        /// Docker registry user
        #[arg(long, requires = "password")]
        user: Option<String>,

        /// Docker registry password
        #[arg(long, requires = "user")]
        password: Option<String>,

        /// Target architecture (repeatable; defaults to the addon's arch list)
        #[arg(long, value_name = "ARCH")]
        arch: Vec<String>,

        /// Docker Hub namespace checked for existing images
        #[arg(long, value_name = "NAMESPACE")]
        docker_hub: Option<String>,
    },

    /// Regenerate the addon list in README.md
    Docs,
}

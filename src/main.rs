mod agents;
mod cli;
mod error;
mod repository;
mod utils;
mod workflow;

use agents::BuildOptions;
use clap::Parser;
use cli::{Cli, Commands};
use colored::Colorize;
use std::process;
use workflow::UpdateCommand;

fn main() {
    let cli = Cli::parse();

    if cli.verbose {
        unsafe {
            std::env::set_var("HAM_VERBOSE", "1");
        }
    }

    let result = match cli.command {
        Commands::Update {
            patch,
            no_git,
            base_branch,
            remote,
            keep_going,
            github_token,
        } => workflow::execute_update(
            &cli.path,
            UpdateCommand {
                allow_patch: patch,
                no_git,
                base_branch,
                remote,
                keep_going,
                github_token,
            },
        ),
        Commands::Build {
            addon,
            no_check,
            no_test,
            user,
            password,
            arch,
            docker_hub,
        } => workflow::execute_build(
            &cli.path,
            &addon,
            BuildOptions {
                arch,
                test: !no_test,
                check: !no_check,
                docker_user: user,
                docker_password: password,
                docker_hub,
            },
        ),
        Commands::Docs => workflow::execute_docs(&cli.path),
    };

    if let Err(e) = result {
        eprintln!("{} {}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

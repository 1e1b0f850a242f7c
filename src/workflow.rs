use crate::agents::update::{AddonOutcome, ConsolePrompt, SessionOutcome, UpdateSession};
use crate::agents::version_control::todays_update_branch;
use crate::agents::{
    AddonStore, AddonUpdater, BuildExecutionAgent, BuildOptions, ProjectScannerAgent,
    ReadmeGenerator, UpdateOptions, UpdateReport, VersionControlAgent,
};
use crate::error::Result;
use crate::repository::ReleaseSourceFactory;
use colored::Colorize;
use std::path::Path;

/// Settings of one `update` invocation.
#[derive(Debug, Clone)]
pub struct UpdateCommand {
    pub allow_patch: bool,
    pub no_git: bool,
    pub base_branch: String,
    pub remote: String,
    pub keep_going: bool,
    pub github_token: Option<String>,
}

/// Execute the update workflow
pub fn execute_update<P: AsRef<Path>>(project_path: P, command: UpdateCommand) -> Result<()> {
    println!("{}", "Starting addon update process...".cyan().bold());

    // Step 1: Validate project structure
    println!("\n{}", "1. Validating repository...".yellow());
    let scanner = ProjectScannerAgent::new(project_path);
    let project_info = scanner.validate()?;
    println!("{}", "✓ Repository root is valid".green());

    let use_git = if command.no_git {
        println!("\n{}", "2. Git disabled, changes stay in the working tree".yellow());
        false
    } else if project_info.has_git {
        println!("\n{}", "2. Git repository detected".yellow());
        true
    } else {
        println!(
            "\n{}",
            "2. Git repository not detected, skipping Git operations".yellow()
        );
        false
    };

    // Step 3: Reconcile every addon
    println!("\n{}", "3. Checking addons against upstream releases...".yellow());
    let store = AddonStore::new(&project_info.root);
    let source = ReleaseSourceFactory::create_github(command.github_token)?;
    let updater = AddonUpdater::new(
        &store,
        source,
        UpdateOptions {
            allow_patch: command.allow_patch,
            keep_going: command.keep_going,
        },
    );

    let mut prompt = ConsolePrompt;
    let report = if use_git {
        let mut git_agent = VersionControlAgent::new(&project_info.root)?;
        let branch = todays_update_branch();
        let mut session = UpdateSession::new(
            &mut git_agent,
            command.base_branch,
            command.remote,
            branch,
        );
        updater.run(Some(&mut session), &mut prompt)?
    } else {
        updater.run(None, &mut prompt)?
    };

    println!("{}", "✓ Update completed".green());

    // Step 4: Display summary
    print_update_report(&report);

    if report.failures().next().is_some() {
        println!(
            "\n{}",
            "⚠ Some upstream releases could not be fetched".red()
        );
    } else {
        println!(
            "\n{}",
            "✨ Update process completed successfully!".green().bold()
        );
    }
    Ok(())
}

fn print_update_report(report: &UpdateReport) {
    if report.outcomes.is_empty() {
        println!("\n{}", "No addons found".yellow());
        return;
    }

    println!("\n{}", "📦 Update Summary:".cyan().bold());

    if !report.is_empty() {
        println!("\n{}:", "Updated".cyan().bold());
        for update in report.updates() {
            println!(
                "  • {} {} → {} [{}] {} → {}",
                update.addon.white().bold(),
                update.previous_version.to_string().red(),
                update.new_version.to_string().green().bold(),
                update.bump,
                update.previous_tag.magenta(),
                update.new_tag.magenta()
            );
            println!("    {}", update.message.dimmed());
        }
    }

    let up_to_date = report.count(|o| *o == AddonOutcome::UpToDate);
    let ignored = report.count(|o| *o == AddonOutcome::PatchIgnored);
    println!(
        "\n  {} up-to-date, {} patch update(s) ignored",
        up_to_date.to_string().green(),
        ignored.to_string().bright_black()
    );

    let skipped: Vec<_> = report.skipped().collect();
    if !skipped.is_empty() {
        println!("\n{}:", "Skipped".yellow().bold());
        for (addon, reason) in skipped {
            println!("  • {} {}", addon.white().bold(), reason.dimmed());
        }
    }

    let failures: Vec<_> = report.failures().collect();
    if !failures.is_empty() {
        println!("\n{}:", "Failed".red().bold());
        for (addon, reason) in failures {
            println!("  • {} {}", addon.white().bold(), reason.bright_red());
        }
    }

    match &report.session {
        Some(SessionOutcome::Pushed { branch, commits }) => println!(
            "\n{}",
            format!("✓ Pushed {} commit(s) on branch: {}", commits.len(), branch).green()
        ),
        Some(SessionOutcome::Declined { branch, commits }) => println!(
            "\n{}",
            format!(
                "Branch {} with {} commit(s) was kept local, push it when ready",
                branch,
                commits.len()
            )
            .yellow()
        ),
        Some(SessionOutcome::Discarded { branch }) => println!(
            "\n{}",
            format!("No updates were applied, removed branch {}", branch).yellow()
        ),
        None if report.is_empty() => println!("\n{}", "No updates were applied".yellow()),
        None => {}
    }
}

/// Execute the build workflow for a single addon
pub fn execute_build<P: AsRef<Path>>(
    project_path: P,
    addon: &str,
    options: BuildOptions,
) -> Result<()> {
    println!(
        "{}",
        format!("Building addon {}...", addon).cyan().bold()
    );

    println!("\n{}", "1. Validating repository...".yellow());
    let project_info = ProjectScannerAgent::new(project_path).validate()?;
    let store = AddonStore::new(&project_info.root);
    let descriptor = store.load_descriptor(addon)?;
    println!(
        "{}",
        format!("✓ Loaded {} {}", addon, descriptor.version).green()
    );

    println!("\n{}", "2. Running add-on builder...".yellow());
    BuildExecutionAgent::new(&project_info.root).build(addon, &descriptor.arch, &options)?;

    println!("\n{}", "✨ Build completed successfully!".green().bold());
    Ok(())
}

/// Execute the docs workflow - regenerate the addon list in README.md
pub fn execute_docs<P: AsRef<Path>>(project_path: P) -> Result<()> {
    println!("{}", "Generating addon list...".cyan().bold());

    println!("\n{}", "1. Validating repository...".yellow());
    let project_info = ProjectScannerAgent::new(project_path).validate()?;
    println!("{}", "✓ Repository root is valid".green());

    println!("\n{}", "2. Writing README.md...".yellow());
    let store = AddonStore::new(&project_info.root);
    let listed = ReadmeGenerator::new(&store).generate()?;
    println!(
        "{}",
        format!("✓ Listed {} addon(s) in {}", listed, project_info.readme_path.display()).green()
    );

    Ok(())
}

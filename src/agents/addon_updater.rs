use crate::agents::addon_store::AddonStore;
use crate::agents::pin::Pin;
use crate::agents::update::{
    AddonOutcome, ChangeKind, MutationApplier, PushConfirmation, UpdateDecisionEngine,
    UpdateReport, UpdateSession, VersionExtractor,
};
use crate::error::{HamError, Result};
use crate::repository::{ReleaseRepository, ReleaseSource, UpstreamRelease};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::time::Duration;

/// Knobs for one update run.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateOptions {
    /// Apply patch-level changes, not only application version changes
    pub allow_patch: bool,
    /// Record upstream fetch failures per addon instead of aborting the run
    pub keep_going: bool,
}

/// AddonUpdater reconciles every addon in the repository against its upstream releases
pub struct AddonUpdater<'a> {
    store: &'a AddonStore,
    source: Arc<dyn ReleaseSource>,
    engine: UpdateDecisionEngine,
    keep_going: bool,
}

impl<'a> AddonUpdater<'a> {
    pub fn new(store: &'a AddonStore, source: Arc<dyn ReleaseSource>, options: UpdateOptions) -> Self {
        Self {
            store,
            source,
            engine: UpdateDecisionEngine::new(options.allow_patch),
            keep_going: options.keep_going,
        }
    }

    /// Runs every addon in directory order. Each addon's files and commit are
    /// finished before the next addon starts.
    pub fn run(
        &self,
        mut session: Option<&mut UpdateSession<'_>>,
        confirm: &mut dyn PushConfirmation,
    ) -> Result<UpdateReport> {
        if let Some(session) = session.as_deref_mut() {
            session.start()?;
        }

        let mut report = UpdateReport::new();

        for (index, addon) in self.store.addon_dirs()?.iter().enumerate() {
            if index > 0 {
                println!(
                    "{}",
                    "=============================================================".bright_black()
                );
            }

            let outcome = match self.reconcile(addon) {
                Ok(outcome) => outcome,
                Err(err) if err.is_addon_skip() => {
                    print_skip(addon, &err);
                    AddonOutcome::Skipped(err.to_string())
                }
                Err(err @ HamError::UpstreamFetch { .. }) if self.keep_going => {
                    println!("{} {}", addon.blue(), err.to_string().bright_red());
                    AddonOutcome::Failed(err.to_string())
                }
                Err(err) => return Err(err),
            };

            if let (AddonOutcome::Updated(update), Some(session)) =
                (&outcome, session.as_deref_mut())
            {
                session.commit_addon(addon, &update.message)?;
            }

            report.record(addon.as_str(), outcome);
        }

        if let Some(session) = session {
            report.session = Some(session.finish(confirm)?);
        }

        Ok(report)
    }

    /// Load, fetch, extract, decide and, when needed, mutate a single addon.
    pub fn reconcile(&self, addon: &str) -> Result<AddonOutcome> {
        let descriptor = self.store.load_descriptor(addon)?;
        let version = descriptor.parse_version(addon)?;
        println!(
            "loaded {} {}",
            addon.blue(),
            version.to_string().bright_cyan()
        );

        let policy = descriptor.policy(addon)?;
        let repository =
            ReleaseRepository::from_url(policy.upstream_repository_url.as_deref().unwrap_or_default())?;
        let version_extractor = VersionExtractor::new(policy.version_extract_pattern.as_deref())?;
        // Upstream tags are read with the version pattern unless they follow their own scheme
        let release_extractor = VersionExtractor::new(
            policy
                .release_extract_pattern
                .as_deref()
                .filter(|p| !p.trim().is_empty())
                .or(policy.version_extract_pattern.as_deref()),
        )?;
        let pin = self.store.load_pin(addon)?;

        let release = self.fetch_release(&repository, policy.include_prerelease)?;
        if release.prerelease {
            println!("{}", format!("{} is a pre-release", release.tag_name).yellow());
        }

        let local_token = version_extractor.token(pin.tag());
        let upstream_token = release_extractor.token(&release.tag_name);
        let decision = self
            .engine
            .decide(pin.tag(), &release.tag_name, &local_token, &upstream_token);

        let current = describe_pin(&pin, &decision.local_tag, &decision.local_token);
        let latest = describe_pin(&pin, &decision.upstream_tag, &decision.upstream_token);

        match decision.kind {
            ChangeKind::UpToDate => {
                println!("{}", format!("base {current} is up-to-date").bright_green());
                Ok(AddonOutcome::UpToDate)
            }
            ChangeKind::PatchIgnored => {
                println!(
                    "{}",
                    format!("ignoring patch for {current} to {latest}").bright_black()
                );
                Ok(AddonOutcome::PatchIgnored)
            }
            ChangeKind::Patch | ChangeKind::Minor => {
                let applied = MutationApplier::new(self.store).apply(
                    addon,
                    &descriptor,
                    &version,
                    &pin,
                    &decision,
                )?;
                Ok(AddonOutcome::Updated(applied))
            }
        }
    }

    fn fetch_release(
        &self,
        repository: &ReleaseRepository,
        include_prerelease: bool,
    ) -> Result<UpstreamRelease> {
        let spinner = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("  {spinner} {msg}") {
            spinner.set_style(style);
        }
        spinner.set_message(format!("fetching latest release of {}", repository));
        spinner.enable_steady_tick(Duration::from_millis(100));

        let release = self.source.fetch_release(repository, include_prerelease);
        spinner.finish_and_clear();
        release
    }
}

/// `image nginx:1.24` or `application v2.0.0`, with the extracted token highlighted.
fn describe_pin(pin: &Pin, tag: &str, token: &str) -> String {
    let tag = highlight_token(tag, token);
    match pin.image() {
        Some(image) => format!("image {}:{}", image, tag),
        None => format!("application {}", tag),
    }
}

fn highlight_token(tag: &str, token: &str) -> String {
    if token.is_empty() {
        return tag.magenta().to_string();
    }
    tag.replacen(token, &token.bright_yellow().to_string(), 1)
        .magenta()
        .to_string()
}

fn print_skip(addon: &str, err: &HamError) {
    match err {
        HamError::PolicyAbsent(_) => {
            println!("{}", "no valid maintenance section found, skipping".yellow())
        }
        HamError::DescriptorMissing(_) => println!(
            "{}",
            format!("no config found for addon {}, skipping", addon.blue()).bright_red()
        ),
        other => println!("{} {}", addon.blue(), format!("{other}, skipping").bright_red()),
    }
}

use crate::agents::update::mutation::AppliedUpdate;
use crate::agents::update::session::SessionOutcome;

/// What happened to one addon during a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddonOutcome {
    UpToDate,
    PatchIgnored,
    Updated(AppliedUpdate),
    /// Descriptor or policy problem; the run moved on
    Skipped(String),
    /// Upstream could not be reached (only recorded with `--keep-going`)
    Failed(String),
}

/// Per-addon outcomes in iteration order, plus how the update branch ended.
#[derive(Debug, Clone, Default)]
pub struct UpdateReport {
    pub outcomes: Vec<(String, AddonOutcome)>,
    pub session: Option<SessionOutcome>,
}

impl UpdateReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, addon: impl Into<String>, outcome: AddonOutcome) {
        self.outcomes.push((addon.into(), outcome));
    }

    pub fn updates(&self) -> impl Iterator<Item = &AppliedUpdate> {
        self.outcomes.iter().filter_map(|(_, outcome)| match outcome {
            AddonOutcome::Updated(update) => Some(update),
            _ => None,
        })
    }

    pub fn skipped(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(addon, outcome)| match outcome {
            AddonOutcome::Skipped(reason) => Some((addon.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.outcomes.iter().filter_map(|(addon, outcome)| match outcome {
            AddonOutcome::Failed(reason) => Some((addon.as_str(), reason.as_str())),
            _ => None,
        })
    }

    pub fn count(&self, predicate: impl Fn(&AddonOutcome) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| predicate(o)).count()
    }

    #[cfg(test)]
    pub fn outcome(&self, addon: &str) -> Option<&AddonOutcome> {
        self.outcomes
            .iter()
            .find(|(name, _)| name == addon)
            .map(|(_, outcome)| outcome)
    }

    /// True when no addon was updated.
    pub fn is_empty(&self) -> bool {
        self.total_updates() == 0
    }

    pub fn total_updates(&self) -> usize {
        self.updates().count()
    }
}

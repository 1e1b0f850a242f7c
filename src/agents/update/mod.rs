// Update module - the release reconciliation pipeline for a single addon and
// the branch bookkeeping around a whole run.
//
// - VersionExtractor: pulls comparable version tokens out of tags
// - UpdateDecisionEngine: classifies a tag change as up-to-date / patch / minor
// - MutationApplier: rewrites the pin, bumps the version, writes the changelog
// - UpdateSession: the per-run git branch state machine
// - PushConfirmation: the interactive push gate
pub mod context;
pub mod decision;
pub mod extractor;
pub mod interaction;
pub mod mutation;
pub mod session;

pub use context::{AddonOutcome, UpdateReport};
pub use decision::{ChangeKind, UpdateDecisionEngine};
pub use extractor::VersionExtractor;
pub use interaction::{ConsolePrompt, PushConfirmation};
pub use mutation::MutationApplier;
pub use session::{SessionOutcome, UpdateSession};

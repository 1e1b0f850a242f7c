pub mod addon_store;
pub mod addon_updater;
pub mod build_execution;
pub mod changelog;
pub mod pin;
pub mod project_scanner;
pub mod readme_generator;
pub mod version_control;

// Per-addon reconciliation pipeline and run bookkeeping
pub mod update;
pub use update::UpdateReport;

#[cfg(test)]
pub(crate) mod testing;

pub use addon_store::AddonStore;
pub use addon_updater::{AddonUpdater, UpdateOptions};
pub use build_execution::{BuildExecutionAgent, BuildOptions};
pub use project_scanner::ProjectScannerAgent;
pub use readme_generator::ReadmeGenerator;
pub use version_control::VersionControlAgent;

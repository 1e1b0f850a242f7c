use crate::agents::addon_store::AddonStore;
use crate::error::{HamError, Result};
use colored::Colorize;
use std::fs;

pub const ADDONLIST_START: &str = "[//]: # (ADDONLIST_START)";
pub const ADDONLIST_END: &str = "[//]: # (ADDONLIST_END)";

/// Regenerates the addon list section of the repository README.
pub struct ReadmeGenerator<'a> {
    store: &'a AddonStore,
}

impl<'a> ReadmeGenerator<'a> {
    pub fn new(store: &'a AddonStore) -> Self {
        Self { store }
    }

    /// Rewrites the README in place and returns the number of listed addons.
    pub fn generate(&self) -> Result<usize> {
        let readme_path = self.store.readme_path();
        let readme = fs::read_to_string(&readme_path).map_err(|e| {
            HamError::ProjectValidation(format!("Cannot read {}: {e}", readme_path.display()))
        })?;

        let mut entries = Vec::new();
        for addon in self.store.addon_dirs()? {
            match self.store.load_descriptor(&addon) {
                Ok(descriptor) => entries.push(addon_entry(
                    &addon,
                    descriptor.description.as_deref().unwrap_or_default(),
                )),
                Err(err) if err.is_addon_skip() => {
                    println!("{}", format!("{err}, leaving it out of the list").yellow());
                }
                Err(err) => return Err(err),
            }
        }

        let updated = replace_addon_list(&readme, &entries)?;
        if updated != readme {
            fs::write(&readme_path, updated)?;
        }
        Ok(entries.len())
    }
}

pub fn addon_entry(addon: &str, description: &str) -> String {
    format!("### [{addon}]({addon}/)\n{description}\n")
}

/// Replaces everything between the list markers, keeping the markers.
pub fn replace_addon_list(readme: &str, entries: &[String]) -> Result<String> {
    let start = readme
        .find(ADDONLIST_START)
        .map(|i| i + ADDONLIST_START.len())
        .ok_or_else(|| missing_marker(ADDONLIST_START))?;
    let end = readme[start..]
        .find(ADDONLIST_END)
        .map(|i| start + i)
        .ok_or_else(|| missing_marker(ADDONLIST_END))?;

    let mut output = String::with_capacity(readme.len());
    output.push_str(&readme[..start]);
    output.push_str("\n\n");
    output.push_str(&entries.join("\n"));
    output.push('\n');
    output.push_str(&readme[end..]);
    Ok(output)
}

fn missing_marker(marker: &str) -> HamError {
    HamError::ProjectValidation(format!("README.md has no '{marker}' marker"))
}

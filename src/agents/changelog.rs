use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};

/// Append-only markdown changelog, newest section first.
pub struct Changelog {
    path: PathBuf,
}

impl Changelog {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Writes a new section above all existing content. Existing text is never touched.
    pub fn prepend_section(&self, version: &str, entries: &[String]) -> Result<()> {
        let previous = if self.path.exists() {
            fs::read_to_string(&self.path)?
        } else {
            String::new()
        };

        let mut changelog = render_section(version, entries);
        if !previous.is_empty() {
            changelog.push('\n');
            changelog.push_str(&previous);
        }

        fs::write(&self.path, changelog)?;
        Ok(())
    }
}

pub fn render_section(version: &str, entries: &[String]) -> String {
    let mut section = format!("## {version}\n\n");
    for entry in entries {
        section.push_str(&format!(" - {entry}\n"));
    }
    section
}

use crate::error::{HamError, Result};
use regex::Regex;

/// Pulls a comparable version token out of a tag using a single-capture-group pattern.
///
/// When the pattern is missing or captures nothing the token is empty and the
/// comparison falls back to the raw tags. Only compiling the pattern can fail.
#[derive(Debug, Clone, Default)]
pub struct VersionExtractor {
    pattern: Option<Regex>,
}

impl VersionExtractor {
    pub fn new(pattern: Option<&str>) -> Result<Self> {
        let pattern = match pattern.map(str::trim).filter(|p| !p.is_empty()) {
            Some(raw) => Some(Regex::new(raw).map_err(|source| HamError::InvalidPattern {
                pattern: raw.to_string(),
                source,
            })?),
            None => None,
        };

        Ok(Self { pattern })
    }

    /// The first capture group, if the pattern matched and captured.
    pub fn capture<'t>(&self, tag: &'t str) -> Option<&'t str> {
        let captures = self.pattern.as_ref()?.captures(tag)?;
        captures.get(1).map(|m| m.as_str())
    }

    /// The captured substring, or an empty token when nothing was captured.
    pub fn token(&self, tag: &str) -> String {
        self.capture(tag).unwrap_or_default().to_string()
    }
}

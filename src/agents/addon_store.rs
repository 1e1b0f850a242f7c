use crate::agents::changelog::Changelog;
use crate::agents::pin::{BuildDescriptor, Pin, parse_base_image_line};
use crate::error::{HamError, Result};
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use std::fs;
use std::path::{Path, PathBuf};

pub const DESCRIPTOR_FILE: &str = "config.json";
pub const BUILD_DESCRIPTOR_FILE: &str = "build.json";
pub const BASE_IMAGE_FILE: &str = "Dockerfile";
pub const CHANGELOG_FILE: &str = "CHANGELOG.md";
const TMP_DIR: &str = "tmp";

/// Typed read view of an addon's `config.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct AddonDescriptor {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub arch: Vec<String>,
    #[serde(default)]
    pub maintenance: Option<MaintenancePolicy>,
}

/// The `maintenance` block. Legacy snake_case keys are accepted as aliases.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaintenancePolicy {
    #[serde(default, alias = "github_release")]
    pub upstream_repository_url: Option<String>,
    #[serde(default, alias = "version_regex")]
    pub version_extract_pattern: Option<String>,
    #[serde(default, alias = "release_regex")]
    pub release_extract_pattern: Option<String>,
    #[serde(default, alias = "include_prerelease")]
    pub include_prerelease: bool,
}

impl AddonDescriptor {
    /// Name used in changelog and commit messages; falls back to the directory name.
    pub fn display_name<'a>(&'a self, addon: &'a str) -> &'a str {
        if self.name.trim().is_empty() {
            addon
        } else {
            &self.name
        }
    }

    pub fn parse_version(&self, addon: &str) -> Result<semver::Version> {
        let trimmed = self.version.trim();
        let candidate = trimmed.strip_prefix('v').unwrap_or(trimmed);
        semver::Version::parse(candidate).map_err(|_| HamError::DescriptorInvalidVersion {
            addon: addon.to_string(),
            version: self.version.clone(),
        })
    }

    /// The maintenance block, provided it names an upstream repository.
    pub fn policy(&self, addon: &str) -> Result<&MaintenancePolicy> {
        self.maintenance
            .as_ref()
            .filter(|policy| {
                policy
                    .upstream_repository_url
                    .as_deref()
                    .is_some_and(|url| !url.trim().is_empty())
            })
            .ok_or_else(|| HamError::PolicyAbsent(addon.to_string()))
    }
}

/// Reads and writes the per-addon files under the repository root.
pub struct AddonStore {
    root: PathBuf,
}

impl AddonStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Every non-hidden addon directory, sorted by name.
    pub fn addon_dirs(&self) -> Result<Vec<String>> {
        let mut dirs = Vec::new();

        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') || name == TMP_DIR {
                continue;
            }
            if entry.file_type()?.is_dir() {
                dirs.push(name);
            }
        }

        dirs.sort();
        Ok(dirs)
    }

    pub fn addon_path(&self, addon: &str) -> PathBuf {
        self.root.join(addon)
    }

    pub fn descriptor_path(&self, addon: &str) -> PathBuf {
        self.addon_path(addon).join(DESCRIPTOR_FILE)
    }

    pub fn build_descriptor_path(&self, addon: &str) -> PathBuf {
        self.addon_path(addon).join(BUILD_DESCRIPTOR_FILE)
    }

    pub fn base_image_path(&self, addon: &str) -> PathBuf {
        self.addon_path(addon).join(BASE_IMAGE_FILE)
    }

    pub fn readme_path(&self) -> PathBuf {
        self.root.join("README.md")
    }

    pub fn changelog(&self, addon: &str) -> Changelog {
        Changelog::new(self.addon_path(addon).join(CHANGELOG_FILE))
    }

    pub fn load_descriptor(&self, addon: &str) -> Result<AddonDescriptor> {
        let path = self.descriptor_path(addon);
        if !path.exists() {
            return Err(HamError::DescriptorMissing(addon.to_string()));
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Rewrites only the `version` field of `config.json`; key order and unknown fields survive.
    pub fn write_descriptor_version(&self, addon: &str, version: &semver::Version) -> Result<()> {
        let path = self.descriptor_path(addon);
        let mut doc: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;

        match doc.as_object_mut() {
            Some(object) => {
                object.insert("version".to_string(), Value::String(version.to_string()));
            }
            None => return Err(HamError::DescriptorMissing(addon.to_string())),
        }

        write_json(&path, &doc)
    }

    pub fn load_build_descriptor(&self, addon: &str) -> Result<Option<BuildDescriptor>> {
        let path = self.build_descriptor_path(addon);
        if !path.exists() {
            return Ok(None);
        }

        let doc: Value = serde_json::from_str(&fs::read_to_string(&path)?)?;
        Ok(Some(BuildDescriptor::from_value(doc)))
    }

    pub fn save_build_descriptor(&self, addon: &str, build: &BuildDescriptor) -> Result<()> {
        write_json(&self.build_descriptor_path(addon), build.as_value())
    }

    pub fn read_base_image(&self, addon: &str) -> Result<String> {
        Ok(fs::read_to_string(self.base_image_path(addon))?)
    }

    pub fn write_base_image(&self, addon: &str, content: &str) -> Result<()> {
        Ok(fs::write(self.base_image_path(addon), content)?)
    }

    /// Resolves the pin: build.json when present, otherwise the Dockerfile's first line.
    pub fn load_pin(&self, addon: &str) -> Result<Pin> {
        let invalid = |reason: &str| HamError::InvalidPin {
            addon: addon.to_string(),
            reason: reason.to_string(),
        };

        if let Some(build) = self.load_build_descriptor(addon)? {
            return build
                .pin()
                .ok_or_else(|| invalid("build.json has neither a template nor a release"));
        }

        if !self.base_image_path(addon).exists() {
            return Err(invalid("no Dockerfile or build.json"));
        }

        let dockerfile = self.read_base_image(addon)?;
        let (image, tag) = parse_base_image_line(&dockerfile)
            .ok_or_else(|| invalid("first Dockerfile line is not 'FROM <image>:<tag>'"))?;

        Ok(Pin::Image { image, tag })
    }
}

fn write_json(path: &Path, doc: &Value) -> Result<()> {
    let mut buffer = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    doc.serialize(&mut serializer)?;
    buffer.push(b'\n');
    fs::write(path, buffer)?;
    Ok(())
}

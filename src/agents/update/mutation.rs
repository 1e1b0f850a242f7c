use crate::agents::addon_store::{AddonDescriptor, AddonStore};
use crate::agents::pin::{BuildDescriptor, Pin};
use crate::agents::update::decision::{ChangeDecision, VersionBump};
use crate::error::{HamError, Result};
use colored::Colorize;

/// What was written for one addon; the message doubles as changelog entry and commit subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppliedUpdate {
    pub addon: String,
    pub bump: VersionBump,
    pub previous_version: semver::Version,
    pub new_version: semver::Version,
    pub previous_tag: String,
    pub new_tag: String,
    pub message: String,
}

/// Rewrites the pin, bumps the addon version and prepends a changelog section.
pub struct MutationApplier<'a> {
    store: &'a AddonStore,
}

impl<'a> MutationApplier<'a> {
    pub fn new(store: &'a AddonStore) -> Self {
        Self { store }
    }

    /// Applies an update decision. Side effects happen in order: pin file,
    /// descriptor version, changelog.
    pub fn apply(
        &self,
        addon: &str,
        descriptor: &AddonDescriptor,
        current_version: &semver::Version,
        pin: &Pin,
        decision: &ChangeDecision,
    ) -> Result<AppliedUpdate> {
        let (Some(bump), Some(new_tag)) = (decision.kind.bump(), decision.new_tag()) else {
            return Err(HamError::InvalidPin {
                addon: addon.to_string(),
                reason: format!("nothing to apply for a {} decision", decision.kind),
            });
        };

        self.rewrite_pin(addon, pin, &decision.local_tag, new_tag)?;

        let new_version = bump.apply(current_version);
        println!(
            "{}",
            format!(
                "bumping version from {} to {}",
                current_version.to_string().bright_cyan(),
                new_version.to_string().bright_cyan()
            )
            .yellow()
        );
        self.store.write_descriptor_version(addon, &new_version)?;

        let message = change_message(descriptor.display_name(addon), pin, decision);
        self.store
            .changelog(addon)
            .prepend_section(&new_version.to_string(), std::slice::from_ref(&message))?;

        Ok(AppliedUpdate {
            addon: addon.to_string(),
            bump,
            previous_version: current_version.clone(),
            new_version,
            previous_tag: decision.local_tag.clone(),
            new_tag: new_tag.to_string(),
            message,
        })
    }

    fn rewrite_pin(&self, addon: &str, pin: &Pin, old_tag: &str, new_tag: &str) -> Result<()> {
        match pin {
            Pin::Image { image, .. } => {
                println!(
                    "{}",
                    format!(
                        "updating base image from {}:{} to {}:{}",
                        image,
                        old_tag.magenta(),
                        image,
                        new_tag.magenta()
                    )
                    .bright_yellow()
                );
                let dockerfile = self.store.read_base_image(addon)?;
                let pinned = format!("{image}:{old_tag}");
                if !dockerfile.contains(&pinned) {
                    return Err(unwritable_pin(addon, "Dockerfile no longer holds the pinned image"));
                }
                let updated = dockerfile.replacen(&pinned, &format!("{image}:{new_tag}"), 1);
                self.store.write_base_image(addon, &updated)
            }
            Pin::Template { image, .. } => {
                println!(
                    "{}",
                    format!(
                        "updating base images in build.json from {}:{{arch}}-{} to {}:{{arch}}-{}",
                        image,
                        old_tag.magenta(),
                        image,
                        new_tag.magenta()
                    )
                    .bright_yellow()
                );
                let mut build = self.load_build(addon)?;
                if !build.retag_template(old_tag, new_tag) {
                    return Err(unwritable_pin(addon, "build.json has no template to retag"));
                }
                self.store.save_build_descriptor(addon, &build)
            }
            Pin::Release { .. } => {
                println!(
                    "{}",
                    format!(
                        "updating application release in build.json from {} to {}",
                        old_tag.magenta(),
                        new_tag.magenta()
                    )
                    .bright_yellow()
                );
                let mut build = self.load_build(addon)?;
                if !build.set_release(new_tag) {
                    return Err(unwritable_pin(addon, "build.json has no release field"));
                }
                self.store.save_build_descriptor(addon, &build)
            }
        }
    }

    fn load_build(&self, addon: &str) -> Result<BuildDescriptor> {
        self.store
            .load_build_descriptor(addon)?
            .ok_or_else(|| unwritable_pin(addon, "build.json disappeared during the run"))
    }
}

fn unwritable_pin(addon: &str, reason: &str) -> HamError {
    HamError::InvalidPin {
        addon: addon.to_string(),
        reason: reason.to_string(),
    }
}

/// Changelog bullet and commit message for an update.
pub fn change_message(display_name: &str, pin: &Pin, decision: &ChangeDecision) -> String {
    let new_tag = &decision.upstream_tag;
    let token = &decision.upstream_token;

    match pin {
        // Without a captured application version the raw tag stands in for it
        Pin::Release { .. } if token.is_empty() => {
            format!("Update {display_name} to {new_tag} ({new_tag})")
        }
        Pin::Release { .. } => format!("Update {display_name} to {token} ({new_tag})"),
        Pin::Image { image, .. } | Pin::Template { image, .. } => {
            if decision.is_minor() {
                format!("Update {display_name} to {token} ({image}:{new_tag})")
            } else {
                format!("Update base image to {image}:{new_tag}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::addon_store::{
        BASE_IMAGE_FILE, BUILD_DESCRIPTOR_FILE, CHANGELOG_FILE, DESCRIPTOR_FILE,
    };
    use crate::agents::update::decision::UpdateDecisionEngine;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn setup(root: &Path, addon: &str, files: &[(&str, &str)]) -> AddonStore {
        let dir = root.join(addon);
        fs::create_dir_all(&dir).unwrap();
        for (name, content) in files {
            fs::write(dir.join(name), content).unwrap();
        }
        AddonStore::new(root)
    }

    fn apply(store: &AddonStore, addon: &str, decision: &ChangeDecision) -> AppliedUpdate {
        let descriptor = store.load_descriptor(addon).unwrap();
        let version = descriptor.parse_version(addon).unwrap();
        let pin = store.load_pin(addon).unwrap();
        MutationApplier::new(store)
            .apply(addon, &descriptor, &version, &pin, decision)
            .unwrap()
    }

    #[test]
    fn image_pin_patch_update() {
        let dir = tempdir().unwrap();
        let store = setup(
            dir.path(),
            "nginx",
            &[
                (DESCRIPTOR_FILE, r#"{"name":"Nginx","version":"1.2.3"}"#),
                (BASE_IMAGE_FILE, "FROM nginx:1.24\nRUN apk add curl\n"),
            ],
        );
        let decision = UpdateDecisionEngine::new(true).decide("1.24", "1.25", "", "");

        let applied = apply(&store, "nginx", &decision);

        assert_eq!(applied.new_version, semver::Version::new(1, 2, 4));
        assert_eq!(applied.message, "Update base image to nginx:1.25");
        assert_eq!(
            fs::read_to_string(store.base_image_path("nginx")).unwrap(),
            "FROM nginx:1.25\nRUN apk add curl\n"
        );
        let changelog = fs::read_to_string(dir.path().join("nginx").join(CHANGELOG_FILE)).unwrap();
        assert_eq!(changelog, "## 1.2.4\n\n - Update base image to nginx:1.25\n");
    }

    #[test]
    fn image_pin_only_first_occurrence_is_rewritten() {
        let dir = tempdir().unwrap();
        let store = setup(
            dir.path(),
            "multi",
            &[
                (DESCRIPTOR_FILE, r#"{"name":"Multi","version":"0.1.0"}"#),
                (BASE_IMAGE_FILE, "FROM alpine:3.18\nCOPY --from=alpine:3.18 /etc /etc\n"),
            ],
        );
        let decision = UpdateDecisionEngine::new(true).decide("3.18", "3.19", "", "");

        apply(&store, "multi", &decision);

        assert_eq!(
            fs::read_to_string(store.base_image_path("multi")).unwrap(),
            "FROM alpine:3.19\nCOPY --from=alpine:3.18 /etc /etc\n"
        );
    }

    #[test]
    fn image_pin_minor_update_names_the_application() {
        let dir = tempdir().unwrap();
        let store = setup(
            dir.path(),
            "grafana",
            &[
                (DESCRIPTOR_FILE, r#"{"name":"Grafana","version":"2.4.1"}"#),
                (BASE_IMAGE_FILE, "FROM grafana/grafana:9.5.2-ubuntu\n"),
            ],
        );
        let decision =
            UpdateDecisionEngine::new(false).decide("9.5.2-ubuntu", "10.0.0-ubuntu", "9.5.2", "10.0.0");

        let applied = apply(&store, "grafana", &decision);

        assert_eq!(applied.new_version, semver::Version::new(2, 5, 0));
        assert_eq!(
            applied.message,
            "Update Grafana to 10.0.0 (grafana/grafana:10.0.0-ubuntu)"
        );
    }

    #[test]
    fn template_pin_rewrites_version_and_architectures() {
        let dir = tempdir().unwrap();
        let store = setup(
            dir.path(),
            "base",
            &[
                (DESCRIPTOR_FILE, r#"{"name":"Base","version":"1.0.0"}"#),
                (
                    BUILD_DESCRIPTOR_FILE,
                    r#"{"template":{"image":"hassioaddons/base","version":"8.0.1"},
                        "buildFrom":{"amd64":"hassioaddons/base-amd64:8.0.1","armv7":"hassioaddons/base-armv7:8.0.1"}}"#,
                ),
            ],
        );
        let decision = UpdateDecisionEngine::new(true).decide("8.0.1", "8.0.2", "", "");

        let applied = apply(&store, "base", &decision);

        assert_eq!(applied.message, "Update base image to hassioaddons/base:8.0.2");
        let build: Value =
            serde_json::from_str(&fs::read_to_string(store.build_descriptor_path("base")).unwrap())
                .unwrap();
        assert_eq!(build["template"]["version"], "8.0.2");
        assert_eq!(build["buildFrom"]["amd64"], "hassioaddons/base-amd64:8.0.2");
        assert_eq!(build["buildFrom"]["armv7"], "hassioaddons/base-armv7:8.0.2");
    }

    #[test]
    fn release_pin_minor_update() {
        let dir = tempdir().unwrap();
        let store = setup(
            dir.path(),
            "app",
            &[
                (DESCRIPTOR_FILE, r#"{"name":"App","version":"1.4.2","slug":"app"}"#),
                (BUILD_DESCRIPTOR_FILE, r#"{"release":"v2.0.0"}"#),
            ],
        );
        let decision = UpdateDecisionEngine::new(false).decide("v2.0.0", "v2.1.0", "2.0.0", "2.1.0");

        let applied = apply(&store, "app", &decision);

        assert_eq!(applied.new_version, semver::Version::new(1, 5, 0));
        assert_eq!(applied.message, "Update App to 2.1.0 (v2.1.0)");
        let build: Value =
            serde_json::from_str(&fs::read_to_string(store.build_descriptor_path("app")).unwrap())
                .unwrap();
        assert_eq!(build["release"], "v2.1.0");
        let descriptor: Value =
            serde_json::from_str(&fs::read_to_string(store.descriptor_path("app")).unwrap())
                .unwrap();
        assert_eq!(descriptor["version"], "1.5.0");
        assert_eq!(descriptor["slug"], "app");
    }

    #[test]
    fn release_message_without_token_uses_tag() {
        let pin = Pin::Release {
            tag: "r41".to_string(),
        };
        let decision = UpdateDecisionEngine::new(true).decide("r41", "r42", "", "");
        assert_eq!(change_message("App", &pin, &decision), "Update App to r42 (r42)");
    }

    #[test]
    fn display_name_falls_back_to_directory() {
        let dir = tempdir().unwrap();
        let store = setup(
            dir.path(),
            "unnamed",
            &[
                (DESCRIPTOR_FILE, r#"{"version":"0.0.1"}"#),
                (BUILD_DESCRIPTOR_FILE, r#"{"release":"1.0"}"#),
            ],
        );
        let decision = UpdateDecisionEngine::new(false).decide("1.0", "1.1", "1.0", "1.1");

        let applied = apply(&store, "unnamed", &decision);

        assert_eq!(applied.message, "Update unnamed to 1.1 (1.1)");
    }

    #[test]
    fn unwritable_pin_stops_before_version_and_changelog() {
        let dir = tempdir().unwrap();
        let config = r#"{"name":"App","version":"1.0.0"}"#;
        let store = setup(
            dir.path(),
            "app",
            &[
                (DESCRIPTOR_FILE, config),
                (BUILD_DESCRIPTOR_FILE, r#"{"squash":true}"#),
            ],
        );
        let descriptor = store.load_descriptor("app").unwrap();
        let pin = Pin::Release {
            tag: "v1".to_string(),
        };
        let decision = UpdateDecisionEngine::new(true).decide("v1", "v2", "", "");

        let err = MutationApplier::new(&store)
            .apply("app", &descriptor, &semver::Version::new(1, 0, 0), &pin, &decision)
            .unwrap_err();

        assert!(matches!(err, HamError::InvalidPin { .. }));
        assert_eq!(fs::read_to_string(store.descriptor_path("app")).unwrap(), config);
        assert!(!dir.path().join("app").join(CHANGELOG_FILE).exists());
    }

    #[test]
    fn up_to_date_decision_is_not_applied() {
        let dir = tempdir().unwrap();
        let store = setup(
            dir.path(),
            "nginx",
            &[
                (DESCRIPTOR_FILE, r#"{"name":"Nginx","version":"1.2.3"}"#),
                (BASE_IMAGE_FILE, "FROM nginx:1.24\n"),
            ],
        );
        let descriptor = store.load_descriptor("nginx").unwrap();
        let pin = store.load_pin("nginx").unwrap();
        let decision = UpdateDecisionEngine::new(true).decide("1.24", "1.24", "", "");

        let err = MutationApplier::new(&store)
            .apply("nginx", &descriptor, &semver::Version::new(1, 2, 3), &pin, &decision)
            .unwrap_err();

        assert!(matches!(err, HamError::InvalidPin { .. }));
        assert_eq!(
            fs::read_to_string(store.base_image_path("nginx")).unwrap(),
            "FROM nginx:1.24\n"
        );
    }
}

use serde_json::Value;

/// Where an addon's upstream version is pinned. Exactly one applies per addon.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pin {
    /// `FROM <image>:<tag>` on the first line of the Dockerfile
    Image { image: String, tag: String },
    /// `template.version` in build.json, mirrored into every `buildFrom` image
    Template { image: String, tag: String },
    /// Application release tag held directly in build.json
    Release { tag: String },
}

impl Pin {
    pub fn tag(&self) -> &str {
        match self {
            Pin::Image { tag, .. } | Pin::Template { tag, .. } | Pin::Release { tag } => tag,
        }
    }

    pub fn image(&self) -> Option<&str> {
        match self {
            Pin::Image { image, .. } | Pin::Template { image, .. } => Some(image),
            Pin::Release { .. } => None,
        }
    }
}

/// Splits the first line of a Dockerfile into `(image, tag)`.
pub fn parse_base_image_line(dockerfile: &str) -> Option<(String, String)> {
    let first_line = dockerfile.lines().next()?.trim();
    let reference = first_line.strip_prefix("FROM ")?.trim_start();
    let reference = reference.split_whitespace().next()?;
    let (image, tag) = reference.rsplit_once(':')?;

    // `registry:5000/image` has a port, not a tag
    if image.is_empty() || tag.is_empty() || tag.contains('/') {
        return None;
    }

    Some((image.to_string(), tag.to_string()))
}

const TEMPLATE_KEYS: [&str; 2] = ["template", "build_from_template"];
const BUILD_FROM_KEYS: [&str; 2] = ["buildFrom", "build_from"];

/// Lossless view over build.json. Edits touch only the pinned fields and
/// write back under whichever key spelling the file already uses.
#[derive(Debug, Clone, PartialEq)]
pub struct BuildDescriptor {
    doc: Value,
}

impl BuildDescriptor {
    pub fn from_value(doc: Value) -> Self {
        Self { doc }
    }

    pub fn as_value(&self) -> &Value {
        &self.doc
    }

    /// Template pins win over release pins when both are present.
    pub fn pin(&self) -> Option<Pin> {
        if let Some(template) = self.template() {
            let image = template.get("image").and_then(Value::as_str)?;
            let tag = template.get("version").and_then(Value::as_str)?;
            return Some(Pin::Template {
                image: image.to_string(),
                tag: tag.to_string(),
            });
        }

        self.release().map(|tag| Pin::Release {
            tag: tag.to_string(),
        })
    }

    /// Sets the template version and swaps `old_tag` for `new_tag` inside
    /// every per-architecture image string.
    pub fn retag_template(&mut self, old_tag: &str, new_tag: &str) -> bool {
        let Some(key) = find_key(&self.doc, &TEMPLATE_KEYS) else {
            return false;
        };

        if let Some(template) = self.doc.get_mut(key).and_then(Value::as_object_mut) {
            template.insert("version".to_string(), Value::String(new_tag.to_string()));
        }

        if let Some(key) = find_key(&self.doc, &BUILD_FROM_KEYS) {
            if let Some(images) = self.doc.get_mut(key).and_then(Value::as_object_mut) {
                for image in images.values_mut() {
                    if let Some(current) = image.as_str() {
                        *image = Value::String(current.replace(old_tag, new_tag));
                    }
                }
            }
        }

        true
    }

    pub fn set_release(&mut self, new_tag: &str) -> bool {
        if self.doc.get("release").is_some_and(Value::is_string) {
            self.doc["release"] = Value::String(new_tag.to_string());
            return true;
        }

        match self
            .doc
            .get_mut("args")
            .and_then(Value::as_object_mut)
            .and_then(|args| args.get_mut("RELEASE"))
        {
            Some(release) => {
                *release = Value::String(new_tag.to_string());
                true
            }
            None => false,
        }
    }

    fn template(&self) -> Option<&serde_json::Map<String, Value>> {
        find_key(&self.doc, &TEMPLATE_KEYS).and_then(|key| self.doc.get(key)?.as_object())
    }

    fn release(&self) -> Option<&str> {
        self.doc
            .get("release")
            .and_then(Value::as_str)
            .or_else(|| self.doc.get("args")?.get("RELEASE")?.as_str())
    }
}

fn find_key(doc: &Value, candidates: &[&'static str]) -> Option<&'static str> {
    candidates
        .iter()
        .copied()
        .find(|key| doc.get(*key).is_some_and(Value::is_object))
}

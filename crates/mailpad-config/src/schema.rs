/// Versioned layouts of the stored draft blob.
///
/// Older builds stored a single flat draft object under the storage key.
/// The current layout is a versioned map of drafts keyed by template ID.
/// Both are modeled as variants of [`StoredSchema`] and converted once, at
/// load time, by [`StoredSchema::migrate`].
use std::collections::BTreeMap;
use std::fmt;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Version written into every current-layout blob and draft record.
pub const STORAGE_VERSION: &str = "2.0.0";

/// Version assumed for flat drafts that carried no version field.
pub const LEGACY_VERSION: &str = "1.0.0";

const DEFAULT_KEY: &str = "default";

/// Identifies one draft slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DraftKey {
    /// Draft not bound to any template.
    Default,
    Template(u32),
}

impl DraftKey {
    pub fn for_template(template_id: Option<u32>) -> Self {
        template_id.map_or(Self::Default, Self::Template)
    }

    /// Map key used inside the stored blob.
    pub fn storage_key(&self) -> String {
        match self {
            Self::Default => DEFAULT_KEY.to_string(),
            Self::Template(id) => id.to_string(),
        }
    }

    /// Parses a map key. Returns `None` for keys this build doesn't know.
    pub fn from_storage_key(key: &str) -> Option<Self> {
        if key == DEFAULT_KEY {
            return Some(Self::Default);
        }
        key.parse().ok().map(Self::Template)
    }
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str(DEFAULT_KEY),
            Self::Template(id) => write!(f, "template {id}"),
        }
    }
}

/// One saved draft.
///
/// Records moved over from the flat layout may lack `content`, `timestamp`
/// or `version`; those fall back to empty, zero and [`LEGACY_VERSION`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftRecord {
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Save time in unix milliseconds.
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default = "legacy_version")]
    pub version: String,
}

fn legacy_version() -> String {
    LEGACY_VERSION.to_string()
}

/// Current layout: `{ "version": "2.0.0", "drafts": { "<key>": DraftRecord } }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftsV2 {
    pub version: String,
    pub drafts: BTreeMap<String, DraftRecord>,
}

impl Default for DraftsV2 {
    fn default() -> Self {
        Self {
            version: STORAGE_VERSION.to_string(),
            drafts: BTreeMap::new(),
        }
    }
}

impl DraftsV2 {
    pub fn get(&self, key: DraftKey) -> Option<&DraftRecord> {
        self.drafts.get(&key.storage_key())
    }

    pub fn insert(&mut self, key: DraftKey, record: DraftRecord) {
        self.drafts.insert(key.storage_key(), record);
    }

    pub fn remove(&mut self, key: DraftKey) -> Option<DraftRecord> {
        self.drafts.remove(&key.storage_key())
    }

    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Drafts with a recognized key, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (DraftKey, &DraftRecord)> {
        self.drafts
            .iter()
            .filter_map(|(k, v)| DraftKey::from_storage_key(k).map(|key| (key, v)))
    }
}

/// Original flat layout: a single draft object with no envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub version: Option<String>,
}

/// Every layout the storage key may hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredSchema {
    Current(DraftsV2),
    Legacy(LegacyDraft),
}

impl StoredSchema {
    /// Parses a stored blob.
    ///
    /// # Errors
    ///
    /// Returns an error when the blob is not JSON or matches neither
    /// layout (for instance a flat object without a `title`).
    pub fn parse(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("Stored drafts match no known layout")
    }

    pub fn is_current(&self) -> bool {
        matches!(self, Self::Current(_))
    }

    /// Converts any layout into the current one.
    ///
    /// A legacy flat draft becomes the `default` draft; it is never
    /// attributed to a template.
    pub fn migrate(self) -> DraftsV2 {
        match self {
            Self::Current(mut drafts) => {
                drafts.version = STORAGE_VERSION.to_string();
                drafts
            }
            Self::Legacy(old) => {
                let mut drafts = DraftsV2::default();
                drafts.insert(
                    DraftKey::Default,
                    DraftRecord {
                        title: old.title,
                        content: old.content,
                        timestamp: old.timestamp,
                        version: old.version.unwrap_or_else(|| LEGACY_VERSION.to_string()),
                    },
                );
                drafts
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_key_storage_keys() {
        assert_eq!(DraftKey::Default.storage_key(), "default");
        assert_eq!(DraftKey::Template(7).storage_key(), "7");
        assert_eq!(DraftKey::from_storage_key("default"), Some(DraftKey::Default));
        assert_eq!(DraftKey::from_storage_key("12"), Some(DraftKey::Template(12)));
        assert_eq!(DraftKey::from_storage_key("bogus"), None);
        assert_eq!(DraftKey::for_template(None), DraftKey::Default);
        assert_eq!(DraftKey::for_template(Some(3)), DraftKey::Template(3));
    }

    #[test]
    fn test_parse_current_layout() {
        let raw = r#"{
            "version": "2.0.0",
            "drafts": {
                "1": {"title": "T", "content": "C", "timestamp": 5, "version": "2.0.0"}
            }
        }"#;
        let schema = StoredSchema::parse(raw).expect("parse");
        assert!(schema.is_current());
        let drafts = schema.migrate();
        assert_eq!(drafts.get(DraftKey::Template(1)).expect("draft").title, "T");
    }

    #[test]
    fn test_parse_legacy_layout_migrates_to_default() {
        let raw = r#"{"title": "Old", "content": "<p>x</p>", "timestamp": 42}"#;
        let schema = StoredSchema::parse(raw).expect("parse");
        assert!(!schema.is_current());

        let drafts = schema.migrate();
        assert_eq!(drafts.version, STORAGE_VERSION);
        let record = drafts.get(DraftKey::Default).expect("default draft");
        assert_eq!(record.title, "Old");
        assert_eq!(record.timestamp, 42);
        assert_eq!(record.version, LEGACY_VERSION);
        assert_eq!(drafts.drafts.len(), 1);
    }

    #[test]
    fn test_current_layout_with_unversioned_record() {
        let raw = r#"{
            "version": "2.0.0",
            "drafts": {
                "default": {"title": "old", "content": "c", "timestamp": 1},
                "3": {"title": "kept", "content": "k", "timestamp": 9, "version": "2.0.0"},
                "4": {"title": "bare"}
            }
        }"#;
        let schema = StoredSchema::parse(raw).expect("parse");
        assert!(schema.is_current());

        let drafts = schema.migrate();
        let old = drafts.get(DraftKey::Default).expect("default draft");
        assert_eq!(old.version, LEGACY_VERSION);
        assert_eq!(old.timestamp, 1);
        assert_eq!(drafts.get(DraftKey::Template(3)).expect("draft 3").title, "kept");
        let bare = drafts.get(DraftKey::Template(4)).expect("draft 4");
        assert_eq!(bare.content, "");
        assert_eq!(bare.timestamp, 0);
    }

    #[test]
    fn test_legacy_without_title_is_rejected() {
        assert!(StoredSchema::parse(r#"{"content": "orphan"}"#).is_err());
        assert!(StoredSchema::parse("not json at all").is_err());
        assert!(StoredSchema::parse(r#""a string""#).is_err());
    }

    #[test]
    fn test_iter_skips_unknown_keys() {
        let mut drafts = DraftsV2::default();
        let record = DraftRecord {
            title: "t".into(),
            content: "c".into(),
            timestamp: 0,
            version: STORAGE_VERSION.into(),
        };
        drafts.insert(DraftKey::Template(2), record.clone());
        drafts.drafts.insert("weird".into(), record);

        let keys: Vec<DraftKey> = drafts.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![DraftKey::Template(2)]);
    }
}

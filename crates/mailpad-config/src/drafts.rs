/// Draft persistence: keeps unsent title/content pairs across restarts.
///
/// All drafts live in one JSON blob under a single key of a redb `storage`
/// table, mirroring a browser local-storage slot. The blob is versioned (see
/// [`crate::schema`]); older layouts are migrated once when the store opens.
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::schema::{DraftKey, DraftRecord, DraftsV2, StoredSchema, STORAGE_VERSION};

/// Key/value storage table: storage key → raw JSON.
const STORAGE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("storage");

/// Storage key holding every draft.
pub const STORAGE_KEY: &str = "email_editor_draft";

/// Persistence layer for drafts, backed by redb.
pub struct DraftStore {
    db: Database,
}

impl std::fmt::Debug for DraftStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DraftStore").finish()
    }
}

impl DraftStore {
    /// Returns the draft database path inside `data_dir`.
    pub fn draft_path(data_dir: &Path) -> PathBuf {
        data_dir.join("drafts.redb")
    }

    /// Opens or creates the draft database at `path`, migrating any legacy
    /// blob to the current layout.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory or database cannot be created.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create data directory: {}", parent.display()))?;
        }
        let db = Database::create(path)
            .with_context(|| format!("Failed to open draft database: {}", path.display()))?;

        let write_txn = db
            .begin_write()
            .context("Failed to begin initial draft write transaction")?;
        {
            let _ = write_txn
                .open_table(STORAGE_TABLE)
                .context("Failed to create storage table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial draft transaction")?;

        let store = Self { db };
        store.migrate_on_open()?;
        Ok(store)
    }

    fn migrate_on_open(&self) -> Result<()> {
        let Some(raw) = self.raw_blob()? else {
            return Ok(());
        };
        match StoredSchema::parse(&raw) {
            Ok(schema) if !schema.is_current() => {
                let migrated = schema.migrate();
                self.write_drafts(&migrated)?;
                tracing::info!("Migrated stored drafts to version {STORAGE_VERSION}");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!("Ignoring unreadable stored drafts: {e:#}"),
        }
        Ok(())
    }

    /// Returns the raw JSON blob, or `None` if nothing is stored.
    pub fn raw_blob(&self) -> Result<Option<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(STORAGE_TABLE)
            .context("Failed to open storage table")?;

        match table.get(STORAGE_KEY).context("Failed to read stored drafts")? {
            Some(guard) => Ok(Some(guard.value().to_string())),
            None => Ok(None),
        }
    }

    /// Reads all drafts. Malformed blobs read as empty.
    fn read_drafts(&self) -> Result<DraftsV2> {
        let Some(raw) = self.raw_blob()? else {
            return Ok(DraftsV2::default());
        };
        match StoredSchema::parse(&raw) {
            Ok(schema) => Ok(schema.migrate()),
            Err(e) => {
                tracing::warn!("Failed to parse stored drafts: {e:#}");
                Ok(DraftsV2::default())
            }
        }
    }

    /// Writes all drafts, removing the key when nothing is left.
    fn write_drafts(&self, drafts: &DraftsV2) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(STORAGE_TABLE)
                .context("Failed to open storage table")?;
            if drafts.is_empty() {
                table
                    .remove(STORAGE_KEY)
                    .context("Failed to remove drafts")?;
            } else {
                let json = serde_json::to_string(drafts).context("Failed to serialize drafts")?;
                table
                    .insert(STORAGE_KEY, json.as_str())
                    .context("Failed to insert drafts")?;
            }
        }
        write_txn.commit().context("Failed to commit drafts")?;
        Ok(())
    }

    /// Saves a draft stamped with the current time.
    pub fn save_draft(&self, key: DraftKey, title: &str, content: &str) -> Result<DraftRecord> {
        self.save_draft_at(key, title, content, chrono::Utc::now().timestamp_millis())
    }

    /// Saves a draft with an explicit unix-millisecond timestamp.
    pub fn save_draft_at(
        &self,
        key: DraftKey,
        title: &str,
        content: &str,
        timestamp: i64,
    ) -> Result<DraftRecord> {
        let record = DraftRecord {
            title: title.to_string(),
            content: content.to_string(),
            timestamp,
            version: STORAGE_VERSION.to_string(),
        };
        let mut drafts = self.read_drafts()?;
        drafts.insert(key, record.clone());
        self.write_drafts(&drafts)?;
        tracing::debug!("Saved draft for {key}");
        Ok(record)
    }

    pub fn load_draft(&self, key: DraftKey) -> Result<Option<DraftRecord>> {
        Ok(self.read_drafts()?.get(key).cloned())
    }

    pub fn has_draft(&self, key: DraftKey) -> Result<bool> {
        Ok(self.read_drafts()?.get(key).is_some())
    }

    /// Deletes one draft. Returns whether it existed.
    pub fn delete_draft(&self, key: DraftKey) -> Result<bool> {
        let mut drafts = self.read_drafts()?;
        let removed = drafts.remove(key).is_some();
        if removed {
            self.write_drafts(&drafts)?;
            tracing::debug!("Deleted draft for {key}");
        }
        Ok(removed)
    }

    /// All drafts with a recognized key, default first then by template id.
    pub fn list_drafts(&self) -> Result<Vec<(DraftKey, DraftRecord)>> {
        let drafts = self.read_drafts()?;
        let mut list: Vec<(DraftKey, DraftRecord)> =
            drafts.iter().map(|(k, r)| (k, r.clone())).collect();
        list.sort_by_key(|(k, _)| *k);
        Ok(list)
    }

    /// Removes every draft.
    pub fn clear(&self) -> Result<()> {
        self.write_drafts(&DraftsV2::default())
    }

    /// Save time of a draft in unix milliseconds.
    pub fn timestamp(&self, key: DraftKey) -> Result<Option<i64>> {
        Ok(self.read_drafts()?.get(key).map(|r| r.timestamp))
    }

    /// True when the draft is older than `max_age` at `now_ms`, or missing.
    pub fn is_expired(&self, key: DraftKey, max_age: Duration, now_ms: i64) -> Result<bool> {
        Ok(match self.timestamp(key)? {
            Some(ts) => record_expired(ts, max_age, now_ms),
            None => true,
        })
    }

    /// Removes drafts older than `max_age`. Returns how many were removed.
    pub fn cleanup_expired(&self, max_age: Duration, now_ms: i64) -> Result<usize> {
        let mut drafts = self.read_drafts()?;
        let before = drafts.drafts.len();
        drafts
            .drafts
            .retain(|_, record| !record_expired(record.timestamp, max_age, now_ms));
        let removed = before - drafts.drafts.len();
        if removed > 0 {
            self.write_drafts(&drafts)?;
            tracing::info!("Removed {removed} expired draft(s)");
        }
        Ok(removed)
    }
}

fn record_expired(timestamp: i64, max_age: Duration, now_ms: i64) -> bool {
    let max_age_ms = i64::try_from(max_age.as_millis()).unwrap_or(i64::MAX);
    now_ms.saturating_sub(timestamp) > max_age_ms
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const DAY: Duration = Duration::from_secs(24 * 60 * 60);
    const DAY_MS: i64 = 24 * 60 * 60 * 1000;

    fn open_test_store() -> (DraftStore, TempDir) {
        let dir = TempDir::new().expect("create temp dir");
        let db_path = dir.path().join("test-drafts.redb");
        let store = DraftStore::open(&db_path).expect("open draft store");
        (store, dir)
    }

    #[test]
    fn test_load_missing_draft() {
        let (store, _dir) = open_test_store();
        assert!(store.load_draft(DraftKey::Default).expect("load").is_none());
        assert!(!store.has_draft(DraftKey::Template(1)).expect("has"));
        assert!(store.raw_blob().expect("raw").is_none());
    }

    #[test]
    fn test_save_and_load_draft() {
        let (store, _dir) = open_test_store();
        store
            .save_draft_at(DraftKey::Template(1), "Hello", "<p>Body</p>", 1_000)
            .expect("save");

        let draft = store
            .load_draft(DraftKey::Template(1))
            .expect("load")
            .expect("some");
        assert_eq!(draft.title, "Hello");
        assert_eq!(draft.content, "<p>Body</p>");
        assert_eq!(draft.timestamp, 1_000);
        assert_eq!(draft.version, STORAGE_VERSION);
        assert!(store.load_draft(DraftKey::Default).expect("load").is_none());
    }

    #[test]
    fn test_saved_blob_uses_current_layout() {
        let (store, _dir) = open_test_store();
        store
            .save_draft_at(DraftKey::Default, "t", "c", 5)
            .expect("save");

        let raw = store.raw_blob().expect("raw").expect("blob");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
        assert_eq!(value["version"], "2.0.0");
        assert_eq!(value["drafts"]["default"]["title"], "t");
    }

    #[test]
    fn test_delete_last_draft_removes_key() {
        let (store, _dir) = open_test_store();
        store.save_draft(DraftKey::Template(4), "t", "c").expect("save");

        assert!(store.delete_draft(DraftKey::Template(4)).expect("delete"));
        assert!(!store.delete_draft(DraftKey::Template(4)).expect("delete again"));
        assert!(store.raw_blob().expect("raw").is_none());
    }

    #[test]
    fn test_list_drafts_sorted() {
        let (store, _dir) = open_test_store();
        store.save_draft_at(DraftKey::Template(10), "ten", "c", 1).expect("save");
        store.save_draft_at(DraftKey::Template(2), "two", "c", 2).expect("save");
        store.save_draft_at(DraftKey::Default, "default", "c", 3).expect("save");

        let keys: Vec<DraftKey> = store
            .list_drafts()
            .expect("list")
            .into_iter()
            .map(|(k, _)| k)
            .collect();
        assert_eq!(
            keys,
            vec![DraftKey::Default, DraftKey::Template(2), DraftKey::Template(10)]
        );
    }

    #[test]
    fn test_is_expired() {
        let (store, _dir) = open_test_store();
        store.save_draft_at(DraftKey::Default, "t", "c", 0).expect("save");

        assert!(!store.is_expired(DraftKey::Default, 7 * DAY, 7 * DAY_MS).expect("check"));
        assert!(store.is_expired(DraftKey::Default, 7 * DAY, 7 * DAY_MS + 1).expect("check"));
        assert!(store.is_expired(DraftKey::Template(9), 7 * DAY, 0).expect("missing"));
    }

    #[test]
    fn test_cleanup_expired_keeps_fresh_drafts() {
        let (store, _dir) = open_test_store();
        let now = 30 * DAY_MS;
        store.save_draft_at(DraftKey::Template(1), "old", "c", 0).expect("save");
        store
            .save_draft_at(DraftKey::Template(2), "fresh", "c", now - DAY_MS)
            .expect("save");

        assert_eq!(store.cleanup_expired(7 * DAY, now).expect("cleanup"), 1);
        assert!(!store.has_draft(DraftKey::Template(1)).expect("has"));
        assert!(store.has_draft(DraftKey::Template(2)).expect("has"));
    }

    #[test]
    fn test_cleanup_all_expired_removes_key() {
        let (store, _dir) = open_test_store();
        store.save_draft_at(DraftKey::Default, "old", "c", 0).expect("save");

        assert_eq!(store.cleanup_expired(DAY, 2 * DAY_MS).expect("cleanup"), 1);
        assert!(store.raw_blob().expect("raw").is_none());
    }

    #[test]
    fn test_clear() {
        let (store, _dir) = open_test_store();
        store.save_draft(DraftKey::Default, "a", "b").expect("save");
        store.save_draft(DraftKey::Template(3), "a", "b").expect("save");

        store.clear().expect("clear");
        assert!(store.list_drafts().expect("list").is_empty());
        assert!(store.raw_blob().expect("raw").is_none());

        // Clearing an already empty store is fine
        store.clear().expect("clear again");
    }

    #[test]
    fn test_content_with_special_chars() {
        let (store, _dir) = open_test_store();
        let content = "<p>Hello 🌍</p>\n\"quotes\" and \\backslash\n\ttab";
        store.save_draft(DraftKey::Default, "Ünïcode", content).expect("save");

        let draft = store.load_draft(DraftKey::Default).expect("load").expect("some");
        assert_eq!(draft.content, content);
        assert_eq!(draft.title, "Ünïcode");
    }

    #[test]
    fn test_record_expired_handles_huge_max_age() {
        assert!(!record_expired(0, Duration::MAX, i64::MAX));
    }
}

/// Disk persistence layer backed by redb.
///
/// Uses a single redb database file with two tables:
/// - `timeline`: stores the serialized snapshot buffer keyed by `doc_id`
/// - `meta`: stores per-document metadata keyed by `doc_id`
///
/// The history buffer itself never touches disk; editing sessions call
/// into this layer when they want their timeline to survive a restart.
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use redb::{Database, ReadableDatabase, ReadableTable, TableDefinition};

use crate::buffer::HistoryBuffer;
use crate::snapshot::EditorSnapshot;

/// Timeline table: doc_id → bincode-serialized `HistoryBuffer<EditorSnapshot>`.
const TIMELINE_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("timeline");

/// Metadata table: doc_id → bincode-serialized DocumentMeta.
const META_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("meta");

/// Per-document metadata persisted alongside the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DocumentMeta {
    /// When the timeline was last written, unix milliseconds.
    pub saved_at: i64,
    /// Number of snapshots in the stored timeline.
    pub entries: usize,
}

/// Persistence layer for editor timelines backed by redb.
///
/// Thread-safe: redb supports concurrent readers and serialized writers.
/// Shared across editing sessions via `Arc<PersistenceLayer>`.
pub struct PersistenceLayer {
    db: Database,
}

impl std::fmt::Debug for PersistenceLayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceLayer").finish()
    }
}

impl PersistenceLayer {
    /// Opens or creates the history database in the given directory.
    ///
    /// Creates the directory and database file if they don't exist.
    /// Initializes tables on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the database
    /// cannot be opened.
    pub fn open(data_dir: &Path) -> Result<Arc<Self>> {
        std::fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("history.redb");
        let db = Database::create(&db_path)
            .with_context(|| format!("Failed to open history database: {}", db_path.display()))?;

        // Ensure tables exist
        let write_txn = db
            .begin_write()
            .context("Failed to begin initial write transaction")?;
        {
            let _ = write_txn
                .open_table(TIMELINE_TABLE)
                .context("Failed to create timeline table")?;
            let _ = write_txn
                .open_table(META_TABLE)
                .context("Failed to create meta table")?;
        }
        write_txn
            .commit()
            .context("Failed to commit initial transaction")?;

        Ok(Arc::new(Self { db }))
    }

    /// Writes the full timeline for a document, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write transaction fails.
    pub fn save_timeline(
        &self,
        doc_id: &str,
        timeline: &HistoryBuffer<EditorSnapshot>,
    ) -> Result<()> {
        let bytes = bincode::serialize(timeline).context("Failed to serialize timeline")?;
        let meta = DocumentMeta {
            saved_at: chrono::Utc::now().timestamp_millis(),
            entries: timeline.len(),
        };
        let meta_bytes = bincode::serialize(&meta).context("Failed to serialize document metadata")?;

        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(TIMELINE_TABLE)
                .context("Failed to open timeline table")?;
            table
                .insert(doc_id, bytes.as_slice())
                .context("Failed to insert timeline")?;

            let mut meta_table = write_txn
                .open_table(META_TABLE)
                .context("Failed to open meta table")?;
            meta_table
                .insert(doc_id, meta_bytes.as_slice())
                .context("Failed to insert metadata")?;
        }
        write_txn
            .commit()
            .context("Failed to commit write transaction")?;
        tracing::debug!("Saved timeline for {doc_id} ({} entries)", meta.entries);
        Ok(())
    }

    /// Reads the stored timeline for a document.
    ///
    /// Returns `None` if nothing was stored. The returned buffer has been
    /// normalized, so its invariants hold even for hand-edited databases.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn load_timeline(&self, doc_id: &str) -> Result<Option<HistoryBuffer<EditorSnapshot>>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(TIMELINE_TABLE)
            .context("Failed to open timeline table")?;

        match table.get(doc_id).context("Failed to read timeline")? {
            Some(guard) => {
                let mut timeline: HistoryBuffer<EditorSnapshot> =
                    bincode::deserialize(guard.value()).context("Failed to deserialize timeline")?;
                timeline.normalize();
                Ok(Some(timeline))
            }
            None => Ok(None),
        }
    }

    /// Loads the metadata for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction or deserialization fails.
    pub fn load_meta(&self, doc_id: &str) -> Result<Option<DocumentMeta>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(META_TABLE)
            .context("Failed to open meta table")?;

        match table.get(doc_id).context("Failed to read metadata")? {
            Some(guard) => {
                let meta: DocumentMeta = bincode::deserialize(guard.value())
                    .context("Failed to deserialize metadata")?;
                Ok(Some(meta))
            }
            None => Ok(None),
        }
    }

    /// Removes the timeline and metadata for a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the write transaction fails.
    pub fn delete_document(&self, doc_id: &str) -> Result<()> {
        let write_txn = self
            .db
            .begin_write()
            .context("Failed to begin write transaction")?;
        {
            let mut table = write_txn
                .open_table(TIMELINE_TABLE)
                .context("Failed to open timeline table")?;
            table
                .remove(doc_id)
                .context("Failed to remove timeline")?;

            let mut meta_table = write_txn
                .open_table(META_TABLE)
                .context("Failed to open meta table")?;
            meta_table
                .remove(doc_id)
                .context("Failed to remove metadata")?;
        }
        write_txn.commit().context("Failed to commit deletion")?;
        Ok(())
    }

    /// Lists all document IDs that have a stored timeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the read transaction fails.
    pub fn list_documents(&self) -> Result<Vec<String>> {
        let read_txn = self
            .db
            .begin_read()
            .context("Failed to begin read transaction")?;
        let table = read_txn
            .open_table(META_TABLE)
            .context("Failed to open meta table")?;

        let mut doc_ids = Vec::new();
        for entry in table.iter().context("Failed to iterate meta table")? {
            let (key_guard, _) = entry.context("Failed to read meta entry")?;
            doc_ids.push(key_guard.value().to_string());
        }
        Ok(doc_ids)
    }
}

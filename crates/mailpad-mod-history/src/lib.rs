/// Undo/redo history for the email editor.
///
/// Provides a generic, size-bounded `HistoryBuffer` of immutable snapshots
/// with a cursor, an `EditorHistory` specialization for title/content
/// snapshots, and an optional redb-backed `PersistenceLayer` that lets an
/// editing session keep its timeline across restarts.
pub mod buffer;
pub mod config;
pub mod editor;
pub mod error;
pub mod persistence;
pub mod snapshot;

pub use buffer::{HistoryBuffer, HistoryEntry, HistoryInfo, DEFAULT_CAPACITY};
pub use editor::EditorHistory;
pub use error::HistoryError;
pub use persistence::{DocumentMeta, PersistenceLayer};
pub use snapshot::{EditorSnapshot, StateDiff};

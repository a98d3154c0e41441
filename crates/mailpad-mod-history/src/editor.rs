/// Undo/redo history specialized for the email editor's title and body.
use std::time::Duration;

use crate::buffer::{HistoryBuffer, HistoryInfo};
use crate::snapshot::{EditorSnapshot, StateDiff};

/// History of [`EditorSnapshot`]s with change detection helpers.
#[derive(Debug, Clone, Default)]
pub struct EditorHistory {
    buffer: HistoryBuffer<EditorSnapshot>,
}

impl EditorHistory {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: HistoryBuffer::with_capacity(capacity),
        }
    }

    /// Wraps an existing buffer (e.g. one restored from disk).
    pub fn from_buffer(mut buffer: HistoryBuffer<EditorSnapshot>) -> Self {
        buffer.normalize();
        Self { buffer }
    }

    pub fn buffer(&self) -> &HistoryBuffer<EditorSnapshot> {
        &self.buffer
    }

    pub fn set_capacity(&mut self, capacity: usize) {
        self.buffer.set_capacity(capacity);
    }

    /// Records the current title and content as a new snapshot.
    pub fn save_state(&mut self, title: &str, content: &str, description: Option<&str>) {
        self.push(EditorSnapshot::capture(title, content), description);
    }

    /// Records a prebuilt snapshot.
    pub fn push(&mut self, snapshot: EditorSnapshot, description: Option<&str>) {
        self.buffer.push(snapshot);
        let info = self.buffer.info();
        tracing::debug!(
            "Recorded {} ({}/{})",
            description.unwrap_or("edit"),
            info.current,
            info.total
        );
    }

    pub fn undo(&mut self) -> Option<EditorSnapshot> {
        self.buffer.undo().cloned()
    }

    pub fn redo(&mut self) -> Option<EditorSnapshot> {
        self.buffer.redo().cloned()
    }

    pub fn current(&self) -> Option<&EditorSnapshot> {
        self.buffer.current()
    }

    pub fn can_undo(&self) -> bool {
        self.buffer.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.buffer.can_redo()
    }

    pub fn info(&self) -> HistoryInfo {
        self.buffer.info()
    }

    /// Whether the given fields differ from the current snapshot.
    /// An empty history always counts as changed.
    pub fn has_changes(&self, title: &str, content: &str) -> bool {
        self.current()
            .map_or(true, |current| !current.matches(title, content))
    }

    /// Field-level diff against the current snapshot, measured at `now_ms`
    /// (unix milliseconds).
    pub fn diff(&self, title: &str, content: &str, now_ms: i64) -> StateDiff {
        match self.current() {
            Some(current) => StateDiff {
                title_changed: current.title != title,
                content_changed: current.content != content,
                since_last_save: Some(Duration::from_millis(
                    u64::try_from(now_ms.saturating_sub(current.captured_at)).unwrap_or(0),
                )),
            },
            None => StateDiff {
                title_changed: true,
                content_changed: true,
                since_last_save: None,
            },
        }
    }

    pub fn clear(&mut self, keep_current: bool) {
        self.buffer.clear(keep_current);
    }
}

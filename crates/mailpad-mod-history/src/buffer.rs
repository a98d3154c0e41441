/// Bounded undo/redo timeline of immutable snapshots.
///
/// The buffer keeps an ordered list of states and a cursor pointing at the
/// current one. Pushing from the middle of the timeline discards the redo
/// branch; exceeding the capacity evicts the oldest entries first.
use serde::{Deserialize, Serialize};

use crate::error::HistoryError;

/// Number of snapshots retained when no capacity is given.
pub const DEFAULT_CAPACITY: usize = 50;

/// Summary of the buffer state, for status bars and diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryInfo {
    /// Number of stored snapshots.
    pub total: usize,
    /// 1-based position of the current snapshot, 0 when empty.
    pub current: usize,
    pub can_undo: bool,
    pub can_redo: bool,
    pub capacity: usize,
}

/// A borrowed view of one stored snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryEntry<'a, T> {
    pub index: usize,
    pub state: &'a T,
    pub is_current: bool,
}

/// Navigable, size-bounded history of application states.
///
/// `cursor` is `None` exactly when `entries` is empty. Entries after the
/// cursor are redo-able, entries before it are undo-able.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryBuffer<T> {
    entries: Vec<T>,
    cursor: Option<usize>,
    capacity: usize,
}

impl<T> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> HistoryBuffer<T> {
    /// Creates an empty buffer with the default capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates an empty buffer. A capacity of 0 is clamped to 1.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            capacity: clamp_capacity(capacity),
        }
    }

    /// Creates a buffer seeded with one snapshot at index 0.
    pub fn with_initial(state: T) -> Self {
        let mut buffer = Self::new();
        buffer.entries.push(state);
        buffer.cursor = Some(0);
        buffer
    }

    /// Appends a snapshot and makes it current.
    ///
    /// Any redo-able entries after the cursor are discarded first. When the
    /// buffer overflows, the oldest entries are evicted; the pushed state
    /// always survives as the last entry.
    pub fn push(&mut self, state: T) {
        let keep = self.cursor.map_or(0, |c| c + 1);
        self.entries.truncate(keep);
        self.entries.push(state);

        if self.entries.len() > self.capacity {
            let excess = self.entries.len() - self.capacity;
            self.entries.drain(..excess);
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Steps back one snapshot. Returns `None` at the start of the timeline.
    pub fn undo(&mut self) -> Option<&T> {
        self.try_undo().ok()
    }

    /// Like [`undo`](Self::undo), but reports why nothing happened.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::EmptyHistory`] when the cursor is at index 0
    /// or the buffer is empty. The buffer is left unchanged.
    pub fn try_undo(&mut self) -> Result<&T, HistoryError> {
        match self.cursor {
            Some(c) if c > 0 => {
                self.cursor = Some(c - 1);
                tracing::debug!("Undo ({}/{})", c, self.entries.len());
                Ok(&self.entries[c - 1])
            }
            _ => {
                tracing::debug!("Nothing to undo: at start of history");
                Err(HistoryError::EmptyHistory)
            }
        }
    }

    /// Steps forward one snapshot. Returns `None` at the end of the timeline.
    pub fn redo(&mut self) -> Option<&T> {
        self.try_redo().ok()
    }

    /// Like [`redo`](Self::redo), but reports why nothing happened.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::EmptyHistory`] when the cursor is already on
    /// the last entry or the buffer is empty.
    pub fn try_redo(&mut self) -> Result<&T, HistoryError> {
        match self.cursor {
            Some(c) if c + 1 < self.entries.len() => {
                self.cursor = Some(c + 1);
                tracing::debug!("Redo ({}/{})", c + 2, self.entries.len());
                Ok(&self.entries[c + 1])
            }
            _ => {
                tracing::debug!("Nothing to redo: at end of history");
                Err(HistoryError::EmptyHistory)
            }
        }
    }

    /// Jumps to an arbitrary stored snapshot.
    pub fn go_to(&mut self, index: usize) -> Option<&T> {
        self.try_go_to(index).ok()
    }

    /// Like [`go_to`](Self::go_to), but reports invalid indices.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::OutOfRange`] when `index >= len`.
    pub fn try_go_to(&mut self, index: usize) -> Result<&T, HistoryError> {
        let len = self.entries.len();
        if index >= len {
            tracing::debug!("Invalid history index {index} (len {len})");
            return Err(HistoryError::OutOfRange { index, len });
        }
        self.cursor = Some(index);
        tracing::debug!("Jumped to history entry ({}/{len})", index + 1);
        Ok(&self.entries[index])
    }

    /// Drops the timeline.
    ///
    /// With `keep_current`, the current snapshot (if any) survives alone at
    /// index 0. Otherwise the buffer becomes empty.
    pub fn clear(&mut self, keep_current: bool) {
        match (keep_current, self.cursor) {
            (true, Some(c)) => {
                let current = self.entries.swap_remove(c);
                self.entries.clear();
                self.entries.push(current);
                self.cursor = Some(0);
            }
            _ => {
                self.entries.clear();
                self.cursor = None;
            }
        }
        tracing::debug!("History cleared (kept {})", self.entries.len());
    }

    /// Changes the capacity, trimming the oldest entries if needed.
    ///
    /// The kept window ends at the cursor when possible, so the current
    /// snapshot stays reachable.
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = clamp_capacity(capacity);
        if self.entries.len() <= self.capacity {
            return;
        }

        let cursor = self.cursor.unwrap_or(0);
        let start = (cursor + 1).saturating_sub(self.capacity);
        self.entries.truncate(start + self.capacity);
        self.entries.drain(..start);
        self.cursor = Some((cursor - start).min(self.capacity - 1));
    }

    /// Re-establishes the invariants after the buffer was deserialized
    /// from an untrusted source.
    pub fn normalize(&mut self) {
        let len = self.entries.len();
        self.cursor = match self.cursor {
            _ if len == 0 => None,
            Some(c) if c < len => Some(c),
            _ => Some(len - 1),
        };
        self.set_capacity(self.capacity);
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.cursor, Some(c) if c > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// The snapshot at the cursor, or `None` for an empty buffer.
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Index of the current snapshot.
    pub fn position(&self) -> Option<usize> {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// All stored snapshots, oldest first.
    pub fn states(&self) -> &[T] {
        &self.entries
    }

    /// Iterates stored snapshots with their index and a current marker.
    pub fn entries(&self) -> impl Iterator<Item = HistoryEntry<'_, T>> {
        self.entries
            .iter()
            .enumerate()
            .map(move |(index, state)| HistoryEntry {
                index,
                state,
                is_current: self.cursor == Some(index),
            })
    }

    pub fn info(&self) -> HistoryInfo {
        HistoryInfo {
            total: self.entries.len(),
            current: self.cursor.map_or(0, |c| c + 1),
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            capacity: self.capacity,
        }
    }
}

fn clamp_capacity(capacity: usize) -> usize {
    if capacity == 0 {
        tracing::debug!("{}", HistoryError::InvalidCapacity(capacity));
        return 1;
    }
    capacity
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled(states: &[&'static str]) -> HistoryBuffer<&'static str> {
        let mut buffer = HistoryBuffer::new();
        for s in states {
            buffer.push(*s);
        }
        buffer
    }

    fn assert_invariants<T>(buffer: &HistoryBuffer<T>) {
        assert!(buffer.len() <= buffer.capacity());
        match buffer.position() {
            Some(c) => assert!(c < buffer.len()),
            None => assert!(buffer.is_empty()),
        }
    }

    #[test]
    fn test_new_buffer_is_empty() {
        let buffer: HistoryBuffer<u32> = HistoryBuffer::new();
        assert!(buffer.is_empty());
        assert_eq!(buffer.position(), None);
        assert_eq!(buffer.capacity(), DEFAULT_CAPACITY);
        assert!(!buffer.can_undo());
        assert!(!buffer.can_redo());
        assert!(buffer.current().is_none());
    }

    #[test]
    fn test_with_initial_seeds_cursor() {
        let buffer = HistoryBuffer::with_initial("initial");
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.position(), Some(0));
        assert_eq!(buffer.current(), Some(&"initial"));
        assert!(!buffer.can_undo());
        assert!(!buffer.can_redo());
    }

    #[test]
    fn test_push_moves_cursor_to_tail() {
        let mut buffer = HistoryBuffer::new();
        buffer.push("state1");
        assert_eq!(buffer.position(), Some(0));
        assert!(!buffer.can_undo());

        buffer.push("state2");
        assert_eq!(buffer.states(), &["state1", "state2"]);
        assert_eq!(buffer.position(), Some(1));
        assert!(buffer.can_undo());
    }

    #[test]
    fn test_scenario_undo_redo_walk() {
        let mut buffer = filled(&["v1", "v2", "v3"]);
        assert_eq!(buffer.current(), Some(&"v3"));
        assert!(buffer.can_undo());
        assert!(!buffer.can_redo());

        assert_eq!(buffer.undo(), Some(&"v2"));
        assert_eq!(buffer.undo(), Some(&"v1"));
        assert_eq!(buffer.undo(), None);
        assert_eq!(buffer.current(), Some(&"v1"));

        assert_eq!(buffer.redo(), Some(&"v2"));
        assert_eq!(buffer.redo(), Some(&"v3"));
    }

    #[test]
    fn test_push_after_undo_truncates_branch() {
        let mut buffer = filled(&["A", "B", "C"]);
        buffer.undo();
        buffer.push("D");

        assert_eq!(buffer.states(), &["A", "B", "D"]);
        assert_eq!(buffer.position(), Some(2));
        assert!(!buffer.can_redo());
        assert_eq!(buffer.redo(), None);
    }

    #[test]
    fn test_push_from_middle_after_jump() {
        let mut buffer = filled(&["A", "B", "C"]);
        buffer.go_to(1);
        buffer.push("D");
        assert_eq!(buffer.states(), &["A", "B", "D"]);
        assert!(!buffer.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut buffer = HistoryBuffer::with_capacity(3);
        for s in ["A", "B", "C", "D", "E"] {
            buffer.push(s);
            assert_invariants(&buffer);
        }
        assert_eq!(buffer.states(), &["C", "D", "E"]);
        assert_eq!(buffer.position(), Some(2));
    }

    #[test]
    fn test_undo_then_redo_returns_to_same_index() {
        let mut buffer = filled(&["a", "b", "c", "d"]);
        buffer.go_to(2);
        buffer.undo();
        assert_eq!(buffer.redo(), Some(&"c"));
        assert_eq!(buffer.position(), Some(2));
    }

    #[test]
    fn test_boundary_undo_is_idempotent() {
        let mut buffer = filled(&["only"]);
        for _ in 0..3 {
            assert_eq!(buffer.try_undo(), Err(HistoryError::EmptyHistory));
            assert_eq!(buffer.position(), Some(0));
        }
    }

    #[test]
    fn test_boundary_redo_is_idempotent() {
        let mut buffer = filled(&["a", "b"]);
        for _ in 0..3 {
            assert_eq!(buffer.try_redo(), Err(HistoryError::EmptyHistory));
            assert_eq!(buffer.position(), Some(1));
        }
    }

    #[test]
    fn test_undo_redo_on_empty_buffer() {
        let mut buffer: HistoryBuffer<u8> = HistoryBuffer::new();
        assert!(buffer.undo().is_none());
        assert!(buffer.redo().is_none());
        assert_eq!(buffer.position(), None);
    }

    #[test]
    fn test_go_to_valid_index() {
        let mut buffer = filled(&["state1", "state2", "state3"]);
        assert_eq!(buffer.go_to(0), Some(&"state1"));
        assert_eq!(buffer.position(), Some(0));
        assert!(buffer.can_redo());
    }

    #[test]
    fn test_go_to_out_of_range_leaves_buffer_unchanged() {
        let mut buffer = filled(&["state1"]);
        assert_eq!(
            buffer.try_go_to(5),
            Err(HistoryError::OutOfRange { index: 5, len: 1 })
        );
        assert!(buffer.go_to(1).is_none());
        assert_eq!(buffer.position(), Some(0));
    }

    #[test]
    fn test_clear_keep_current() {
        let mut buffer = filled(&["v1", "v2", "v3"]);
        buffer.go_to(1);
        buffer.clear(true);
        assert_eq!(buffer.states(), &["v2"]);
        assert_eq!(buffer.position(), Some(0));

        buffer.clear(false);
        assert!(buffer.is_empty());
        assert_eq!(buffer.position(), None);
    }

    #[test]
    fn test_clear_keep_current_on_empty_stays_empty() {
        let mut buffer: HistoryBuffer<u8> = HistoryBuffer::new();
        buffer.clear(true);
        assert!(buffer.is_empty());
        assert_eq!(buffer.position(), None);
    }

    #[test]
    fn test_set_capacity_keeps_cursor_window() {
        let mut buffer = filled(&["v1", "v2", "v3"]);
        buffer.set_capacity(2);
        assert_eq!(buffer.states(), &["v2", "v3"]);
        assert_eq!(buffer.current(), Some(&"v3"));
        assert_eq!(buffer.position(), Some(1));
    }

    #[test]
    fn test_set_capacity_with_cursor_near_start() {
        let mut buffer = filled(&["a", "b", "c", "d", "e"]);
        buffer.go_to(1);
        buffer.set_capacity(3);
        assert_eq!(buffer.states(), &["a", "b", "c"]);
        assert_eq!(buffer.current(), Some(&"b"));
        assert_invariants(&buffer);
    }

    #[test]
    fn test_set_capacity_zero_clamps_to_one() {
        let mut buffer = filled(&["a", "b"]);
        buffer.set_capacity(0);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.states(), &["b"]);
        assert_eq!(buffer.position(), Some(0));
    }

    #[test]
    fn test_with_capacity_zero_clamps() {
        let buffer: HistoryBuffer<u8> = HistoryBuffer::with_capacity(0);
        assert_eq!(buffer.capacity(), 1);
    }

    #[test]
    fn test_duplicates_are_kept() {
        let buffer = filled(&["x", "x", "x"]);
        assert_eq!(buffer.len(), 3);
    }

    #[test]
    fn test_info_reports_position() {
        let mut buffer = filled(&["a", "b", "c"]);
        buffer.undo();
        let info = buffer.info();
        assert_eq!(info.total, 3);
        assert_eq!(info.current, 2);
        assert!(info.can_undo);
        assert!(info.can_redo);
        assert_eq!(info.capacity, DEFAULT_CAPACITY);

        let empty: HistoryBuffer<u8> = HistoryBuffer::new();
        assert_eq!(empty.info().current, 0);
    }

    #[test]
    fn test_entries_marks_current() {
        let mut buffer = filled(&["a", "b", "c"]);
        buffer.go_to(1);
        let current: Vec<usize> = buffer
            .entries()
            .filter(|e| e.is_current)
            .map(|e| e.index)
            .collect();
        assert_eq!(current, vec![1]);
        assert_eq!(buffer.entries().count(), 3);
    }

    #[test]
    fn test_normalize_repairs_cursor_and_capacity() {
        let mut buffer: HistoryBuffer<u8> = HistoryBuffer {
            entries: vec![1, 2, 3, 4],
            cursor: Some(9),
            capacity: 2,
        };
        buffer.normalize();
        assert_eq!(buffer.states(), &[3, 4]);
        assert_eq!(buffer.position(), Some(1));

        let mut empty: HistoryBuffer<u8> = HistoryBuffer {
            entries: Vec::new(),
            cursor: Some(0),
            capacity: 0,
        };
        empty.normalize();
        assert_eq!(empty.position(), None);
        assert_eq!(empty.capacity(), 1);
    }

    #[test]
    fn test_invariants_hold_over_mixed_operations() {
        let mut buffer = HistoryBuffer::with_capacity(4);
        for i in 0..40u32 {
            match i % 7 {
                0 | 1 | 2 => buffer.push(i),
                3 => {
                    buffer.undo();
                }
                4 => {
                    buffer.redo();
                }
                5 => {
                    buffer.go_to((i as usize) % 5);
                }
                _ => buffer.set_capacity((i as usize) % 6),
            }
            assert_invariants(&buffer);
        }
    }
}

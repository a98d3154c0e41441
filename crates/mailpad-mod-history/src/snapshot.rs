/// Editor state snapshots stored in the history buffer.
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// One point-in-time state of the edited email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditorSnapshot {
    pub title: String,
    /// HTML body.
    pub content: String,
    /// Capture time in unix milliseconds.
    pub captured_at: i64,
}

impl EditorSnapshot {
    /// Captures a snapshot stamped with the current wall-clock time.
    pub fn capture(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self::at(title, content, chrono::Utc::now().timestamp_millis())
    }

    /// Builds a snapshot with an explicit timestamp.
    pub fn at(title: impl Into<String>, content: impl Into<String>, captured_at: i64) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            captured_at,
        }
    }

    /// Whether this snapshot holds exactly the given title and content.
    pub fn matches(&self, title: &str, content: &str) -> bool {
        self.title == title && self.content == content
    }
}

/// Difference between the live editor fields and the current snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateDiff {
    pub title_changed: bool,
    pub content_changed: bool,
    /// Time elapsed since the snapshot was captured; `None` when there is
    /// no snapshot to compare against.
    pub since_last_save: Option<Duration>,
}

impl StateDiff {
    pub fn any_changed(&self) -> bool {
        self.title_changed || self.content_changed
    }
}

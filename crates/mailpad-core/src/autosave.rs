//! Periodic draft auto-save.
//!
//! [`AutoSave`] owns the timer state of one editing session. The host calls
//! [`AutoSave::poll`] from its event loop with the current instant; when the
//! interval has elapsed and there are unsaved changes, the supplied save
//! closure runs. Status messages expire on later polls.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use mailpad_config::AppConfig;

/// Shortest allowed interval between auto-saves.
pub const MIN_INTERVAL: Duration = Duration::from_secs(5);

/// How long a success message stays visible.
pub const SAVED_MESSAGE_TTL: Duration = Duration::from_secs(3);

/// How long an error message stays visible.
pub const ERROR_MESSAGE_TTL: Duration = Duration::from_secs(5);

/// Unsaved changes older than this trigger a reminder.
pub const REMINDER_AFTER: Duration = Duration::from_secs(5 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved,
    Error,
}

#[derive(Debug)]
pub struct AutoSave {
    enabled: bool,
    interval: Duration,
    /// Start of the current interval while the timer runs.
    timer_base: Option<Instant>,
    dirty: bool,
    status: SaveStatus,
    status_since: Option<Instant>,
    message: String,
    last_save: Option<Instant>,
    last_save_at: Option<DateTime<Local>>,
}

impl AutoSave {
    pub fn new(interval: Duration, enabled: bool) -> Self {
        Self {
            enabled,
            interval: interval.max(MIN_INTERVAL),
            timer_base: None,
            dirty: false,
            status: SaveStatus::Idle,
            status_since: None,
            message: String::new(),
            last_save: None,
            last_save_at: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(config.auto_save_interval(), config.auto_save_enabled)
    }

    /// Starts the timer. No-op when disabled or already running.
    pub fn start(&mut self, now: Instant) {
        if !self.enabled || self.timer_base.is_some() {
            return;
        }
        self.timer_base = Some(now);
        tracing::info!("Auto-save started, interval {}s", self.interval.as_secs());
    }

    pub fn stop(&mut self) {
        if self.timer_base.take().is_some() {
            tracing::info!("Auto-save stopped");
        }
    }

    pub fn restart(&mut self, now: Instant) {
        self.stop();
        self.start(now);
    }

    pub fn is_running(&self) -> bool {
        self.timer_base.is_some()
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Enables (and starts) or disables (and stops) the timer.
    pub fn set_enabled(&mut self, enabled: bool, now: Instant) {
        self.enabled = enabled;
        if enabled {
            self.start(now);
        } else {
            self.stop();
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Sets the interval, clamped to [`MIN_INTERVAL`]. A running timer restarts.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval.max(MIN_INTERVAL);
        if self.is_running() {
            self.restart(now);
        }
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.dirty = false;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn status(&self) -> SaveStatus {
        self.status
    }

    /// Current status message, empty when idle.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Saves now regardless of the timer. Returns whether the save succeeded.
    pub fn save(&mut self, now: Instant, save: impl FnOnce() -> anyhow::Result<()>) -> bool {
        self.perform(now, false, save)
    }

    /// Advances the session clock.
    ///
    /// Expires stale status messages, then runs `save` if the timer is
    /// running, the interval has elapsed and there are unsaved changes.
    /// Returns whether a save was attempted.
    pub fn poll(&mut self, now: Instant, save: impl FnOnce() -> anyhow::Result<()>) -> bool {
        self.expire_message(now);

        let Some(base) = self.timer_base else {
            return false;
        };
        if now.saturating_duration_since(base) < self.interval {
            return false;
        }
        self.timer_base = Some(now);
        if !self.dirty || self.status == SaveStatus::Saving {
            return false;
        }
        self.perform(now, true, save);
        true
    }

    fn perform(
        &mut self,
        now: Instant,
        auto: bool,
        save: impl FnOnce() -> anyhow::Result<()>,
    ) -> bool {
        if self.status == SaveStatus::Saving {
            tracing::debug!("Save already in progress, skipping");
            return false;
        }
        self.status = SaveStatus::Saving;
        self.message = if auto { "Auto-saving..." } else { "Saving..." }.to_string();

        let ok = match save() {
            Ok(()) => {
                self.status = SaveStatus::Saved;
                self.message = if auto { "Auto-saved" } else { "Saved" }.to_string();
                self.last_save = Some(now);
                self.last_save_at = Some(Local::now());
                self.dirty = false;
                true
            }
            Err(e) => {
                tracing::warn!("Save failed: {e:#}");
                self.status = SaveStatus::Error;
                self.message = if auto { "Auto-save failed" } else { "Save failed" }.to_string();
                false
            }
        };
        self.status_since = Some(now);
        ok
    }

    fn expire_message(&mut self, now: Instant) {
        let ttl = match self.status {
            SaveStatus::Saved => SAVED_MESSAGE_TTL,
            SaveStatus::Error => ERROR_MESSAGE_TTL,
            SaveStatus::Idle | SaveStatus::Saving => return,
        };
        let expired = self
            .status_since
            .map_or(true, |since| now.saturating_duration_since(since) >= ttl);
        if expired {
            self.status = SaveStatus::Idle;
            self.message.clear();
        }
    }

    /// Human-readable age of the last successful save.
    pub fn last_save_text(&self, now: Instant) -> String {
        let (Some(at), Some(local)) = (self.last_save, self.last_save_at) else {
            return "Never saved".to_string();
        };
        let seconds = now.saturating_duration_since(at).as_secs();
        let minutes = seconds / 60;
        let hours = minutes / 60;
        if seconds < 60 {
            format!("Saved {seconds}s ago")
        } else if minutes < 60 {
            format!("Saved {minutes} min ago")
        } else if hours < 24 {
            format!("Saved {hours} h ago")
        } else {
            format!("Saved on {}", local.format("%Y-%m-%d"))
        }
    }

    /// True when there are unsaved changes that were never saved or are
    /// older than [`REMINDER_AFTER`].
    pub fn needs_save_reminder(&self, now: Instant) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(at) => now.saturating_duration_since(at) >= REMINDER_AFTER,
            None => true,
        }
    }

    /// Prompt to show before the session closes with unsaved changes.
    pub fn leave_warning(&self) -> Option<&'static str> {
        self.dirty
            .then_some("You have unsaved changes. Are you sure you want to leave?")
    }
}

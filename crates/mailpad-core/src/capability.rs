//! Host environment abstraction.
//!
//! The editor never touches a document model directly. Formatting commands,
//! live-region announcements and environment probes go through a
//! [`CapabilityProvider`] supplied by the host.

use crate::format::FormatCommand;

/// Urgency of a live-region announcement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Politeness {
    #[default]
    Polite,
    Assertive,
}

impl Politeness {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Polite => "polite",
            Self::Assertive => "assertive",
        }
    }
}

pub trait CapabilityProvider {
    /// Whether assistive technology is running.
    fn screen_reader_active(&self) -> bool;

    fn prefers_reduced_motion(&self) -> bool;

    /// Applies a formatting command to the current selection.
    fn execute(&mut self, command: &FormatCommand) -> anyhow::Result<()>;

    /// Reads `message` out to assistive technology.
    fn announce(&mut self, message: &str, politeness: Politeness);
}

/// A provider with no host behind it.
///
/// Commands and announcements are recorded so callers (and tests) can
/// inspect what the editor asked for.
#[derive(Debug, Default)]
pub struct HeadlessCapabilities {
    pub screen_reader: bool,
    pub reduced_motion: bool,
    executed: Vec<FormatCommand>,
    announcements: Vec<(String, Politeness)>,
}

impl HeadlessCapabilities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn executed(&self) -> &[FormatCommand] {
        &self.executed
    }

    pub fn announcements(&self) -> &[(String, Politeness)] {
        &self.announcements
    }

    pub fn last_announcement(&self) -> Option<&str> {
        self.announcements.last().map(|(m, _)| m.as_str())
    }
}

impl CapabilityProvider for HeadlessCapabilities {
    fn screen_reader_active(&self) -> bool {
        self.screen_reader
    }

    fn prefers_reduced_motion(&self) -> bool {
        self.reduced_motion
    }

    fn execute(&mut self, command: &FormatCommand) -> anyhow::Result<()> {
        tracing::debug!("Format command: {}", command.command_name());
        self.executed.push(command.clone());
        Ok(())
    }

    fn announce(&mut self, message: &str, politeness: Politeness) {
        // Blank messages would produce an empty live-region update.
        let message = message.trim();
        if message.is_empty() {
            return;
        }
        tracing::debug!("Announce ({}): {message}", politeness.as_str());
        self.announcements.push((message.to_string(), politeness));
    }
}

//! Editing session for one email.
//!
//! [`EmailEditor`] holds the live title and HTML body, records checkpoints
//! into an [`EditorHistory`], and ties in the draft store, the auto-save
//! timer and the host [`CapabilityProvider`].

use std::time::Instant;

use anyhow::Result;
use mailpad_config::{AppConfig, DraftKey, DraftRecord, DraftStore};
use uuid::Uuid;

use crate::autosave::AutoSave;
use crate::capability::{CapabilityProvider, Politeness};
use crate::error::{AppError, ErrorLog};
use crate::format::FormatCommand;
use crate::history::{doc_id_for_key, EditorHistory, EditorSnapshot, HistoryInfo, PersistenceLayer};
use crate::sanitize::html_summary;
use crate::shortcuts::EditorAction;
use crate::template::{EmailCategory, EmailTemplate};
use crate::validation::{validate_template, TemplateFields, ValidationLimits, ValidationReport};

/// What [`EmailEditor::handle_action`] did with an action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The editor carried the action out.
    Applied,
    /// Nothing to do, e.g. undo at the oldest snapshot.
    Unavailable,
    /// The host owns this action (storage, clipboard, help panel).
    Host,
}

#[derive(Debug)]
pub struct EmailEditor {
    session_id: Uuid,
    title: String,
    content: String,
    template_id: Option<u32>,
    history: EditorHistory,
    /// Fields changed since the last draft save or load.
    dirty: bool,
    autosave: AutoSave,
    errors: ErrorLog,
}

impl EmailEditor {
    /// Creates an empty session with one initial snapshot.
    pub fn new(config: &AppConfig) -> Self {
        let mut history = EditorHistory::new(config.history_capacity);
        history.save_state("", "", Some("initial state"));
        let session_id = Uuid::new_v4();
        tracing::debug!("Editor session {session_id} created");
        Self {
            session_id,
            title: String::new(),
            content: String::new(),
            template_id: None,
            history,
            dirty: false,
            autosave: AutoSave::from_config(config),
            errors: ErrorLog::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn template_id(&self) -> Option<u32> {
        self.template_id
    }

    /// Draft slot this session saves to.
    pub fn draft_key(&self) -> DraftKey {
        DraftKey::for_template(self.template_id)
    }

    pub fn history(&self) -> &EditorHistory {
        &self.history
    }

    pub fn history_info(&self) -> HistoryInfo {
        self.history.info()
    }

    pub fn autosave(&self) -> &AutoSave {
        &self.autosave
    }

    pub fn autosave_mut(&mut self) -> &mut AutoSave {
        &mut self.autosave
    }

    pub fn errors(&self) -> &ErrorLog {
        &self.errors
    }

    pub fn errors_mut(&mut self) -> &mut ErrorLog {
        &mut self.errors
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        let title = title.into();
        if title != self.title {
            self.title = title;
            self.touch();
        }
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        let content = content.into();
        if content != self.content {
            self.content = content;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.dirty = true;
        self.autosave.mark_dirty();
    }

    /// Records the live fields as a snapshot if they differ from the
    /// current one. Returns whether a snapshot was pushed.
    pub fn checkpoint(&mut self, description: &str) -> bool {
        if !self.history.has_changes(&self.title, &self.content) {
            return false;
        }
        self.history
            .save_state(&self.title, &self.content, Some(description));
        true
    }

    /// Whether [`undo`](Self::undo) would change the fields.
    pub fn can_undo(&self) -> bool {
        self.history.can_undo() || self.has_pending_edits()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo() && !self.has_pending_edits()
    }

    /// Edits made since the last checkpoint.
    fn has_pending_edits(&self) -> bool {
        self.history
            .current()
            .is_some_and(|s| !s.matches(&self.title, &self.content))
    }

    /// Steps back one snapshot. Pending edits are checkpointed first so
    /// they can be redone.
    pub fn undo(&mut self) -> bool {
        self.checkpoint("edit");
        match self.history.undo() {
            Some(snapshot) => {
                self.apply(snapshot);
                true
            }
            None => false,
        }
    }

    /// Steps forward one snapshot. Unavailable while there are pending
    /// edits, since those start a new branch.
    pub fn redo(&mut self) -> bool {
        if self.has_pending_edits() {
            tracing::debug!("Redo skipped: uncommitted edits");
            return false;
        }
        match self.history.redo() {
            Some(snapshot) => {
                self.apply(snapshot);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, snapshot: EditorSnapshot) {
        self.title = snapshot.title;
        self.content = snapshot.content;
        self.touch();
    }

    /// Resets the fields and the history to a single snapshot.
    fn reset_to(&mut self, title: String, content: String, description: &str) {
        self.history.clear(false);
        self.history.save_state(&title, &content, Some(description));
        self.title = title;
        self.content = content;
        self.dirty = false;
        self.autosave.mark_clean();
    }

    /// Opens `template` for editing.
    ///
    /// A stored draft for the template wins over the template's own text.
    /// Returns whether a draft was used. A failing draft store is recorded
    /// in the error log and the template text is used.
    pub fn load_template(&mut self, template: &EmailTemplate, drafts: Option<&DraftStore>) -> bool {
        self.template_id = Some(template.id);
        let key = self.draft_key();
        let draft = drafts.and_then(|store| self.draft_or_record(store.load_draft(key)));

        match draft {
            Some(draft) => {
                tracing::info!("Loaded draft for template {}", template.id);
                self.reset_to(draft.title, draft.content, "load draft");
                true
            }
            None => {
                self.reset_to(
                    template.title.clone(),
                    template.content.clone(),
                    "load template",
                );
                false
            }
        }
    }

    /// Starts an unbound session, resuming the default draft when present.
    /// A failing draft store is recorded in the error log.
    pub fn start_blank(&mut self, drafts: Option<&DraftStore>) -> bool {
        self.template_id = None;
        let draft =
            drafts.and_then(|store| self.draft_or_record(store.load_draft(DraftKey::Default)));
        match draft {
            Some(draft) => {
                self.reset_to(draft.title, draft.content, "load draft");
                true
            }
            None => {
                self.reset_to(String::new(), String::new(), "initial state");
                false
            }
        }
    }

    /// Unwraps a draft lookup, logging a storage failure as no draft.
    fn draft_or_record(&mut self, loaded: Result<Option<DraftRecord>>) -> Option<DraftRecord> {
        match loaded {
            Ok(draft) => draft,
            Err(e) => {
                tracing::warn!("Failed to load draft: {e:#}");
                self.errors.record(AppError::storage(&e, "load draft"));
                None
            }
        }
    }

    /// Writes the live fields to the session's draft slot.
    pub fn save_draft(&mut self, store: &DraftStore, now: Instant) -> bool {
        let key = self.draft_key();
        let (title, content, errors) = (&self.title, &self.content, &mut self.errors);
        let saved = self.autosave.save(now, || {
            store
                .save_draft(key, title, content)
                .map(|_| ())
                .inspect_err(|e| {
                    errors.record(AppError::storage(e, "save draft"));
                })
        });
        if saved {
            self.dirty = false;
            self.checkpoint("save draft");
        }
        saved
    }

    /// Reloads the session's draft, replacing the live fields. The restore
    /// is undoable.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft store cannot be read.
    pub fn restore_draft(&mut self, store: &DraftStore) -> Result<bool> {
        let Some(draft) = store.load_draft(self.draft_key())? else {
            return Ok(false);
        };
        self.checkpoint("edit");
        self.title = draft.title;
        self.content = draft.content;
        self.checkpoint("restore draft");
        self.dirty = false;
        self.autosave.mark_clean();
        Ok(true)
    }

    /// Deletes the session's draft.
    ///
    /// # Errors
    ///
    /// Returns an error if the draft store cannot be written.
    pub fn discard_draft(&mut self, store: &DraftStore) -> Result<bool> {
        store.delete_draft(self.draft_key())
    }

    /// Advances the auto-save timer; saves the draft when due.
    pub fn tick(&mut self, store: &DraftStore, now: Instant) -> bool {
        let key = self.draft_key();
        let (title, content, errors) = (&self.title, &self.content, &mut self.errors);
        let attempted = self.autosave.poll(now, || {
            store
                .save_draft(key, title, content)
                .map(|_| ())
                .inspect_err(|e| {
                    errors.record(AppError::storage(e, "auto-save draft"));
                })
        });
        if attempted && !self.autosave.is_dirty() {
            self.dirty = false;
        }
        attempted
    }

    /// Validates the live fields as a template called `name`.
    pub fn validate(
        &self,
        name: &str,
        category: Option<EmailCategory>,
        limits: &ValidationLimits,
    ) -> ValidationReport {
        validate_template(
            &TemplateFields {
                name,
                title: &self.title,
                content: &self.content,
                category,
            },
            limits,
        )
    }

    /// Plain-text preview of the body.
    pub fn summary(&self, max_chars: usize) -> String {
        html_summary(&self.content, max_chars)
    }

    /// Runs an editor action against the host.
    ///
    /// Formatting goes to `caps`; undo/redo are applied here and announced.
    ///
    /// # Errors
    ///
    /// Returns an error if the host rejects a formatting command.
    pub fn handle_action(
        &mut self,
        action: EditorAction,
        caps: &mut dyn CapabilityProvider,
    ) -> Result<ActionOutcome> {
        let command = match action {
            EditorAction::Undo => {
                let moved = self.undo();
                return Ok(announce_step(moved, "Undone", "Nothing to undo", caps));
            }
            EditorAction::Redo => {
                let moved = self.redo();
                return Ok(announce_step(moved, "Redone", "Nothing to redo", caps));
            }
            EditorAction::Cancel => {
                caps.announce("Cancelled", Politeness::Polite);
                return Ok(ActionOutcome::Applied);
            }
            EditorAction::Save | EditorAction::Copy | EditorAction::Paste | EditorAction::Help => {
                return Ok(ActionOutcome::Host);
            }
            EditorAction::Bold => FormatCommand::Bold,
            EditorAction::Italic => FormatCommand::Italic,
            EditorAction::Underline => FormatCommand::Underline,
        };

        if let Err(e) = caps.execute(&command) {
            self.errors
                .record(AppError::unknown(&e, Some(command.command_name())));
            return Err(e.context(format!("Failed to apply {}", command.command_name())));
        }
        Ok(ActionOutcome::Applied)
    }

    /// Stores the history timeline for this session's draft slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeline cannot be written.
    pub fn persist_history(&self, layer: &PersistenceLayer) -> Result<()> {
        layer.save_timeline(&doc_id_for_key(self.draft_key()), self.history.buffer())
    }

    /// Replaces the history with the stored timeline and moves the fields
    /// to its current snapshot. Returns false when nothing was stored.
    ///
    /// Like loading a template, a restore leaves the session clean: the
    /// restored fields are not pending edits until the user changes them.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored timeline cannot be read.
    pub fn restore_history(&mut self, layer: &PersistenceLayer) -> Result<bool> {
        let Some(buffer) = layer.load_timeline(&doc_id_for_key(self.draft_key()))? else {
            return Ok(false);
        };
        let mut history = EditorHistory::from_buffer(buffer);
        history.set_capacity(self.history.buffer().capacity());
        self.history = history;
        if let Some(current) = self.history.current().cloned() {
            self.title = current.title;
            self.content = current.content;
        }
        self.dirty = false;
        self.autosave.mark_clean();
        Ok(true)
    }
}

fn announce_step(
    moved: bool,
    done: &str,
    unavailable: &str,
    caps: &mut dyn CapabilityProvider,
) -> ActionOutcome {
    if moved {
        caps.announce(done, Politeness::Polite);
        ActionOutcome::Applied
    } else {
        caps.announce(unavailable, Politeness::Polite);
        ActionOutcome::Unavailable
    }
}

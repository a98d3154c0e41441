/// Headless core of the mailpad email-template editor.
///
/// Templates and their validation, HTML sanitizing and export, keyboard
/// shortcuts, the auto-save lifecycle and the [`editor::EmailEditor`]
/// session that ties them to the undo/redo history and the draft store.
pub mod a11y;
pub mod autosave;
pub mod capability;
pub mod dates;
pub mod editor;
pub mod error;
pub mod export;
pub mod format;
pub mod history;
pub mod language;
pub mod sanitize;
pub mod shortcuts;
pub mod template;
pub mod validation;

pub use editor::{ActionOutcome, EmailEditor};
pub use error::{AppError, ErrorCode, ErrorLog};
pub use template::{EmailCategory, EmailTemplate, TemplateLibrary};

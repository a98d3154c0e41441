// Integration tests for an editing session.
//
// These drive EmailEditor against a real draft store and history database
// in a temporary directory.

use std::time::{Duration, Instant};

use mailpad_config::{AppConfig, DraftKey, DraftStore};
use mailpad_core::capability::HeadlessCapabilities;
use mailpad_core::history::PersistenceLayer;
use mailpad_core::shortcuts::{EditorAction, KeyEvent, ShortcutRegistry};
use mailpad_core::{ActionOutcome, EmailEditor, TemplateLibrary};

fn open_store(dir: &tempfile::TempDir) -> DraftStore {
    DraftStore::open(&DraftStore::draft_path(dir.path())).unwrap()
}

// ── Drafts ─────────────────────────────────────────────────────────────

#[test]
fn test_draft_wins_over_template_text_on_reload() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let library = TemplateLibrary::builtin();
    let template = library.get(2).unwrap();
    let config = AppConfig::default();

    let mut editor = EmailEditor::new(&config);
    assert!(!editor.load_template(template, Some(&store)));
    editor.set_title("Happy holidays");
    assert!(editor.save_draft(&store, Instant::now()));
    assert!(!editor.is_dirty());

    let mut reopened = EmailEditor::new(&config);
    assert!(reopened.load_template(template, Some(&store)));
    assert_eq!(reopened.title(), "Happy holidays");
    assert_eq!(reopened.content(), template.content);

    // Other templates are unaffected
    let other = library.get(1).unwrap();
    assert!(!reopened.load_template(other, Some(&store)));
    assert_eq!(reopened.title(), other.title);
}

#[test]
fn test_restore_draft_is_undoable() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let mut editor = EmailEditor::new(&AppConfig::default());
    editor.start_blank(Some(&store));

    editor.set_title("Saved title");
    editor.set_content("<p>Saved body text</p>");
    editor.save_draft(&store, Instant::now());

    editor.set_title("Scratch");
    assert!(editor.restore_draft(&store).unwrap());
    assert_eq!(editor.title(), "Saved title");

    assert!(editor.undo());
    assert_eq!(editor.title(), "Scratch");
}

#[test]
fn test_discard_draft() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let mut editor = EmailEditor::new(&AppConfig::default());
    editor.set_title("Temp");
    editor.save_draft(&store, Instant::now());
    assert!(store.has_draft(DraftKey::Default).unwrap());

    assert!(editor.discard_draft(&store).unwrap());
    assert!(!editor.discard_draft(&store).unwrap());
    assert!(!editor.restore_draft(&store).unwrap());
}

// ── Auto-save ──────────────────────────────────────────────────────────

#[test]
fn test_tick_autosaves_dirty_session() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);
    let config = AppConfig {
        auto_save_interval_secs: 10,
        ..Default::default()
    };
    let t0 = Instant::now();
    let mut editor = EmailEditor::new(&config);
    editor.autosave_mut().start(t0);

    editor.set_content("<p>Typed before the timer fired</p>");
    assert!(!editor.tick(&store, t0 + Duration::from_secs(5)));
    assert!(!store.has_draft(DraftKey::Default).unwrap());

    assert!(editor.tick(&store, t0 + Duration::from_secs(10)));
    assert!(!editor.is_dirty());
    let draft = store.load_draft(DraftKey::Default).unwrap().unwrap();
    assert_eq!(draft.content, "<p>Typed before the timer fired</p>");
}

// ── History persistence ────────────────────────────────────────────────

#[test]
fn test_history_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let layer = PersistenceLayer::open(dir.path()).unwrap();
    let library = TemplateLibrary::builtin();
    let template = library.get(3).unwrap();
    let config = AppConfig::default();

    let mut editor = EmailEditor::new(&config);
    editor.load_template(template, None);
    editor.set_title("Notice v2");
    editor.checkpoint("title");
    editor.set_title("Notice v3");
    editor.checkpoint("title");
    editor.undo();
    editor.persist_history(&layer).unwrap();

    let mut restarted = EmailEditor::new(&config);
    restarted.load_template(template, None);
    assert!(restarted.restore_history(&layer).unwrap());
    assert_eq!(restarted.title(), "Notice v2");
    assert!(restarted.redo());
    assert_eq!(restarted.title(), "Notice v3");

    // Unbound sessions have their own timeline
    let mut blank = EmailEditor::new(&config);
    assert!(!blank.restore_history(&layer).unwrap());
}

#[test]
fn test_restore_history_leaves_session_clean() {
    let dir = tempfile::tempdir().unwrap();
    let layer = PersistenceLayer::open(dir.path()).unwrap();
    let config = AppConfig::default();

    let mut editor = EmailEditor::new(&config);
    editor.set_title("Kept");
    editor.checkpoint("title");
    editor.persist_history(&layer).unwrap();

    let mut restarted = EmailEditor::new(&config);
    restarted.set_title("Typed before restore");
    assert!(restarted.is_dirty());
    assert!(restarted.restore_history(&layer).unwrap());
    assert_eq!(restarted.title(), "Kept");
    assert!(!restarted.is_dirty());
    assert!(!restarted.autosave().is_dirty());
}

// ── Keyboard flow ──────────────────────────────────────────────────────

#[test]
fn test_shortcut_dispatch_drives_undo() {
    let registry = ShortcutRegistry::with_defaults();
    let mut caps = HeadlessCapabilities::new();
    let mut editor = EmailEditor::new(&AppConfig::default());
    editor.set_title("Draft");

    let mut event = KeyEvent::new("z");
    event.ctrl = true;
    let action = registry.dispatch(&event).unwrap();
    assert_eq!(action, EditorAction::Undo);

    let outcome = editor.handle_action(action, &mut caps).unwrap();
    assert_eq!(outcome, ActionOutcome::Applied);
    assert_eq!(editor.title(), "");
    assert_eq!(caps.last_announcement(), Some("Undone"));
}

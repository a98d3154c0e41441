//! Keyboard shortcut registry.
//!
//! Maps normalized key combinations to editor actions. Key events coming
//! from the host are normalized the same way, so `ctrl+s`, `Ctrl + S` and
//! a Ctrl-held `S` key event all resolve to the same entry.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Primary modifier of a combo. Ctrl wins when both are held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Control,
    Meta,
}

/// A normalized key combination.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifier: Option<Modifier>,
    pub alt: bool,
    pub shift: bool,
    /// Lowercase key name (`s`, `f1`, `/`, `esc`, `space`).
    pub key: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyComboError {
    #[error("empty shortcut")]
    Empty,
    #[error("shortcut '{0}' has no key")]
    MissingKey(String),
    #[error("unknown modifier '{modifier}' in shortcut '{shortcut}'")]
    UnknownModifier { modifier: String, shortcut: String },
}

fn normalize_key(key: &str) -> String {
    match key.to_lowercase().as_str() {
        " " | "space" | "spacebar" => "space".to_string(),
        "escape" | "esc" => "esc".to_string(),
        other => other.to_string(),
    }
}

impl KeyCombo {
    /// A bare key with no modifiers.
    pub fn key(key: &str) -> Self {
        Self {
            modifier: None,
            alt: false,
            shift: false,
            key: normalize_key(key),
        }
    }

    pub fn ctrl(key: &str) -> Self {
        Self {
            modifier: Some(Modifier::Control),
            ..Self::key(key)
        }
    }

    pub fn meta(key: &str) -> Self {
        Self {
            modifier: Some(Modifier::Meta),
            ..Self::key(key)
        }
    }

    pub fn with_shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn with_alt(mut self) -> Self {
        self.alt = true;
        self
    }

    /// Combo label for the help screen, with macOS symbols when `mac`.
    pub fn display_label(&self, mac: bool) -> String {
        let mut parts: Vec<String> = Vec::new();
        match (self.modifier, mac) {
            (Some(Modifier::Control), true) => parts.push("⌃".into()),
            (Some(Modifier::Control), false) => parts.push("Ctrl".into()),
            (Some(Modifier::Meta), true) => parts.push("⌘".into()),
            (Some(Modifier::Meta), false) => parts.push("Win".into()),
            (None, _) => {}
        }
        if self.alt {
            parts.push(if mac { "⌥" } else { "Alt" }.into());
        }
        if self.shift {
            parts.push(if mac { "⇧" } else { "Shift" }.into());
        }
        let key = if self.key.chars().count() == 1 {
            self.key.to_uppercase()
        } else {
            let mut chars = self.key.chars();
            chars
                .next()
                .map(|c| c.to_uppercase().chain(chars).collect())
                .unwrap_or_default()
        };
        parts.push(key);
        parts.join(if mac { "" } else { "+" })
    }
}

impl FromStr for KeyCombo {
    type Err = KeyComboError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
        if compact.is_empty() {
            // A lone space is the space key, not an empty shortcut
            return if s.is_empty() {
                Err(KeyComboError::Empty)
            } else {
                Ok(Self::key("space"))
            };
        }

        // A trailing "+" means the plus key itself (`ctrl++`)
        let (head, key) = match compact.strip_suffix("++") {
            Some(head) => (head, "+"),
            None => match compact.rsplit_once('+') {
                Some((head, key)) => (head, key),
                None => ("", compact.as_str()),
            },
        };
        if key.is_empty() {
            return Err(KeyComboError::MissingKey(s.to_string()));
        }

        let mut combo = Self::key(key);
        for part in head.split('+').filter(|p| !p.is_empty()) {
            match part.to_lowercase().as_str() {
                "ctrl" | "control" => combo.modifier = Some(Modifier::Control),
                "cmd" | "command" | "meta" | "win" | "super" => {
                    if combo.modifier.is_none() {
                        combo.modifier = Some(Modifier::Meta);
                    }
                }
                "alt" | "option" | "opt" => combo.alt = true,
                "shift" => combo.shift = true,
                _ => {
                    return Err(KeyComboError::UnknownModifier {
                        modifier: part.to_string(),
                        shortcut: s.to_string(),
                    })
                }
            }
        }
        Ok(combo)
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.modifier {
            Some(Modifier::Control) => f.write_str("control+")?,
            Some(Modifier::Meta) => f.write_str("meta+")?,
            None => {}
        }
        if self.alt {
            f.write_str("alt+")?;
        }
        if self.shift {
            f.write_str("shift+")?;
        }
        f.write_str(&self.key)
    }
}

/// Where a key event was delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KeyTarget {
    #[default]
    Document,
    /// A text field or editable region.
    TextInput,
}

/// A key press as reported by the host.
#[derive(Debug, Clone, Default)]
pub struct KeyEvent {
    pub key: String,
    pub ctrl: bool,
    pub meta: bool,
    pub alt: bool,
    pub shift: bool,
    pub target: KeyTarget,
}

impl KeyEvent {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ..Self::default()
        }
    }

    pub fn combo(&self) -> KeyCombo {
        let modifier = if self.ctrl {
            Some(Modifier::Control)
        } else if self.meta {
            Some(Modifier::Meta)
        } else {
            None
        };
        KeyCombo {
            modifier,
            alt: self.alt,
            shift: self.shift,
            key: normalize_key(&self.key),
        }
    }
}

/// Editor commands a shortcut can trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorAction {
    Save,
    Copy,
    Paste,
    Undo,
    Redo,
    Bold,
    Italic,
    Underline,
    Help,
    Cancel,
}

impl EditorAction {
    pub fn description(&self) -> &'static str {
        match self {
            Self::Save => "Save",
            Self::Copy => "Copy",
            Self::Paste => "Paste",
            Self::Undo => "Undo",
            Self::Redo => "Redo",
            Self::Bold => "Bold",
            Self::Italic => "Italic",
            Self::Underline => "Underline",
            Self::Help => "Show shortcut help",
            Self::Cancel => "Cancel / close",
        }
    }
}

/// Combos still honored while typing in a text field.
fn allowed_in_text_input(combo: &KeyCombo) -> bool {
    if combo.alt || combo.shift {
        return false;
    }
    match combo.modifier {
        Some(_) => matches!(combo.key.as_str(), "s" | "z" | "y" | "a" | "c" | "v" | "x"),
        None => combo.key == "esc",
    }
}

/// Registered shortcuts in registration order.
#[derive(Debug, Clone)]
pub struct ShortcutRegistry {
    bindings: Vec<(KeyCombo, EditorAction)>,
    enabled: bool,
}

impl Default for ShortcutRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ShortcutRegistry {
    /// An enabled registry with no bindings.
    pub fn new() -> Self {
        Self {
            bindings: Vec::new(),
            enabled: true,
        }
    }

    /// The standard editor bindings, for both Ctrl and Cmd.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        let pairs = [
            ("s", EditorAction::Save),
            ("c", EditorAction::Copy),
            ("v", EditorAction::Paste),
            ("z", EditorAction::Undo),
            ("y", EditorAction::Redo),
            ("b", EditorAction::Bold),
            ("i", EditorAction::Italic),
            ("u", EditorAction::Underline),
            ("/", EditorAction::Help),
        ];
        for (key, action) in pairs {
            registry.register(KeyCombo::ctrl(key), action);
            registry.register(KeyCombo::meta(key), action);
        }
        registry.register(KeyCombo::ctrl("z").with_shift(), EditorAction::Redo);
        registry.register(KeyCombo::meta("z").with_shift(), EditorAction::Redo);
        registry.register(KeyCombo::key("f1"), EditorAction::Help);
        registry.register(KeyCombo::key("esc"), EditorAction::Cancel);
        registry
    }

    /// Binds `combo` to `action`, replacing any previous binding.
    pub fn register(&mut self, combo: KeyCombo, action: EditorAction) {
        tracing::debug!("Registered shortcut {combo} -> {action:?}");
        match self.bindings.iter_mut().find(|(c, _)| *c == combo) {
            Some(binding) => binding.1 = action,
            None => self.bindings.push((combo, action)),
        }
    }

    /// Removes a binding. Returns whether it existed.
    pub fn unregister(&mut self, combo: &KeyCombo) -> bool {
        let before = self.bindings.len();
        self.bindings.retain(|(c, _)| c != combo);
        self.bindings.len() != before
    }

    pub fn is_registered(&self, combo: &KeyCombo) -> bool {
        self.bindings.iter().any(|(c, _)| c == combo)
    }

    pub fn registered(&self) -> impl Iterator<Item = (&KeyCombo, EditorAction)> {
        self.bindings.iter().map(|(c, a)| (c, *a))
    }

    /// Looks up `combo`. Returns `None` when disabled or unbound.
    pub fn execute(&self, combo: &KeyCombo) -> Option<EditorAction> {
        if !self.enabled {
            return None;
        }
        self.bindings
            .iter()
            .find(|(c, _)| c == combo)
            .map(|(_, action)| *action)
    }

    /// Resolves a key event, applying the text-input filter.
    pub fn dispatch(&self, event: &KeyEvent) -> Option<EditorAction> {
        if !self.enabled {
            return None;
        }
        let combo = event.combo();
        if event.target == KeyTarget::TextInput && !allowed_in_text_input(&combo) {
            return None;
        }
        self.execute(&combo)
    }

    pub fn enable(&mut self) {
        self.enabled = true;
    }

    pub fn disable(&mut self) {
        self.enabled = false;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    /// Lines for a help screen: a heading, a blank line, one line per binding.
    pub fn help_lines(&self, mac: bool) -> Vec<String> {
        let mut lines = vec!["Keyboard shortcuts:".to_string(), String::new()];
        lines.extend(
            self.bindings
                .iter()
                .map(|(combo, action)| format!("{}: {}", combo.display_label(mac), action.description())),
        );
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> KeyCombo {
        s.parse().expect("valid combo")
    }

    #[test]
    fn test_parse_normalizes_aliases() {
        assert_eq!(parse("ctrl+s").to_string(), "control+s");
        assert_eq!(parse("Cmd + Z").to_string(), "meta+z");
        assert_eq!(parse("command+shift+z").to_string(), "meta+shift+z");
        assert_eq!(parse("Ctrl+Shift+Z"), KeyCombo::ctrl("z").with_shift());
        assert_eq!(parse("Escape").to_string(), "esc");
        assert_eq!(parse("ctrl+/").key, "/");
        assert_eq!(parse("ctrl++").key, "+");
        assert_eq!(parse(" ").key, "space");
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<KeyCombo>(), Err(KeyComboError::Empty));
        assert!(matches!("ctrl+".parse::<KeyCombo>(), Err(KeyComboError::MissingKey(_))));
        assert!(matches!(
            "hyper+s".parse::<KeyCombo>(),
            Err(KeyComboError::UnknownModifier { .. })
        ));
    }

    #[test]
    fn test_event_combo_prefers_control() {
        let event = KeyEvent {
            key: "S".into(),
            ctrl: true,
            meta: true,
            ..KeyEvent::default()
        };
        assert_eq!(event.combo().to_string(), "control+s");
        assert_eq!(KeyEvent::new(" ").combo().key, "space");
        assert_eq!(KeyEvent::new("Escape").combo().key, "esc");
    }

    #[test]
    fn test_defaults_dispatch() {
        let registry = ShortcutRegistry::with_defaults();
        let meta_z = KeyEvent {
            key: "z".into(),
            meta: true,
            ..KeyEvent::default()
        };
        assert_eq!(registry.dispatch(&meta_z), Some(EditorAction::Undo));

        let redo = KeyEvent {
            key: "Z".into(),
            ctrl: true,
            shift: true,
            ..KeyEvent::default()
        };
        assert_eq!(registry.dispatch(&redo), Some(EditorAction::Redo));
        assert_eq!(registry.dispatch(&KeyEvent::new("F1")), Some(EditorAction::Help));
        assert_eq!(registry.execute(&parse("meta+/")), Some(EditorAction::Help));
        assert_eq!(registry.dispatch(&KeyEvent::new("q")), None);
    }

    #[test]
    fn test_text_input_filter() {
        let registry = ShortcutRegistry::with_defaults();
        let in_input = |key: &str, ctrl: bool| KeyEvent {
            key: key.into(),
            ctrl,
            target: KeyTarget::TextInput,
            ..KeyEvent::default()
        };

        assert_eq!(registry.dispatch(&in_input("s", true)), Some(EditorAction::Save));
        assert_eq!(registry.dispatch(&in_input("z", true)), Some(EditorAction::Undo));
        assert_eq!(registry.dispatch(&in_input("Escape", false)), Some(EditorAction::Cancel));
        // Bold is bound but suppressed while typing
        assert_eq!(registry.dispatch(&in_input("b", true)), None);
        assert_eq!(registry.dispatch(&in_input("F1", false)), None);
    }

    #[test]
    fn test_disabled_registry_ignores_everything() {
        let mut registry = ShortcutRegistry::with_defaults();
        registry.disable();
        assert!(!registry.is_enabled());
        assert_eq!(registry.execute(&KeyCombo::ctrl("s")), None);
        registry.enable();
        assert_eq!(registry.execute(&KeyCombo::ctrl("s")), Some(EditorAction::Save));
    }

    #[test]
    fn test_register_replace_and_unregister() {
        let mut registry = ShortcutRegistry::new();
        registry.register(parse("ctrl+k"), EditorAction::Bold);
        registry.register(parse("control+K"), EditorAction::Italic);
        assert_eq!(registry.registered().count(), 1);
        assert_eq!(registry.execute(&KeyCombo::ctrl("k")), Some(EditorAction::Italic));

        assert!(registry.unregister(&KeyCombo::ctrl("k")));
        assert!(!registry.unregister(&KeyCombo::ctrl("k")));
        assert!(!registry.is_registered(&KeyCombo::ctrl("k")));

        let mut defaults = ShortcutRegistry::with_defaults();
        defaults.clear();
        assert_eq!(defaults.registered().count(), 0);
    }

    #[test]
    fn test_help_lines() {
        let mut registry = ShortcutRegistry::new();
        registry.register(KeyCombo::ctrl("s"), EditorAction::Save);
        registry.register(KeyCombo::meta("z").with_shift(), EditorAction::Redo);
        registry.register(KeyCombo::key("f1"), EditorAction::Help);

        let pc = registry.help_lines(false);
        assert_eq!(pc[0], "Keyboard shortcuts:");
        assert_eq!(pc[1], "");
        assert_eq!(pc[2], "Ctrl+S: Save");
        assert_eq!(pc[3], "Win+Shift+Z: Redo");
        assert_eq!(pc[4], "F1: Show shortcut help");

        let mac = registry.help_lines(true);
        assert_eq!(mac[2], "⌃S: Save");
        assert_eq!(mac[3], "⌘⇧Z: Redo");
    }
}

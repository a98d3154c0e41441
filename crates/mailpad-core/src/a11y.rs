/// Keyboard focus management for a group of focusable controls.
use crate::capability::{CapabilityProvider, Politeness};
use crate::shortcuts::KeyEvent;

/// Ordered set of focusable items with a wrapping cursor.
///
/// `T` is whatever identifies a control on the host side.
#[derive(Debug, Clone)]
pub struct FocusRing<T> {
    items: Vec<T>,
    current: Option<usize>,
}

impl<T: PartialEq> FocusRing<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self {
            items,
            current: None,
        }
    }

    /// Replaces the items, keeping focus on the same item when it survives.
    pub fn set_items(&mut self, items: Vec<T>) {
        let focused = self.current.take().map(|i| &self.items[i]);
        let kept = focused.and_then(|item| items.iter().position(|other| other == item));
        self.items = items;
        self.current = kept;
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn current(&self) -> Option<&T> {
        self.current.map(|i| &self.items[i])
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    /// Focuses `item`. Returns false if it is not in the ring.
    pub fn focus(&mut self, item: &T) -> bool {
        match self.items.iter().position(|i| i == item) {
            Some(idx) => {
                self.current = Some(idx);
                true
            }
            None => false,
        }
    }

    pub fn blur(&mut self) {
        self.current = None;
    }

    pub fn focus_next(&mut self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        let next = self.current.map_or(0, |i| (i + 1) % self.items.len());
        self.current = Some(next);
        self.current()
    }

    pub fn focus_previous(&mut self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        let prev = match self.current {
            Some(i) if i > 0 => i - 1,
            _ => self.items.len() - 1,
        };
        self.current = Some(prev);
        self.current()
    }

    pub fn focus_first(&mut self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        self.current = Some(0);
        self.current()
    }

    pub fn focus_last(&mut self) -> Option<&T> {
        if self.items.is_empty() {
            return None;
        }
        self.current = Some(self.items.len() - 1);
        self.current()
    }

    /// Keeps Tab inside the ring.
    ///
    /// Wraps Tab on the last item to the first and Shift+Tab on the first
    /// item to the last. Returns true when the key was consumed; any other
    /// position is left to the host's normal tab order.
    pub fn trap_tab(&mut self, event: &KeyEvent) -> bool {
        if event.key != "Tab" || self.items.is_empty() {
            return false;
        }
        let last = self.items.len() - 1;
        match (event.shift, self.current) {
            (true, Some(0)) => {
                self.current = Some(last);
                true
            }
            (false, Some(i)) if i == last => {
                self.current = Some(0);
                true
            }
            _ => false,
        }
    }

    /// Arrow/Home/End navigation. Escape announces a cancellation.
    ///
    /// Returns true when the key was consumed.
    pub fn handle_key(&mut self, event: &KeyEvent, caps: &mut dyn CapabilityProvider) -> bool {
        let modified = event.ctrl || event.meta;
        match event.key.as_str() {
            "ArrowDown" | "ArrowRight" if !modified => self.focus_next().is_some(),
            "ArrowUp" | "ArrowLeft" if !modified => self.focus_previous().is_some(),
            "Home" if modified => self.focus_first().is_some(),
            "End" if modified => self.focus_last().is_some(),
            "Escape" => {
                caps.announce("Cancelled", Politeness::Polite);
                true
            }
            _ => false,
        }
    }
}

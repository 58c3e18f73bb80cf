//! Navigation and mode state.
//!
//! Pure transitions over a small struct: no awaits, no collaborator calls.
//! Command mode is derived from a leading sentinel in the raw query rather
//! than stored, so editing the sentinel in or out of the text is the mode
//! switch. The fuzzy toggle is an explicit flag that yields to a derived
//! command mode and resurfaces when the sentinel goes away.

use tracing::debug;

use crate::model::{COMMAND_SENTINEL, SearchMode};

/// Rows a PageUp/PageDown step jumps over.
pub const PAGE_STEP: usize = 5;

/// Cursor movement over the displayed list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorMove {
    Next,
    Prev,
    First,
    Last,
    PageDown,
    PageUp,
}

/// What an Escape press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EscapeAction {
    WentBack,
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct NavigationState {
    open: bool,
    /// Raw query as typed, sentinel included.
    query: String,
    fuzzy: bool,
    category: Option<String>,
    selected: usize,
}

impl NavigationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Raw query with any command sentinel stripped.
    pub fn command_body(&self) -> &str {
        self.query
            .strip_prefix(COMMAND_SENTINEL)
            .unwrap_or(&self.query)
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Current mode: a leading sentinel always means command.
    pub fn mode(&self) -> SearchMode {
        if self.query.starts_with(COMMAND_SENTINEL) {
            SearchMode::Command
        } else if self.fuzzy {
            SearchMode::Fuzzy
        } else {
            SearchMode::Normal
        }
    }

    pub fn open(&mut self) {
        self.open = true;
        self.selected = 0;
    }

    /// Open straight into command mode by seeding the sentinel. Works
    /// from inside a category too; commands rank over the whole catalog.
    pub fn open_command(&mut self) {
        self.open = true;
        self.query = COMMAND_SENTINEL.to_string();
        self.fuzzy = false;
        self.category = None;
        self.selected = 0;
    }

    pub fn close(&mut self) {
        self.open = false;
        self.query.clear();
        self.fuzzy = false;
        self.category = None;
        self.selected = 0;
    }

    /// One level up: out of the category, or out of command mode. At the
    /// top level only the cursor resets.
    pub fn back(&mut self) {
        if self.category.is_some() {
            self.category = None;
            self.query.clear();
        } else if self.mode() == SearchMode::Command {
            self.query.clear();
            self.fuzzy = false;
        } else {
            debug!("back_at_top_level");
        }
        self.selected = 0;
    }

    /// Escape backs out of categories and command mode, and closes from
    /// the top level.
    pub fn escape(&mut self) -> EscapeAction {
        if self.category.is_some() || self.mode() == SearchMode::Command {
            self.back();
            EscapeAction::WentBack
        } else {
            self.close();
            EscapeAction::Closed
        }
    }

    /// Drill into a category. The typed query does not follow; browsing
    /// starts fresh inside.
    pub fn enter_category(&mut self, id: impl Into<String>) {
        self.category = Some(id.into());
        self.query.clear();
        self.selected = 0;
    }

    /// Replace the raw query. Unchanged text leaves the cursor alone;
    /// edits reset it.
    pub fn set_query(&mut self, raw: impl Into<String>) {
        let raw = raw.into();
        if raw == self.query {
            return;
        }
        self.query = raw;
        self.selected = 0;
    }

    /// Flip normal and fuzzy matching. Ignored while the sentinel derives
    /// command mode; leaving command mode is back/escape's job.
    pub fn toggle_fuzzy(&mut self) {
        if self.mode() == SearchMode::Command {
            debug!("fuzzy_toggle_ignored_in_command_mode");
            return;
        }
        self.fuzzy = !self.fuzzy;
        self.selected = 0;
    }

    /// Move the cursor over a displayed list of length `len`. Next/Prev
    /// wrap at both ends; page steps clamp.
    pub fn move_cursor(&mut self, mv: CursorMove, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let last = len - 1;
        self.selected = match mv {
            CursorMove::Next => {
                if self.selected >= last {
                    0
                } else {
                    self.selected + 1
                }
            }
            CursorMove::Prev => {
                if self.selected == 0 {
                    last
                } else {
                    self.selected - 1
                }
            }
            CursorMove::First => 0,
            CursorMove::Last => last,
            CursorMove::PageDown => (self.selected + PAGE_STEP).min(last),
            CursorMove::PageUp => self.selected.saturating_sub(PAGE_STEP),
        };
    }

    /// Keep the cursor inside the displayed list after a length change.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }
}

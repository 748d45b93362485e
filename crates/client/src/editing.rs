//! Single-cell editing overlay.
//!
//! States are `Idle` and `Editing(coord)`. The pending text lives here, not in
//! the cell store, so discarding an edit never touches stored state.

use crate::cell::CellCoord;

/// How an edit ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FinishMode {
    Commit,
    Discard,
}

/// Keys with a meaning to the editor. Everything else is text input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKey {
    Enter,
    NumpadEnter,
    Tab,
    Escape,
}

impl EditKey {
    pub fn finish_mode(self) -> FinishMode {
        match self {
            EditKey::Enter | EditKey::NumpadEnter | EditKey::Tab => FinishMode::Commit,
            EditKey::Escape => FinishMode::Discard,
        }
    }
}

/// The in-progress text of the edited cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub coord: CellCoord,
    pub text: String,
}

#[derive(Debug, Clone, Default)]
pub struct EditingOverlay {
    pending: Option<PendingEdit>,
}

impl EditingOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start editing `coord` with `text` (the cell's current expression).
    pub fn begin(&mut self, coord: CellCoord, text: String) {
        self.pending = Some(PendingEdit { coord, text });
    }

    pub fn pending(&self) -> Option<&PendingEdit> {
        self.pending.as_ref()
    }

    pub fn is_editing(&self) -> bool {
        self.pending.is_some()
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        if let Some(p) = self.pending.as_mut() {
            p.text = text.into();
        }
    }

    pub fn insert_char(&mut self, ch: char) {
        if let Some(p) = self.pending.as_mut() {
            p.text.push(ch);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(p) = self.pending.as_mut() {
            p.text.pop();
        }
    }

    /// Leave edit mode, handing back the pending text.
    pub fn take(&mut self) -> Option<PendingEdit> {
        self.pending.take()
    }
}

/// Decide what a commit writes.
///
/// The text is right-trimmed and compared with the cell's current expression
/// (absent counts as empty). Returns `None` when nothing changes, otherwise
/// the expression to store, where `Some(None)` deletes the cell.
pub fn commit_expression(text: &str, current: Option<&str>) -> Option<Option<String>> {
    let trimmed = text.trim_end();
    if trimmed == current.unwrap_or("") {
        return None;
    }
    if trimmed.is_empty() {
        Some(None)
    } else {
        Some(Some(trimmed.to_string()))
    }
}

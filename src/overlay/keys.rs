//! Keyboard routing.
//!
//! Accelerators fire anywhere in the app, open or closed. While the overlay
//! is open, navigation keys drive the cursor and everything else passes
//! through to the host's text input, so typing is never swallowed.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use super::OverlayEvent;
use crate::overlay::state::CursorMove;

/// What to do with one key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyDecision {
    Handled(OverlayEvent),
    /// Not ours: deliver to the focused widget as usual.
    PassThrough,
}

/// Map a key event. `open` is whether the overlay is currently showing.
pub fn decide(key: &KeyEvent, open: bool) -> KeyDecision {
    if key.kind == KeyEventKind::Release {
        return KeyDecision::PassThrough;
    }

    // Ctrl on most platforms, Cmd (SUPER) on macOS.
    let primary = key
        .modifiers
        .intersects(KeyModifiers::CONTROL | KeyModifiers::SUPER);
    if primary {
        match key.code {
            KeyCode::Char('k') | KeyCode::Char('K') => {
                let shifted = key.modifiers.contains(KeyModifiers::SHIFT)
                    || key.code == KeyCode::Char('K');
                return KeyDecision::Handled(if shifted {
                    OverlayEvent::OpenCommand
                } else {
                    OverlayEvent::Open
                });
            }
            KeyCode::Char('/') => return KeyDecision::Handled(OverlayEvent::ToggleFuzzy),
            _ => {}
        }
    }

    if !open {
        return KeyDecision::PassThrough;
    }

    match key.code {
        KeyCode::Esc => KeyDecision::Handled(OverlayEvent::Escape),
        KeyCode::Enter => KeyDecision::Handled(OverlayEvent::Activate),
        KeyCode::Up => KeyDecision::Handled(OverlayEvent::Move(CursorMove::Prev)),
        KeyCode::Down => KeyDecision::Handled(OverlayEvent::Move(CursorMove::Next)),
        KeyCode::Home => KeyDecision::Handled(OverlayEvent::Move(CursorMove::First)),
        KeyCode::End => KeyDecision::Handled(OverlayEvent::Move(CursorMove::Last)),
        KeyCode::PageUp => KeyDecision::Handled(OverlayEvent::Move(CursorMove::PageUp)),
        KeyCode::PageDown => KeyDecision::Handled(OverlayEvent::Move(CursorMove::PageDown)),
        _ => KeyDecision::PassThrough,
    }
}

/// Accelerator table for help surfaces.
pub fn binding_legend() -> Vec<(&'static str, &'static str)> {
    vec![
        ("Ctrl+K", "Open search"),
        ("Ctrl+Shift+K", "Open command palette"),
        ("Ctrl+/", "Toggle fuzzy matching"),
        ("Esc", "Back / close"),
        ("Enter", "Select"),
        ("↑ ↓", "Move (wraps)"),
        ("PgUp PgDn", "Jump five rows"),
        ("Home End", "First / last row"),
    ]
}

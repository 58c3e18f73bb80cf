mod util;

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use omnibar::{SearchMode, binding_legend};
use util::{MemStore, RecordingShell, StubBackend, session_with};

#[tokio::test]
async fn primary_k_toggles_and_escape_closes() {
    let backend = Arc::new(StubBackend::default());
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(backend, store, shell);
    session.mount().await;

    let open_key = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL);
    assert!(session.handle_key(&open_key), "accelerator must be consumed");
    assert!(session.is_open());

    // Plain letters reach the host input, never the session.
    let letter = KeyEvent::new(KeyCode::Char('x'), KeyModifiers::NONE);
    assert!(!session.handle_key(&letter));

    let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
    assert!(session.handle_key(&esc));
    assert!(!session.is_open());

    // Navigation keys mean nothing while closed.
    let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
    assert!(!session.handle_key(&down));

    // A second chord reopens; the same chord while open closes again.
    assert!(session.handle_key(&open_key));
    assert!(session.is_open());
    assert!(session.handle_key(&open_key));
    assert!(!session.is_open());
}

#[tokio::test]
async fn shifted_chord_opens_the_command_palette() {
    let backend = Arc::new(StubBackend::default());
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(backend, store, shell);
    session.mount().await;

    let key = KeyEvent::new(
        KeyCode::Char('K'),
        KeyModifiers::CONTROL | KeyModifiers::SHIFT,
    );
    assert!(session.handle_key(&key));
    assert!(session.is_open());
    assert_eq!(session.mode(), SearchMode::Command);
    assert_eq!(session.query(), ">");
}

#[tokio::test]
async fn cursor_keys_drive_the_category_browser() {
    let backend = Arc::new(StubBackend::default());
    let store = Arc::new(MemStore::default());
    let shell = Arc::new(RecordingShell::default());
    let mut session = session_with(backend, store, shell);
    session.mount().await;

    let open_key = KeyEvent::new(KeyCode::Char('k'), KeyModifiers::CONTROL);
    session.handle_key(&open_key);

    // Three category tiles: down twice lands on the last, once more wraps.
    let down = KeyEvent::new(KeyCode::Down, KeyModifiers::NONE);
    session.handle_key(&down);
    session.handle_key(&down);
    assert_eq!(session.selected(), 2);
    session.handle_key(&down);
    assert_eq!(session.selected(), 0);

    let end = KeyEvent::new(KeyCode::End, KeyModifiers::NONE);
    session.handle_key(&end);
    assert_eq!(session.selected(), 2);

    let up = KeyEvent::new(KeyCode::Up, KeyModifiers::NONE);
    session.handle_key(&up);
    assert_eq!(session.selected(), 1);
}

#[test]
fn legend_mentions_every_core_chord() {
    let legend = binding_legend();
    let chords: Vec<&str> = legend.iter().map(|(chord, _)| *chord).collect();
    for expected in ["Ctrl+K", "Ctrl+Shift+K", "Ctrl+/", "Esc", "Enter"] {
        assert!(
            chords.contains(&expected),
            "legend should mention {expected}"
        );
    }
}

//! Keyboard input handling.
//!
//! Maps terminal key events to [`App`] actions.  Adding a new keybinding is
//! a single match arm in [`handle_key_event`]; remember the help text in the
//! status bar.

use std::time::Instant;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};

use crate::app::App;
use crate::service::SectionRequester;

/// Process a single key event, updating app state accordingly.
///
/// Only reacts to key-press events (ignoring release / repeat) so that each
/// physical keypress triggers exactly one action.
pub fn handle_key_event<R: SectionRequester + Clone>(app: &mut App<R>, key: KeyEvent, now: Instant) {
    if key.kind != KeyEventKind::Press {
        return;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => app.shutdown(),
        KeyCode::Char('r') => app.refresh(now),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    use crate::orchestrator::test_support::RecordingRequester;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn q_quits_and_detaches() {
        let mut app = App::new(RecordingRequester::default());
        handle_key_event(&mut app, press(KeyCode::Char('q')), Instant::now());
        assert!(app.quit);
        assert!(!app.card.is_attached());
    }

    #[test]
    fn r_refreshes() {
        let requester = RecordingRequester::default();
        let mut app = App::new(requester.clone());
        handle_key_event(&mut app, press(KeyCode::Char('r')), Instant::now());
        assert_eq!(requester.calls().len(), 2);
    }

    #[test]
    fn key_release_is_ignored() {
        let requester = RecordingRequester::default();
        let mut app = App::new(requester.clone());
        let mut key = press(KeyCode::Char('r'));
        key.kind = KeyEventKind::Release;
        handle_key_event(&mut app, key, Instant::now());
        assert!(requester.calls().is_empty());
    }
}

use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// User actions from keyboard events
#[derive(Debug, PartialEq)]
pub enum Action {
    Quit,
    ClearSearch,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    Select,
    CopyPayload,
    DeleteEntry,
    ClearHistory,
    UpdateSearch(char),
    DeleteChar,
    None,
}

/// Poll for keyboard events and convert to actions
pub fn poll_event(timeout: Duration) -> anyhow::Result<Action> {
    if event::poll(timeout)?
        && let Event::Key(key) = event::read()?
        && key.kind != KeyEventKind::Release
    {
        return Ok(key_to_action(key));
    }
    Ok(Action::None)
}

pub(crate) fn key_to_action(key: KeyEvent) -> Action {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), KeyModifiers::CONTROL) => Action::Quit,
        (KeyCode::Esc, _) => Action::ClearSearch,

        (KeyCode::Char('p'), KeyModifiers::CONTROL) | (KeyCode::Up, _) => Action::MoveUp,
        (KeyCode::Char('n'), KeyModifiers::CONTROL) | (KeyCode::Down, _) => Action::MoveDown,
        (KeyCode::PageUp, _) => Action::PageUp,
        (KeyCode::PageDown, _) => Action::PageDown,

        (KeyCode::Enter, _) => Action::Select,
        (KeyCode::Char('y'), KeyModifiers::CONTROL) => Action::CopyPayload,
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => Action::DeleteEntry,
        (KeyCode::Char('x'), KeyModifiers::CONTROL) => Action::ClearHistory,

        (KeyCode::Char(c), KeyModifiers::NONE) | (KeyCode::Char(c), KeyModifiers::SHIFT) => {
            Action::UpdateSearch(c)
        }
        (KeyCode::Backspace, _) => Action::DeleteChar,

        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> Action {
        key_to_action(KeyEvent::new(code, modifiers))
    }

    #[test]
    fn test_quit_and_escape() {
        assert_eq!(key(KeyCode::Char('c'), KeyModifiers::CONTROL), Action::Quit);
        assert_eq!(key(KeyCode::Esc, KeyModifiers::NONE), Action::ClearSearch);
    }

    #[test]
    fn test_navigation() {
        assert_eq!(key(KeyCode::Char('p'), KeyModifiers::CONTROL), Action::MoveUp);
        assert_eq!(key(KeyCode::Char('n'), KeyModifiers::CONTROL), Action::MoveDown);
        assert_eq!(key(KeyCode::Up, KeyModifiers::NONE), Action::MoveUp);
        assert_eq!(key(KeyCode::Down, KeyModifiers::NONE), Action::MoveDown);
        assert_eq!(key(KeyCode::PageUp, KeyModifiers::NONE), Action::PageUp);
        assert_eq!(key(KeyCode::PageDown, KeyModifiers::NONE), Action::PageDown);
    }

    #[test]
    fn test_entry_actions() {
        assert_eq!(key(KeyCode::Enter, KeyModifiers::NONE), Action::Select);
        assert_eq!(key(KeyCode::Char('y'), KeyModifiers::CONTROL), Action::CopyPayload);
        assert_eq!(key(KeyCode::Char('d'), KeyModifiers::CONTROL), Action::DeleteEntry);
        assert_eq!(key(KeyCode::Char('x'), KeyModifiers::CONTROL), Action::ClearHistory);
    }

    #[test]
    fn test_plain_letters_go_to_search() {
        // Unmodified d/x/y are search input, not entry actions
        assert_eq!(key(KeyCode::Char('d'), KeyModifiers::NONE), Action::UpdateSearch('d'));
        assert_eq!(key(KeyCode::Char('W'), KeyModifiers::SHIFT), Action::UpdateSearch('W'));
        assert_eq!(key(KeyCode::Backspace, KeyModifiers::NONE), Action::DeleteChar);
    }

    #[test]
    fn test_unknown_key() {
        assert_eq!(key(KeyCode::F(1), KeyModifiers::NONE), Action::None);
        assert_eq!(key(KeyCode::Tab, KeyModifiers::NONE), Action::None);
    }
}

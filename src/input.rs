use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::session::Phase;

/// What a key press means to the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Type(char),
    Backspace,
    Start,
    Restart,
    NewParagraph,
    CycleTimer,
    Quit,
    Ignore,
}

/// Maps a terminal key event to an [`Action`] for the given session phase.
///
/// Shortcut chords (ctrl/alt/super) never reach the session; ctrl+c quits.
pub fn map_key(key: KeyEvent, phase: Phase) -> Action {
    if key.kind == KeyEventKind::Release {
        return Action::Ignore;
    }

    let chord =
        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER | KeyModifiers::META;
    if key.modifiers.intersects(chord) {
        return match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => Action::Quit,
            _ => Action::Ignore,
        };
    }

    match key.code {
        KeyCode::Esc => Action::Quit,
        KeyCode::Tab => Action::CycleTimer,
        KeyCode::Left => Action::Restart,
        KeyCode::Right => Action::NewParagraph,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Enter if phase == Phase::Idle => Action::Start,
        KeyCode::Char(c) => match phase {
            Phase::Idle | Phase::Running => Action::Type(c),
            Phase::Finished => match c {
                'r' => Action::Restart,
                'n' => Action::NewParagraph,
                _ => Action::Ignore,
            },
        },
        _ => Action::Ignore,
    }
}

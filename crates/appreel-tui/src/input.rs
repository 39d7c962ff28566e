use crossterm::event::KeyEvent;

use crate::app::{App, Mode};
use crate::keymap::KeyBinding;

/// Input action that can be performed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    /// Scroll to the next slide's rest point
    NextSlide,
    PrevSlide,
    JumpToTop,
    JumpToBottom,
    PendingG, // First 'g' press, waiting for second 'g'
    /// Follow the active app's route
    Open,
    ToggleMode,
    TogglePointer,
    Help,
    ExitMode,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App) -> Action {
    if app.mode == Mode::Help {
        // Any key exits help
        return Action::ExitMode;
    }

    let binding = KeyBinding::from(key);
    if app.keymap.starts_sequence(&binding) {
        return match app.pending_key {
            Some('g') => app.keymap.sequence_action().unwrap_or(Action::None),
            _ => Action::PendingG,
        };
    }

    app.keymap.action_for(&binding).unwrap_or(Action::None)
}

//! Key bindings of the console window.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// What a key press asks the application to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    /// Send the input line to the shell (Enter).
    Submit,
    /// Abort the running command (Ctrl+C, from anywhere).
    Interrupt,
    /// Close the window (Ctrl+Q).
    Quit,
    Insert(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    /// Recall the previous submitted command.
    HistoryPrev,
    HistoryNext,
    /// Clear the input line (Ctrl+U).
    ClearInput,
    ScrollUp,
    ScrollDown,
    ScrollToBottom,
}

/// Map a key event to an intent. Releases and unbound keys map to `None`.
pub fn key_to_intent(key: KeyEvent) -> Option<Intent> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let intent = match key.code {
        KeyCode::Char(c) if ctrl => match c.to_ascii_lowercase() {
            'c' => Intent::Interrupt,
            'q' => Intent::Quit,
            'u' => Intent::ClearInput,
            'a' => Intent::CursorHome,
            'e' => Intent::CursorEnd,
            _ => return None,
        },
        KeyCode::Char(c) => Intent::Insert(c),
        KeyCode::Enter => Intent::Submit,
        KeyCode::Backspace => Intent::Backspace,
        KeyCode::Delete => Intent::Delete,
        KeyCode::Left => Intent::CursorLeft,
        KeyCode::Right => Intent::CursorRight,
        KeyCode::Home => Intent::CursorHome,
        KeyCode::End if ctrl => Intent::ScrollToBottom,
        KeyCode::End => Intent::CursorEnd,
        KeyCode::Up => Intent::HistoryPrev,
        KeyCode::Down => Intent::HistoryNext,
        KeyCode::PageUp => Intent::ScrollUp,
        KeyCode::PageDown => Intent::ScrollDown,
        _ => return None,
    };
    Some(intent)
}

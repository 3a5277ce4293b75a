//! User interface of the console window.
//!
//! The window is a transcript pane, a one-line command editor and a
//! status line with key hints. All state shown here is read from [`App`].

use ratatui::buffer::Buffer;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::app::App;
use crate::shell::SessionState;

pub mod history;
pub mod input;
pub mod terminal;

pub use input::InputLine;
pub use terminal::{SCROLL_STEP, TranscriptPane, TranscriptView};

const PLACEHOLDER: &str = "Enter commands here...";
const HINTS: &str = " Enter: execute  Ctrl+C: interrupt  PgUp/PgDn: scroll  Ctrl+Q: quit";

/// Areas of the window, top to bottom.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowLayout {
    pub transcript: Rect,
    pub input: Rect,
    pub status: Rect,
}

impl WindowLayout {
    pub fn new(area: Rect) -> Self {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(3), Constraint::Length(3), Constraint::Length(1)])
            .split(area);
        Self {
            transcript: chunks[0],
            input: chunks[1],
            status: chunks[2],
        }
    }

    /// Inner area of the bordered input box.
    pub fn input_inner(&self) -> Rect {
        Block::default().borders(Borders::ALL).inner(self.input)
    }
}

fn state_label(state: SessionState) -> Span<'static> {
    let (text, color) = match state {
        SessionState::NotStarted => ("NOT STARTED", Color::DarkGray),
        SessionState::Starting => ("STARTING", Color::Yellow),
        SessionState::Running => ("RUNNING", Color::Green),
        SessionState::Terminating => ("TERMINATING", Color::Yellow),
        SessionState::Stopped => ("STOPPED", Color::Red),
    };
    Span::styled(format!(" {text} "), Style::default().fg(Color::Black).bg(color))
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let layout = WindowLayout::new(area);

        TranscriptPane {
            transcript: self.session().transcript(),
            view: &self.view,
            title: format!(" {} ", self.shell_name),
        }
        .render(layout.transcript, buf);

        let input_block = Block::default().borders(Borders::ALL).title(" Command ");
        let inner = input_block.inner(layout.input);
        input_block.render(layout.input, buf);
        let line = if self.input.text().is_empty() {
            Line::from(PLACEHOLDER.dark_gray())
        } else {
            let (shown, _) = self.input.visible(usize::from(inner.width));
            Line::raw(shown)
        };
        Paragraph::new(line).render(inner, buf);

        let transcript = self.session().transcript();
        let status = Line::from(vec![
            state_label(self.session_state),
            Span::raw(format!(" {} ", self.session().decoder().name())),
            Span::raw(format!("{}/{} lines ", transcript.len(), transcript.max_lines())),
            Span::raw(HINTS).dark_gray(),
        ]);
        Paragraph::new(status).render(layout.status, buf);
    }
}

//! Transcript pane: the visible tail of the shell's output.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use ratatui::prelude::{Buffer, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use crate::output::{ERROR_MARKER, Transcript};

/// Lines moved per PgUp/PgDn.
pub const SCROLL_STEP: usize = 10;

/// Scroll state of the transcript pane.
///
/// The view is anchored to the bottom; `scroll` counts lines hidden below
/// the viewport. Output that arrives while scrolled back is counted so the
/// title can say how much was missed.
#[derive(Debug, Default)]
pub struct TranscriptView {
    scroll: usize,
    unread: Arc<AtomicUsize>,
}

impl TranscriptView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Counter to bump from the session's output hooks.
    pub fn unread_counter(&self) -> Arc<AtomicUsize> {
        self.unread.clone()
    }

    pub fn scroll(&self) -> usize {
        self.scroll
    }

    pub fn is_following(&self) -> bool {
        self.scroll == 0
    }

    pub fn unread(&self) -> usize {
        self.unread.load(Ordering::Relaxed)
    }

    pub fn scroll_up(&mut self, lines: usize, total: usize) {
        if self.is_following() {
            self.unread.store(0, Ordering::Relaxed);
        }
        self.scroll = (self.scroll + lines).min(total.saturating_sub(1));
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll = self.scroll.saturating_sub(lines);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll = 0;
        self.unread.store(0, Ordering::Relaxed);
    }
}

/// Renders a transcript through a [`TranscriptView`].
pub struct TranscriptPane<'a> {
    pub transcript: &'a Transcript,
    pub view: &'a TranscriptView,
    pub title: String,
}

impl Widget for TranscriptPane<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut title = self.title;
        if !self.view.is_following() {
            title.push_str(&format!(" [scrolled ↑{}", self.view.scroll()));
            match self.view.unread() {
                0 => title.push_str("] "),
                n => title.push_str(&format!(", {n} new] ")),
            }
        }

        let block = Block::default().borders(Borders::ALL).title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        let height = usize::from(inner.height);
        let total = self.transcript.len();
        let end = total.saturating_sub(self.view.scroll());
        let start = end.saturating_sub(height);

        let lines: Vec<Line> = self
            .transcript
            .lines()
            .skip(start)
            .take(end - start)
            .map(|line| {
                if line.starts_with(ERROR_MARKER) {
                    Line::styled(line.to_string(), Style::default().fg(Color::Red))
                } else {
                    Line::raw(line.to_string())
                }
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(buf: &Buffer) -> Vec<String> {
        let area = buf.area;
        (area.y..area.y + area.height)
            .map(|y| {
                (area.x..area.x + area.width)
                    .map(|x| buf[(x, y)].symbol().to_string())
                    .collect::<String>()
            })
            .collect()
    }

    fn transcript_of(n: usize) -> Transcript {
        let mut transcript = Transcript::new(100);
        for i in 0..n {
            transcript.append(&format!("line {i}"));
        }
        transcript
    }

    #[test]
    fn test_renders_the_tail() {
        let transcript = transcript_of(10);
        let view = TranscriptView::new();
        let area = Rect::new(0, 0, 20, 5);
        let mut buf = Buffer::empty(area);

        TranscriptPane { transcript: &transcript, view: &view, title: " Shell ".into() }
            .render(area, &mut buf);

        let rows = rows(&buf);
        assert!(rows[1].contains("line 7"));
        assert!(rows[3].contains("line 9"));
    }

    #[test]
    fn test_scrolled_view_shows_older_lines_and_unread() {
        let transcript = transcript_of(10);
        let mut view = TranscriptView::new();
        view.scroll_up(5, transcript.len());
        view.unread_counter().fetch_add(2, Ordering::Relaxed);

        let area = Rect::new(0, 0, 40, 5);
        let mut buf = Buffer::empty(area);
        TranscriptPane { transcript: &transcript, view: &view, title: " Shell".into() }
            .render(area, &mut buf);

        let rows = rows(&buf);
        assert!(rows[0].contains("scrolled ↑5, 2 new"));
        assert!(rows[1].contains("line 2"));
        assert!(rows[3].contains("line 4"));
    }

    #[test]
    fn test_scroll_is_clamped() {
        let mut view = TranscriptView::new();
        view.scroll_up(50, 10);
        assert_eq!(view.scroll(), 9);
        view.scroll_down(100);
        assert!(view.is_following());
    }

    #[test]
    fn test_scroll_to_bottom_clears_unread() {
        let mut view = TranscriptView::new();
        view.scroll_up(3, 10);
        view.unread_counter().fetch_add(4, Ordering::Relaxed);
        view.scroll_to_bottom();
        assert_eq!(view.unread(), 0);
        assert!(view.is_following());
    }
}

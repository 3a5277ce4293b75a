//! The single-line command editor under the transcript.

use super::history::History;

#[derive(Debug, Default)]
pub struct InputLine {
    text: String,
    /// Cursor position in chars, `0..=text.chars().count()`.
    cursor: usize,
    history: History,
}

impl InputLine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        self.cursor -= 1;
        let at = self.byte_index(self.cursor);
        self.text.remove(at);
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
        self.history.reset_cursor();
    }

    fn replace(&mut self, text: &str) {
        self.text = text.to_string();
        self.cursor = self.char_count();
    }

    /// Hand the line over for execution and start a fresh one.
    pub fn submit(&mut self) -> String {
        let line = std::mem::take(&mut self.text);
        self.cursor = 0;
        self.history.push(&line);
        line
    }

    pub fn recall_prev(&mut self) {
        if let Some(cmd) = self.history.older().map(str::to_string) {
            self.replace(&cmd);
        }
    }

    pub fn recall_next(&mut self) {
        match self.history.newer().map(str::to_string) {
            Some(cmd) => self.replace(&cmd),
            None => {
                self.text.clear();
                self.cursor = 0;
            }
        }
    }

    /// The part of the line that fits in `width` columns, and the cursor
    /// column within it. Scrolls horizontally to keep the cursor visible.
    pub fn visible(&self, width: usize) -> (String, usize) {
        if width == 0 {
            return (String::new(), 0);
        }
        let offset = (self.cursor + 1).saturating_sub(width);
        let shown = self.text.chars().skip(offset).take(width).collect();
        (shown, self.cursor - offset)
    }
}

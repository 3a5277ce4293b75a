//! In-memory recall of submitted commands for the input line.
//!
//! History lives only as long as the window; nothing is written to disk.

use std::collections::VecDeque;

/// Maximum number of commands kept for recall.
const MAX_HISTORY_SIZE: usize = 500;

#[derive(Clone, Debug)]
pub struct History {
    commands: VecDeque<String>,
    max_len: usize,
    /// Position while browsing with Up/Down; `None` when not browsing.
    cursor: Option<usize>,
}

impl Default for History {
    fn default() -> Self {
        Self::new(MAX_HISTORY_SIZE)
    }
}

impl History {
    pub fn new(max_len: usize) -> Self {
        Self {
            commands: VecDeque::new(),
            max_len: max_len.max(1),
            cursor: None,
        }
    }

    /// Record a submitted command and stop browsing.
    /// Skips empty commands and duplicates of the last command.
    pub fn push(&mut self, cmd: &str) {
        self.cursor = None;

        let trimmed = cmd.trim();
        if trimmed.is_empty() {
            return;
        }
        if self.commands.back().map(String::as_str) == Some(trimmed) {
            return;
        }

        self.commands.push_back(trimmed.to_string());
        if self.commands.len() > self.max_len {
            self.commands.pop_front();
        }
    }

    /// Step back to an older command. Stays on the oldest one.
    pub fn older(&mut self) -> Option<&str> {
        let idx = match self.cursor {
            None => self.commands.len().checked_sub(1)?,
            Some(i) => i.saturating_sub(1),
        };
        self.cursor = Some(idx);
        self.commands.get(idx).map(String::as_str)
    }

    /// Step forward to a newer command. Returns `None` after the newest,
    /// which means "back to an empty line".
    pub fn newer(&mut self) -> Option<&str> {
        let idx = self.cursor? + 1;
        if idx >= self.commands.len() {
            self.cursor = None;
            return None;
        }
        self.cursor = Some(idx);
        self.commands.get(idx).map(String::as_str)
    }

    pub fn reset_cursor(&mut self) {
        self.cursor = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stored(history: &History) -> Vec<&str> {
        history.commands.iter().map(String::as_str).collect()
    }

    #[test]
    fn test_push_skips_empty_and_repeats() {
        let mut history = History::default();
        history.push("dir");
        history.push("  ");
        history.push("dir ");
        history.push("cd ..");
        assert_eq!(stored(&history), vec!["dir", "cd .."]);
    }

    #[test]
    fn test_bounded() {
        let mut history = History::new(2);
        history.push("a");
        history.push("b");
        history.push("c");
        assert_eq!(stored(&history), vec!["b", "c"]);
    }

    #[test]
    fn test_browse_back_and_forth() {
        let mut history = History::default();
        history.push("one");
        history.push("two");
        history.push("three");

        assert_eq!(history.older(), Some("three"));
        assert_eq!(history.older(), Some("two"));
        assert_eq!(history.older(), Some("one"));
        assert_eq!(history.older(), Some("one"));
        assert_eq!(history.newer(), Some("two"));
        assert_eq!(history.newer(), Some("three"));
        assert_eq!(history.newer(), None);
        assert_eq!(history.newer(), None);
    }

    #[test]
    fn test_push_resets_browsing() {
        let mut history = History::default();
        history.push("one");
        history.push("two");
        assert_eq!(history.older(), Some("two"));
        assert_eq!(history.older(), Some("one"));

        history.push("three");
        assert_eq!(history.older(), Some("three"));
    }

    #[test]
    fn test_empty_history_recalls_nothing() {
        let mut history = History::default();
        assert_eq!(history.older(), None);
        assert_eq!(history.newer(), None);
        assert!(history.commands.is_empty());
    }
}

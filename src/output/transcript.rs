//! Bounded transcript of everything the shell has printed.

use std::collections::VecDeque;

/// Default number of lines kept before the oldest are discarded.
pub const DEFAULT_MAX_LINES: usize = 1000;

/// Prefix that marks chunks read from the child's standard error.
pub const ERROR_MARKER: &str = "Error: ";

/// Append-only line buffer with FIFO eviction.
///
/// Stdout and stderr chunks land in the same buffer in arrival order.
#[derive(Clone, Debug)]
pub struct Transcript {
    lines: VecDeque<String>,
    max_lines: usize,
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES)
    }
}

impl Transcript {
    /// Create a transcript holding at most `max_lines` lines (at least one).
    pub fn new(max_lines: usize) -> Self {
        let max_lines = max_lines.max(1);
        Self {
            lines: VecDeque::with_capacity(max_lines.min(DEFAULT_MAX_LINES)),
            max_lines,
        }
    }

    /// Append a chunk of output.
    ///
    /// A single trailing line terminator is dropped, the remainder is split
    /// on `\n` and each line loses a trailing `\r`. An empty chunk appends
    /// one empty line.
    pub fn append(&mut self, text: &str) {
        let body = text
            .strip_suffix('\n')
            .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
            .unwrap_or(text);

        for line in body.split('\n') {
            let line = line.strip_suffix('\r').unwrap_or(line);
            self.lines.push_back(line.to_string());
        }

        while self.lines.len() > self.max_lines {
            self.lines.pop_front();
        }
    }

    /// Append a chunk read from standard error, marked with [`ERROR_MARKER`].
    pub fn append_error(&mut self, text: &str) {
        self.append(&format!("{ERROR_MARKER}{text}"));
    }

    /// Lines in display order, oldest first.
    pub fn lines(&self) -> impl DoubleEndedIterator<Item = &str> + ExactSizeIterator {
        self.lines.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn max_lines(&self) -> usize {
        self.max_lines
    }
}

use std::collections::VecDeque;

use log::info;

const MAX_HISTORY_SIZE: usize = 500;

#[derive(Debug, Clone, PartialEq)]
pub struct LogLine {
    pub text: String,
    pub bold: bool,
}

/// The lobby's text log. Oldest lines are dropped past the history size.
pub struct LogPanel {
    lines: VecDeque<LogLine>,
    max_lines: usize,
}

impl LogPanel {
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_SIZE)
    }

    pub fn with_capacity(max_lines: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(max_lines),
            max_lines,
        }
    }

    pub fn append(&mut self, text: impl Into<String>) {
        self.push(text.into(), false);
    }

    pub fn append_bold(&mut self, text: impl Into<String>) {
        self.push(text.into(), true);
    }

    pub fn append_failure(&mut self, err: impl std::fmt::Display) {
        self.append_bold(format!("Failed: {}", err));
    }

    fn push(&mut self, text: String, bold: bool) {
        info!("{}", text);
        if self.lines.len() >= self.max_lines {
            self.lines.pop_front();
        }
        self.lines.push_back(LogLine { text, bold });
    }

    pub fn lines(&self) -> impl Iterator<Item = &LogLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn last(&self) -> Option<&LogLine> {
        self.lines.back()
    }

    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }
}

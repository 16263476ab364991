//! Output buffer for printing operators
//!
//! Operators never write to stdout directly. They append to a [`Terminal`],
//! and whichever surface is driving the interpreter decides what to do with
//! the lines: the CLI flushes them after every statement batch, the inspector
//! shows the full history in its output pane.

/// Captured output lines
#[derive(Debug, Clone, Default)]
pub struct Terminal {
    lines: Vec<String>,
    flushed: usize,
}

impl Terminal {
    pub fn new() -> Self {
        Terminal {
            lines: Vec::new(),
            flushed: 0,
        }
    }

    /// Append text, one line per embedded newline
    pub fn print(&mut self, text: impl Into<String>) {
        let text = text.into();
        let mut split: Vec<String> = text.split('\n').map(str::to_string).collect();
        // Remove trailing empty string if text ended with newline
        if split.len() > 1 && split.last().is_some_and(|s| s.is_empty()) {
            split.pop();
        }
        self.lines.extend(split);
    }

    /// Every line printed so far
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Lines printed since the previous call
    pub fn take_new(&mut self) -> Vec<String> {
        let fresh = self.lines[self.flushed..].to_vec();
        self.flushed = self.lines.len();
        fresh
    }

    pub fn clear(&mut self) {
        self.lines.clear();
        self.flushed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::Terminal;

    #[test]
    fn take_new_returns_only_unflushed_lines() {
        let mut terminal = Terminal::new();
        terminal.print("1");
        terminal.print("2\n3\n");
        assert_eq!(terminal.take_new(), vec!["1", "2", "3"]);

        terminal.print("4");
        assert_eq!(terminal.take_new(), vec!["4"]);
        assert!(terminal.take_new().is_empty());
        assert_eq!(terminal.lines().len(), 4);
    }
}

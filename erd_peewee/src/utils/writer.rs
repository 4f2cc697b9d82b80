//! Indenting line writer for generated source

/// Accumulates output lines at a current indentation level
#[derive(Debug, Clone)]
pub struct CodeWriter {
    lines: Vec<String>,
    level: usize,
    indent: String,
}

impl CodeWriter {
    /// Create a writer using the given indentation unit
    pub fn new(indent: impl Into<String>) -> Self {
        Self {
            lines: Vec::new(),
            level: 0,
            indent: indent.into(),
        }
    }

    pub fn indent(&mut self) -> &mut Self {
        self.level += 1;
        self
    }

    pub fn dedent(&mut self) -> &mut Self {
        debug_assert!(self.level > 0, "indent level went negative");
        self.level = self.level.saturating_sub(1);
        self
    }

    /// Write one line at the current indentation
    pub fn writeln(&mut self, line: impl AsRef<str>) -> &mut Self {
        let line = line.as_ref();
        if line.is_empty() {
            self.lines.push(String::new());
        } else {
            self.lines
                .push(format!("{}{}", self.indent.repeat(self.level), line));
        }
        self
    }

    /// Write an empty line
    pub fn blank(&mut self) -> &mut Self {
        self.lines.push(String::new());
        self
    }

    /// Current line count, used to detect whether a block got any content
    pub fn mark(&self) -> usize {
        self.lines.len()
    }

    /// Whether a non-empty line was written after `mark`
    pub fn written_since(&self, mark: usize) -> bool {
        self.lines[mark..].iter().any(|line| !line.is_empty())
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

use crate::Position;

/// Offset-to-position conversion using a pre-built table of line starts.
///
/// # Example
///
/// ```
/// use gofmts_syntax::LineIndex;
///
/// let index = LineIndex::new("package main\n\nfunc main() {}\n");
///
/// let pos = index.position(14);
/// assert_eq!((pos.line, pos.column), (3, 1));
/// assert_eq!(index.line_start(3), Some(14));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineIndex {
    /// Byte offset of the start of each line.
    /// Index 0 is always 0, index N is the offset right after the Nth '\n'.
    line_starts: Vec<usize>,
    len: usize,
}

impl LineIndex {
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut line_starts = vec![0];
        line_starts.extend(
            text.bytes()
                .enumerate()
                .filter(|(_, b)| *b == b'\n')
                .map(|(i, _)| i + 1),
        );

        Self {
            line_starts,
            len: text.len(),
        }
    }

    /// Convert a byte offset to a 1-based line/column position.
    ///
    /// Offsets past the end of the text are clamped to the end.
    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        let offset = offset.min(self.len);
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        Position {
            offset,
            line: line + 1,
            column: offset - self.line_starts[line] + 1,
        }
    }

    /// 1-based line number containing the offset
    #[must_use]
    pub fn line(&self, offset: usize) -> usize {
        self.position(offset).line
    }

    /// Get the number of lines in the indexed text
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Byte offset where a 1-based line starts
    #[must_use]
    pub fn line_start(&self, line: usize) -> Option<usize> {
        line.checked_sub(1)
            .and_then(|index| self.line_starts.get(index))
            .copied()
    }

    /// Byte offset just past a 1-based line, including its newline.
    /// The last line ends at the end of the text.
    #[must_use]
    pub fn line_end(&self, line: usize) -> Option<usize> {
        self.line_start(line)?;
        Some(self.line_starts.get(line).copied().unwrap_or(self.len))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_string() {
        let index = LineIndex::new("");
        assert_eq!(index.line_count(), 1);
        assert_eq!(index.line_start(1), Some(0));
        assert_eq!(index.line_end(1), Some(0));
        assert_eq!(index.position(0), Position::new(0, 1, 1));
    }

    #[test]
    fn test_multiple_lines() {
        let source = "line 1\nline 2\nline 3";
        let index = LineIndex::new(source);

        assert_eq!(index.line_count(), 3);
        assert_eq!(index.line_start(1), Some(0));
        assert_eq!(index.line_start(2), Some(7));
        assert_eq!(index.line_start(3), Some(14));
        assert_eq!(index.line_start(4), None);
        assert_eq!(index.line_start(0), None);
    }

    #[test]
    fn test_line_end_includes_newline() {
        let source = "line 1\nline 2\nline 3";
        let index = LineIndex::new(source);

        assert_eq!(index.line_end(1), Some(7));
        assert_eq!(index.line_end(3), Some(source.len()));
        assert_eq!(index.line_end(4), None);
    }

    #[test]
    fn test_position() {
        let source = "line 1\nline 2\nline 3";
        let index = LineIndex::new(source);

        assert_eq!(index.position(0), Position::new(0, 1, 1));
        assert_eq!(index.position(7), Position::new(7, 2, 1));
        assert_eq!(index.position(10), Position::new(10, 2, 4));
        assert_eq!(index.position(6), Position::new(6, 1, 7));
    }

    #[test]
    fn test_position_clamps_to_end() {
        let index = LineIndex::new("ab\ncd");
        assert_eq!(index.position(100), Position::new(5, 2, 3));
    }

    #[test]
    fn test_columns_count_bytes() {
        // 世 and 界 are 3 bytes each
        let source = "x := \"世界\" + y\n";
        let index = LineIndex::new(source);

        let plus = source.find('+').unwrap();
        assert_eq!(plus, 14);
        assert_eq!(index.position(plus).column, 15);
    }

    #[test]
    fn test_windows_line_endings() {
        let source = "line 1\r\nline 2\r\nline 3";
        let index = LineIndex::new(source);

        assert_eq!(index.line_start(2), Some(8));
        assert_eq!(index.line_start(3), Some(16));
    }
}

//! Indentation of multi-line string literals.

/// How far multi-line content is indented, in columns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndentWidth(pub usize);

impl IndentWidth {
    /// Measure the text in front of a literal on its line, a tab counting as
    /// a full tab width, and move to the next tab stop past it
    #[must_use]
    pub fn from_line_prefix(prefix: &str, tab_width: usize) -> Self {
        let width: usize = prefix
            .chars()
            .map(|c| if c == '\t' { tab_width } else { 1 })
            .sum();

        Self(next_tab_stop(width, tab_width))
    }

    /// Estimate without the source bytes, from the literal's 0-based column
    /// and whether it is the first token on its line
    #[must_use]
    pub const fn estimate(column: usize, first_on_line: bool, tab_width: usize) -> Self {
        if first_on_line {
            Self((column + 1) * tab_width)
        } else {
            Self(column + tab_width)
        }
    }
}

const fn next_tab_stop(column: usize, tab_width: usize) -> usize {
    (column / tab_width + 1) * tab_width
}

/// Tabs for every full tab stop, spaces for the remainder
#[must_use]
pub fn indent_string(width: IndentWidth, tab_width: usize) -> String {
    let mut indent = "\t".repeat(width.0 / tab_width);
    indent.push_str(&" ".repeat(width.0 % tab_width));
    indent
}

/// Lay formatted content out between a pair of delimiters: the opening
/// delimiter, every line indented on its own line, then the indent and the
/// closing delimiter.
#[must_use]
pub fn layout_multiline(formatted: &str, delimiter: char, indent: &str) -> String {
    let mut out = String::with_capacity(formatted.len() + 16);
    out.push(delimiter);
    out.push('\n');

    for line in formatted.lines() {
        if !line.is_empty() {
            out.push_str(indent);
            out.push_str(line);
        }
        out.push('\n');
    }

    out.push_str(indent);
    out.push(delimiter);
    out
}

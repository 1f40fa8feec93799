use gofmts_engine::{
    Diagnostic, Range as EngineRange, Severity, TextEdit as EngineEdit, TextPosition,
};
use lsp_types::{DiagnosticSeverity, NumberOrString, Position, Range, TextEdit};

/// Line starts of a document, for turning byte columns into the UTF-16
/// columns the protocol counts in
pub struct LineTable<'a> {
    source: &'a str,
    starts: Vec<usize>,
}

impl<'a> LineTable<'a> {
    pub fn new(source: &'a str) -> Self {
        let starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(index, _)| index + 1))
            .collect();
        Self { source, starts }
    }

    #[allow(clippy::cast_possible_truncation)]
    pub fn position(&self, position: TextPosition) -> Position {
        let Some(&start) = self.starts.get(position.line) else {
            return self.end();
        };
        let line_end = self
            .starts
            .get(position.line + 1)
            .map_or(self.source.len(), |next| next - 1);

        let mut offset = (start + position.character).min(line_end);
        while !self.source.is_char_boundary(offset) {
            offset -= 1;
        }
        let character = self.source[start..offset].encode_utf16().count();

        Position::new(position.line as u32, character as u32)
    }

    /// Position just past the last character
    #[allow(clippy::cast_possible_truncation)]
    pub fn end(&self) -> Position {
        let line = self.starts.len() - 1;
        let character = self.source[self.starts[line]..].encode_utf16().count();
        Position::new(line as u32, character as u32)
    }

    pub fn range(&self, range: EngineRange) -> Range {
        Range::new(self.position(range.start), self.position(range.end))
    }
}

pub fn to_lsp_diagnostic(lines: &LineTable<'_>, diagnostic: &Diagnostic) -> lsp_types::Diagnostic {
    lsp_types::Diagnostic {
        range: lines.range(diagnostic.range),
        severity: Some(match diagnostic.severity {
            Severity::Error => DiagnosticSeverity::ERROR,
            Severity::Warning => DiagnosticSeverity::WARNING,
        }),
        code: Some(NumberOrString::String(diagnostic.code.clone())),
        source: Some(diagnostic.source.clone()),
        message: diagnostic.message.clone(),
        ..Default::default()
    }
}

pub fn to_lsp_edit(lines: &LineTable<'_>, edit: &EngineEdit) -> TextEdit {
    TextEdit::new(lines.range(edit.range), edit.new_text.clone())
}

/// Replace the whole of `source` with `new_text`
pub fn full_document_edit(source: &str, new_text: String) -> TextEdit {
    let end = LineTable::new(source).end();
    TextEdit::new(Range::new(Position::new(0, 0), end), new_text)
}

/// Whether two ranges share at least one position
pub fn overlaps(a: &Range, b: &Range) -> bool {
    a.start <= b.end && b.start <= a.end
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofmts_engine::Engine;

    fn at(line: usize, character: usize) -> TextPosition {
        TextPosition { line, character }
    }

    #[test]
    fn test_ascii_columns_are_unchanged() {
        let lines = LineTable::new("package main\n\nvar a = 1\n");
        assert_eq!(lines.position(at(2, 8)), Position::new(2, 8));
    }

    #[test]
    fn test_columns_count_utf16_units() {
        // "é" is two bytes and one UTF-16 unit; "🦀" is four bytes and two units
        let lines = LineTable::new("var é, 🦀 = 1, 2\n");
        assert_eq!(lines.position(at(0, 6)), Position::new(0, 5));
        assert_eq!(lines.position(at(0, 12)), Position::new(0, 9));
    }

    #[test]
    fn test_positions_are_clamped() {
        let lines = LineTable::new("ab\ncd");
        assert_eq!(lines.position(at(0, 10)), Position::new(0, 2));
        assert_eq!(lines.position(at(7, 0)), Position::new(1, 2));
        assert_eq!(lines.end(), Position::new(1, 2));
    }

    #[test]
    fn test_full_document_edit() {
        let edit = full_document_edit("package main\n", "package app\n".to_string());
        assert_eq!(
            edit.range,
            Range::new(Position::new(0, 0), Position::new(1, 0))
        );
        assert_eq!(edit.new_text, "package app\n");
    }

    #[test]
    fn test_overlaps() {
        let line = |l| Range::new(Position::new(l, 0), Position::new(l, 5));
        assert!(overlaps(&line(1), &line(1)));
        assert!(!overlaps(&line(1), &line(2)));
    }

    #[test]
    fn test_engine_diagnostics_convert() {
        let source = "package main\n\n//gofmts:yaml\nvar a = `x: 1`\n";
        let diagnostics = Engine::default().diagnose(source).unwrap();
        let lines = LineTable::new(source);
        let converted = to_lsp_diagnostic(&lines, &diagnostics[0]);

        assert_eq!(converted.severity, Some(DiagnosticSeverity::ERROR));
        assert_eq!(
            converted.code,
            Some(NumberOrString::String("unknown-directive".to_string()))
        );
        assert_eq!(converted.source.as_deref(), Some("gofmts"));
        assert_eq!(
            converted.range,
            Range::new(Position::new(2, 0), Position::new(2, 13))
        );
    }
}

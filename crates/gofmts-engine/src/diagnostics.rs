use crate::Issue;
use gofmts_syntax::LineIndex;
use serde::{Deserialize, Serialize};

/// Diagnostic severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

/// Position in a document (0-indexed, character counted in bytes)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextPosition {
    pub line: usize,
    pub character: usize,
}

/// Range in a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Range {
    pub start: TextPosition,
    pub end: TextPosition,
}

/// Replace the text in `range` with `new_text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextEdit {
    pub range: Range,
    pub new_text: String,
}

/// Edit that resolves a diagnostic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedFix {
    pub title: String,
    pub edit: TextEdit,
}

/// An issue placed in a document, with its fix when it has one
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub range: Range,
    pub message: String,
    /// Issue kind, see [`Issue::code`]
    pub code: String,
    pub source: String,
    pub fix: Option<SuggestedFix>,
}

/// Turn the issues found in `source` into diagnostics
#[must_use]
pub fn to_diagnostics(source: &str, issues: &[Issue]) -> Vec<Diagnostic> {
    let lines = LineIndex::new(source);
    issues
        .iter()
        .map(|issue| diagnostic(source, &lines, issue))
        .collect()
}

fn diagnostic(source: &str, lines: &LineIndex, issue: &Issue) -> Diagnostic {
    let start = issue.position().offset;
    // Issues about a directive cover the rest of the directive's line
    let end = issue.end().map_or_else(
        || {
            let line_end = lines
                .line_end(issue.position().line)
                .unwrap_or(source.len());
            start.max(source[..line_end].trim_end_matches(['\n', '\r']).len())
        },
        |end| end.offset,
    );

    let severity = match issue {
        Issue::UnknownDirective { .. } | Issue::FailedDirective { .. } => Severity::Error,
        _ => Severity::Warning,
    };

    let fix = issue.replacement().map(|replacement| SuggestedFix {
        title: fix_title(issue),
        edit: TextEdit {
            range: range(lines, replacement.offset, replacement.end()),
            new_text: replacement.text.clone(),
        },
    });

    Diagnostic {
        severity,
        range: range(lines, start, end),
        message: issue.details(),
        code: issue.code().to_string(),
        source: "gofmts".to_string(),
        fix,
    }
}

fn fix_title(issue: &Issue) -> String {
    match issue {
        Issue::BlockUnsorted { .. } => "Sort block".to_string(),
        Issue::FormattingDiffers { directive, .. } => format!("Format {directive}"),
        _ => "Apply fix".to_string(),
    }
}

fn range(lines: &LineIndex, start: usize, end: usize) -> Range {
    Range {
        start: text_position(lines, start),
        end: text_position(lines, end),
    }
}

fn text_position(lines: &LineIndex, offset: usize) -> TextPosition {
    let position = lines.position(offset);
    TextPosition {
        line: position.line - 1,
        character: position.column - 1,
    }
}

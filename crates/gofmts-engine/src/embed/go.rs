use super::{EmbedError, EmbeddedFormatter};
use gofmts_syntax::{tokenize, Delimiter, LineIndex, SyntaxTree, Token, TokenKind};

/// Re-spaces a Go snippet and re-indents it with tabs by bracket nesting.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoFormatter;

impl EmbeddedFormatter for GoFormatter {
    fn language(&self) -> &'static str {
        "go"
    }

    fn format(&self, text: &str) -> Result<String, EmbedError> {
        let tokens = tokenize(text).map_err(format_error)?;
        let lines = LineIndex::new(text);
        check_operands(text, &lines, &tokens)?;
        check_brackets(text, &lines, &tokens)?;
        SyntaxTree::parse(text).map_err(format_error)?;

        let mut layout = Layout {
            source: text,
            tokens: &tokens,
            lines: Vec::new(),
            current: String::new(),
            stack: Vec::new(),
            line_indent: 0,
        };
        layout.run();

        Ok(layout.finish())
    }
}

fn format_error(err: impl std::fmt::Display) -> EmbedError {
    EmbedError::new(format!("unable to format go code: {err}"))
}

/// Operators that never need an operand on their right
fn is_postfix(op: &str) -> bool {
    matches!(op, "++" | "--" | "..." | ":" | ".")
}

/// Every other operator must be followed by an operand
fn check_operands(source: &str, lines: &LineIndex, tokens: &[Token]) -> Result<(), EmbedError> {
    let code: Vec<&Token> = tokens.iter().filter(|t| !t.is_comment()).collect();

    for (i, token) in code.iter().enumerate() {
        if token.kind != TokenKind::Operator || is_postfix(token.text(source)) {
            continue;
        }
        let (position, found) = match code.get(i + 1) {
            None => (lines.position(source.len()), "EOF".to_string()),
            Some(next)
                if matches!(
                    next.kind,
                    TokenKind::Close(_) | TokenKind::Comma | TokenKind::Semicolon
                ) =>
            {
                (
                    lines.position(next.span.start),
                    format!("'{}'", next.text(source)),
                )
            }
            Some(_) => continue,
        };
        return Err(format_error(format!(
            "{position}: expected operand, found {found}"
        )));
    }

    Ok(())
}

fn check_brackets(source: &str, lines: &LineIndex, tokens: &[Token]) -> Result<(), EmbedError> {
    let mut open: Vec<Delimiter> = Vec::new();

    for token in tokens {
        match token.kind {
            TokenKind::Open(delimiter) => open.push(delimiter),
            TokenKind::Close(found) => match open.pop() {
                Some(expected) if expected == found => {}
                Some(expected) => {
                    return Err(format_error(format!(
                        "{}: expected '{}', found '{}'",
                        lines.position(token.span.start),
                        expected.close(),
                        found.close()
                    )));
                }
                None => {
                    return Err(format_error(format!(
                        "{}: unexpected '{}'",
                        lines.position(token.span.start),
                        found.close()
                    )));
                }
            },
            _ => {}
        }
    }

    match open.pop() {
        Some(expected) => Err(format_error(format!(
            "{}: expected '{}', found EOF",
            lines.position(source.len()),
            expected.close()
        ))),
        None => Ok(()),
    }
}

struct Open {
    delimiter: Delimiter,
    /// Indent of the line the bracket was opened on
    line_indent: usize,
}

struct Layout<'a> {
    source: &'a str,
    tokens: &'a [Token],
    /// Finished lines; `None` marks a collapsed run of blank lines
    lines: Vec<Option<(usize, String)>>,
    current: String,
    stack: Vec<Open>,
    line_indent: usize,
}

impl Layout<'_> {
    fn run(&mut self) {
        let (source, tokens) = (self.source, self.tokens);
        let mut prev: Option<Token> = None;
        // Last non-comment token, for unary detection and continuation lines
        let mut last_code: Option<Token> = None;
        let mut last_unary = false;

        for (i, &token) in tokens.iter().enumerate() {
            let gap = prev.map_or("", |p| &source[p.span.end..token.span.start]);
            let newlines = gap.matches('\n').count();
            let text = token.text(source);

            if prev.is_none() || newlines > 0 {
                if prev.is_some() {
                    self.end_line(newlines > 1);
                }
                self.line_indent = self.indent_for(&token, text, last_code);
            } else if self.spaced(prev, last_unary, i, gap) {
                self.current.push(' ');
            }

            self.current.push_str(text);

            match token.kind {
                TokenKind::Open(delimiter) => self.stack.push(Open {
                    delimiter,
                    line_indent: self.line_indent,
                }),
                TokenKind::Close(_) => {
                    self.stack.pop();
                }
                _ => {}
            }

            if !token.is_comment() {
                last_unary = token.kind == TokenKind::Operator
                    && self.is_unary(last_code, i, gap);
                last_code = Some(token);
            }
            prev = Some(token);
        }

        if prev.is_some() {
            self.end_line(false);
        }
    }

    fn end_line(&mut self, blank_after: bool) {
        let line = std::mem::take(&mut self.current);
        self.lines.push(Some((self.line_indent, line)));
        if blank_after {
            self.lines.push(None);
        }
    }

    fn indent_for(&self, token: &Token, text: &str, last_code: Option<Token>) -> usize {
        let content = self.stack.last().map_or(0, |open| open.line_indent + 1);

        if matches!(token.kind, TokenKind::Close(_)) {
            return self.stack.last().map_or(0, |open| open.line_indent);
        }
        if token.kind == TokenKind::Keyword && matches!(text, "case" | "default") {
            return content.saturating_sub(1);
        }

        let continued = last_code.is_some_and(|last| {
            last.kind == TokenKind::Operator && !is_postfix(last.text(self.source))
        });
        content + usize::from(continued)
    }

    /// Whether the operator at `index` applies to the operand after it
    fn is_unary(&self, before: Option<Token>, index: usize, gap_before: &str) -> bool {
        let token = self.tokens[index];
        let text = token.text(self.source);
        match text {
            "!" | "~" => return true,
            "*" | "&" | "-" | "+" | "^" | "<-" => {}
            _ => return false,
        }

        let Some(before) = before else {
            return true;
        };
        match before.kind {
            TokenKind::Open(_)
            | TokenKind::Comma
            | TokenKind::Semicolon
            | TokenKind::Operator
            | TokenKind::Keyword => return true,
            // `[]*T`, `map[K]*V`
            TokenKind::Close(Delimiter::Bracket) if text == "*" && gap_before.is_empty() => {
                return true
            }
            _ => {}
        }

        let gap_after = self
            .tokens
            .get(index + 1)
            .map_or("", |next| &self.source[token.span.end..next.span.start]);
        !gap_before.is_empty() && gap_after.is_empty()
    }

    fn spaced(&self, prev: Option<Token>, prev_unary: bool, index: usize, gap: &str) -> bool {
        let Some(prev) = prev else {
            return false;
        };
        let token = &self.tokens[index];
        let text = token.text(self.source);
        let prev_text = prev.text(self.source);

        if token.is_comment() || prev.is_comment() {
            return true;
        }
        if matches!(
            token.kind,
            TokenKind::Comma | TokenKind::Semicolon | TokenKind::Close(_)
        ) || matches!(text, ":" | "++" | "--" | ".")
        {
            return false;
        }
        if matches!(prev.kind, TokenKind::Open(_)) || prev_text == "." || prev_unary {
            return false;
        }
        if matches!(prev.kind, TokenKind::Comma | TokenKind::Semicolon) {
            return true;
        }
        if prev_text == ":" {
            let in_index = self
                .stack
                .last()
                .is_some_and(|open| open.delimiter == Delimiter::Bracket);
            return !in_index;
        }

        let binary = token.kind == TokenKind::Operator
            && !is_postfix(text)
            && !matches!(text, "!" | "~")
            && !self.is_unary(Some(prev), index, gap);
        if binary {
            return true;
        }
        if prev.kind == TokenKind::Operator && !is_postfix(prev_text) {
            return true;
        }

        !gap.is_empty()
    }

    fn finish(self) -> String {
        let mut out = String::new();
        let mut lines = self.lines.into_iter().peekable();
        let mut first = true;

        while let Some(line) = lines.next() {
            match line {
                // Blank lines never lead or trail
                None if first || lines.peek().is_none() => {}
                None => out.push('\n'),
                Some((indent, text)) => {
                    if !first {
                        out.push('\n');
                    }
                    out.push_str(&"\t".repeat(indent));
                    out.push_str(&text);
                    first = false;
                }
            }
        }

        out
    }
}

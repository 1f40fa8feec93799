use crate::parser::parse_go;
use crate::{Result, Span};
use arborium::tree_sitter::Node;

/// Bracket pair kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Delimiter {
    Paren,
    Bracket,
    Brace,
}

impl Delimiter {
    /// Delimiter opened by a grammar token kind
    #[must_use]
    pub fn opened_by(kind: &str) -> Option<Self> {
        match kind {
            "(" => Some(Self::Paren),
            "[" => Some(Self::Bracket),
            "{" => Some(Self::Brace),
            _ => None,
        }
    }

    /// Delimiter closed by a grammar token kind
    #[must_use]
    pub fn closed_by(kind: &str) -> Option<Self> {
        match kind {
            ")" => Some(Self::Paren),
            "]" => Some(Self::Bracket),
            "}" => Some(Self::Brace),
            _ => None,
        }
    }

    #[must_use]
    pub const fn close(self) -> char {
        match self {
            Self::Paren => ')',
            Self::Bracket => ']',
            Self::Brace => '}',
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    Keyword,
    Number,
    Char,
    /// Interpreted string literal, `"..."`
    String,
    /// Raw string literal, `` `...` ``
    RawString,
    Operator,
    Open(Delimiter),
    Close(Delimiter),
    Comma,
    Semicolon,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    #[must_use]
    pub fn text<'a>(&self, source: &'a str) -> &'a str {
        &source[self.span.start..self.span.end]
    }

    #[must_use]
    pub const fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::LineComment | TokenKind::BlockComment)
    }
}

const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Grammar nodes read as a single token even though they have children
const ATOMIC: &[&str] = &[
    "comment",
    "interpreted_string_literal",
    "raw_string_literal",
    "rune_literal",
];

/// Leaf tokens of Go source, comments included, in source order.
///
/// Works on source that does not parse: tokens the parser had to invent are
/// left out, everything it read is kept. Newline terminators are not tokens.
pub fn tokenize(source: &str) -> Result<Vec<Token>> {
    let tree = parse_go(source)?;
    let mut tokens = Vec::new();
    collect_tokens(tree.root_node(), source, &mut tokens);
    Ok(tokens)
}

pub(crate) fn collect_tokens(node: Node<'_>, source: &str, tokens: &mut Vec<Token>) {
    if node.is_missing() {
        return;
    }

    if node.child_count() == 0 || ATOMIC.contains(&node.kind()) {
        let span = Span::new(node.start_byte(), node.end_byte());
        let text = &source[span.start..span.end];
        if !text.trim().is_empty() {
            tokens.push(Token {
                kind: classify(node, text),
                span,
            });
        }
        return;
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_tokens(child, source, tokens);
    }
}

fn classify(node: Node<'_>, text: &str) -> TokenKind {
    let kind = node.kind();
    if let Some(delimiter) = Delimiter::opened_by(kind) {
        return TokenKind::Open(delimiter);
    }
    if let Some(delimiter) = Delimiter::closed_by(kind) {
        return TokenKind::Close(delimiter);
    }

    match kind {
        "comment" if text.starts_with("//") => TokenKind::LineComment,
        "comment" => TokenKind::BlockComment,
        "interpreted_string_literal" => TokenKind::String,
        "raw_string_literal" => TokenKind::RawString,
        "rune_literal" => TokenKind::Char,
        "int_literal" | "float_literal" | "imaginary_literal" => TokenKind::Number,
        "," => TokenKind::Comma,
        ";" => TokenKind::Semicolon,
        // identifiers, `true`, `nil`, `iota` and friends
        _ if node.is_named() => TokenKind::Ident,
        _ if KEYWORDS.contains(&kind) => TokenKind::Keyword,
        _ => TokenKind::Operator,
    }
}

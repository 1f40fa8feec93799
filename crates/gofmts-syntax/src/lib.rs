//! Comment-preserving Go syntax tree.
//!
//! Source is parsed with the tree-sitter Go grammar and folded into a
//! smaller tree: the file, every bracket pair and every case clause body
//! form a [`Sequence`] of [`Element`]s (declarations, specs, statements,
//! fields, keyed elements, case clauses, arguments), and string literals are
//! addressable [`StringLit`] nodes. Each sequence member carries its leading
//! comments, trailing comments and blank-line spacing, which is what
//! comment-aware rewriting needs. Printing is lossless: untouched regions are
//! copied from the source byte for byte.

mod error;
mod line_index;
mod parser;
mod printer;
mod source_location;
mod token;
mod tree;

pub use error::{Result, SyntaxError};
pub use line_index::LineIndex;
pub use source_location::{Position, Span};
pub use token::{tokenize, Delimiter, Token, TokenKind};
pub use tree::{
    Child, Comment, CommentId, CommentKind, Decorations, Element, NodeData, NodeId, NodeKind,
    Sequence, Slot, Spacing, StringLit, SyntaxTree, Trivia,
};

//! Directive-driven rewriting of Go source.
//!
//! `//gofmts:NAME` comments mark what to rewrite: a string literal whose
//! embedded JSON, SQL or Go gets reformatted, or (with `sort`) a run of
//! sibling declarations that must stay sorted. Analysis produces [`Issue`]s;
//! the consumers either apply them ([`Engine::rewrite`]), report them
//! ([`Engine::check`]) or turn them into diagnostics with suggested fixes
//! ([`Engine::diagnose`]).

mod apply;
mod check;
mod diagnostics;
mod directive;
pub mod embed;
mod engine;
mod error;
mod format;
mod indent;
mod issue;
mod resolve;
mod rewrite;
mod sort;
mod splice;

pub use apply::apply_replacements;
pub use check::{check, CheckReport};
pub use diagnostics::{
    to_diagnostics, Diagnostic, Range, Severity, SuggestedFix, TextEdit, TextPosition,
};
pub use directive::{parse_directive, Directive, DirectiveIndex, DIRECTIVE_PREFIX, SORT_DIRECTIVE};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use format::FormatPass;
pub use indent::{indent_string, layout_multiline, IndentWidth};
pub use issue::{Issue, Replacement};
pub use resolve::{closest, ReferencePolicy};
pub use rewrite::rewrite;
pub use sort::SortPass;
pub use splice::{PassOutcome, PendingReplacement, Splice};

// Re-export common types from dependencies
pub use gofmts_config::GofmtsConfig;
pub use gofmts_syntax::{Position, SyntaxTree};

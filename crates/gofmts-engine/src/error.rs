use crate::Issue;
use gofmts_syntax::Position;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Config(#[from] gofmts_config::ConfigError),

    #[error("Parse error: {0}")]
    Syntax(#[from] gofmts_syntax::SyntaxError),

    #[error("Duplicate directive ending at {0}")]
    DuplicateDirective(Position),

    #[error("Replacement at offset {offset} overlaps a previous replacement")]
    OverlappingReplacement { offset: usize },

    #[error("{}", unresolved_message(.0))]
    Unresolved(Vec<Issue>),
}

fn unresolved_message(issues: &[Issue]) -> String {
    let lines: Vec<String> = issues.iter().map(ToString::to_string).collect();
    format!("unresolved issues:\n{}", lines.join("\n"))
}

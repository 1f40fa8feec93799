use crate::Position;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, SyntaxError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxError {
    #[error("failed to load the Go grammar: {0}")]
    Grammar(String),

    #[error("parser produced no tree")]
    NoTree,

    #[error("{position}: {message}")]
    Invalid { position: Position, message: String },

    #[error("node {0} is not attached to the tree")]
    Detached(usize),
}

impl SyntaxError {
    /// Source position the error points at, if any
    #[must_use]
    pub const fn position(&self) -> Option<Position> {
        match self {
            Self::Invalid { position, .. } => Some(*position),
            Self::Grammar(_) | Self::NoTree | Self::Detached(_) => None,
        }
    }
}

use gofmts_syntax::Position;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Text edit that resolves an issue: remove `length` bytes at `offset`, insert `text`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Replacement {
    pub offset: usize,
    pub length: usize,
    pub text: String,
}

impl Replacement {
    #[must_use]
    pub fn new(offset: usize, length: usize, text: impl Into<String>) -> Self {
        Self {
            offset,
            length,
            text: text.into(),
        }
    }

    /// Offset just past the replaced range
    #[must_use]
    pub const fn end(&self) -> usize {
        self.offset + self.length
    }
}

/// Something a directive found in a source unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    /// Embedded content does not match its formatter's output
    FormattingDiffers {
        directive: String,
        position: Position,
        end: Position,
        replacement: Replacement,
    },
    /// Directive that governs nothing
    UnusedDirective { name: String, position: Position },
    /// Directive with no formatter behind it
    UnknownDirective { name: String, position: Position },
    /// Formatter rejected the content, or the result cannot be written back
    FailedDirective {
        name: String,
        position: Position,
        cause: String,
    },
    /// Sort group whose members are out of order
    BlockUnsorted {
        directive: String,
        position: Position,
        end: Position,
        replacement: Replacement,
    },
}

impl Issue {
    /// Human-readable description, without the position
    #[must_use]
    pub fn details(&self) -> String {
        match self {
            Self::FormattingDiffers { directive, .. } => format!("{directive} formatting differs"),
            Self::UnusedDirective { name, .. } => format!("unused directive `gofmts:{name}`"),
            Self::UnknownDirective { name, .. } => format!("unknown directive `gofmts:{name}`"),
            Self::FailedDirective { name, cause, .. } => {
                format!("failed directive {name:?}: {cause}")
            }
            Self::BlockUnsorted { .. } => "block is unsorted".to_string(),
        }
    }

    #[must_use]
    pub const fn position(&self) -> Position {
        match self {
            Self::FormattingDiffers { position, .. }
            | Self::UnusedDirective { position, .. }
            | Self::UnknownDirective { position, .. }
            | Self::FailedDirective { position, .. }
            | Self::BlockUnsorted { position, .. } => *position,
        }
    }

    /// End of the flagged node, for issues that cover one
    #[must_use]
    pub const fn end(&self) -> Option<Position> {
        match self {
            Self::FormattingDiffers { end, .. } | Self::BlockUnsorted { end, .. } => Some(*end),
            _ => None,
        }
    }

    #[must_use]
    pub const fn replacement(&self) -> Option<&Replacement> {
        match self {
            Self::FormattingDiffers { replacement, .. } | Self::BlockUnsorted { replacement, .. } => {
                Some(replacement)
            }
            _ => None,
        }
    }

    /// Stable identifier of the issue kind
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::FormattingDiffers { .. } => "formatting-differs",
            Self::UnusedDirective { .. } => "unused-directive",
            Self::UnknownDirective { .. } => "unknown-directive",
            Self::FailedDirective { .. } => "failed-directive",
            Self::BlockUnsorted { .. } => "block-unsorted",
        }
    }
}

impl fmt::Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.details(), self.position())
    }
}

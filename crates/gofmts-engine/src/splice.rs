use crate::{Issue, Result};
use gofmts_syntax::{Decorations, NodeId, SyntaxTree};
use std::collections::BTreeMap;

/// What to put in place of a node once analysis is over
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingReplacement {
    /// Same string literal with new text
    Literal { text: String },
    /// Copy of `source` carrying `decorations`
    Member {
        source: NodeId,
        decorations: Decorations,
    },
}

/// Replacements keyed by the node they replace, applied in one go
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Splice {
    pending: BTreeMap<NodeId, PendingReplacement>,
}

impl Splice {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, target: NodeId, replacement: PendingReplacement) {
        self.pending.insert(target, replacement);
    }

    pub fn extend(&mut self, other: Self) {
        self.pending.extend(other.pending);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Substitute every pending replacement into `tree`.
    ///
    /// Member copies are taken before any substitution, so a replacement
    /// whose source is itself replaced still copies the original node.
    pub fn apply(&self, tree: &mut SyntaxTree) -> Result<()> {
        let mut copies = Vec::with_capacity(self.pending.len());
        for (target, replacement) in &self.pending {
            if let PendingReplacement::Member {
                source,
                decorations,
            } = replacement
            {
                let copy = tree.deep_clone(*source);
                tree.set_decorations(copy, decorations.clone());
                copies.push((*target, copy));
            }
        }

        for (target, replacement) in &self.pending {
            if let PendingReplacement::Literal { text } = replacement {
                tree.replace_literal(*target, text.clone())?;
            }
        }
        for (target, copy) in copies {
            tree.substitute(target, copy)?;
        }

        Ok(())
    }
}

/// Result of one analysis pass over a tree
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    pub issues: Vec<Issue>,
    pub splice: Splice,
}

impl PassOutcome {
    /// Issues that carry no replacement and so cannot be applied
    #[must_use]
    pub fn unresolved(&self) -> Vec<Issue> {
        self.issues
            .iter()
            .filter(|issue| issue.replacement().is_none())
            .cloned()
            .collect()
    }
}

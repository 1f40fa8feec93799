use crate::{Directive, DirectiveIndex};
use gofmts_syntax::{NodeId, SyntaxTree};

/// Which line of a node a directive has to be at or above
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReferencePolicy {
    /// The node's last line, so a directive trailing the node still applies
    Inline,
    /// The node's first line
    Leading,
}

/// Find the directive that governs `node`: among directives on or above the
/// reference line, the one closest to the node (largest position).
///
/// Does not consume the directive; callers take it from the index once they
/// decide it applies.
#[must_use]
pub fn closest<'a>(
    index: &'a DirectiveIndex,
    tree: &SyntaxTree,
    node: NodeId,
    policy: ReferencePolicy,
) -> Option<&'a Directive> {
    let reference = match policy {
        ReferencePolicy::Inline => tree.end_position(node).line,
        ReferencePolicy::Leading => tree.start_position(node).line,
    };

    index
        .iter()
        .rev()
        .find(|directive| directive.end.line <= reference)
}

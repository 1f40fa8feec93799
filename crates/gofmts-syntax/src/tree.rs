use crate::{Delimiter, LineIndex, Position, Result, Span, SyntaxError, Token};

/// Stable handle of a node in a [`SyntaxTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Handle of a comment in the tree's comment table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommentId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentKind {
    /// `// ...`
    Line,
    /// `/* ... */`
    Block,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub kind: CommentKind,
    pub text: String,
    pub span: Span,
    pub start: Position,
    pub end: Position,
    /// Nothing but whitespace follows the comment on its last line
    pub owns_line: bool,
}

/// Vertical spacing between a sequence member and its neighbour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Spacing {
    /// Same line
    #[default]
    None,
    NewLine,
    /// At least one blank line
    EmptyLine,
}

impl Spacing {
    pub(crate) fn from_gap(gap: &str) -> Self {
        match gap.matches('\n').count() {
            0 => Self::None,
            1 => Self::NewLine,
            _ => Self::EmptyLine,
        }
    }
}

/// Leading trivia of a sequence member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trivia {
    Comment(CommentId),
    BlankLine,
}

/// Comment and spacing attachments of a node.
///
/// Only sequence members carry decorations; other nodes keep the default.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decorations {
    pub before: Spacing,
    pub start: Vec<Trivia>,
    /// Comments on the same line after the member and its separator
    pub end: Vec<CommentId>,
    pub after: Spacing,
}

/// Position of one member inside a [`Sequence`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    /// Current occupant
    pub node: NodeId,
    /// Occupant at parse time
    pub original: NodeId,
    /// Leading trivia, member and trailing comments as laid out in the source
    pub region: Span,
    /// The original occupant's own span
    pub element: Span,
    /// `,` or `;` following the member
    pub separator: Option<Span>,
}

/// The file, the contents of one bracket pair, or the body of a case clause
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    /// `None` for the file and for case clause bodies
    pub delimiter: Option<Delimiter>,
    pub slots: Vec<Slot>,
    /// Text between the brackets, or after a clause's `:`
    pub content: Span,
}

/// Nested node inside an [`Element`] and the source range it occupies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Child {
    pub node: NodeId,
    pub span: Span,
}

/// A declaration, const or var spec, statement, field, keyed element,
/// case clause or argument of a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub children: Vec<Child>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLit {
    /// Literal text including its delimiters
    pub text: String,
    pub raw: bool,
}

impl StringLit {
    /// Text between the delimiters, escapes left as written
    #[must_use]
    pub fn value(&self) -> &str {
        self.text
            .get(1..self.text.len().saturating_sub(1))
            .unwrap_or("")
    }

    #[must_use]
    pub const fn delimiter(&self) -> char {
        if self.raw {
            '`'
        } else {
            '"'
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Sequence(Sequence),
    Element(Element),
    StringLit(StringLit),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeData {
    pub kind: NodeKind,
    pub span: Span,
    pub decorations: Decorations,
    pub(crate) parent: Option<NodeId>,
    /// Decorations still describe the source layout
    pub(crate) pristine: bool,
}

/// Parsed Go file: source text, tokens, comments and the node arena
#[derive(Debug, Clone)]
pub struct SyntaxTree {
    pub(crate) source: String,
    pub(crate) line_index: LineIndex,
    pub(crate) tokens: Vec<Token>,
    pub(crate) comments: Vec<Comment>,
    pub(crate) nodes: Vec<NodeData>,
    pub(crate) root: NodeId,
}

impl SyntaxTree {
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        self.root
    }

    #[must_use]
    pub const fn line_index(&self) -> &LineIndex {
        &self.line_index
    }

    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    #[must_use]
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    #[must_use]
    pub fn comment(&self, id: CommentId) -> &Comment {
        &self.comments[id.0]
    }

    /// Ids of all comments in source order
    pub fn comment_ids(&self) -> impl Iterator<Item = CommentId> {
        (0..self.comments.len()).map(CommentId)
    }

    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        &self.nodes[id.0]
    }

    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0].kind
    }

    #[must_use]
    pub fn span(&self, id: NodeId) -> Span {
        self.nodes[id.0].span
    }

    #[must_use]
    pub fn decorations(&self, id: NodeId) -> &Decorations {
        &self.nodes[id.0].decorations
    }

    /// Number of `//` comments directly above a member, with no blank line
    /// or block comment between them and the member
    #[must_use]
    pub fn comment_run(&self, id: NodeId) -> usize {
        self.decorations(id)
            .start
            .iter()
            .rev()
            .take_while(|trivia| match trivia {
                Trivia::Comment(comment) => self.comment(*comment).kind == CommentKind::Line,
                Trivia::BlankLine => false,
            })
            .count()
    }

    #[must_use]
    pub fn string_lit(&self, id: NodeId) -> Option<&StringLit> {
        match self.kind(id) {
            NodeKind::StringLit(lit) => Some(lit),
            _ => None,
        }
    }

    #[must_use]
    pub fn position(&self, offset: usize) -> Position {
        self.line_index.position(offset)
    }

    #[must_use]
    pub fn start_position(&self, id: NodeId) -> Position {
        self.position(self.span(id).start)
    }

    #[must_use]
    pub fn end_position(&self, id: NodeId) -> Position {
        self.position(self.span(id).end)
    }

    /// Current members of a sequence, empty for other node kinds
    #[must_use]
    pub fn members(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::Sequence(sequence) => sequence.slots.iter().map(|slot| slot.node).collect(),
            _ => Vec::new(),
        }
    }

    /// Sequences nested directly inside an element, in source order
    #[must_use]
    pub fn child_sequences(&self, id: NodeId) -> Vec<NodeId> {
        match self.kind(id) {
            NodeKind::Element(element) => element
                .children
                .iter()
                .map(|child| child.node)
                .filter(|node| matches!(self.kind(*node), NodeKind::Sequence(_)))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Every string literal reachable from the root, in document order
    #[must_use]
    pub fn string_literals(&self) -> Vec<NodeId> {
        let mut literals = Vec::new();
        let mut stack = vec![self.root];

        while let Some(id) = stack.pop() {
            match self.kind(id) {
                NodeKind::Sequence(sequence) => {
                    stack.extend(sequence.slots.iter().rev().map(|slot| slot.node));
                }
                NodeKind::Element(element) => {
                    stack.extend(element.children.iter().rev().map(|child| child.node));
                }
                NodeKind::StringLit(_) => literals.push(id),
            }
        }

        literals
    }

    /// Whether no other token precedes the node on its first line
    #[must_use]
    pub fn is_first_on_line(&self, id: NodeId) -> bool {
        let start = self.span(id).start;
        let index = self.tokens.partition_point(|token| token.span.start < start);

        self.tokens[..index]
            .iter()
            .rev()
            .find(|token| !token.is_comment())
            .map_or(true, |previous| {
                self.line_index.line(previous.span.end) != self.line_index.line(start)
            })
    }

    /// Leading whitespace of the line containing `offset`
    #[must_use]
    pub fn line_indent(&self, offset: usize) -> &str {
        let line = self.line_index.line(offset);
        let start = self.line_index.line_start(line).unwrap_or(0);
        let text = &self.source[start..];
        let width = text
            .find(|c: char| c != ' ' && c != '\t')
            .unwrap_or(text.len());
        &text[..width]
    }

    /// Replace the decorations of a node, marking its layout as rewritten
    pub fn set_decorations(&mut self, id: NodeId, decorations: Decorations) {
        let node = &mut self.nodes[id.0];
        node.decorations = decorations;
        node.pristine = false;
    }

    /// Structural copy of a subtree. The copy is detached until substituted.
    pub fn deep_clone(&mut self, id: NodeId) -> NodeId {
        let mut data = self.nodes[id.0].clone();
        let mut children = Vec::new();

        match &mut data.kind {
            NodeKind::Sequence(sequence) => {
                for slot in &mut sequence.slots {
                    let was_original = slot.node == slot.original;
                    slot.node = self.deep_clone(slot.node);
                    if was_original {
                        slot.original = slot.node;
                    }
                    children.push(slot.node);
                }
            }
            NodeKind::Element(element) => {
                for child in &mut element.children {
                    child.node = self.deep_clone(child.node);
                    children.push(child.node);
                }
            }
            NodeKind::StringLit(_) => {}
        }

        data.parent = None;
        let clone = self.push(data);
        for child in children {
            self.nodes[child.0].parent = Some(clone);
        }
        clone
    }

    /// Put `new` in the place `old` occupies in its parent
    pub fn substitute(&mut self, old: NodeId, new: NodeId) -> Result<()> {
        let parent = self.nodes[old.0]
            .parent
            .ok_or(SyntaxError::Detached(old.0))?;

        let handle = match &mut self.nodes[parent.0].kind {
            NodeKind::Sequence(sequence) => sequence
                .slots
                .iter_mut()
                .map(|slot| &mut slot.node)
                .find(|node| **node == old),
            NodeKind::Element(element) => element
                .children
                .iter_mut()
                .map(|child| &mut child.node)
                .find(|node| **node == old),
            NodeKind::StringLit(_) => None,
        };

        match handle {
            Some(node) => *node = new,
            None => return Err(SyntaxError::Detached(old.0)),
        }

        self.nodes[new.0].parent = Some(parent);
        self.nodes[old.0].parent = None;
        Ok(())
    }

    /// Swap a string literal for a copy with different text
    pub fn replace_literal(&mut self, id: NodeId, text: String) -> Result<NodeId> {
        let clone = self.deep_clone(id);
        if let NodeKind::StringLit(lit) = &mut self.nodes[clone.0].kind {
            lit.text = text;
        }
        self.substitute(id, clone)?;
        Ok(clone)
    }

    pub(crate) fn push(&mut self, data: NodeData) -> NodeId {
        self.nodes.push(data);
        NodeId(self.nodes.len() - 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_lit_value() {
        let lit = StringLit {
            text: "`{\"a\": 1}`".to_string(),
            raw: true,
        };
        assert_eq!(lit.value(), "{\"a\": 1}");
        assert_eq!(lit.delimiter(), '`');

        let empty = StringLit {
            text: "\"\"".to_string(),
            raw: false,
        };
        assert_eq!(empty.value(), "");
        assert_eq!(empty.delimiter(), '"');
    }

    #[test]
    fn test_spacing_from_gap() {
        assert_eq!(Spacing::from_gap(" "), Spacing::None);
        assert_eq!(Spacing::from_gap("\n\t"), Spacing::NewLine);
        assert_eq!(Spacing::from_gap("\n\n\t"), Spacing::EmptyLine);
        assert_eq!(Spacing::from_gap("\n\t\n\n"), Spacing::EmptyLine);
    }
}

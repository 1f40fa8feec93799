use crate::token::collect_tokens;
use crate::tree::{
    Child, Comment, CommentId, CommentKind, Decorations, Element, NodeData, NodeId, NodeKind,
    Sequence, Slot, Spacing, StringLit, SyntaxTree, Trivia,
};
use crate::{Delimiter, LineIndex, Result, Span, SyntaxError, TokenKind};
use arborium::tree_sitter::{Node, Parser, Tree};

/// Clauses whose statements after the `:` form a sequence of their own
const CASE_CLAUSES: &[&str] = &[
    "expression_case",
    "default_case",
    "type_case",
    "communication_case",
];

/// Wrappers whose children are members of the enclosing sequence
const INLINE_LISTS: &[&str] = &["statement_list"];

pub(crate) fn parse_go(source: &str) -> Result<Tree> {
    let mut parser = Parser::new();
    parser
        .set_language(&arborium_go::language().into())
        .map_err(|err| SyntaxError::Grammar(err.to_string()))?;

    parser.parse(source, None).ok_or(SyntaxError::NoTree)
}

impl SyntaxTree {
    /// Parse Go source into a comment-preserving tree.
    ///
    /// Fails at the first node the grammar could not make sense of.
    pub fn parse(source: &str) -> Result<Self> {
        let cst = parse_go(source)?;
        let root = cst.root_node();
        let line_index = LineIndex::new(source);

        if let Some(node) = first_error(root) {
            return Err(invalid(node, source, &line_index));
        }

        let mut tokens = Vec::new();
        collect_tokens(root, source, &mut tokens);

        let comments = tokens
            .iter()
            .filter(|token| token.is_comment())
            .map(|token| {
                let after = source[token.span.end..].trim_start_matches([' ', '\t', '\r']);
                let line = token.kind == TokenKind::LineComment;
                Comment {
                    kind: if line {
                        CommentKind::Line
                    } else {
                        CommentKind::Block
                    },
                    text: token.text(source).to_string(),
                    span: token.span,
                    start: line_index.position(token.span.start),
                    end: line_index.position(token.span.end),
                    owns_line: line || after.is_empty() || after.starts_with('\n'),
                }
            })
            .collect();

        let mut tree = Self {
            source: source.to_string(),
            line_index,
            tokens,
            comments,
            nodes: Vec::new(),
            root: NodeId(0),
        };

        let whole = Span::new(0, source.len());
        let shape = Shape {
            delimiter: None,
            span: whole,
            content: whole,
            opener_line: None,
            members: members(&child_nodes(root)),
        };
        let root = Builder { tree: &mut tree }.sequence(shape);
        tree.root = root;

        Ok(tree)
    }
}

fn child_nodes<'a>(node: Node<'a>) -> Vec<Node<'a>> {
    let mut cursor = node.walk();
    node.children(&mut cursor).collect()
}

fn node_span(node: Node<'_>) -> Span {
    Span::new(node.start_byte(), node.end_byte())
}

/// First node, in document order, that is an error or was made up by the parser
fn first_error(node: Node<'_>) -> Option<Node<'_>> {
    if node.is_error() || node.is_missing() {
        return Some(node);
    }
    if !node.has_error() {
        return None;
    }
    child_nodes(node).into_iter().find_map(first_error)
}

fn invalid(node: Node<'_>, source: &str, lines: &LineIndex) -> SyntaxError {
    let message = if node.is_missing() {
        if node.is_named() {
            format!("expected {}", node.kind())
        } else {
            format!("expected '{}'", node.kind())
        }
    } else {
        source[node.start_byte()..node.end_byte()]
            .split_whitespace()
            .next()
            .map_or_else(|| "syntax error".to_string(), |text| format!("unexpected '{text}'"))
    };

    SyntaxError::Invalid {
        position: lines.position(node.start_byte()),
        message,
    }
}

/// Index of the token closing the bracket opened at `open`
fn matching_close(nodes: &[Node<'_>], open: usize, delimiter: Delimiter) -> Option<usize> {
    let mut depth = 0usize;
    for (index, node) in nodes.iter().enumerate().skip(open) {
        if node.is_named() {
            continue;
        }
        if Delimiter::opened_by(node.kind()) == Some(delimiter) {
            depth += 1;
        } else if Delimiter::closed_by(node.kind()) == Some(delimiter) {
            depth -= 1;
            if depth == 0 {
                return Some(index);
            }
        }
    }
    None
}

/// Named children of a list, each with the `,` or `;` that follows it
fn members<'a>(nodes: &[Node<'a>]) -> Vec<(Node<'a>, Option<Span>)> {
    let mut found: Vec<(Node<'a>, Option<Span>)> = Vec::new();

    for node in nodes {
        if INLINE_LISTS.contains(&node.kind()) {
            found.extend(members(&child_nodes(*node)));
            continue;
        }
        match node.kind() {
            "comment" => {}
            "," | ";" if !node.is_named() => {
                if let Some(last) = found.last_mut() {
                    last.1.get_or_insert(node_span(*node));
                }
            }
            _ if node.is_named() => found.push((*node, None)),
            _ => {}
        }
    }

    found
}

/// Region of the source holding one run of sibling members
struct Shape<'a> {
    delimiter: Option<Delimiter>,
    span: Span,
    content: Span,
    /// Line of the token that opens the content
    opener_line: Option<usize>,
    members: Vec<(Node<'a>, Option<Span>)>,
}

struct Builder<'t> {
    tree: &'t mut SyntaxTree,
}

impl Builder<'_> {
    fn line(&self, offset: usize) -> usize {
        self.tree.line_index.line(offset)
    }

    fn gap(&self, start: usize, end: usize) -> &str {
        &self.tree.source[start..end]
    }

    fn reserve(&mut self, span: Span) -> NodeId {
        self.tree.push(NodeData {
            kind: NodeKind::Element(Element {
                children: Vec::new(),
            }),
            span,
            decorations: Decorations::default(),
            parent: None,
            pristine: true,
        })
    }

    /// Span of a node from its first to its last non-comment token
    fn code_extent(&self, node: Node<'_>) -> Span {
        let outer = node_span(node);
        let tokens = &self.tree.tokens;
        let first = tokens.partition_point(|token| token.span.start < outer.start);
        let last = tokens.partition_point(|token| token.span.end <= outer.end);

        let mut code = tokens[first..last.max(first)]
            .iter()
            .filter(|token| !token.is_comment());
        let Some(head) = code.next() else {
            return outer;
        };
        let tail = code.last().unwrap_or(head);
        Span::new(head.span.start, tail.span.end)
    }

    /// Comments lying entirely inside `[start, end)`, in source order
    fn comments_between(&self, start: usize, end: usize) -> Vec<CommentId> {
        let comments = &self.tree.comments;
        let first = comments.partition_point(|comment| comment.span.start < start);
        comments[first..]
            .iter()
            .take_while(|comment| comment.span.end <= end)
            .enumerate()
            .map(|(index, _)| CommentId(first + index))
            .collect()
    }

    /// One `BlankLine` per empty line between two offsets
    fn blank_lines(&self, start: usize, end: usize) -> impl Iterator<Item = Trivia> {
        let newlines = self.gap(start, end).matches('\n').count();
        std::iter::repeat(Trivia::BlankLine).take(newlines.saturating_sub(1))
    }

    fn sequence(&mut self, shape: Shape<'_>) -> NodeId {
        let id = self.reserve(shape.span);
        let elements: Vec<Span> = shape
            .members
            .iter()
            .map(|(node, _)| self.code_extent(*node))
            .collect();

        let mut slots: Vec<Slot> = Vec::with_capacity(elements.len());
        let mut decorations: Vec<Decorations> = Vec::with_capacity(elements.len());
        let mut previous_end = shape.content.start;

        for (index, (node, separator)) in shape.members.iter().enumerate() {
            let element = elements[index];
            let next_start = elements
                .get(index + 1)
                .map_or(shape.content.end, |next| next.start);

            // Comments on the opening token's line stay with it
            let header_line = if index == 0 { shape.opener_line } else { None };
            let leading: Vec<CommentId> = self
                .comments_between(previous_end, element.start)
                .into_iter()
                .filter(|id| Some(self.tree.comment(*id).start.line) != header_line)
                .collect();

            let tail = separator.map_or(element.end, |span| span.end);
            let tail_line = self.line(tail);
            let trailing: Vec<CommentId> = self
                .comments_between(tail, next_start)
                .into_iter()
                .take_while(|id| self.tree.comment(*id).start.line == tail_line)
                .collect();

            let mut start = Vec::new();
            let mut cursor = None;
            for comment in &leading {
                let span = self.tree.comment(*comment).span;
                if let Some(previous) = cursor {
                    start.extend(self.blank_lines(previous, span.start));
                }
                start.push(Trivia::Comment(*comment));
                cursor = Some(span.end);
            }
            if let Some(previous) = cursor {
                start.extend(self.blank_lines(previous, element.start));
            }

            let region_start = leading
                .first()
                .map_or(element.start, |comment| self.tree.comment(*comment).span.start);
            let region_end = trailing
                .last()
                .map_or(tail, |comment| self.tree.comment(*comment).span.end);

            let member = self.element(*node, element);
            self.tree.nodes[member.0].parent = Some(id);

            decorations.push(Decorations {
                before: Spacing::from_gap(self.gap(previous_end, region_start)),
                start,
                end: trailing,
                after: Spacing::None,
            });
            slots.push(Slot {
                node: member,
                original: member,
                region: Span::new(region_start, region_end),
                element,
                separator: *separator,
            });
            previous_end = region_end;
        }

        let footer_start = self
            .comments_between(previous_end, shape.content.end)
            .first()
            .map_or(shape.content.end, |comment| {
                self.tree.comment(*comment).span.start
            });
        for index in 0..slots.len() {
            let next_start = slots
                .get(index + 1)
                .map_or(footer_start, |next| next.region.start);
            decorations[index].after =
                Spacing::from_gap(self.gap(slots[index].region.end, next_start));
        }
        for (slot, member) in slots.iter().zip(decorations) {
            self.tree.nodes[slot.node.0].decorations = member;
        }

        self.tree.nodes[id.0].kind = NodeKind::Sequence(Sequence {
            delimiter: shape.delimiter,
            slots,
            content: shape.content,
        });
        id
    }

    fn element(&mut self, node: Node<'_>, span: Span) -> NodeId {
        let id = self.reserve(span);
        let mut children = Vec::new();
        self.collect(node, id, &mut children);
        self.tree.nodes[id.0].kind = NodeKind::Element(Element { children });
        id
    }

    fn attach(&mut self, shape: Shape<'_>, parent: NodeId, children: &mut Vec<Child>) {
        let span = shape.span;
        let sequence = self.sequence(shape);
        self.tree.nodes[sequence.0].parent = Some(parent);
        children.push(Child {
            node: sequence,
            span,
        });
    }

    /// Gather the string literals and nested sequences inside `node`, in
    /// source order, as children of `parent`
    fn collect(&mut self, node: Node<'_>, parent: NodeId, children: &mut Vec<Child>) {
        let raw = match node.kind() {
            "interpreted_string_literal" => Some(false),
            "raw_string_literal" => Some(true),
            _ => None,
        };
        if let Some(raw) = raw {
            let span = node_span(node);
            let literal = self.tree.push(NodeData {
                kind: NodeKind::StringLit(StringLit {
                    text: self.gap(span.start, span.end).to_string(),
                    raw,
                }),
                span,
                decorations: Decorations::default(),
                parent: Some(parent),
                pristine: true,
            });
            children.push(Child {
                node: literal,
                span,
            });
            return;
        }

        let nodes = child_nodes(node);
        let clause = CASE_CLAUSES.contains(&node.kind());
        let mut index = 0;

        while index < nodes.len() {
            let child = nodes[index];

            if clause && child.kind() == ":" && !child.is_named() {
                let start = child.end_byte();
                let end = self.code_extent(node).end.max(start);
                let body = Span::new(start, end);
                let shape = Shape {
                    delimiter: None,
                    span: body,
                    content: body,
                    opener_line: Some(self.line(child.start_byte())),
                    members: members(&nodes[index + 1..]),
                };
                self.attach(shape, parent, children);
                return;
            }

            let opened = (!child.is_named())
                .then(|| Delimiter::opened_by(child.kind()))
                .flatten();
            if let Some((delimiter, close)) = opened.and_then(|delimiter| {
                matching_close(&nodes, index, delimiter).map(|close| (delimiter, close))
            }) {
                let open = node_span(child);
                let end = node_span(nodes[close]);
                let shape = Shape {
                    delimiter: Some(delimiter),
                    span: Span::new(open.start, end.end),
                    content: Span::new(open.end, end.start),
                    opener_line: Some(self.line(open.start)),
                    members: members(&nodes[index + 1..close]),
                };
                self.attach(shape, parent, children);
                index = close + 1;
                continue;
            }

            self.collect(child, parent, children);
            index += 1;
        }
    }
}

use crate::tree::{NodeKind, Slot, SyntaxTree, Trivia};
use crate::NodeId;

impl SyntaxTree {
    /// Print the tree back to source text.
    ///
    /// Untouched members are copied verbatim. A member that was substituted
    /// or had its decorations replaced is printed from its own text and
    /// trivia, using the indentation and separator of the slot it sits in.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.source.len());
        self.render_node(self.root, &mut out);
        out
    }

    /// Tokens of a node without comments, every whitespace run collapsed to a
    /// single space, or a single newline when it spans lines
    #[must_use]
    pub fn canonical_text(&self, id: NodeId) -> String {
        let span = self.span(id);
        let first = self.tokens.partition_point(|token| token.span.start < span.start);
        let last = self.tokens.partition_point(|token| token.span.end <= span.end);

        let mut out = String::new();
        let mut previous_end = None;
        for token in self.tokens[first..last.max(first)]
            .iter()
            .filter(|token| !token.is_comment())
        {
            if let Some(end) = previous_end {
                let gap = &self.source[end..token.span.start];
                if gap.contains('\n') {
                    out.push('\n');
                } else if !gap.is_empty() {
                    out.push(' ');
                }
            }
            out.push_str(token.text(&self.source));
            previous_end = Some(token.span.end);
        }

        out
    }

    fn render_node(&self, id: NodeId, out: &mut String) {
        let node = self.node(id);
        match &node.kind {
            NodeKind::StringLit(lit) => out.push_str(&lit.text),
            NodeKind::Element(element) => {
                let mut cursor = node.span.start;
                for child in &element.children {
                    out.push_str(&self.source[cursor..child.span.start]);
                    self.render_node(child.node, out);
                    cursor = child.span.end;
                }
                out.push_str(&self.source[cursor..node.span.end]);
            }
            NodeKind::Sequence(sequence) => {
                out.push_str(&self.source[node.span.start..sequence.content.start]);
                let mut cursor = sequence.content.start;
                for slot in &sequence.slots {
                    out.push_str(&self.source[cursor..slot.region.start]);
                    self.render_slot(slot, out);
                    cursor = slot.region.end;
                }
                out.push_str(&self.source[cursor..node.span.end]);
            }
        }
    }

    fn render_slot(&self, slot: &Slot, out: &mut String) {
        let member = self.node(slot.node);

        if slot.node == slot.original && member.pristine {
            out.push_str(&self.source[slot.region.start..slot.element.start]);
            self.render_node(slot.node, out);
            out.push_str(&self.source[slot.element.end..slot.region.end]);
            return;
        }

        let indent = self.line_indent(slot.region.start);
        let mut line_start = false;
        for trivia in &member.decorations.start {
            match trivia {
                Trivia::Comment(id) => {
                    let comment = self.comment(*id);
                    if line_start {
                        out.push_str(indent);
                    }
                    out.push_str(&comment.text);
                    if comment.owns_line {
                        out.push('\n');
                    } else {
                        out.push(' ');
                    }
                    line_start = comment.owns_line;
                }
                Trivia::BlankLine => {
                    out.push('\n');
                    line_start = true;
                }
            }
        }
        if line_start {
            out.push_str(indent);
        }

        self.render_node(slot.node, out);

        if let Some(separator) = slot.separator {
            out.push_str(&self.source[slot.element.end..separator.end]);
        }
        for id in &member.decorations.end {
            out.push(' ');
            out.push_str(&self.comment(*id).text);
        }
    }
}

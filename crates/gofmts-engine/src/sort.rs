use crate::{
    closest, Directive, DirectiveIndex, Issue, PassOutcome, PendingReplacement, ReferencePolicy,
    Replacement, Result, Splice,
};
use gofmts_syntax::{LineIndex, NodeId, Spacing, SyntaxTree, Trivia};
use tracing::{debug, trace};

/// Whether the traversal looks inside a member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Visit {
    Descend,
    SkipSubtree,
}

/// Run of sibling members governed by one `sort` directive
#[derive(Debug)]
struct Group {
    directive: Directive,
    members: Vec<NodeId>,
    /// Line the last member ends on
    end_line: usize,
}

/// Traversal state for one sibling sequence
struct Frame {
    members: Vec<NodeId>,
    next: usize,
    group: Option<Group>,
}

impl Frame {
    fn new(members: Vec<NodeId>) -> Self {
        Self {
            members,
            next: 0,
            group: None,
        }
    }
}

/// Finds sort groups and plans the reordering of unsorted ones
#[derive(Debug, Clone, Copy, Default)]
pub struct SortPass;

impl SortPass {
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    pub fn run(&self, tree: &SyntaxTree) -> Result<PassOutcome> {
        let mut index = DirectiveIndex::for_sorting(tree)?;
        let mut groups = collect_groups(tree, &mut index);
        groups.sort_by_key(|group| tree.span(group.members[0]).start);

        let mut outcome = PassOutcome::default();
        for group in &groups {
            if let Some((issue, splice)) = plan(tree, group)? {
                outcome.issues.push(issue);
                outcome.splice.extend(splice);
            }
        }

        outcome.issues.extend(index.into_unused());
        debug!(
            groups = groups.len(),
            issues = outcome.issues.len(),
            "sort pass finished"
        );

        Ok(outcome)
    }
}

fn collect_groups(tree: &SyntaxTree, index: &mut DirectiveIndex) -> Vec<Group> {
    let mut groups = Vec::new();
    let mut stack = vec![Frame::new(tree.members(tree.root()))];

    while let Some(frame) = stack.last_mut() {
        let Some(&member) = frame.members.get(frame.next) else {
            if let Some(group) = frame.group.take() {
                groups.push(group);
            }
            stack.pop();
            continue;
        };
        let decorations = tree.decorations(member);

        if let Some(mut group) = frame.group.take() {
            if !extends(tree, &group, member) {
                // Close, then look at the member again with no group open
                groups.push(group);
                continue;
            }
            group.members.push(member);
            group.end_line = tree.end_position(member).line;
            if decorations.after == Spacing::EmptyLine {
                groups.push(group);
            } else {
                frame.group = Some(group);
            }
            frame.next += 1;
            continue;
        }

        let visit = match opening_directive(index, tree, member) {
            Some(directive) => {
                index.take(&directive);
                trace!(at = %directive.position, "opened sort group");
                let group = Group {
                    directive,
                    members: vec![member],
                    end_line: tree.end_position(member).line,
                };
                if decorations.after == Spacing::EmptyLine {
                    groups.push(group);
                } else {
                    frame.group = Some(group);
                }
                Visit::SkipSubtree
            }
            None => Visit::Descend,
        };
        frame.next += 1;

        if visit == Visit::Descend {
            let children = tree.child_sequences(member);
            stack.extend(
                children
                    .into_iter()
                    .rev()
                    .map(|sequence| Frame::new(tree.members(sequence))),
            );
        }
    }

    groups
}

/// The directive that opens a group at `member`, if any. Only the comments
/// directly above the member may separate it from the directive.
fn opening_directive(index: &DirectiveIndex, tree: &SyntaxTree, member: NodeId) -> Option<Directive> {
    let directive = closest(index, tree, member, ReferencePolicy::Leading)?;
    let run = tree.comment_run(member);
    let start_line = tree.start_position(member).line;

    (start_line <= directive.end.line + run).then(|| directive.clone())
}

fn extends(tree: &SyntaxTree, group: &Group, member: NodeId) -> bool {
    let decorations = tree.decorations(member);
    if decorations.before == Spacing::EmptyLine {
        return false;
    }
    leading_block_line(tree, member) <= group.end_line + 1
}

/// First line of the member including the comments directly above it
fn leading_block_line(tree: &SyntaxTree, member: NodeId) -> usize {
    let start = &tree.decorations(member).start;
    let run = tree.comment_run(member);
    start[start.len() - run..]
        .iter()
        .find_map(|trivia| match trivia {
            Trivia::Comment(id) => Some(tree.comment(*id).start.line),
            Trivia::BlankLine => None,
        })
        .unwrap_or_else(|| tree.start_position(member).line)
}

/// Reordering of an unsorted group: the issue and the member substitutions
fn plan(tree: &SyntaxTree, group: &Group) -> Result<Option<(Issue, Splice)>> {
    let members = &group.members;
    let keys: Vec<String> = members.iter().map(|m| tree.canonical_text(*m)).collect();

    let mut order: Vec<usize> = (0..members.len()).collect();
    order.sort_by(|a, b| keys[*a].cmp(&keys[*b]));
    if order.iter().enumerate().all(|(slot, from)| slot == *from) {
        return Ok(None);
    }

    let last = members.len() - 1;
    let first_decorations = tree.decorations(members[0]);
    let mut splice = Splice::new();

    for (slot, &from) in order.iter().enumerate() {
        if slot == from {
            continue;
        }
        let source = members[from];
        let mut decorations = tree.decorations(source).clone();

        // The first member's trivia, directive included, stays at the top
        if from == 0 {
            decorations.start.clear();
        }
        if slot == 0 {
            let mut start = first_decorations.start.clone();
            start.append(&mut decorations.start);
            decorations.start = start;
        }

        splice.insert(
            members[slot],
            PendingReplacement::Member {
                source,
                decorations,
            },
        );
    }

    let replacement = replacement_lines(tree, &splice, members[0], members[last])?;
    debug!(
        at = %group.directive.position,
        members = members.len(),
        "sort group is unsorted"
    );

    let issue = Issue::BlockUnsorted {
        directive: group.directive.name.clone(),
        position: tree.start_position(members[0]),
        end: tree.end_position(members[last]),
        replacement,
    };
    Ok(Some((issue, splice)))
}

/// Whole lines from the first member to the last, taken from a scratch copy
/// with the splice applied
fn replacement_lines(
    tree: &SyntaxTree,
    splice: &Splice,
    first: NodeId,
    last: NodeId,
) -> Result<Replacement> {
    let mut scratch = tree.clone();
    splice.apply(&mut scratch)?;
    let rendered = scratch.render();

    let lines = tree.line_index();
    let rendered_lines = LineIndex::new(&rendered);
    let first_line = tree.start_position(first).line;
    let last_line = tree.end_position(last).line;
    // Everything after the group is copied verbatim, so the line count
    // difference is all inside it
    let rendered_last = (last_line + rendered_lines.line_count()).saturating_sub(lines.line_count());

    let start = lines.line_start(first_line).unwrap_or(0);
    let end = lines.line_end(last_line).unwrap_or(tree.source().len());
    let text_start = rendered_lines.line_start(first_line).unwrap_or(0);
    let text_end = rendered_lines
        .line_end(rendered_last)
        .unwrap_or(rendered.len());

    Ok(Replacement::new(
        start,
        end - start,
        &rendered[text_start..text_end],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(source: &str) -> PassOutcome {
        let tree = SyntaxTree::parse(source).unwrap();
        SortPass::new().run(&tree).unwrap()
    }

    fn texts(outcome: &PassOutcome) -> Vec<String> {
        outcome.issues.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_basic_const_block() {
        let outcome = run("package main

const (
\t//gofmts:sort
\tZ = 2
\tA = 1
)
");
        assert_eq!(texts(&outcome), vec!["block is unsorted at 5:2"]);
        let replacement = outcome.issues[0].replacement().unwrap();
        assert_eq!(replacement.text, "\tA = 1\n\tZ = 2\n");
        assert_eq!(replacement.offset, 37);
        assert_eq!(replacement.length, 14);
    }

    #[test]
    fn test_sorted_group_is_silent() {
        let outcome = run("package main

const (
\t//gofmts:sort
\tA = 1
\tB = 2
)
");
        assert!(outcome.issues.is_empty());
        assert!(outcome.splice.is_empty());
    }

    #[test]
    fn test_group_ends_at_blank_line() {
        let outcome = run("package main

var (
\t//gofmts:sort
\tb = 1
\ta = 2

\tz = 3
\ty = 4
)
");
        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(
            outcome.issues[0].replacement().unwrap().text,
            "\ta = 2\n\tb = 1\n"
        );
    }

    #[test]
    fn test_directive_separated_by_blank_line_is_unused() {
        let outcome = run("package main

var (
\t//gofmts:sort

\tb = 1
\ta = 2
)
");
        assert_eq!(
            texts(&outcome),
            vec!["unused directive `gofmts:sort` at 4:2"]
        );
    }

    #[test]
    fn test_comments_between_directive_and_member() {
        let outcome = run("package main

var (
\t//gofmts:sort
\t// about b
\tb = 1
\ta = 2
)
");
        assert_eq!(
            outcome.issues[0].replacement().unwrap().text,
            "\ta = 2\n\tb = 1\n"
        );
    }

    #[test]
    fn test_nested_sequence() {
        let outcome = run("package main

func f() {
\tx := []string{
\t\t//gofmts:sort
\t\t\"b\",
\t\t\"a\",
\t}
}
");
        assert_eq!(texts(&outcome), vec!["block is unsorted at 6:3"]);
        assert_eq!(
            outcome.issues[0].replacement().unwrap().text,
            "\t\t\"a\",\n\t\t\"b\",\n"
        );
    }
}

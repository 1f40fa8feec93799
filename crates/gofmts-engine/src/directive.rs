use crate::{EngineError, Issue, Result};
use gofmts_syntax::{CommentId, CommentKind, Position, SyntaxTree};
use std::collections::BTreeMap;

/// Prefix that turns a line comment into a directive
pub const DIRECTIVE_PREFIX: &str = "gofmts:";

/// Name reserved for sort groups
pub const SORT_DIRECTIVE: &str = "sort";

/// Extract the directive name from a comment's text.
///
/// The text after `//` must start with `gofmts:` immediately followed by the
/// name. The name stops at whitespace or at a trailing `//` comment.
///
/// ```
/// use gofmts_engine::parse_directive;
///
/// assert_eq!(parse_directive("//gofmts:json"), Some("json"));
/// assert_eq!(parse_directive("//gofmts:sql // keep upper-case"), Some("sql"));
/// assert_eq!(parse_directive("// gofmts:json"), None);
/// assert_eq!(parse_directive("/*gofmts:json*/"), None);
/// ```
#[must_use]
pub fn parse_directive(text: &str) -> Option<&str> {
    let body = text.strip_prefix("//")?.strip_prefix(DIRECTIVE_PREFIX)?;
    let end = body
        .find(|c: char| c.is_whitespace())
        .unwrap_or(body.len());
    let name = &body[..end];
    let name = name.find("//").map_or(name, |comment| &name[..comment]);

    (!name.is_empty()).then_some(name)
}

/// A directive comment found in the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    pub name: String,
    pub comment: CommentId,
    /// Start of the comment, where issues about the directive are reported
    pub position: Position,
    /// End of the comment; the index key and the line used for resolution
    pub end: Position,
}

/// Directives of one source unit, keyed by comment end offset.
///
/// Matching a directive removes it; whatever is left once a pass is over
/// was never used.
#[derive(Debug, Clone, Default)]
pub struct DirectiveIndex {
    entries: BTreeMap<usize, Directive>,
}

impl DirectiveIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every directive except `sort`
    pub fn for_formatting(tree: &SyntaxTree) -> Result<Self> {
        Self::build(tree, |name| name != SORT_DIRECTIVE)
    }

    /// Only `sort` directives
    pub fn for_sorting(tree: &SyntaxTree) -> Result<Self> {
        Self::build(tree, |name| name == SORT_DIRECTIVE)
    }

    fn build(tree: &SyntaxTree, keep: impl Fn(&str) -> bool) -> Result<Self> {
        let mut index = Self::new();

        for id in tree.comment_ids() {
            let comment = tree.comment(id);
            if comment.kind != CommentKind::Line {
                continue;
            }
            let Some(name) = parse_directive(&comment.text) else {
                continue;
            };
            if !keep(name) {
                continue;
            }

            index.insert(Directive {
                name: name.to_string(),
                comment: id,
                position: comment.start,
                end: comment.end,
            })?;
        }

        Ok(index)
    }

    /// Add a directive. Two directives ending at the same offset are rejected.
    pub fn insert(&mut self, directive: Directive) -> Result<()> {
        let key = directive.end.offset;
        if self.entries.contains_key(&key) {
            return Err(EngineError::DuplicateDirective(directive.end));
        }
        self.entries.insert(key, directive);
        Ok(())
    }

    /// Consume a directive so it cannot match another node
    pub fn take(&mut self, directive: &Directive) -> Option<Directive> {
        self.entries.remove(&directive.end.offset)
    }

    /// Remaining directives in source order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Directive> {
        self.entries.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Report every directive nothing has consumed
    #[must_use]
    pub fn into_unused(self) -> Vec<Issue> {
        self.entries
            .into_values()
            .map(|directive| Issue::UnusedDirective {
                name: directive.name,
                position: directive.position,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SOURCE: &str = "package main

//gofmts:json
const a = `{}`

/*gofmts:json*/
//gofmts:sort
const (
\tB = 1 //gofmts:sql // trailing note
\tA = 2
)
// gofmts:go
";

    #[test]
    fn test_parse_directive() {
        assert_eq!(parse_directive("//gofmts:sort"), Some("sort"));
        assert_eq!(parse_directive("//gofmts:postgresql   "), Some("postgresql"));
        assert_eq!(parse_directive("//gofmts:sql//note"), Some("sql"));
        assert_eq!(parse_directive("//gofmts:"), None);
        assert_eq!(parse_directive("//gofmts: sql"), None);
        assert_eq!(parse_directive("// regular comment"), None);
        assert_eq!(parse_directive("//go:generate stringer"), None);
    }

    #[test]
    fn test_formatting_index_skips_sort() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let index = DirectiveIndex::for_formatting(&tree).unwrap();

        let names: Vec<(&str, usize)> = index
            .iter()
            .map(|d| (d.name.as_str(), d.position.line))
            .collect();
        assert_eq!(names, vec![("json", 3), ("sql", 9)]);
    }

    #[test]
    fn test_sorting_index_only_sort() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let index = DirectiveIndex::for_sorting(&tree).unwrap();

        assert_eq!(index.len(), 1);
        let directive = index.iter().next().unwrap();
        assert_eq!(directive.name, "sort");
        assert_eq!(directive.position, Position::new(60, 7, 1));
    }

    #[test]
    fn test_take_consumes() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let mut index = DirectiveIndex::for_formatting(&tree).unwrap();

        let first = index.iter().next().cloned().unwrap();
        assert_eq!(index.take(&first), Some(first.clone()));
        assert_eq!(index.take(&first), None);

        let unused = index.into_unused();
        assert_eq!(unused.len(), 1);
        assert_eq!(unused[0].to_string(), "unused directive `gofmts:sql` at 9:8");
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let tree = SyntaxTree::parse(SOURCE).unwrap();
        let mut index = DirectiveIndex::for_formatting(&tree).unwrap();
        let existing = index.iter().next().cloned().unwrap();

        let err = index.insert(existing).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateDirective(_)));
    }
}

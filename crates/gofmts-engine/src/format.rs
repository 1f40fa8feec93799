use crate::embed::FormatterRegistry;
use crate::{
    closest, indent_string, layout_multiline, DirectiveIndex, IndentWidth, Issue, PassOutcome,
    PendingReplacement, ReferencePolicy, Replacement, Result,
};
use gofmts_syntax::{NodeId, SyntaxTree};
use tracing::{debug, trace};

const MULTILINE_NEEDS_BACKTICKS: &str =
    "reformatted string will be multiline and must be quoted using backticks";

/// Reformats string literals governed by a formatter directive
#[derive(Debug, Clone, Copy)]
pub struct FormatPass<'r> {
    registry: &'r FormatterRegistry,
    tab_width: usize,
    measure_source: bool,
}

impl<'r> FormatPass<'r> {
    #[must_use]
    pub const fn new(registry: &'r FormatterRegistry, tab_width: usize) -> Self {
        Self {
            registry,
            tab_width,
            measure_source: true,
        }
    }

    /// Derive the indent of multi-line results from token columns instead of
    /// measuring the source line
    #[must_use]
    pub const fn estimate_indent(mut self) -> Self {
        self.measure_source = false;
        self
    }

    /// Analyze every string literal of `tree`, in document order
    pub fn run(&self, tree: &SyntaxTree) -> Result<PassOutcome> {
        let mut index = DirectiveIndex::for_formatting(tree)?;
        let mut outcome = PassOutcome::default();

        for literal in tree.string_literals() {
            let Some(directive) =
                closest(&index, tree, literal, ReferencePolicy::Inline).cloned()
            else {
                continue;
            };
            index.take(&directive);
            trace!(
                name = %directive.name,
                at = %directive.position,
                "matched formatter directive"
            );

            match self.literal(tree, literal, &directive.name, directive.position) {
                Ok(Some((issue, text))) => {
                    outcome
                        .splice
                        .insert(literal, PendingReplacement::Literal { text });
                    outcome.issues.push(issue);
                }
                Ok(None) => {}
                Err(issue) => outcome.issues.push(issue),
            }
        }

        outcome.issues.extend(index.into_unused());
        debug!(
            issues = outcome.issues.len(),
            replacements = outcome.splice.len(),
            "format pass finished"
        );

        Ok(outcome)
    }

    /// Format one literal. `Ok(None)` means it is already formatted.
    fn literal(
        &self,
        tree: &SyntaxTree,
        id: NodeId,
        name: &str,
        directive_at: gofmts_syntax::Position,
    ) -> std::result::Result<Option<(Issue, String)>, Issue> {
        let Some(formatter) = self.registry.get(name) else {
            return Err(Issue::UnknownDirective {
                name: name.to_string(),
                position: directive_at,
            });
        };
        let Some(lit) = tree.string_lit(id) else {
            return Ok(None);
        };

        let formatted = formatter
            .format(lit.value())
            .map_err(|err| Issue::FailedDirective {
                name: name.to_string(),
                position: directive_at,
                cause: err.to_string(),
            })?;

        let start = tree.start_position(id);
        let end = tree.end_position(id);
        let multiline = formatted.contains('\n') || start.line != end.line;

        let text = if multiline {
            if !lit.raw {
                return Err(Issue::FailedDirective {
                    name: name.to_string(),
                    position: start,
                    cause: MULTILINE_NEEDS_BACKTICKS.to_string(),
                });
            }
            let width = self.indent_width(tree, id);
            layout_multiline(
                &formatted,
                lit.delimiter(),
                &indent_string(width, self.tab_width),
            )
        } else {
            format!("{0}{formatted}{0}", lit.delimiter())
        };

        if text == lit.text {
            return Ok(None);
        }

        let span = tree.span(id);
        let issue = Issue::FormattingDiffers {
            directive: name.to_string(),
            position: start,
            end,
            replacement: Replacement::new(span.start, span.len(), text.clone()),
        };
        Ok(Some((issue, text)))
    }

    fn indent_width(&self, tree: &SyntaxTree, id: NodeId) -> IndentWidth {
        let start = tree.span(id).start;
        if self.measure_source {
            let line = tree.line_index().line(start);
            let line_start = tree.line_index().line_start(line).unwrap_or(0);
            IndentWidth::from_line_prefix(&tree.source()[line_start..start], self.tab_width)
        } else {
            let column = tree.start_position(id).column - 1;
            IndentWidth::estimate(column, tree.is_first_on_line(id), self.tab_width)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofmts_config::GofmtsConfig;

    fn run(source: &str) -> PassOutcome {
        let registry = FormatterRegistry::from_config(&GofmtsConfig::default());
        let tree = SyntaxTree::parse(source).unwrap();
        FormatPass::new(&registry, 8).run(&tree).unwrap()
    }

    #[test]
    fn test_json_const() {
        let outcome = run("package main\n\n//gofmts:json\nconst j = `{\"a\":  1, \"b\":2}`\n");

        assert_eq!(outcome.issues.len(), 1);
        let issue = &outcome.issues[0];
        assert_eq!(issue.to_string(), "json formatting differs at 4:11");
        assert_eq!(
            issue.replacement().map(|r| r.text.as_str()),
            Some("`\n\t\t{\n\t\t  \"a\": 1,\n\t\t  \"b\": 2\n\t\t}\n\t\t`")
        );
        assert_eq!(outcome.splice.len(), 1);
    }

    #[test]
    fn test_single_line_result_keeps_quotes() {
        let outcome = run("package main\n\n//gofmts:go\nvar g = \"1  + 2\"\n");

        assert_eq!(
            outcome.issues[0].replacement().map(|r| r.text.as_str()),
            Some("\"1 + 2\"")
        );
    }

    #[test]
    fn test_multiline_needs_backticks() {
        let outcome = run("package main\n\n//gofmts:sql\nvar q = \"select * from t\"\n");

        assert_eq!(outcome.issues.len(), 1);
        assert_eq!(
            outcome.issues[0].to_string(),
            "failed directive \"sql\": reformatted string will be multiline and must be \
             quoted using backticks at 4:9"
        );
        assert!(outcome.splice.is_empty());
    }

    #[test]
    fn test_unknown_and_failed() {
        let outcome = run(
            "package main\n\n//gofmts:yaml\nvar a = `x: 1`\n\n//gofmts:json\nvar b = `{`\n",
        );
        let rendered: Vec<String> = outcome.issues.iter().map(ToString::to_string).collect();

        assert_eq!(
            rendered,
            vec![
                "unknown directive `gofmts:yaml` at 3:1",
                "failed directive \"json\": json is not valid at 6:1",
            ]
        );
    }

    #[test]
    fn test_already_formatted_yields_nothing() {
        let outcome = run("package main\n\nvar a = `1 + 2` //gofmts:go\n");
        assert!(outcome.issues.is_empty());
        assert!(outcome.splice.is_empty());
    }

    #[test]
    fn test_unused_directive_reported_last() {
        let outcome = run("package main\n\n//gofmts:go\nvar a = `1+2`\n\n//gofmts:json\n");
        let codes: Vec<&str> = outcome.issues.iter().map(Issue::code).collect();
        assert_eq!(codes, vec!["formatting-differs", "unused-directive"]);
    }

    #[test]
    fn test_estimated_indent() {
        let registry = FormatterRegistry::from_config(&GofmtsConfig::default());
        let tree =
            SyntaxTree::parse("package main\n\n//gofmts:json\nconst j = `{\"a\":1}`\n").unwrap();
        let outcome = FormatPass::new(&registry, 8)
            .estimate_indent()
            .run(&tree)
            .unwrap();

        // column 10, not first on its line: 10 + 8
        assert_eq!(
            outcome.issues[0].replacement().map(|r| r.text.as_str()),
            Some("`\n\t\t  {\n\t\t    \"a\": 1\n\t\t  }\n\t\t  `")
        );
    }
}

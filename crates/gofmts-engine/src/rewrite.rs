use crate::{EngineError, FormatPass, PassOutcome, Result, SortPass};
use gofmts_syntax::SyntaxTree;
use tracing::debug;

/// Rewrite `source` in place: reformat embedded content, then sort groups on
/// the reformatted text.
///
/// A pass that finds an issue without a fix fails with every such issue and
/// nothing is rewritten.
pub fn rewrite(source: &str, format: &FormatPass<'_>, sort: &SortPass) -> Result<String> {
    let tree = SyntaxTree::parse(source)?;
    let outcome = format.run(&tree)?;
    let formatted = apply(tree, outcome)?;

    let tree = SyntaxTree::parse(&formatted)?;
    let outcome = sort.run(&tree)?;
    apply(tree, outcome)
}

fn apply(mut tree: SyntaxTree, outcome: PassOutcome) -> Result<String> {
    let unresolved = outcome.unresolved();
    if !unresolved.is_empty() {
        return Err(EngineError::Unresolved(unresolved));
    }
    if outcome.splice.is_empty() {
        return Ok(tree.source().to_string());
    }

    debug!(replacements = outcome.splice.len(), "applying pass");
    outcome.splice.apply(&mut tree)?;
    Ok(tree.render())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::FormatterRegistry;
    use gofmts_config::GofmtsConfig;

    fn rewrite_default(source: &str) -> Result<String> {
        let registry = FormatterRegistry::from_config(&GofmtsConfig::default());
        rewrite(source, &FormatPass::new(&registry, 8), &SortPass::new())
    }

    #[test]
    fn test_format_then_sort() {
        let source = "package main

var (
\t//gofmts:sort
\tz = `1+2` //gofmts:go
\ta = 1
)
";
        assert_eq!(
            rewrite_default(source).unwrap(),
            "package main

var (
\t//gofmts:sort
\ta = 1
\tz = `1 + 2` //gofmts:go
)
"
        );
    }

    #[test]
    fn test_untouched_source_is_returned_as_is() {
        let source = "package main\n\nvar a = 1\n";
        assert_eq!(rewrite_default(source).unwrap(), source);
    }

    #[test]
    fn test_unresolved_issue_fails() {
        let err = rewrite_default("package main\n\n//gofmts:json\nvar a = `{`\n").unwrap_err();
        assert_eq!(
            err.to_string(),
            "unresolved issues:\nfailed directive \"json\": json is not valid at 3:1"
        );
    }

    #[test]
    fn test_parse_error_propagates() {
        let err = rewrite_default("package main\n\nfunc f() {\n").unwrap_err();
        assert!(matches!(err, EngineError::Syntax(_)));
    }
}

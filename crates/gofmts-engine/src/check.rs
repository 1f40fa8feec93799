use crate::{FormatPass, Issue, Result, SortPass};
use gofmts_syntax::SyntaxTree;
use std::fmt::Write;

/// Issues found in one source unit without rewriting it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckReport {
    pub issues: Vec<Issue>,
}

impl CheckReport {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// One `path:line:column: detail` line per issue
    #[must_use]
    pub fn render(&self, path: &str) -> String {
        self.issues.iter().fold(String::new(), |mut out, issue| {
            let position = issue.position();
            let _ = writeln!(
                out,
                "{path}:{}:{}: {}",
                position.line,
                position.column,
                issue.details()
            );
            out
        })
    }
}

/// Run both passes over the unmodified unit and collect every issue
pub fn check(source: &str, format: &FormatPass<'_>, sort: &SortPass) -> Result<CheckReport> {
    let tree = SyntaxTree::parse(source)?;

    let mut issues = format.run(&tree)?.issues;
    issues.extend(sort.run(&tree)?.issues);

    Ok(CheckReport { issues })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embed::FormatterRegistry;
    use gofmts_config::GofmtsConfig;

    #[test]
    fn test_reports_both_passes() {
        let registry = FormatterRegistry::from_config(&GofmtsConfig::default());
        let source = "package main

//gofmts:json
var j = `{\"a\":1}`

var (
\t//gofmts:sort
\tb = 1
\ta = 2
)
";
        let report = check(source, &FormatPass::new(&registry, 8), &SortPass::new()).unwrap();

        assert!(!report.is_clean());
        assert_eq!(
            report.render("main.go"),
            "main.go:4:9: json formatting differs\nmain.go:8:2: block is unsorted\n"
        );
    }

    #[test]
    fn test_clean_report() {
        let registry = FormatterRegistry::from_config(&GofmtsConfig::default());
        let report = check(
            "package main\n",
            &FormatPass::new(&registry, 8),
            &SortPass::new(),
        )
        .unwrap();

        assert!(report.is_clean());
        assert_eq!(report.render("main.go"), "");
    }
}

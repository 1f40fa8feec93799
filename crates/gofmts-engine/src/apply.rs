use crate::{EngineError, Issue, Replacement, Result};

/// Splice the replacements of `issues` straight into `source`.
///
/// Returns the new text and the issues that had no replacement. Two
/// replacements touching the same bytes are an error.
pub fn apply_replacements(source: &str, issues: &[Issue]) -> Result<(String, Vec<Issue>)> {
    let mut replacements: Vec<&Replacement> =
        issues.iter().filter_map(Issue::replacement).collect();
    replacements.sort_by_key(|replacement| replacement.offset);

    let unresolved = issues
        .iter()
        .filter(|issue| issue.replacement().is_none())
        .cloned()
        .collect();

    let mut out = String::with_capacity(source.len());
    let mut cursor = 0;
    for replacement in replacements {
        if replacement.offset < cursor || replacement.end() > source.len() {
            return Err(EngineError::OverlappingReplacement {
                offset: replacement.offset,
            });
        }
        out.push_str(&source[cursor..replacement.offset]);
        out.push_str(&replacement.text);
        cursor = replacement.end();
    }
    out.push_str(&source[cursor..]);

    Ok((out, unresolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use gofmts_syntax::Position;

    fn differs(offset: usize, length: usize, text: &str) -> Issue {
        Issue::FormattingDiffers {
            directive: "go".to_string(),
            position: Position::new(offset, 1, offset + 1),
            end: Position::new(offset + length, 1, offset + length + 1),
            replacement: Replacement::new(offset, length, text),
        }
    }

    #[test]
    fn test_applies_in_offset_order() {
        let issues = vec![differs(8, 3, "D"), differs(0, 3, "A")];
        let (text, unresolved) = apply_replacements("aaa bbb ccc", &issues).unwrap();

        assert_eq!(text, "A bbb D");
        assert!(unresolved.is_empty());
    }

    #[test]
    fn test_returns_unresolved() {
        let unused = Issue::UnusedDirective {
            name: "json".to_string(),
            position: Position::new(0, 1, 1),
        };
        let (text, unresolved) =
            apply_replacements("abc", &[unused.clone(), differs(1, 1, "X")]).unwrap();

        assert_eq!(text, "aXc");
        assert_eq!(unresolved, vec![unused]);
    }

    #[test]
    fn test_overlap_is_an_error() {
        let issues = vec![differs(0, 4, "x"), differs(2, 2, "y")];
        let err = apply_replacements("abcdef", &issues).unwrap_err();

        assert!(matches!(err, EngineError::OverlappingReplacement { offset: 2 }));
    }
}

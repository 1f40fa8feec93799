use gofmts_engine::{Engine, EngineError};
use std::fs;
use std::path::Path;

fn fixture(name: &str) -> String {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read_to_string(path).expect("Failed to read fixture")
}

#[test]
fn test_rewrite_example() {
    let engine = Engine::default();
    let rewritten = engine
        .rewrite(&fixture("example.go"))
        .expect("Rewrite failed");

    assert_eq!(rewritten, fixture("example_expected.go"));
}

#[test]
fn test_rewrite_is_idempotent() {
    let engine = Engine::default();
    let expected = fixture("example_expected.go");

    assert_eq!(engine.rewrite(&expected).expect("Rewrite failed"), expected);
    assert!(engine.check(&expected).expect("Check failed").is_clean());
}

#[test]
fn test_check_example() {
    let report = Engine::default()
        .check(&fixture("example.go"))
        .expect("Check failed");

    assert_eq!(
        report.render("example.go"),
        "example.go:4:13: sql formatting differs
example.go:9:14: json formatting differs
example.go:12:1: block is unsorted
example.go:18:2: block is unsorted
example.go:24:2: block is unsorted
"
    );
}

#[test]
fn test_rewrite_refuses_unfixable_issues() {
    let err = Engine::default()
        .rewrite(&fixture("broken.go"))
        .expect_err("Rewrite should fail");

    let EngineError::Unresolved(issues) = &err else {
        panic!("Expected unresolved issues, got {err}");
    };
    let codes: Vec<&str> = issues.iter().map(|issue| issue.code()).collect();
    assert_eq!(codes, vec!["failed-directive", "unknown-directive"]);
}

#[test]
fn test_check_reports_unfixable_issues() {
    let report = Engine::default()
        .check(&fixture("broken.go"))
        .expect("Check failed");

    assert_eq!(
        report.render("broken.go"),
        "broken.go:3:1: failed directive \"json\": json is not valid
broken.go:6:1: unknown directive `gofmts:yaml`
broken.go:9:1: unused directive `gofmts:sort`
"
    );
}

#[test]
fn test_diagnostics_carry_fixes() {
    let diagnostics = Engine::default()
        .diagnose(&fixture("example.go"))
        .expect("Diagnose failed");

    assert_eq!(diagnostics.len(), 5);
    assert!(diagnostics.iter().all(|diagnostic| diagnostic.fix.is_some()));
    assert_eq!(diagnostics[0].range.start.line, 3);
    assert_eq!(diagnostics[0].range.start.character, 12);
}

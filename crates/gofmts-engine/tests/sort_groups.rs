use gofmts_engine::{Engine, Issue, SortPass, SyntaxTree};

fn run(source: &str) -> Vec<Issue> {
    let tree = SyntaxTree::parse(source).expect("Failed to parse source");
    SortPass::new().run(&tree).expect("Sort pass failed").issues
}

fn replacement(issue: &Issue) -> &str {
    issue
        .replacement()
        .map(|replacement| replacement.text.as_str())
        .expect("Issue should carry a replacement")
}

#[test]
fn test_previous_directive() {
    let issues = run("package main

const (
\t//gofmts:sort
\tZ = 2
\tA = 1
)
");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].details(), "block is unsorted");
    assert_eq!(issues[0].position().line, 5);
    assert_eq!(replacement(&issues[0]), "\tA = 1\n\tZ = 2\n");
}

#[test]
fn test_comments_move_with_their_member() {
    let issues = run("package main

const (
\t//gofmts:sort
\tZ = 2
\t// B = 1
\tA = 1
)
");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].position().line, 5);
    assert_eq!(replacement(&issues[0]), "\t// B = 1\n\tA = 1\n\tZ = 2\n");
}

#[test]
fn test_comment_after_directive_stays() {
    let issues = run("package main

const (
\t//gofmts:sort
\t// B = 1
\tZ = 2
\tA = 1
)
");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].position().line, 6);
    assert_eq!(replacement(&issues[0]), "\tA = 1\n\tZ = 2\n");
}

#[test]
fn test_top_level_declarations() {
    let issues = run("package main

//gofmts:sort
const Z = 1
const A = 2

const B = 3
");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].position().line, 4);
    assert_eq!(replacement(&issues[0]), "const A = 2\nconst Z = 1\n");
}

#[test]
fn test_back_to_back_groups() {
    let issues = run("package main

//gofmts:sort
const Z = 1
const A = 2

//gofmts:sort
const Y = 1
const B = 2
");

    let rendered: Vec<String> = issues.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec!["block is unsorted at 4:1", "block is unsorted at 8:1"]
    );
    assert_eq!(replacement(&issues[1]), "const B = 2\nconst Y = 1\n");
}

#[test]
fn test_unused_directive() {
    let issues = run("package main

//gofmts:sort
");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].details(), "unused directive `gofmts:sort`");
    assert_eq!(issues[0].position().line, 3);
}

#[test]
fn test_unused_directive_due_to_whitespace() {
    let issues = run("package main

//gofmts:sort

const A = 1
");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].details(), "unused directive `gofmts:sort`");
    assert_eq!(issues[0].position().line, 3);
}

#[test]
fn test_struct_fields() {
    let issues = run("package main

type Config struct {
\t//gofmts:sort
\tName    string
\tAddress string // where
\tAge     int
}
");

    assert_eq!(issues.len(), 1);
    assert_eq!(
        replacement(&issues[0]),
        "\tAddress string // where\n\tAge     int\n\tName    string\n"
    );
}

#[test]
fn test_only_governed_block_is_sorted() {
    let issues = run("package main

var m = map[string]int{
\t//gofmts:sort
\t\"b\": 2,
\t\"a\": 1,
}

var n = map[string]int{
\t\"z\": 2,
\t\"y\": 1,
}
");

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].position().line, 5);
    assert_eq!(replacement(&issues[0]), "\t\"a\": 1,\n\t\"b\": 2,\n");
}

const SWITCH: &str = "package main

func f(x string) {
\tswitch x {
\t//gofmts:sort
\tcase \"b\":
\t\tdoB()
\t\taaa()
\tcase \"a\":
\t\tdoA()
\t}
}
";

#[test]
fn test_case_clauses_keep_their_bodies() {
    let issues = run(SWITCH);

    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].to_string(), "block is unsorted at 6:2");
    assert_eq!(
        replacement(&issues[0]),
        "\tcase \"a\":\n\t\tdoA()\n\tcase \"b\":\n\t\tdoB()\n\t\taaa()\n"
    );
}

#[test]
fn test_rewrite_sorts_case_clauses() {
    let rewritten = Engine::default().rewrite(SWITCH).expect("Rewrite failed");

    assert_eq!(
        rewritten,
        "package main

func f(x string) {
\tswitch x {
\t//gofmts:sort
\tcase \"a\":
\t\tdoA()
\tcase \"b\":
\t\tdoB()
\t\taaa()
\t}
}
"
    );
    assert!(Engine::default().check(&rewritten).unwrap().is_clean());
}

#[test]
fn test_block_comment_detaches_directive() {
    let issues = run("package main

const (
\t//gofmts:sort
\t/* note */
\tZ = 2
\tA = 1
)
");

    let rendered: Vec<String> = issues.iter().map(ToString::to_string).collect();
    assert_eq!(rendered, vec!["unused directive `gofmts:sort` at 4:2"]);
}

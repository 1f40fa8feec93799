use super::{EmbedError, EmbeddedFormatter};

/// Clause-per-line SQL layout shared by the `sql`, `mysql` and `postgresql`
/// directives.
#[derive(Debug, Clone)]
pub struct SqlFormatter {
    uppercase: bool,
}

impl SqlFormatter {
    #[must_use]
    pub const fn new(uppercase: bool) -> Self {
        Self { uppercase }
    }
}

impl Default for SqlFormatter {
    fn default() -> Self {
        Self::new(true)
    }
}

impl EmbeddedFormatter for SqlFormatter {
    fn language(&self) -> &'static str {
        "sql"
    }

    fn format(&self, text: &str) -> Result<String, EmbedError> {
        let tokens = lex(text).map_err(parse_error)?;
        check_balance(&tokens).map_err(parse_error)?;

        let mut statements: Vec<&[Tok<'_>]> = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        for (i, tok) in tokens.iter().enumerate() {
            match tok.text {
                "(" => depth += 1,
                ")" => depth -= 1,
                ";" if depth == 0 => {
                    statements.push(&tokens[start..i]);
                    start = i + 1;
                }
                _ => {}
            }
        }
        let terminated = start == tokens.len() && start > 0;
        if !terminated {
            statements.push(&tokens[start..]);
        }

        let mut writer = Writer::new(self.uppercase);
        for (i, statement) in statements.iter().enumerate() {
            if statement.is_empty() {
                return Err(parse_error("empty statement".to_string()));
            }
            if i > 0 {
                writer.push_raw(";");
            }
            writer.statement(statement, 0).map_err(parse_error)?;
        }
        if terminated {
            writer.push_raw(";");
        }

        Ok(writer.out)
    }
}

fn parse_error(message: String) -> EmbedError {
    EmbedError::new(format!("unable to parse sql: {message}"))
}

/// Keywords that head a clause, and whether the clause has a body
const CLAUSES: &[(&[&str], bool)] = &[
    (&["SELECT"], true),
    (&["FROM"], true),
    (&["WHERE"], true),
    (&["GROUP", "BY"], true),
    (&["HAVING"], true),
    (&["ORDER", "BY"], true),
    (&["LIMIT"], true),
    (&["OFFSET"], true),
    (&["VALUES"], true),
    (&["SET"], true),
    (&["RETURNING"], true),
    (&["WITH"], true),
    (&["INSERT", "INTO"], true),
    (&["UPDATE"], true),
    (&["DELETE", "FROM"], true),
    (&["ON", "CONFLICT"], true),
    (&["UNION", "ALL"], false),
    (&["UNION"], false),
    (&["INTERSECT"], false),
    (&["EXCEPT"], false),
];

const STATEMENT_STARTS: &[&str] = &["SELECT", "WITH", "INSERT", "UPDATE", "DELETE", "VALUES"];

const JOIN_MODIFIERS: &[&str] = &["NATURAL", "LEFT", "RIGHT", "FULL", "INNER", "CROSS", "OUTER"];

const KEYWORDS: &[&str] = &[
    "ALL", "AND", "ANY", "AS", "ASC", "BETWEEN", "BY", "CASE", "CAST", "CONFLICT", "CROSS",
    "DEFAULT", "DELETE", "DESC", "DISTINCT", "DO", "ELSE", "END", "EXCEPT", "EXISTS", "FALSE",
    "FETCH", "FIRST", "FOR", "FROM", "FULL", "GROUP", "HAVING", "ILIKE", "IN", "INNER", "INSERT",
    "INTERSECT", "INTO", "IS", "JOIN", "LEFT", "LIKE", "LIMIT", "NATURAL", "NOT", "NOTHING",
    "NULL", "NULLS", "OFFSET", "ON", "OR", "ORDER", "OUTER", "OVER", "PARTITION", "RETURNING",
    "RIGHT", "SELECT", "SET", "THEN", "TRUE", "UNION", "UPDATE", "USING", "VALUES", "WHEN",
    "WHERE", "WITH",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Word,
    Literal,
    Punct,
    Operator,
}

#[derive(Debug, Clone, Copy)]
struct Tok<'a> {
    kind: Kind,
    text: &'a str,
    /// Whitespace separated this token from the previous one in the source
    spaced: bool,
}

impl Tok<'_> {
    fn is_word(&self, word: &str) -> bool {
        self.kind == Kind::Word && self.text.eq_ignore_ascii_case(word)
    }

    fn is_keyword(&self) -> bool {
        self.kind == Kind::Word && KEYWORDS.iter().any(|keyword| self.is_word(keyword))
    }
}

fn lex(text: &str) -> Result<Vec<Tok<'_>>, String> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;
    let mut spaced = false;

    while i < bytes.len() {
        let start = i;
        let c = bytes[i];
        let kind = match c {
            b' ' | b'\t' | b'\r' | b'\n' => {
                spaced = true;
                i += 1;
                continue;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                return Err("comments not supported".to_string());
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                return Err("comments not supported".to_string());
            }
            b'\'' | b'"' | b'`' => {
                i += 1;
                loop {
                    match bytes.get(i) {
                        None => return Err("unterminated string literal".to_string()),
                        Some(&b) if b == c => {
                            // A doubled quote is an escaped quote
                            if bytes.get(i + 1) == Some(&c) {
                                i += 2;
                            } else {
                                i += 1;
                                break;
                            }
                        }
                        Some(b'\\') if c == b'\'' => i += 2,
                        Some(_) => i += 1,
                    }
                }
                Kind::Literal
            }
            b'0'..=b'9' => {
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'.') {
                    i += 1;
                }
                Kind::Literal
            }
            b'(' | b')' | b',' | b';' | b'.' => {
                i += 1;
                Kind::Punct
            }
            b'$' | b'?' if bytes.get(i + 1).map_or(true, u8::is_ascii_digit) || c == b'?' => {
                i += 1;
                while i < bytes.len() && bytes[i].is_ascii_digit() {
                    i += 1;
                }
                Kind::Literal
            }
            b':' if bytes.get(i + 1).is_some_and(|b| b.is_ascii_alphabetic() || *b == b'_') => {
                i += 1;
                while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                    i += 1;
                }
                Kind::Literal
            }
            c if c.is_ascii_alphabetic() || c == b'_' || c >= 0x80 => {
                while i < bytes.len()
                    && (bytes[i].is_ascii_alphanumeric()
                        || bytes[i] == b'_'
                        || bytes[i] == b'$'
                        || bytes[i] >= 0x80)
                {
                    i += 1;
                }
                Kind::Word
            }
            _ => {
                i += operator_len(&text[i..]);
                Kind::Operator
            }
        };

        tokens.push(Tok {
            kind,
            text: &text[start..i.min(bytes.len())],
            spaced,
        });
        spaced = false;
    }

    Ok(tokens)
}

fn operator_len(rest: &str) -> usize {
    const OPERATORS: &[&str] = &[
        "->>", "<=", ">=", "<>", "!=", "||", "::", "->", "#>", "<<", ">>", "&&",
    ];
    OPERATORS
        .iter()
        .find(|op| rest.starts_with(*op))
        .map_or_else(|| rest.chars().next().map_or(1, char::len_utf8), |op| op.len())
}

fn check_balance(tokens: &[Tok<'_>]) -> Result<(), String> {
    let mut depth = 0usize;
    for tok in tokens {
        match tok.text {
            "(" if tok.kind == Kind::Punct => depth += 1,
            ")" if tok.kind == Kind::Punct => {
                depth = depth
                    .checked_sub(1)
                    .ok_or_else(|| "unexpected ')'".to_string())?;
            }
            _ => {}
        }
    }
    if depth > 0 {
        return Err("missing ')'".to_string());
    }
    Ok(())
}

/// Index of the parenthesis closing the one at `open`
fn matching(tokens: &[Tok<'_>], open: usize) -> usize {
    let mut depth = 0usize;
    for (i, tok) in tokens.iter().enumerate().skip(open) {
        match tok.text {
            "(" => depth += 1,
            ")" => {
                depth -= 1;
                if depth == 0 {
                    return i;
                }
            }
            _ => {}
        }
    }
    tokens.len() - 1
}

struct Writer {
    out: String,
    uppercase: bool,
    /// Indent of the line the next token starts, if a break is pending
    pending: Option<usize>,
    prev: Option<(Kind, String, bool)>,
    prev_unary: bool,
}

impl Writer {
    fn new(uppercase: bool) -> Self {
        Self {
            out: String::new(),
            uppercase,
            pending: None,
            prev: None,
            prev_unary: false,
        }
    }

    fn break_line(&mut self, indent: usize) {
        self.pending = Some(indent);
    }

    fn push_raw(&mut self, text: &str) {
        self.pending = None;
        self.out.push_str(text);
    }

    fn render(&self, tok: &Tok<'_>) -> String {
        if self.uppercase && tok.is_keyword() {
            tok.text.to_ascii_uppercase()
        } else {
            tok.text.to_string()
        }
    }

    fn push(&mut self, tok: &Tok<'_>) {
        let text = self.render(tok);

        if let Some(indent) = self.pending.take() {
            if !self.out.is_empty() {
                self.out.push('\n');
            }
            self.out.push_str(&" ".repeat(indent));
        } else if self.spaced(tok) {
            self.out.push(' ');
        }
        self.out.push_str(&text);

        let unary = matches!(tok.text, "-" | "+")
            && self.prev.as_ref().map_or(true, |(kind, prev, keyword)| {
                *kind == Kind::Operator || *keyword || prev == "(" || prev == ","
            });
        self.prev_unary = unary;
        self.prev = Some((tok.kind, tok.text.to_string(), tok.is_keyword()));
    }

    fn spaced(&self, tok: &Tok<'_>) -> bool {
        let Some((_, prev, keyword)) = &self.prev else {
            return false;
        };
        if self.out.is_empty() || self.prev_unary {
            return false;
        }
        if matches!(tok.text, "," | ")" | "." | "::" | ";") && tok.kind != Kind::Literal {
            return false;
        }
        if matches!(prev.as_str(), "(" | "." | "::") {
            return false;
        }
        if tok.text == "(" {
            return *keyword || tok.spaced;
        }
        true
    }

    /// Words of the clause keyword starting at `i`, and whether it has a body
    fn clause_at(tokens: &[Tok<'_>], i: usize) -> Option<(usize, bool)> {
        // `DO UPDATE` continues an `ON CONFLICT` clause
        if i > 0 && tokens[i - 1].is_word("DO") {
            return None;
        }
        CLAUSES.iter().find_map(|(words, body)| {
            let matched = words
                .iter()
                .enumerate()
                .all(|(k, word)| tokens.get(i + k).is_some_and(|tok| tok.is_word(word)));
            matched.then_some((words.len(), *body))
        })
    }

    /// Length of a join phrase such as `LEFT OUTER JOIN` starting at `i`
    fn join_at(tokens: &[Tok<'_>], i: usize) -> Option<usize> {
        let mut k = i;
        while tokens
            .get(k)
            .is_some_and(|tok| JOIN_MODIFIERS.iter().any(|word| tok.is_word(word)))
        {
            k += 1;
        }
        tokens
            .get(k)
            .is_some_and(|tok| tok.is_word("JOIN"))
            .then_some(k + 1 - i)
    }

    fn statement(&mut self, tokens: &[Tok<'_>], base: usize) -> Result<(), String> {
        let first = &tokens[0];
        if !STATEMENT_STARTS.iter().any(|word| first.is_word(word)) {
            return Err(format!("unexpected token `{}` at statement start", first.text));
        }

        let body = base + 2;
        let mut between = false;
        let mut i = 0;

        while i < tokens.len() {
            let tok = &tokens[i];

            if let Some((len, has_body)) = Self::clause_at(tokens, i) {
                self.break_line(base);
                for word in &tokens[i..i + len] {
                    self.push(word);
                }
                if has_body {
                    self.break_line(body);
                }
                i += len;
                continue;
            }

            if let Some(len) = Self::join_at(tokens, i) {
                self.break_line(body);
                for word in &tokens[i..i + len] {
                    self.push(word);
                }
                i += len;
                continue;
            }

            match tok.text {
                "," if tok.kind == Kind::Punct => {
                    self.push(tok);
                    self.break_line(body);
                }
                "(" if tok.kind == Kind::Punct => {
                    let close = matching(tokens, i);
                    let inner = &tokens[i + 1..close];
                    let subquery = inner
                        .first()
                        .is_some_and(|first| first.is_word("SELECT") || first.is_word("WITH"));

                    if subquery {
                        self.push(tok);
                        self.statement(inner, base + 4)?;
                        self.break_line(body);
                        self.push(&tokens[close]);
                    } else {
                        for inline in &tokens[i..=close] {
                            self.push(inline);
                        }
                    }
                    i = close + 1;
                    continue;
                }
                _ if tok.is_word("BETWEEN") => {
                    between = true;
                    self.push(tok);
                }
                _ if tok.is_word("AND") && between => {
                    between = false;
                    self.push(tok);
                }
                _ if tok.is_word("AND") || tok.is_word("OR") => {
                    self.break_line(body);
                    self.push(tok);
                }
                _ => self.push(tok),
            }
            i += 1;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(text: &str) -> String {
        SqlFormatter::default().format(text).unwrap()
    }

    fn error(text: &str) -> String {
        SqlFormatter::default().format(text).unwrap_err().to_string()
    }

    #[test]
    fn test_select_star() {
        assert_eq!(format("select * from mytable"), "SELECT\n  *\nFROM\n  mytable");
    }

    #[test]
    fn test_where_and_or() {
        insta::assert_snapshot!(
            format("select a, b from t where a = 1 and b between 1 and 2 or c is null order by a desc limit 10"),
            @r"
        SELECT
          a,
          b
        FROM
          t
        WHERE
          a = 1
          AND b BETWEEN 1 AND 2
          OR c IS NULL
        ORDER BY
          a DESC
        LIMIT
          10
        "
        );
    }

    #[test]
    fn test_join() {
        insta::assert_snapshot!(
            format("select u.name, count(*) as n from users u left join orders o on o.user_id = u.id group by u.name"),
            @r"
        SELECT
          u.name,
          count(*) AS n
        FROM
          users u
          LEFT JOIN orders o ON o.user_id = u.id
        GROUP BY
          u.name
        "
        );
    }

    #[test]
    fn test_subquery() {
        insta::assert_snapshot!(
            format("select * from t where id in (select id from u where x > -1)"),
            @r"
        SELECT
          *
        FROM
          t
        WHERE
          id IN (
            SELECT
              id
            FROM
              u
            WHERE
              x > -1
          )
        "
        );
    }

    #[test]
    fn test_insert_returning() {
        insta::assert_snapshot!(
            format("insert into t (a, b) values ($1, 'it''s') returning id"),
            @r"
        INSERT INTO
          t (a, b)
        VALUES
          ($1, 'it''s')
        RETURNING
          id
        "
        );
    }

    #[test]
    fn test_update() {
        insta::assert_snapshot!(
            format("UPDATE t SET a = 1, b = now() WHERE id = ?"),
            @r"
        UPDATE
          t
        SET
          a = 1,
          b = now()
        WHERE
          id = ?
        "
        );
    }

    #[test]
    fn test_union_and_statements() {
        assert_eq!(
            format("select 1 union all select 2; select 3;"),
            "SELECT\n  1\nUNION ALL\nSELECT\n  2;\nSELECT\n  3;"
        );
    }

    #[test]
    fn test_keep_case() {
        let formatter = SqlFormatter::new(false);
        assert_eq!(
            formatter.format("select a from t").unwrap(),
            "select\n  a\nfrom\n  t"
        );
    }

    #[test]
    fn test_already_formatted_is_stable() {
        let formatted = format("select a, b from t where a = 1");
        assert_eq!(format(&formatted), formatted);
    }

    #[test]
    fn test_errors() {
        assert_eq!(error(""), "unable to parse sql: empty statement");
        assert_eq!(error("select 1;;"), "unable to parse sql: empty statement");
        assert_eq!(
            error("select 'abc"),
            "unable to parse sql: unterminated string literal"
        );
        assert_eq!(error("select (1"), "unable to parse sql: missing ')'");
        assert_eq!(error("select 1)"), "unable to parse sql: unexpected ')'");
        assert_eq!(
            error("select 1 -- note"),
            "unable to parse sql: comments not supported"
        );
        assert_eq!(
            error("foo bar"),
            "unable to parse sql: unexpected token `foo` at statement start"
        );
    }
}

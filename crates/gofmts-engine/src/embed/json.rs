use super::{EmbedError, EmbeddedFormatter};
use serde::de::IgnoredAny;

/// Pretty-printer for JSON.
///
/// Objects get one member per line. Arrays stay on one line when they hold
/// no object and fit in the remaining width. Strings and numbers are copied
/// as written, and key order is preserved.
#[derive(Debug, Clone)]
pub struct JsonFormatter {
    width: usize,
    indent: String,
}

impl JsonFormatter {
    #[must_use]
    pub fn new(width: usize, indent: &str) -> Self {
        Self {
            width,
            indent: indent.to_string(),
        }
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new(80, "  ")
    }
}

impl EmbeddedFormatter for JsonFormatter {
    fn language(&self) -> &'static str {
        "json"
    }

    fn format(&self, text: &str) -> Result<String, EmbedError> {
        serde_json::from_str::<IgnoredAny>(text).map_err(|_| EmbedError::new("json is not valid"))?;

        let mut printer = Printer {
            tokens: scan(text),
            pos: 0,
            out: String::with_capacity(text.len()),
            line_start: 0,
            formatter: self,
        };
        printer.value(0);
        printer.out.push('\n');

        Ok(printer.out)
    }
}

/// Split already validated JSON into punctuation and scalar tokens
fn scan(text: &str) -> Vec<&str> {
    let bytes = text.as_bytes();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        match bytes[i] {
            b' ' | b'\t' | b'\r' | b'\n' => {
                i += 1;
                continue;
            }
            b'{' | b'}' | b'[' | b']' | b':' | b',' => i += 1,
            b'"' => {
                i += 1;
                while i < bytes.len() && bytes[i] != b'"' {
                    i += if bytes[i] == b'\\' { 2 } else { 1 };
                }
                i += 1;
            }
            _ => {
                while i < bytes.len()
                    && !matches!(
                        bytes[i],
                        b' ' | b'\t' | b'\r' | b'\n' | b'{' | b'}' | b'[' | b']' | b':' | b','
                    )
                {
                    i += 1;
                }
            }
        }
        tokens.push(&text[start..i.min(bytes.len())]);
    }

    tokens
}

struct Printer<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
    out: String,
    /// Offset in `out` where the current line starts
    line_start: usize,
    formatter: &'a JsonFormatter,
}

impl<'a> Printer<'a> {
    fn peek(&self) -> &'a str {
        self.tokens.get(self.pos).copied().unwrap_or("")
    }

    fn newline(&mut self, depth: usize) {
        self.out.push('\n');
        self.line_start = self.out.len();
        for _ in 0..depth {
            self.out.push_str(&self.formatter.indent);
        }
    }

    fn value(&mut self, depth: usize) {
        match self.peek() {
            "{" => self.object(depth),
            "[" => self.array(depth),
            token => {
                self.out.push_str(token);
                self.pos += 1;
            }
        }
    }

    fn object(&mut self, depth: usize) {
        self.pos += 1;
        if self.peek() == "}" {
            self.pos += 1;
            self.out.push_str("{}");
            return;
        }

        self.out.push('{');
        loop {
            self.newline(depth + 1);
            let key = self.peek();
            self.out.push_str(key);
            self.out.push_str(": ");
            self.pos += 2;
            self.value(depth + 1);

            if self.peek() == "," {
                self.pos += 1;
                self.out.push(',');
            } else {
                break;
            }
        }
        self.newline(depth);
        self.out.push('}');
        self.pos += 1;
    }

    fn array(&mut self, depth: usize) {
        let available = self
            .formatter
            .width
            .saturating_sub(self.out.len() - self.line_start);
        if let Some((line, next)) = self.inline(self.pos) {
            if line.len() <= available {
                self.out.push_str(&line);
                self.pos = next;
                return;
            }
        }

        self.pos += 1;
        if self.peek() == "]" {
            self.pos += 1;
            self.out.push_str("[]");
            return;
        }

        self.out.push('[');
        loop {
            self.newline(depth + 1);
            self.value(depth + 1);

            if self.peek() == "," {
                self.pos += 1;
                self.out.push(',');
            } else {
                break;
            }
        }
        self.newline(depth);
        self.out.push(']');
        self.pos += 1;
    }

    /// One-line rendering of the array or scalar at `pos`, with the position
    /// after it. Objects never go on one line.
    fn inline(&self, pos: usize) -> Option<(String, usize)> {
        match self.tokens.get(pos).copied()? {
            "{" => None,
            "[" => {
                let mut pos = pos + 1;
                let mut line = String::from("[");
                if self.tokens.get(pos).copied() == Some("]") {
                    return Some(("[]".to_string(), pos + 1));
                }
                loop {
                    let (element, next) = self.inline(pos)?;
                    line.push_str(&element);
                    pos = next;
                    match self.tokens.get(pos).copied()? {
                        "," => {
                            line.push_str(", ");
                            pos += 1;
                        }
                        _ => break,
                    }
                }
                line.push(']');
                Some((line, pos + 1))
            }
            token => Some((token.to_string(), pos + 1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(text: &str) -> String {
        JsonFormatter::default().format(text).unwrap()
    }

    #[test]
    fn test_object() {
        assert_eq!(format(r#"{"a":    1}"#), "{\n  \"a\": 1\n}\n");
    }

    #[test]
    fn test_nested_object_and_short_array() {
        assert_eq!(
            format(r#"{"a":  1, "b":2, "c": [1,2,3], "d": {"e": null}}"#),
            "{\n  \"a\": 1,\n  \"b\": 2,\n  \"c\": [1, 2, 3],\n  \"d\": {\n    \"e\": null\n  }\n}\n"
        );
    }

    #[test]
    fn test_top_level_array() {
        assert_eq!(format("[1 ]"), "[1]\n");
        assert_eq!(format("[ ]"), "[]\n");
        assert_eq!(format("[[1, 2], []]"), "[[1, 2], []]\n");
    }

    #[test]
    fn test_array_with_objects_expands() {
        assert_eq!(
            format(r#"[{"id": 1}, {}]"#),
            "[\n  {\n    \"id\": 1\n  },\n  {}\n]\n"
        );
    }

    #[test]
    fn test_long_array_expands() {
        let items: Vec<String> = (0..30).map(|i| format!("\"item{i}\"")).collect();
        let formatted = format(&format!("[{}]", items.join(",")));

        assert!(formatted.starts_with("[\n  \"item0\",\n  \"item1\",\n"));
        assert!(formatted.ends_with("  \"item29\"\n]\n"));
    }

    #[test]
    fn test_scalars_copied_verbatim() {
        assert_eq!(
            format(r#"{"n": 1.50e+10, "s": "a \"b\" \u00e9"}"#),
            "{\n  \"n\": 1.50e+10,\n  \"s\": \"a \\\"b\\\" \\u00e9\"\n}\n"
        );
        assert_eq!(format(" true "), "true\n");
    }

    #[test]
    fn test_custom_indent_and_width() {
        let formatter = JsonFormatter::new(10, "\t");
        assert_eq!(
            formatter.format(r#"{"list": [1, 2, 3]}"#).unwrap(),
            "{\n\t\"list\": [\n\t\t1,\n\t\t2,\n\t\t3\n\t]\n}\n"
        );
    }

    #[test]
    fn test_invalid_json() {
        let formatter = JsonFormatter::default();
        for text in [r#"{"a":}"#, "", "[1,]", "{} {}"] {
            let err = formatter.format(text).unwrap_err();
            assert_eq!(err.to_string(), "json is not valid");
        }
    }
}

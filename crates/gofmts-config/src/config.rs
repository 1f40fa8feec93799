use serde::{Deserialize, Serialize};

/// Column width of a tab stop, matching gofmt.
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Top-level gofmts configuration.
/// Every field is optional in the config file; missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GofmtsConfig {
    /// Tab width used when re-indenting embedded content
    pub tab_width: usize,

    /// File patterns to include when walking directories
    pub include: PatternList,

    /// File patterns to exclude when walking directories
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<PatternList>,

    /// Options for the `json` formatter
    pub json: JsonConfig,

    /// Options for the `sql`, `mysql` and `postgresql` formatters
    pub sql: SqlConfig,

    /// Directive names whose formatter is switched off
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub disabled: Vec<String>,
}

impl Default for GofmtsConfig {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            include: PatternList::Pattern("**/*.go".to_string()),
            exclude: Some(PatternList::Pattern("vendor/**".to_string())),
            json: JsonConfig::default(),
            sql: SqlConfig::default(),
            disabled: Vec::new(),
        }
    }
}

impl GofmtsConfig {
    /// Check whether the formatter for a directive name has been disabled
    #[must_use]
    pub fn is_disabled(&self, name: &str) -> bool {
        self.disabled.iter().any(|disabled| disabled == name)
    }

    /// Exclude patterns, empty when none are configured
    #[must_use]
    pub fn exclude_patterns(&self) -> Vec<&str> {
        self.exclude
            .as_ref()
            .map(PatternList::patterns)
            .unwrap_or_default()
    }
}

/// Layout options for embedded JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JsonConfig {
    /// Maximum line width before arrays are expanded one element per line
    pub width: usize,

    /// Indentation for each nesting level
    pub indent: String,
}

impl Default for JsonConfig {
    fn default() -> Self {
        Self {
            width: 80,
            indent: "  ".to_string(),
        }
    }
}

/// Layout options for embedded SQL
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SqlConfig {
    /// Upper-case SQL keywords
    pub uppercase: bool,
}

impl Default for SqlConfig {
    fn default() -> Self {
        Self { uppercase: true }
    }
}

/// One glob pattern or several
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatternList {
    /// Single pattern
    Pattern(String),
    /// Multiple patterns
    Patterns(Vec<String>),
}

impl PatternList {
    /// Get all patterns as a vector of string slices
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        match self {
            Self::Pattern(pattern) => vec![pattern.as_str()],
            Self::Patterns(patterns) => patterns.iter().map(String::as_str).collect(),
        }
    }
}

//! Formatters for content embedded in string literals.

mod go;
mod json;
mod sql;

pub use go::GoFormatter;
pub use json::JsonFormatter;
pub use sql::SqlFormatter;

use gofmts_config::GofmtsConfig;
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

/// Reason a formatter rejected its input
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct EmbedError(String);

impl EmbedError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// Trait for implementing an embedded-language formatter
pub trait EmbeddedFormatter: Send + Sync {
    /// Language name used in log output
    fn language(&self) -> &'static str;

    /// Format the text between a literal's delimiters
    fn format(&self, text: &str) -> Result<String, EmbedError>;
}

/// Formatters keyed by directive name
#[derive(Clone, Default)]
pub struct FormatterRegistry {
    formatters: HashMap<String, Arc<dyn EmbeddedFormatter>>,
}

impl FormatterRegistry {
    /// Registry without any formatter
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in formatters configured from `config`, minus the disabled ones
    #[must_use]
    pub fn from_config(config: &GofmtsConfig) -> Self {
        let mut registry = Self::empty();

        registry.register(
            "json",
            Arc::new(JsonFormatter::new(config.json.width, &config.json.indent)),
        );

        let sql: Arc<dyn EmbeddedFormatter> = Arc::new(SqlFormatter::new(config.sql.uppercase));
        for name in ["sql", "mysql", "postgresql"] {
            registry.register(name, Arc::clone(&sql));
        }

        registry.register("go", Arc::new(GoFormatter));

        for name in &config.disabled {
            registry.formatters.remove(name);
        }

        registry
    }

    /// Add or replace the formatter behind a directive name
    pub fn register(&mut self, name: impl Into<String>, formatter: Arc<dyn EmbeddedFormatter>) {
        self.formatters.insert(name.into(), formatter);
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&dyn EmbeddedFormatter> {
        self.formatters.get(name).map(AsRef::as_ref)
    }

    /// Registered directive names, sorted
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.formatters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FormatterRegistry")
            .field("names", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl EmbeddedFormatter for Upper {
        fn language(&self) -> &'static str {
            "upper"
        }

        fn format(&self, text: &str) -> Result<String, EmbedError> {
            Ok(text.to_uppercase())
        }
    }

    #[test]
    fn test_default_names() {
        let registry = FormatterRegistry::from_config(&GofmtsConfig::default());
        assert_eq!(
            registry.names(),
            vec!["go", "json", "mysql", "postgresql", "sql"]
        );
    }

    #[test]
    fn test_sql_aliases_share_a_formatter() {
        let registry = FormatterRegistry::from_config(&GofmtsConfig::default());
        for name in ["sql", "mysql", "postgresql"] {
            assert_eq!(registry.get(name).unwrap().language(), "sql");
        }
    }

    #[test]
    fn test_disabled_formatters_are_missing() {
        let config = GofmtsConfig {
            disabled: vec!["go".to_string()],
            ..GofmtsConfig::default()
        };
        let registry = FormatterRegistry::from_config(&config);
        assert!(registry.get("go").is_none());
        assert!(registry.get("json").is_some());
    }

    #[test]
    fn test_register_custom_formatter() {
        let mut registry = FormatterRegistry::empty();
        registry.register("upper", Arc::new(Upper));

        let formatter = registry.get("upper").unwrap();
        assert_eq!(formatter.format("abc").unwrap(), "ABC");
        assert!(registry.get("json").is_none());
    }
}

use crate::embed::FormatterRegistry;
use crate::{
    check, rewrite, to_diagnostics, CheckReport, Diagnostic, FormatPass, GofmtsConfig, Result,
    SortPass,
};
use gofmts_config::DEFAULT_TAB_WIDTH;

/// Entry point shared by the command line and the language server
#[derive(Debug, Clone)]
pub struct Engine {
    registry: FormatterRegistry,
    tab_width: usize,
}

impl Engine {
    /// Engine with the built-in formatters, configured by `config`
    #[must_use]
    pub fn new(config: &GofmtsConfig) -> Self {
        Self {
            registry: FormatterRegistry::from_config(config),
            tab_width: config.tab_width,
        }
    }

    #[must_use]
    pub fn with_registry(registry: FormatterRegistry, tab_width: usize) -> Self {
        Self {
            registry,
            tab_width,
        }
    }

    #[must_use]
    pub const fn registry(&self) -> &FormatterRegistry {
        &self.registry
    }

    fn format_pass(&self) -> FormatPass<'_> {
        FormatPass::new(&self.registry, self.tab_width)
    }

    /// Report every issue without touching the source
    pub fn check(&self, source: &str) -> Result<CheckReport> {
        check(source, &self.format_pass(), &SortPass::new())
    }

    /// Apply every fix; fails if any issue has none
    pub fn rewrite(&self, source: &str) -> Result<String> {
        rewrite(source, &self.format_pass(), &SortPass::new())
    }

    /// Issues as diagnostics with suggested fixes
    pub fn diagnose(&self, source: &str) -> Result<Vec<Diagnostic>> {
        let report = self.check(source)?;
        Ok(to_diagnostics(source, &report.issues))
    }
}

impl Default for Engine {
    fn default() -> Self {
        Self::with_registry(
            FormatterRegistry::from_config(&GofmtsConfig::default()),
            DEFAULT_TAB_WIDTH,
        )
    }
}

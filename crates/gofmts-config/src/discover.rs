use crate::{ConfigError, GofmtsConfig, Result};
use glob::Pattern;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Compiled include/exclude patterns of a [`GofmtsConfig`]
#[derive(Debug, Clone)]
pub struct FileMatcher {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl FileMatcher {
    pub fn new(config: &GofmtsConfig) -> Result<Self> {
        Ok(Self {
            include: compile(&config.include.patterns())?,
            exclude: compile(&config.exclude_patterns())?,
        })
    }

    /// Check a path relative to the walked root against the patterns
    #[must_use]
    pub fn is_match(&self, relative: &Path) -> bool {
        self.include.iter().any(|p| p.matches_path(relative))
            && !self.exclude.iter().any(|p| p.matches_path(relative))
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .map(|pattern| {
            Pattern::new(pattern).map_err(|e| ConfigError::InvalidPattern {
                pattern: (*pattern).to_string(),
                message: e.to_string(),
            })
        })
        .collect()
}

/// Expand the given paths into the list of Go files to process.
///
/// Files are kept as given. Directories are walked recursively and filtered
/// through the configured include/exclude patterns, matched against the path
/// relative to that directory. The result is sorted and free of duplicates.
pub fn discover_files(config: &GofmtsConfig, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let matcher = FileMatcher::new(config)?;
    let mut files = Vec::new();

    for root in roots {
        if !root.is_dir() {
            files.push(root.clone());
            continue;
        }

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = entry.map_err(|e| ConfigError::Walk {
                path: root.clone(),
                message: e.to_string(),
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let relative = entry.path().strip_prefix(root).unwrap_or(entry.path());
            if matcher.is_match(relative) {
                files.push(entry.path().to_path_buf());
            }
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

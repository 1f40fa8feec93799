pub mod check;
pub mod format;

use anyhow::{Context, Result};
use gofmts_config::{find_config, load_config, GofmtsConfig};
use gofmts_engine::{EngineError, Issue};
use std::path::PathBuf;

/// Load the config given on the command line, or the first one found above
/// the working directory. Without either, the defaults apply.
pub fn resolve_config(config_path: Option<PathBuf>) -> Result<GofmtsConfig> {
    let config_path = if let Some(path) = config_path {
        Some(path)
    } else {
        let current_dir = std::env::current_dir()?;
        find_config(&current_dir).context("Failed to search for config")?
    };

    match config_path {
        Some(path) => {
            tracing::debug!("Using config at {:?}", path);
            load_config(&path).with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(GofmtsConfig::default()),
    }
}

/// `path:line:column: detail`, the way every issue is reported
pub fn issue_line(path: &str, issue: &Issue) -> String {
    let position = issue.position();
    format!(
        "{path}:{}:{}: {}",
        position.line,
        position.column,
        issue.details()
    )
}

/// Issues that kept a rewrite from happening, if that is why it failed
pub fn unresolved(err: &EngineError) -> Option<&[Issue]> {
    match err {
        EngineError::Unresolved(issues) => Some(issues),
        _ => None,
    }
}

use crate::{ConfigError, GofmtsConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file names to search for, in order of preference
const CONFIG_FILES: &[&str] = &[
    ".gofmts.yml",
    ".gofmts.yaml",
    ".gofmts.json",
    "gofmts.config.yml",
    "gofmts.config.yaml",
    "gofmts.config.json",
];

/// Find a gofmts config file by walking up the directory tree from the given start directory.
/// Returns the path to the config file if found.
pub fn find_config(start_dir: &Path) -> Result<Option<PathBuf>> {
    let mut current_dir = start_dir.to_path_buf();

    loop {
        for file_name in CONFIG_FILES {
            let config_path = current_dir.join(file_name);
            if config_path.is_file() {
                return Ok(Some(config_path));
            }
        }

        if !current_dir.pop() {
            break;
        }
    }

    Ok(None)
}

/// Load a gofmts config from the specified path.
/// The format is detected from the file extension.
pub fn load_config(path: &Path) -> Result<GofmtsConfig> {
    let contents = fs::read_to_string(path)?;
    load_config_from_str(&contents, path)
}

/// Load a gofmts config from a string.
/// The path is used for error messages and format detection.
pub fn load_config_from_str(contents: &str, path: &Path) -> Result<GofmtsConfig> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    let config = match extension {
        "yml" | "yaml" => parse_yaml(contents, path)?,
        "json" => parse_json(contents, path)?,
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    validate_config(&config, path)?;

    Ok(config)
}

fn parse_yaml(contents: &str, path: &Path) -> Result<GofmtsConfig> {
    // An empty YAML document means "all defaults"
    if contents.trim().is_empty() {
        return Ok(GofmtsConfig::default());
    }

    serde_yaml::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("YAML parse error: {e}"),
    })
}

fn parse_json(contents: &str, path: &Path) -> Result<GofmtsConfig> {
    serde_json::from_str(contents).map_err(|e| ConfigError::Invalid {
        path: path.to_path_buf(),
        message: format!("JSON parse error: {e}"),
    })
}

/// Validate the loaded configuration
fn validate_config(config: &GofmtsConfig, path: &Path) -> Result<()> {
    let invalid = |message: String| ConfigError::Invalid {
        path: path.to_path_buf(),
        message,
    };

    if config.tab_width == 0 {
        return Err(invalid("tabWidth must be greater than zero".to_string()));
    }

    if config.json.width == 0 {
        return Err(invalid("json.width must be greater than zero".to_string()));
    }

    if !config.json.indent.chars().all(|c| c == ' ' || c == '\t') {
        return Err(invalid(format!(
            "json.indent must only contain spaces or tabs, got {:?}",
            config.json.indent
        )));
    }

    let include = config.include.patterns();
    if include.is_empty() {
        return Err(invalid("include must contain at least one pattern".to_string()));
    }

    for pattern in include.into_iter().chain(config.exclude_patterns()) {
        if pattern.trim().is_empty() {
            return Err(invalid("file patterns must not be empty".to_string()));
        }
        if let Err(e) = glob::Pattern::new(pattern) {
            return Err(ConfigError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            });
        }
    }

    Ok(())
}

mod config;
mod discover;
mod error;
mod loader;

pub use config::{GofmtsConfig, JsonConfig, PatternList, SqlConfig, DEFAULT_TAB_WIDTH};
pub use discover::{discover_files, FileMatcher};
pub use error::{ConfigError, Result};
pub use loader::{find_config, load_config, load_config_from_str};

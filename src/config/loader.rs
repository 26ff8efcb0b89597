//! Configuration file loading.

use crate::config::schema::SetupConfig;
use crate::error::{Result, SetupError};
use std::fs;
use std::path::{Path, PathBuf};

/// Config file name, relative to the install root.
pub const CONFIG_FILE: &str = ".nbsetup.yml";

/// Location of the config file under `root`.
pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// Load `<root>/.nbsetup.yml`, or the defaults if it does not exist.
pub fn load_config(root: &Path) -> Result<SetupConfig> {
    let path = config_path(root);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config at {}; using defaults", path.display());
            return Ok(SetupConfig::default());
        }
        Err(e) => return Err(SetupError::Io(e)),
    };
    parse_config(&content, &path)
}

/// Parse YAML content into a [`SetupConfig`].
///
/// `source_path` is only used for error reporting.
pub fn parse_config(content: &str, source_path: &Path) -> Result<SetupConfig> {
    if content.trim().is_empty() {
        return Ok(SetupConfig::default());
    }
    serde_yaml::from_str(content).map_err(|e| SetupError::Config {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

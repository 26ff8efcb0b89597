//! Optional per-project configuration.
//!
//! `<install-root>/.nbsetup.yml` supplies defaults for the interpreter
//! range, the container backend and the kernel to register. Command-line
//! flags and `NBSETUP_*` environment variables take precedence.
//!
//! # Example
//!
//! ```
//! use nbsetup::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join(".nbsetup.yml"), "python:\n  version: \">=3.12\"\n").unwrap();
//!
//! let config = load_config(temp.path()).unwrap();
//! assert_eq!(config.python_range().unwrap().to_string(), ">=3.12");
//! ```

pub mod loader;
pub mod schema;

pub use loader::{config_path, load_config, parse_config, CONFIG_FILE};
pub use schema::{DockerConfig, KernelConfig, PythonConfig, SetupConfig};

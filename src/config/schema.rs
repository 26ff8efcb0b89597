//! Configuration schema for `.nbsetup.yml`.

use crate::error::Result;
use crate::requirements::{default_python_range, ContainerBackend, VersionRange};
use serde::{Deserialize, Serialize};

/// Root of `.nbsetup.yml`. Every section is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SetupConfig {
    pub python: PythonConfig,
    pub docker: DockerConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kernel: Option<KernelConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PythonConfig {
    /// Acceptable interpreter versions: `3.11`, `>=3.11` or `3.11-3.13`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DockerConfig {
    /// Backend installed when no Docker runtime is found.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<ContainerBackend>,
}

/// Kernel registered after the interpreter is pinned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct KernelConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl SetupConfig {
    /// The configured interpreter range, or the default one.
    pub fn python_range(&self) -> Result<VersionRange> {
        match &self.python.version {
            Some(range) => range.parse(),
            None => Ok(default_python_range()),
        }
    }
}

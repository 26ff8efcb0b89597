//! Jupyter kernel registration.
//!
//! Runs `<python> -m ipykernel install --user` with the interpreter the
//! run just resolved. The resolved invocation is passed in explicitly; the
//! process environment is never consulted for it.

use crate::error::{Result, SetupError};
use crate::requirements::ProbeResult;
use crate::shell::{display_command, CommandRunner};

/// Name and label of the kernel to register.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelSpec {
    pub name: String,
    pub display_name: String,
}

impl KernelSpec {
    /// A kernel spec whose display name defaults to `Python (<name>)`.
    pub fn new(name: impl Into<String>, display_name: Option<String>) -> Self {
        let name = name.into();
        let display_name = display_name
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| format!("Python ({})", name));
        Self { name, display_name }
    }

    fn install_args(&self) -> Vec<String> {
        [
            "-m",
            "ipykernel",
            "install",
            "--user",
            "--name",
            &self.name,
            "--display-name",
            &self.display_name,
        ]
        .iter()
        .map(|s| s.to_string())
        .collect()
    }
}

/// Register `spec` as a Jupyter kernel backed by `python`.
pub fn register(python: &ProbeResult, spec: &KernelSpec, runner: &dyn CommandRunner) -> Result<()> {
    let mut args = python.invocation.prefix.clone();
    args.extend(spec.install_args());
    let command = display_command(&python.executable, &args);

    tracing::info!("Registering kernel '{}'", spec.name);
    tracing::debug!("Running: {}", command);
    let result = runner.run(&python.executable, &args)?;
    if !result.success {
        return Err(SetupError::ExternalToolFailure {
            command,
            code: result.exit_code,
        });
    }
    Ok(())
}

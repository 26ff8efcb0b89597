//! Error types for nbsetup operations.
//!
//! This module defines [`SetupError`], the primary error type used throughout
//! the application, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Every failure is terminal for the current invocation; nothing retries
//! - Use `SetupError` for failures the operator must act on
//! - Use `anyhow::Error` (via `SetupError::Other`) for unexpected errors
//! - [`SetupError::exit_code`] decides the process exit status

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for nbsetup operations.
#[derive(Debug, Error)]
pub enum SetupError {
    /// Host OS, distribution, or backend is outside the supported set.
    #[error("Unsupported platform '{platform}': {reason}")]
    UnsupportedPlatform { platform: String, reason: String },

    /// No candidate satisfied the requirement and nothing was installed.
    #[error("Requirement '{requirement}' not met: expected {expected}")]
    RequirementUnmet {
        requirement: String,
        expected: String,
    },

    /// The installer exited 0 but re-probing still found nothing acceptable.
    #[error(
        "Installed '{requirement}' but no candidate satisfies {expected}. \
         It may not be on PATH yet; open a new shell and re-run."
    )]
    InstalledButUnresolved {
        requirement: String,
        expected: String,
    },

    /// An external package manager or installer exited non-zero.
    #[error("Command failed with exit code {code:?}: {command}")]
    ExternalToolFailure { command: String, code: Option<i32> },

    /// Malformed user input (version ranges, identifiers).
    #[error("Invalid input: {message}")]
    MalformedInput { message: String },

    /// Failed to read or parse the config file.
    #[error("Failed to load config at {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SetupError {
    /// Process exit status for this error.
    ///
    /// Malformed input exits with 2 (matching clap's usage errors); every
    /// runtime failure exits with 1.
    pub fn exit_code(&self) -> u8 {
        match self {
            SetupError::MalformedInput { .. } => 2,
            _ => 1,
        }
    }
}

/// Result type alias for nbsetup operations.
pub type Result<T> = std::result::Result<T, SetupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_platform_displays_platform_and_reason() {
        let err = SetupError::UnsupportedPlatform {
            platform: "solaris".into(),
            reason: "no installer available".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("solaris"));
        assert!(msg.contains("no installer available"));
    }

    #[test]
    fn requirement_unmet_names_requirement_and_minimum() {
        let err = SetupError::RequirementUnmet {
            requirement: "python".into(),
            expected: "3.11-3.13".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("python"));
        assert!(msg.contains("3.11-3.13"));
    }

    #[test]
    fn installed_but_unresolved_hints_at_new_shell() {
        let err = SetupError::InstalledButUnresolved {
            requirement: "docker".into(),
            expected: ">=20.10".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("docker"));
        assert!(msg.contains("new shell"));
    }

    #[test]
    fn external_tool_failure_displays_command_and_code() {
        let err = SetupError::ExternalToolFailure {
            command: "brew install python@3.11".into(),
            code: Some(1),
        };
        let msg = err.to_string();
        assert!(msg.contains("brew install python@3.11"));
        assert!(msg.contains("1"));
    }

    #[test]
    fn config_error_displays_path() {
        let err = SetupError::Config {
            path: PathBuf::from("/work/.nbsetup.yml"),
            message: "unknown field `pyhton`".into(),
        };
        assert!(err.to_string().contains("/work/.nbsetup.yml"));
    }

    #[test]
    fn malformed_input_exits_with_usage_code() {
        let err = SetupError::MalformedInput {
            message: "bad range".into(),
        };
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn runtime_failures_exit_with_one() {
        let errors = [
            SetupError::UnsupportedPlatform {
                platform: "x".into(),
                reason: "y".into(),
            },
            SetupError::RequirementUnmet {
                requirement: "python".into(),
                expected: ">=3.11".into(),
            },
            SetupError::ExternalToolFailure {
                command: "apt-get".into(),
                code: None,
            },
        ];
        for err in &errors {
            assert_eq!(err.exit_code(), 1);
        }
    }

    #[test]
    fn io_error_converts_from_std() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file missing");
        let err: SetupError = io_err.into();
        assert!(matches!(err, SetupError::Io(_)));
    }
}

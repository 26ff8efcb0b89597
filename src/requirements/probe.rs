//! Version probing for candidate tools.
//!
//! A probe runs a candidate with its version query, parses the reported
//! version, and checks it against the requirement. Probes are speculative:
//! a missing executable, a crash, or garbage output are all just "not this
//! one", never an error. The only side effect is the subprocess itself, so
//! probing the same candidate twice is always safe.
//!
//! # Example
//!
//! ```no_run
//! use nbsetup::requirements::probe::{probe, Candidate, Invocation};
//! use nbsetup::requirements::registry::{default_python_range, CandidateSource, ToolRequirement};
//! use nbsetup::shell::SystemRunner;
//! use std::path::PathBuf;
//!
//! let req = ToolRequirement::python(default_python_range());
//! let candidate = Candidate {
//!     invocation: Invocation::bare("python3.11"),
//!     executable: PathBuf::from("/usr/bin/python3.11"),
//!     source: CandidateSource::VersionedName,
//! };
//! if let Some(result) = probe(&candidate, &req, &SystemRunner).accepted() {
//!     println!("{} is Python {}", result.invocation, result.version);
//! }
//! ```

use crate::requirements::registry::{CandidateSource, ToolRequirement};
use crate::requirements::version::Version;
use crate::shell::{display_command, CommandRunner};
use std::fmt;
use std::path::{Path, PathBuf};

/// The form a downstream tool uses to invoke a resolved command.
///
/// Either a bare command name (`python3.11`), a full path, or a command
/// plus fixed arguments (`py -3.11`, `docker compose`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub prefix: Vec<String>,
}

impl Invocation {
    /// A command with no fixed arguments.
    pub fn bare(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            prefix: Vec::new(),
        }
    }

    /// Parse the single-line form written by [`fmt::Display`].
    ///
    /// A program containing whitespace is expected in double quotes.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        let (program, rest) = if let Some(quoted) = line.strip_prefix('"') {
            let end = quoted.find('"')?;
            (&quoted[..end], &quoted[end + 1..])
        } else {
            match line.split_once(char::is_whitespace) {
                Some((program, rest)) => (program, rest),
                None => (line, ""),
            }
        };
        Some(Self {
            program: program.to_string(),
            prefix: rest.split_whitespace().map(String::from).collect(),
        })
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.program.contains(char::is_whitespace) {
            write!(f, "\"{}\"", self.program)?;
        } else {
            f.write_str(&self.program)?;
        }
        for arg in &self.prefix {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// A located candidate, ready to probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Form persisted for and exposed to downstream tooling.
    pub invocation: Invocation,
    /// Resolved file that is actually executed by the probe.
    pub executable: PathBuf,
    pub source: CandidateSource,
}

/// A candidate that passed its probe. Never mutated; every probe builds a
/// new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeResult {
    pub invocation: Invocation,
    pub executable: PathBuf,
    pub version: Version,
}

/// What a single probe observed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeOutcome {
    /// Version within range (and ready, if readiness is required).
    Accepted(ProbeResult),
    /// Runs, but its version is outside the range.
    Rejected { version: Version },
    /// Version acceptable, but the readiness check failed (daemon down).
    NotReady { version: Version },
    /// Could not run, exited non-zero, or printed no version.
    Unavailable,
}

impl ProbeOutcome {
    /// The result, if the candidate was accepted.
    pub fn accepted(self) -> Option<ProbeResult> {
        match self {
            ProbeOutcome::Accepted(result) => Some(result),
            _ => None,
        }
    }
}

/// Probe one candidate against a requirement.
pub fn probe(
    candidate: &Candidate,
    requirement: &ToolRequirement,
    runner: &dyn CommandRunner,
) -> ProbeOutcome {
    let mut args = candidate.invocation.prefix.clone();
    args.extend(requirement.version_query.iter().cloned());

    let result = match runner.capture(&candidate.executable, &args) {
        Ok(result) => result,
        Err(e) => {
            tracing::debug!("Probe {} could not run: {}", candidate.invocation, e);
            return ProbeOutcome::Unavailable;
        }
    };
    if !result.success {
        tracing::debug!(
            "Probe {} exited with {:?}",
            display_command(&candidate.executable, &args),
            result.exit_code
        );
        return ProbeOutcome::Unavailable;
    }

    let Some(version) = Version::parse_from_output(&result.combined_output()) else {
        tracing::debug!("Probe {} printed no version", candidate.invocation);
        return ProbeOutcome::Unavailable;
    };

    if !requirement.range.accepts(&version) {
        tracing::debug!(
            "Probe {} reported {}, outside {}",
            candidate.invocation,
            version,
            requirement.range
        );
        return ProbeOutcome::Rejected { version };
    }

    if let Some(readiness) = &requirement.readiness {
        let mut ready_args = candidate.invocation.prefix.clone();
        ready_args.extend(readiness.iter().cloned());
        let ready = runner
            .capture(&candidate.executable, &ready_args)
            .is_ok_and(|r| r.success);
        if !ready {
            tracing::debug!(
                "Probe {} reported {} but `{}` failed",
                candidate.invocation,
                version,
                readiness.join(" ")
            );
            return ProbeOutcome::NotReady { version };
        }
    }

    tracing::debug!("Probe {} accepted at {}", candidate.invocation, version);
    ProbeOutcome::Accepted(ProbeResult {
        invocation: candidate.invocation.clone(),
        executable: candidate.executable.clone(),
        version,
    })
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// File names a command may have on disk.
fn executable_names(tool: &str) -> Vec<String> {
    if cfg!(target_os = "windows") && Path::new(tool).extension().is_none() {
        [".exe", ".cmd", ".bat"]
            .iter()
            .map(|ext| format!("{}{}", tool, ext))
            .collect()
    } else {
        vec![tool.to_string()]
    }
}

/// Resolve a tool's binary path by iterating over PATH entries.
///
/// Returns the first match that exists and is executable. Does NOT use
/// the `which` command; `which` behavior varies across systems and
/// is sometimes a shell builtin with inconsistent error handling.
pub fn resolve_tool_path(tool: &str, path_entries: &[PathBuf]) -> Option<PathBuf> {
    let names = executable_names(tool);
    for dir in path_entries {
        for name in &names {
            let candidate = dir.join(name);
            if candidate.is_file() && is_executable(&candidate) {
                return Some(candidate);
            }
        }
    }
    None
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::registry::default_python_range;
    use crate::requirements::version::VersionRange;
    use crate::shell::SystemRunner;
    use std::fs;
    use tempfile::TempDir;

    /// Create a fake binary at a path (creates parent dirs as needed).
    fn create_fake_binary(path: &Path, script: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, format!("#!/bin/sh\n{}\n", script)).unwrap();
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }
    }

    /// Create a non-executable file at a path.
    #[cfg(unix)]
    fn create_non_executable_file(path: &Path) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "not executable").unwrap();
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o644)).unwrap();
    }

    fn candidate(path: &Path, name: &str) -> Candidate {
        Candidate {
            invocation: Invocation::bare(name),
            executable: path.to_path_buf(),
            source: CandidateSource::VersionedName,
        }
    }

    #[test]
    fn invocation_display_joins_prefix() {
        let inv = Invocation {
            program: "py".to_string(),
            prefix: vec!["-3.11".to_string()],
        };
        assert_eq!(inv.to_string(), "py -3.11");
    }

    #[test]
    fn invocation_parse_reads_display_form() {
        let inv = Invocation::parse("py -3.11\n").unwrap();
        assert_eq!(inv.program, "py");
        assert_eq!(inv.prefix, vec!["-3.11"]);

        let bare = Invocation::parse("python3.11").unwrap();
        assert_eq!(bare, Invocation::bare("python3.11"));
    }

    #[test]
    fn invocation_quotes_programs_with_spaces() {
        let inv = Invocation::bare(r"C:\Program Files\Python311\python.exe");
        let line = inv.to_string();
        assert!(line.starts_with('"'));
        assert_eq!(Invocation::parse(&line).unwrap(), inv);
    }

    #[test]
    fn invocation_parse_rejects_blank() {
        assert!(Invocation::parse("   \n").is_none());
    }

    #[cfg(unix)]
    #[test]
    fn probe_accepts_version_in_range() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("python3.11");
        create_fake_binary(&path, "echo 3.11.7");

        let req = ToolRequirement::python(default_python_range());
        let outcome = probe(&candidate(&path, "python3.11"), &req, &SystemRunner);
        let result = outcome.accepted().unwrap();
        assert_eq!(result.version, Version::new(3, 11, 7));
        assert_eq!(result.invocation.to_string(), "python3.11");
    }

    #[cfg(unix)]
    #[test]
    fn probe_rejects_version_above_max() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("python3.14");
        create_fake_binary(&path, "echo 3.14.0");

        let req = ToolRequirement::python(default_python_range());
        let outcome = probe(&candidate(&path, "python3.14"), &req, &SystemRunner);
        assert_eq!(
            outcome,
            ProbeOutcome::Rejected {
                version: Version::new(3, 14, 0)
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn probe_reads_version_from_stderr() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docker-compose");
        create_fake_binary(&path, "echo 'docker-compose version 2.20.2' >&2");

        let req = ToolRequirement::compose();
        let outcome = probe(&candidate(&path, "docker-compose"), &req, &SystemRunner);
        assert!(outcome.accepted().is_some());
    }

    #[test]
    fn probe_missing_executable_is_unavailable() {
        let req = ToolRequirement::python(VersionRange::at_least(3, 11));
        let outcome = probe(
            &candidate(Path::new("/nonexistent/python3.11"), "python3.11"),
            &req,
            &SystemRunner,
        );
        assert_eq!(outcome, ProbeOutcome::Unavailable);
    }

    #[cfg(unix)]
    #[test]
    fn probe_failing_command_is_unavailable() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("python3");
        create_fake_binary(&path, "echo 3.12.1; exit 1");

        let req = ToolRequirement::python(default_python_range());
        let outcome = probe(&candidate(&path, "python3"), &req, &SystemRunner);
        assert_eq!(outcome, ProbeOutcome::Unavailable);
    }

    #[cfg(unix)]
    #[test]
    fn probe_docker_without_daemon_is_not_ready() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docker");
        create_fake_binary(
            &path,
            "if [ \"$1\" = info ]; then exit 1; fi\necho 'Docker version 24.0.7, build afdd53b'",
        );

        let req = ToolRequirement::docker();
        let outcome = probe(&candidate(&path, "docker"), &req, &SystemRunner);
        assert_eq!(
            outcome,
            ProbeOutcome::NotReady {
                version: Version::new(24, 0, 7)
            }
        );
    }

    #[cfg(unix)]
    #[test]
    fn probe_passes_prefix_before_query() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("docker");
        create_fake_binary(
            &path,
            "if [ \"$1\" = compose ] && [ \"$2\" = version ]; then echo 'Docker Compose version v2.23.0'; exit 0; fi\nexit 1",
        );

        let req = ToolRequirement::compose();
        let candidate = Candidate {
            invocation: Invocation {
                program: "docker".to_string(),
                prefix: vec!["compose".to_string()],
            },
            executable: path,
            source: CandidateSource::Subcommand,
        };
        let result = probe(&candidate, &req, &SystemRunner).accepted().unwrap();
        assert_eq!(result.invocation.to_string(), "docker compose");
    }

    #[cfg(unix)]
    #[test]
    fn probing_twice_yields_equal_results() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("python3.12");
        create_fake_binary(&path, "echo 3.12.2");

        let req = ToolRequirement::python(default_python_range());
        let c = candidate(&path, "python3.12");
        assert_eq!(
            probe(&c, &req, &SystemRunner),
            probe(&c, &req, &SystemRunner)
        );
    }

    #[cfg(unix)]
    #[test]
    fn resolve_tool_path_finds_first_match() {
        let temp = TempDir::new().unwrap();
        let dir_a = temp.path().join("a");
        let dir_b = temp.path().join("b");
        create_fake_binary(&dir_a.join("python3"), "echo 3.11.0");
        create_fake_binary(&dir_b.join("python3"), "echo 3.12.0");

        let result = resolve_tool_path("python3", &[dir_a.clone(), dir_b.clone()]);
        assert_eq!(result, Some(dir_a.join("python3")));
    }

    #[test]
    fn resolve_tool_path_returns_none_when_not_found() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("empty");
        fs::create_dir_all(&dir).unwrap();

        let result = resolve_tool_path("python3", &[dir]);
        assert!(result.is_none());
    }

    #[cfg(unix)]
    #[test]
    fn resolve_tool_path_skips_non_executable() {
        let temp = TempDir::new().unwrap();
        let dir_a = temp.path().join("a");
        let dir_b = temp.path().join("b");

        create_non_executable_file(&dir_a.join("python3"));
        create_fake_binary(&dir_b.join("python3"), "echo 3.11.0");

        let result = resolve_tool_path("python3", &[dir_a.clone(), dir_b.clone()]);
        // Should skip non-executable in dir_a and find the one in dir_b
        assert_eq!(result, Some(dir_b.join("python3")));
    }

    #[test]
    fn is_executable_returns_false_for_nonexistent_file() {
        #[cfg(unix)]
        assert!(!is_executable(Path::new("/nonexistent/path/to/file")));
    }
}

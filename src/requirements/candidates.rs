//! Candidate enumeration.
//!
//! Turns a [`ToolRequirement`] into the ordered list of candidates worth
//! probing. Enumeration never runs anything: the only I/O is checking
//! whether a name exists on the search path, so calling it twice against
//! the same environment yields the same list.
//!
//! Priority order:
//!
//! 1. The caller's override, if it exists
//! 2. Version-specific names (`python3.11`, ...)
//! 3. Generic names (`python3`, `python`)
//! 4. Version-selecting launchers (`py -3.11`, Windows only)

use crate::environment::HostPlatform;
use crate::requirements::probe::{
    is_executable, parse_system_path, resolve_tool_path, Candidate, Invocation,
};
use crate::requirements::registry::{CandidateSource, ToolRequirement};
use std::path::{Path, PathBuf};

/// Directories searched for candidates.
///
/// `system` is the process PATH. `extra` holds well-known install
/// locations that installers write to but that may not be on this
/// process's PATH yet. A command found only in `extra` is exposed by full
/// path, since downstream tooling would not find it by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    system: Vec<PathBuf>,
    extra: Vec<PathBuf>,
}

/// Where a name was found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub path: PathBuf,
    pub on_system_path: bool,
}

impl SearchPath {
    /// The current PATH plus well-known install locations.
    pub fn discover() -> Self {
        Self::discover_with_env(|key: &str| std::env::var(key))
    }

    /// Discover with a custom env var lookup (for testing).
    pub fn discover_with_env<F>(env_fn: F) -> Self
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let extra = well_known_dirs(&env_fn)
            .into_iter()
            .filter(|dir| dir.is_dir())
            .collect();
        Self::from_dirs(parse_system_path()).with_extra(extra)
    }

    /// A search path made of exactly these directories.
    pub fn from_dirs(dirs: Vec<PathBuf>) -> Self {
        Self {
            system: dirs,
            extra: Vec::new(),
        }
    }

    /// Add fallback directories searched after the system PATH.
    pub fn with_extra(mut self, extra: Vec<PathBuf>) -> Self {
        for dir in extra {
            if !self.system.contains(&dir) && !self.extra.contains(&dir) {
                self.extra.push(dir);
            }
        }
        self
    }

    /// Find a command by name.
    pub fn locate(&self, name: &str) -> Option<Located> {
        if let Some(path) = resolve_tool_path(name, &self.system) {
            return Some(Located {
                path,
                on_system_path: true,
            });
        }
        resolve_tool_path(name, &self.extra).map(|path| Located {
            path,
            on_system_path: false,
        })
    }
}

/// Enumerate candidates for `requirement` in priority order.
///
/// Names missing from the search path are left out. An override that does
/// not exist is skipped with a warning so resolution falls through to the
/// standard list; it is still version-checked like any other candidate.
pub fn enumerate(
    requirement: &ToolRequirement,
    search: &SearchPath,
    platform: HostPlatform,
) -> Vec<Candidate> {
    let mut candidates = Vec::new();

    if let Some(override_path) = &requirement.override_path {
        match locate_override(override_path, search) {
            Some(candidate) => candidates.push(candidate),
            None => tracing::warn!(
                "{} override '{}' does not exist; trying standard candidates",
                requirement.name,
                override_path
            ),
        }
    }

    for spec in &requirement.candidates {
        if spec.windows_only && !platform.is_windows() {
            continue;
        }
        let Some(located) = search.locate(&spec.program) else {
            tracing::debug!("{} not found on search path", spec.program);
            continue;
        };
        let program = if located.on_system_path {
            spec.program.clone()
        } else {
            located.path.display().to_string()
        };
        candidates.push(Candidate {
            invocation: Invocation {
                program,
                prefix: spec.prefix.clone(),
            },
            executable: located.path,
            source: spec.source,
        });
    }

    candidates
}

fn locate_override(override_path: &str, search: &SearchPath) -> Option<Candidate> {
    let path = Path::new(override_path);
    let looks_like_path = path.is_absolute() || override_path.contains(['/', '\\']);

    if looks_like_path {
        // The pin outlives this working directory, so relative paths are
        // made absolute before they become an invocation.
        let path = std::path::absolute(path).ok()?;
        if path.is_file() && is_executable(&path) {
            return Some(Candidate {
                invocation: Invocation::bare(path.display().to_string()),
                executable: path,
                source: CandidateSource::Override,
            });
        }
        return None;
    }

    search.locate(override_path).map(|located| Candidate {
        invocation: Invocation::bare(if located.on_system_path {
            override_path.to_string()
        } else {
            located.path.display().to_string()
        }),
        executable: located.path,
        source: CandidateSource::Override,
    })
}

/// Install locations that may not be on PATH in the current process.
fn well_known_dirs<F>(env_fn: &F) -> Vec<PathBuf>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let mut dirs = Vec::new();

    if cfg!(target_os = "macos") {
        if cfg!(target_arch = "aarch64") {
            dirs.push(PathBuf::from("/opt/homebrew/bin"));
        } else {
            dirs.push(PathBuf::from("/usr/local/bin"));
        }
        dirs.push(PathBuf::from("/Applications/Docker.app/Contents/Resources/bin"));
    }

    if cfg!(target_os = "windows") {
        if let Ok(local) = env_fn("LOCALAPPDATA") {
            let python_root = PathBuf::from(local).join("Programs").join("Python");
            dirs.push(python_root.join("Launcher"));
            if let Ok(entries) = std::fs::read_dir(&python_root) {
                let mut versions: Vec<PathBuf> = entries
                    .filter_map(|e| e.ok())
                    .map(|e| e.path())
                    .filter(|p| {
                        p.file_name()
                            .and_then(|n| n.to_str())
                            .is_some_and(|n| n.starts_with("Python"))
                    })
                    .collect();
                versions.sort();
                dirs.extend(versions);
            }
        }
        if let Ok(program_files) = env_fn("ProgramFiles") {
            dirs.push(
                PathBuf::from(program_files)
                    .join("Docker")
                    .join("Docker")
                    .join("resources")
                    .join("bin"),
            );
        }
    }

    // Rancher Desktop links its CLIs here on every platform.
    let home = env_fn("HOME").or_else(|_| env_fn("USERPROFILE"));
    if let Ok(home) = home {
        dirs.push(PathBuf::from(home).join(".rd").join("bin"));
    }

    dirs
}

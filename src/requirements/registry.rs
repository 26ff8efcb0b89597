//! Built-in tool requirements.
//!
//! Defines which tools nbsetup knows how to resolve, which command names to
//! look for (in priority order), and how to ask each one for its version.

use crate::requirements::version::VersionRange;

/// Python snippet printing `major.minor.patch` on stdout.
pub const PYTHON_VERSION_QUERY: &str = "import sys; print('%d.%d.%d' % sys.version_info[:3])";

/// Oldest Docker engine/CLI accepted.
pub const DOCKER_MINIMUM: (u32, u32) = (20, 10);

/// Oldest Compose accepted.
pub const COMPOSE_MINIMUM: (u32, u32) = (2, 0);

/// The interpreter range supported by the notebook image.
pub fn default_python_range() -> VersionRange {
    // Constant bounds, always ordered.
    VersionRange::between((3, 11), (3, 13)).unwrap_or_else(|_| VersionRange::at_least(3, 11))
}

/// Where a candidate came from; also its priority class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateSource {
    /// Explicit path supplied by the caller.
    Override,
    /// A command name carrying the version (`python3.11`).
    VersionedName,
    /// A generic command name (`python3`, `python`, `docker`).
    GenericName,
    /// A launcher selecting the version by argument (`py -3.11`).
    Launcher,
    /// A tool exposed as a subcommand of another (`docker compose`).
    Subcommand,
}

/// One command form worth probing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateSpec {
    /// Command name looked up on the search path.
    pub program: String,
    /// Fixed arguments placed before any query arguments.
    pub prefix: Vec<String>,
    pub source: CandidateSource,
    /// Only considered on Windows hosts.
    pub windows_only: bool,
}

impl CandidateSpec {
    fn named(program: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            program: program.into(),
            prefix: Vec::new(),
            source,
            windows_only: false,
        }
    }
}

/// A tool that must be present at an acceptable version.
#[derive(Debug, Clone)]
pub struct ToolRequirement {
    /// Requirement name used in diagnostics (`python`, `docker`, `compose`).
    pub name: String,
    /// Candidate command forms in priority order.
    pub candidates: Vec<CandidateSpec>,
    /// Acceptable versions.
    pub range: VersionRange,
    /// Explicit path or command name that is tried before `candidates`.
    pub override_path: Option<String>,
    /// Arguments that make the tool report its version.
    pub version_query: Vec<String>,
    /// Arguments that must also exit 0 for the tool to count as usable.
    pub readiness: Option<Vec<String>>,
}

impl ToolRequirement {
    /// A Python interpreter within `range`.
    ///
    /// Candidates: `python3.X` for each series in the range, then `python3`,
    /// `python`, and on Windows the `py -3.X` launcher forms.
    pub fn python(range: VersionRange) -> Self {
        let series = range.series();
        let mut candidates: Vec<CandidateSpec> = series
            .iter()
            .map(|(major, minor)| {
                CandidateSpec::named(
                    format!("python{}.{}", major, minor),
                    CandidateSource::VersionedName,
                )
            })
            .collect();
        candidates.push(CandidateSpec::named("python3", CandidateSource::GenericName));
        candidates.push(CandidateSpec::named("python", CandidateSource::GenericName));
        candidates.extend(series.iter().map(|(major, minor)| CandidateSpec {
            program: "py".to_string(),
            prefix: vec![format!("-{}.{}", major, minor)],
            source: CandidateSource::Launcher,
            windows_only: true,
        }));

        Self {
            name: "python".to_string(),
            candidates,
            range,
            override_path: None,
            version_query: vec!["-c".to_string(), PYTHON_VERSION_QUERY.to_string()],
            readiness: None,
        }
    }

    /// The Docker CLI with a reachable daemon.
    pub fn docker() -> Self {
        Self {
            name: "docker".to_string(),
            candidates: vec![CandidateSpec::named("docker", CandidateSource::GenericName)],
            range: VersionRange::at_least(DOCKER_MINIMUM.0, DOCKER_MINIMUM.1),
            override_path: None,
            version_query: vec!["--version".to_string()],
            readiness: Some(vec!["info".to_string()]),
        }
    }

    /// Docker Compose, as the CLI plugin or the standalone binary.
    pub fn compose() -> Self {
        Self {
            name: "compose".to_string(),
            candidates: vec![
                CandidateSpec {
                    program: "docker".to_string(),
                    prefix: vec!["compose".to_string()],
                    source: CandidateSource::Subcommand,
                    windows_only: false,
                },
                CandidateSpec::named("docker-compose", CandidateSource::GenericName),
            ],
            range: VersionRange::at_least(COMPOSE_MINIMUM.0, COMPOSE_MINIMUM.1),
            override_path: None,
            version_query: vec!["version".to_string()],
            readiness: None,
        }
    }

    /// Try `path` before the built-in candidates.
    pub fn with_override(mut self, path: Option<String>) -> Self {
        self.override_path = path.filter(|p| !p.trim().is_empty());
        self
    }
}

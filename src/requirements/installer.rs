//! Installer dispatch.
//!
//! Picks exactly one install plan for the host platform and runs it as a
//! sequence of opaque shell commands. The only thing observed is each
//! command's exit status: the first failure stops the plan and nothing is
//! rolled back. Whether the install actually worked is decided by the
//! resolver re-probing afterwards, never by the plan itself.

use crate::environment::HostPlatform;
use crate::error::{Result, SetupError};
use crate::requirements::version::VersionRange;
use crate::shell::CommandRunner;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Python builds with a Windows installer, by series.
const WINDOWS_PYTHON_BUILDS: &[((u32, u32), &str)] = &[
    ((3, 11), "3.11.9"),
    ((3, 12), "3.12.10"),
    ((3, 13), "3.13.3"),
];

/// Whether installs may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InstallPolicy {
    /// Run the install plan when nothing resolves.
    #[default]
    Enabled,
    /// Never install; an unresolved requirement fails.
    Disabled,
    /// Log the plan instead of running it, then fail.
    DryRun,
}

/// Container runtime backend to install when Docker is missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ContainerBackend {
    /// Native Docker engine (Linux).
    Engine,
    /// Rancher Desktop (macOS, Windows).
    Rancher,
    /// Colima VM with the Docker CLI (macOS).
    Colima,
    /// Docker Desktop (macOS, Windows).
    Desktop,
}

impl ContainerBackend {
    /// All backends, in menu order.
    pub const ALL: [ContainerBackend; 4] = [
        ContainerBackend::Engine,
        ContainerBackend::Rancher,
        ContainerBackend::Colima,
        ContainerBackend::Desktop,
    ];

    /// Backend used when nothing else chose one.
    pub fn default_for(platform: HostPlatform) -> Self {
        match platform {
            HostPlatform::Ubuntu | HostPlatform::Debian => ContainerBackend::Engine,
            HostPlatform::MacOS => ContainerBackend::Colima,
            HostPlatform::Windows => ContainerBackend::Desktop,
        }
    }

    /// Whether this backend has an install plan on `platform`.
    pub fn supports(&self, platform: HostPlatform) -> bool {
        match self {
            ContainerBackend::Engine => platform.is_linux(),
            ContainerBackend::Colima => platform == HostPlatform::MacOS,
            ContainerBackend::Rancher | ContainerBackend::Desktop => !platform.is_linux(),
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            ContainerBackend::Engine => "engine",
            ContainerBackend::Rancher => "rancher",
            ContainerBackend::Colima => "colima",
            ContainerBackend::Desktop => "desktop",
        }
    }

    /// Human-readable name for menus.
    pub fn label(&self) -> &'static str {
        match self {
            ContainerBackend::Engine => "Docker Engine",
            ContainerBackend::Rancher => "Rancher Desktop",
            ContainerBackend::Colima => "Colima",
            ContainerBackend::Desktop => "Docker Desktop",
        }
    }
}

impl fmt::Display for ContainerBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for ContainerBackend {
    type Err = SetupError;

    fn from_str(s: &str) -> Result<Self> {
        ContainerBackend::ALL
            .into_iter()
            .find(|b| b.id() == s.trim().to_lowercase())
            .ok_or_else(|| SetupError::MalformedInput {
                message: format!(
                    "unknown container backend '{}' (expected engine, rancher, colima or desktop)",
                    s
                ),
            })
    }
}

/// An ordered list of opaque shell commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// What the plan installs, for messages.
    pub description: String,
    pub commands: Vec<String>,
}

/// Install plan for a Python interpreter in `range` on `platform`.
///
/// The lowest series in the range is installed. `elevated` drops the
/// `sudo` prefix from privileged commands.
pub fn python_plan(
    platform: HostPlatform,
    range: &VersionRange,
    elevated: bool,
) -> Result<InstallPlan> {
    let (major, minor) = range.min();
    let series = format!("{}.{}", major, minor);
    let sudo = if elevated { "" } else { "sudo " };

    let commands = match platform {
        HostPlatform::Ubuntu => vec![
            format!("{}apt-get update", sudo),
            format!("{}apt-get install -y software-properties-common", sudo),
            format!("{}add-apt-repository -y ppa:deadsnakes/ppa", sudo),
            format!("{}apt-get update", sudo),
            format!(
                "{}apt-get install -y python{s} python{s}-venv python{s}-dev",
                sudo,
                s = series
            ),
        ],
        HostPlatform::Debian => vec![
            format!("{}apt-get update", sudo),
            format!("{}apt-get install -y python3 python3-venv python3-pip", sudo),
        ],
        HostPlatform::MacOS => vec![format!("brew install python@{}", series)],
        HostPlatform::Windows => {
            let build = WINDOWS_PYTHON_BUILDS
                .iter()
                .find(|(s, _)| *s == (major, minor))
                .map(|(_, build)| *build)
                .ok_or_else(|| SetupError::UnsupportedPlatform {
                    platform: platform.id().to_string(),
                    reason: format!("no Windows installer is pinned for Python {}", series),
                })?;
            let installer = format!("%TEMP%\\python-{}-amd64.exe", build);
            vec![
                format!(
                    "curl.exe -fsSL -o \"{}\" https://www.python.org/ftp/python/{b}/python-{b}-amd64.exe",
                    installer,
                    b = build
                ),
                format!(
                    "\"{}\" /quiet InstallAllUsers=0 PrependPath=1 Include_launcher=1",
                    installer
                ),
            ]
        }
    };

    Ok(InstallPlan {
        description: format!("Python {} for {}", series, platform),
        commands,
    })
}

/// Install plan for a Docker-compatible runtime via `backend`.
pub fn container_plan(
    platform: HostPlatform,
    backend: ContainerBackend,
    elevated: bool,
) -> Result<InstallPlan> {
    if !backend.supports(platform) {
        return Err(SetupError::UnsupportedPlatform {
            platform: platform.id().to_string(),
            reason: format!("{} is not available on this platform", backend.label()),
        });
    }
    let sudo = if elevated { "" } else { "sudo " };
    let winget = |id: &str| {
        format!(
            "winget install -e --id {} --silent --accept-source-agreements --accept-package-agreements",
            id
        )
    };

    let commands = match (platform, backend) {
        (_, ContainerBackend::Engine) => vec![
            "curl -fsSL https://get.docker.com -o /tmp/get-docker.sh".to_string(),
            format!("{}sh /tmp/get-docker.sh", sudo),
            format!("{}systemctl enable --now docker", sudo),
        ],
        (_, ContainerBackend::Colima) => vec![
            "brew install colima docker docker-compose".to_string(),
            "colima start".to_string(),
        ],
        (HostPlatform::MacOS, ContainerBackend::Rancher) => vec![
            "brew install --cask rancher".to_string(),
            "open -a 'Rancher Desktop'".to_string(),
        ],
        (HostPlatform::MacOS, ContainerBackend::Desktop) => vec![
            "brew install --cask docker".to_string(),
            "open -a Docker".to_string(),
        ],
        (_, ContainerBackend::Rancher) => vec![winget("SUSE.RancherDesktop")],
        (_, ContainerBackend::Desktop) => vec![winget("Docker.DockerDesktop")],
    };

    Ok(InstallPlan {
        description: format!("{} for {}", backend.label(), platform),
        commands,
    })
}

/// Run every command of `plan` in order, stopping at the first failure.
pub fn run_plan(plan: &InstallPlan, runner: &dyn CommandRunner) -> Result<()> {
    tracing::info!("Installing {}", plan.description);
    for command in &plan.commands {
        tracing::info!("Running: {}", command);
        let result = runner.run_shell(command)?;
        if !result.success {
            return Err(SetupError::ExternalToolFailure {
                command: command.clone(),
                code: result.exit_code,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::registry::default_python_range;
    use crate::shell::CommandResult;
    use std::cell::RefCell;
    use std::path::Path;
    use std::time::Duration;

    /// Records shell commands and fails the one at `fail_at`.
    struct ScriptedRunner {
        fail_at: Option<usize>,
        ran: RefCell<Vec<String>>,
    }

    impl CommandRunner for ScriptedRunner {
        fn capture(&self, _program: &Path, _args: &[String]) -> std::io::Result<CommandResult> {
            Err(std::io::Error::from(std::io::ErrorKind::NotFound))
        }

        fn run(&self, _program: &Path, _args: &[String]) -> Result<CommandResult> {
            unreachable!("install plans only run shell commands")
        }

        fn run_shell(&self, command: &str) -> Result<CommandResult> {
            let index = self.ran.borrow().len();
            self.ran.borrow_mut().push(command.to_string());
            if self.fail_at == Some(index) {
                Ok(CommandResult::failure(
                    Some(100),
                    String::new(),
                    String::new(),
                    Duration::ZERO,
                ))
            } else {
                Ok(CommandResult::success(
                    String::new(),
                    String::new(),
                    Duration::ZERO,
                ))
            }
        }
    }

    #[test]
    fn ubuntu_python_plan_uses_deadsnakes() {
        let plan = python_plan(HostPlatform::Ubuntu, &default_python_range(), false).unwrap();
        assert!(plan.commands.iter().any(|c| c.contains("ppa:deadsnakes/ppa")));
        assert!(plan
            .commands
            .last()
            .unwrap()
            .contains("python3.11 python3.11-venv"));
        assert!(plan.commands.iter().all(|c| c.starts_with("sudo ")));
    }

    #[test]
    fn elevated_plan_drops_sudo() {
        let plan = python_plan(HostPlatform::Debian, &default_python_range(), true).unwrap();
        assert!(plan.commands.iter().all(|c| !c.contains("sudo")));
    }

    #[test]
    fn macos_python_plan_uses_homebrew() {
        let plan = python_plan(HostPlatform::MacOS, &default_python_range(), false).unwrap();
        assert_eq!(plan.commands, vec!["brew install python@3.11"]);
    }

    #[test]
    fn windows_python_plan_runs_silent_installer() {
        let plan = python_plan(HostPlatform::Windows, &default_python_range(), false).unwrap();
        assert!(plan.commands[0].contains("python-3.11.9-amd64.exe"));
        assert!(plan.commands[1].contains("/quiet"));
        assert!(plan.commands[1].contains("PrependPath=1"));
    }

    #[test]
    fn windows_python_plan_requires_pinned_build() {
        let range = VersionRange::at_least(3, 9);
        let err = python_plan(HostPlatform::Windows, &range, false).unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn engine_backend_is_linux_only() {
        assert!(container_plan(HostPlatform::Ubuntu, ContainerBackend::Engine, false).is_ok());
        let err =
            container_plan(HostPlatform::MacOS, ContainerBackend::Engine, false).unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedPlatform { .. }));
    }

    #[test]
    fn colima_is_macos_only() {
        let plan = container_plan(HostPlatform::MacOS, ContainerBackend::Colima, false).unwrap();
        assert_eq!(plan.commands.last().unwrap(), "colima start");
        assert!(container_plan(HostPlatform::Windows, ContainerBackend::Colima, false).is_err());
    }

    #[test]
    fn windows_backends_use_winget() {
        let plan =
            container_plan(HostPlatform::Windows, ContainerBackend::Rancher, false).unwrap();
        assert!(plan.commands[0].contains("SUSE.RancherDesktop"));
        let plan =
            container_plan(HostPlatform::Windows, ContainerBackend::Desktop, false).unwrap();
        assert!(plan.commands[0].contains("Docker.DockerDesktop"));
    }

    #[test]
    fn every_platform_default_backend_is_supported() {
        for platform in [
            HostPlatform::Ubuntu,
            HostPlatform::Debian,
            HostPlatform::MacOS,
            HostPlatform::Windows,
        ] {
            assert!(ContainerBackend::default_for(platform).supports(platform));
        }
    }

    #[test]
    fn parses_backend_ids() {
        assert_eq!(
            "Colima".parse::<ContainerBackend>().unwrap(),
            ContainerBackend::Colima
        );
        assert!(matches!(
            "podman".parse::<ContainerBackend>(),
            Err(SetupError::MalformedInput { .. })
        ));
    }

    #[test]
    fn run_plan_runs_every_command_in_order() {
        let runner = ScriptedRunner {
            fail_at: None,
            ran: RefCell::new(Vec::new()),
        };
        let plan = python_plan(HostPlatform::Ubuntu, &default_python_range(), true).unwrap();
        run_plan(&plan, &runner).unwrap();
        assert_eq!(*runner.ran.borrow(), plan.commands);
    }

    #[test]
    fn run_plan_stops_at_first_failure() {
        let runner = ScriptedRunner {
            fail_at: Some(1),
            ran: RefCell::new(Vec::new()),
        };
        let plan = python_plan(HostPlatform::Ubuntu, &default_python_range(), true).unwrap();
        let err = run_plan(&plan, &runner).unwrap_err();
        match err {
            SetupError::ExternalToolFailure { command, code } => {
                assert_eq!(command, plan.commands[1]);
                assert_eq!(code, Some(100));
            }
            other => panic!("Expected ExternalToolFailure, got {:?}", other),
        }
        assert_eq!(runner.ran.borrow().len(), 2);
    }
}

//! Docker command implementation.
//!
//! `nbsetup docker` makes sure a Docker CLI with a running daemon and
//! Compose v2 are available, installing a container runtime if not.
//! Nothing is persisted.

use std::path::{Path, PathBuf};

use crate::cli::args::{DockerArgs, SetupOptions};
use crate::config::load_config;
use crate::environment::HostPlatform;
use crate::error::Result;
use crate::requirements::installer::container_plan;
use crate::requirements::{
    ContainerBackend, Resolver, ResolverContext, SearchPath, ToolRequirement,
};
use crate::shell::{is_elevated, SystemRunner};
use crate::ui::{Prompt, PromptOption, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The docker command implementation.
pub struct DockerCommand {
    install_root: PathBuf,
    options: SetupOptions,
    backend: Option<ContainerBackend>,
}

impl DockerCommand {
    /// Create a new docker command.
    pub fn new(install_root: &Path, options: SetupOptions, args: &DockerArgs) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
            options,
            backend: args.backend,
        }
    }
}

impl Command for DockerCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.install_root)?;
        let platform = HostPlatform::resolve(self.options.platform.as_deref())?;
        tracing::debug!("Host platform: {}", platform);

        let explicit = self.backend.or(config.docker.backend);
        if let Some(backend) = explicit {
            // Reject an unavailable backend before probing anything.
            container_plan(platform, backend, is_elevated())?;
        }

        let requirements = [ToolRequirement::docker(), ToolRequirement::compose()];
        let runner = SystemRunner;
        let mut resolver = Resolver::new(ResolverContext {
            runner: &runner,
            search_path: &SearchPath::discover,
            platform,
            policy: self.options.policy,
        });

        ui.message("Looking for a Docker runtime");
        let backend = match explicit {
            Some(backend) => backend,
            None if ui.is_interactive()
                && requirements.iter().any(|r| resolver.find(r).is_none()) =>
            {
                choose_backend(ui, platform)?
            }
            None => ContainerBackend::default_for(platform),
        };
        let plan = container_plan(platform, backend, is_elevated())?;

        let resolved = resolver.resolve_all(&requirements, Some(&plan))?;
        for (requirement, result) in requirements.iter().zip(&resolved.results) {
            ui.success(&format!(
                "{} {} ({})",
                requirement.name, result.version, result.invocation
            ));
            if ui.output_mode().shows_details() {
                ui.message(&format!("  Executable: {}", result.executable.display()));
            }
        }
        if resolved.installed {
            ui.message(&format!("Installed {}", backend.label()));
        }

        Ok(CommandResult::success())
    }
}

/// Ask which backend to install, offering only those available on `platform`.
pub fn choose_backend(
    ui: &mut dyn UserInterface,
    platform: HostPlatform,
) -> Result<ContainerBackend> {
    let options = ContainerBackend::ALL
        .into_iter()
        .filter(|b| b.supports(platform))
        .map(|b| PromptOption {
            label: b.label().to_string(),
            value: b.id().to_string(),
        })
        .collect();
    let prompt = Prompt {
        key: "backend".to_string(),
        question: "No Docker runtime found. Which one should be installed?".to_string(),
        options,
        default: Some(ContainerBackend::default_for(platform).id().to_string()),
    };
    ui.prompt(&prompt)?.parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SetupError;
    use crate::ui::MockUI;

    #[test]
    fn choose_backend_uses_answer() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("backend", "rancher");
        assert_eq!(
            choose_backend(&mut ui, HostPlatform::MacOS).unwrap(),
            ContainerBackend::Rancher
        );
    }

    #[test]
    fn choose_backend_defaults_per_platform() {
        let mut ui = MockUI::new();
        assert_eq!(
            choose_backend(&mut ui, HostPlatform::Windows).unwrap(),
            ContainerBackend::Desktop
        );
        assert_eq!(
            choose_backend(&mut ui, HostPlatform::Ubuntu).unwrap(),
            ContainerBackend::Engine
        );
    }

    #[test]
    fn choose_backend_rejects_unknown_answer() {
        let mut ui = MockUI::new();
        ui.set_prompt_response("backend", "podman");
        assert!(matches!(
            choose_backend(&mut ui, HostPlatform::MacOS),
            Err(SetupError::MalformedInput { .. })
        ));
    }

    #[test]
    fn unavailable_backend_fails_before_probing() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = SetupOptions {
            platform: Some("windows".to_string()),
            ..Default::default()
        };
        let args = DockerArgs {
            backend: Some(ContainerBackend::Colima),
        };
        let mut ui = MockUI::new();

        let err = DockerCommand::new(temp.path(), options, &args)
            .execute(&mut ui)
            .unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedPlatform { .. }));
        assert!(ui.messages().is_empty());
    }

    #[test]
    fn unknown_platform_fails_before_probing() {
        let temp = tempfile::TempDir::new().unwrap();
        let options = SetupOptions {
            platform: Some("solaris".to_string()),
            ..Default::default()
        };
        let mut ui = MockUI::new();

        let err = DockerCommand::new(temp.path(), options, &DockerArgs::default())
            .execute(&mut ui)
            .unwrap_err();
        assert!(matches!(err, SetupError::UnsupportedPlatform { .. }));
    }
}

//! Python command implementation.
//!
//! `nbsetup` (or `nbsetup python`) resolves an interpreter, pins it in
//! `<install-root>/.python_cmd`, and optionally registers a Jupyter kernel
//! backed by it.

use std::path::{Path, PathBuf};

use crate::cli::args::SetupOptions;
use crate::config::{load_config, SetupConfig};
use crate::environment::HostPlatform;
use crate::error::Result;
use crate::kernel::{self, KernelSpec};
use crate::requirements::installer::python_plan;
use crate::requirements::{
    InstallPlan, InstallPolicy, ResolutionState, Resolver, ResolverContext, SearchPath,
    ToolRequirement,
};
use crate::shell::{is_elevated, SystemRunner};
use crate::state::{pin_path, write_once, PinOutcome, Resolution};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The python command implementation.
pub struct PythonCommand {
    install_root: PathBuf,
    options: SetupOptions,
}

impl PythonCommand {
    /// Create a new python command.
    pub fn new(install_root: &Path, options: SetupOptions) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
            options,
        }
    }

    /// Kernel to register: the `--kernel` flag, else the config file.
    fn kernel_spec(&self, config: &SetupConfig) -> Option<KernelSpec> {
        let display_name = self.options.kernel_display_name.clone();
        match (&self.options.kernel, &config.kernel) {
            (Some(name), _) => Some(KernelSpec::new(name.clone(), display_name)),
            (None, Some(kernel)) => Some(KernelSpec::new(
                kernel.name.clone(),
                display_name.or_else(|| kernel.display_name.clone()),
            )),
            (None, None) => None,
        }
    }
}

impl Command for PythonCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.install_root)?;
        let range = config.python_range()?;

        // Platform and install plan are settled before anything is probed,
        // so an unsupported host fails without side effects.
        let platform = HostPlatform::resolve(self.options.platform.as_deref())?;
        tracing::debug!("Host platform: {}", platform);
        let plan = python_plan(platform, &range, is_elevated())?;

        let requirement =
            ToolRequirement::python(range).with_override(self.options.python.clone());
        let kernel = self.kernel_spec(&config);

        ui.message(&format!("Looking for Python {}", requirement.range));
        let runner = SystemRunner;
        let ctx = ResolverContext {
            runner: &runner,
            search_path: &SearchPath::discover,
            platform,
            policy: self.options.policy,
        };
        let resolution = resolve_and_pin(&self.install_root, &requirement, &plan, ctx)?;
        report(ui, &self.install_root, &resolution);

        if let Some(spec) = kernel {
            if self.options.policy == InstallPolicy::DryRun {
                ui.message(&format!("Dry run: would register kernel '{}'", spec.name));
            } else {
                kernel::register(&resolution.probe, &spec, &runner)?;
                ui.success(&format!(
                    "Registered kernel '{}' ({})",
                    spec.name, spec.display_name
                ));
            }
        }

        Ok(CommandResult::success())
    }
}

/// Resolve `requirement` and pin the result under `install_root`.
///
/// Dry runs resolve but never write the pin.
pub fn resolve_and_pin(
    install_root: &Path,
    requirement: &ToolRequirement,
    plan: &InstallPlan,
    ctx: ResolverContext<'_>,
) -> Result<Resolution> {
    let policy = ctx.policy;
    let mut resolver = Resolver::new(ctx);
    let probe = resolver.resolve(requirement, Some(plan))?;
    let installed = resolver.history().contains(&ResolutionState::Installing);

    let pin = if policy == InstallPolicy::DryRun {
        None
    } else {
        Some(write_once(install_root, &probe.invocation)?)
    };

    Ok(Resolution {
        probe,
        installed,
        pin,
    })
}

fn report(ui: &mut dyn UserInterface, install_root: &Path, resolution: &Resolution) {
    let probe = &resolution.probe;
    let fresh = probe.invocation.to_string();

    match &resolution.pin {
        Some(PinOutcome::Written { path, line }) => ui.success(&format!(
            "Pinned {} (Python {}) in {}",
            line,
            probe.version,
            path.display()
        )),
        Some(PinOutcome::AlreadyPinned { path, existing }) if *existing != fresh => {
            ui.warning(&format!(
                "{} already pins '{}'; leaving it unchanged (found '{}')",
                path.display(),
                existing,
                fresh
            ))
        }
        Some(PinOutcome::AlreadyPinned { path, existing }) => ui.success(&format!(
            "{} is already pinned in {}",
            existing,
            path.display()
        )),
        None => ui.message(&format!(
            "Dry run: would pin {} (Python {}) in {}",
            fresh,
            probe.version,
            pin_path(install_root).display()
        )),
    }

    if ui.output_mode().shows_details() {
        ui.message(&format!("  Interpreter: {}", probe.executable.display()));
        if resolution.installed {
            ui.message("  Installed during this run");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::KernelConfig;
    use crate::requirements::default_python_range;
    use crate::requirements::{Invocation, ProbeResult, Version};
    use crate::ui::{MockUI, OutputMode};

    fn command(kernel: Option<&str>, display_name: Option<&str>) -> PythonCommand {
        PythonCommand::new(
            Path::new("/work"),
            SetupOptions {
                kernel: kernel.map(String::from),
                kernel_display_name: display_name.map(String::from),
                ..Default::default()
            },
        )
    }

    fn resolution(pin: Option<PinOutcome>) -> Resolution {
        Resolution {
            probe: ProbeResult {
                invocation: Invocation::bare("python3.11"),
                executable: PathBuf::from("/usr/bin/python3.11"),
                version: Version::new(3, 11, 9),
            },
            installed: false,
            pin,
        }
    }

    #[test]
    fn kernel_flag_wins_over_config() {
        let config = SetupConfig {
            kernel: Some(KernelConfig {
                name: "from-config".to_string(),
                display_name: Some("Config".to_string()),
            }),
            ..Default::default()
        };
        let spec = command(Some("from-flag"), None)
            .kernel_spec(&config)
            .unwrap();
        assert_eq!(spec.name, "from-flag");
        assert_eq!(spec.display_name, "Python (from-flag)");
    }

    #[test]
    fn kernel_from_config_keeps_its_display_name() {
        let config = SetupConfig {
            kernel: Some(KernelConfig {
                name: "watsonx-ai".to_string(),
                display_name: Some("Python (watsonx.ai)".to_string()),
            }),
            ..Default::default()
        };
        let spec = command(None, None).kernel_spec(&config).unwrap();
        assert_eq!(spec.display_name, "Python (watsonx.ai)");
    }

    #[test]
    fn no_kernel_configured() {
        assert!(command(None, None)
            .kernel_spec(&SetupConfig::default())
            .is_none());
    }

    #[test]
    fn report_warns_when_existing_pin_differs() {
        let mut ui = MockUI::new();
        let pin = PinOutcome::AlreadyPinned {
            path: PathBuf::from("/work/.python_cmd"),
            existing: "python3.12".to_string(),
        };
        report(&mut ui, Path::new("/work"), &resolution(Some(pin)));
        assert!(ui.has_warning("leaving it unchanged"));
        assert!(ui.successes().is_empty());
    }

    #[test]
    fn report_confirms_matching_pin() {
        let mut ui = MockUI::new();
        let pin = PinOutcome::AlreadyPinned {
            path: PathBuf::from("/work/.python_cmd"),
            existing: "python3.11".to_string(),
        };
        report(&mut ui, Path::new("/work"), &resolution(Some(pin)));
        assert!(ui.has_success("already pinned"));
    }

    #[test]
    fn report_details_in_verbose_mode() {
        let mut ui = MockUI::with_mode(OutputMode::Verbose);
        report(&mut ui, Path::new("/work"), &resolution(None));
        assert!(ui.has_message("Dry run: would pin python3.11"));
        assert!(ui.has_message("/usr/bin/python3.11"));
    }

    #[cfg(unix)]
    mod pinning {
        use super::*;
        use crate::shell::SystemRunner;
        use std::fs;
        use tempfile::TempDir;

        fn create_fake_binary(path: &Path, script: &str) {
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, format!("#!/bin/sh\n{}\n", script)).unwrap();
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
        }

        fn run(root: &Path, bin: &Path, policy: InstallPolicy) -> Result<Resolution> {
            let dirs = vec![bin.to_path_buf()];
            let search = move || SearchPath::from_dirs(dirs.clone());
            let requirement = ToolRequirement::python(default_python_range());
            let plan = python_plan(HostPlatform::Debian, &requirement.range, true)?;
            let ctx = ResolverContext {
                runner: &SystemRunner,
                search_path: &search,
                platform: HostPlatform::Debian,
                policy,
            };
            resolve_and_pin(root, &requirement, &plan, ctx)
        }

        #[test]
        fn first_run_writes_pin() {
            let temp = TempDir::new().unwrap();
            let bin = temp.path().join("bin");
            create_fake_binary(&bin.join("python3.11"), "echo 3.11.9");

            let resolution = run(temp.path(), &bin, InstallPolicy::Disabled).unwrap();
            assert!(!resolution.installed);
            assert!(matches!(resolution.pin, Some(PinOutcome::Written { .. })));
            assert_eq!(
                fs::read_to_string(temp.path().join(".python_cmd")).unwrap(),
                "python3.11\n"
            );
        }

        #[test]
        fn repeated_runs_are_idempotent() {
            let temp = TempDir::new().unwrap();
            let bin = temp.path().join("bin");
            create_fake_binary(&bin.join("python3.12"), "echo 3.12.1");

            let first = run(temp.path(), &bin, InstallPolicy::Disabled).unwrap();
            let before = fs::read(temp.path().join(".python_cmd")).unwrap();
            let second = run(temp.path(), &bin, InstallPolicy::Disabled).unwrap();

            assert_eq!(first.probe, second.probe);
            assert_eq!(fs::read(temp.path().join(".python_cmd")).unwrap(), before);
            assert!(matches!(
                second.pin,
                Some(PinOutcome::AlreadyPinned { .. })
            ));
        }

        #[test]
        fn dry_run_does_not_write_pin() {
            let temp = TempDir::new().unwrap();
            let bin = temp.path().join("bin");
            create_fake_binary(&bin.join("python3"), "echo 3.13.0");

            let resolution = run(temp.path(), &bin, InstallPolicy::DryRun).unwrap();
            assert!(resolution.pin.is_none());
            assert!(!temp.path().join(".python_cmd").exists());
        }

        #[test]
        fn unresolved_python_writes_nothing() {
            let temp = TempDir::new().unwrap();
            let bin = temp.path().join("bin");
            create_fake_binary(&bin.join("python3"), "echo 3.9.18");

            let err = run(temp.path(), &bin, InstallPolicy::Disabled).unwrap_err();
            assert_eq!(err.exit_code(), 1);
            assert!(!temp.path().join(".python_cmd").exists());
        }
    }
}

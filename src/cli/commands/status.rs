//! Status command implementation.
//!
//! `nbsetup status` reports the pinned interpreter and whether it still
//! satisfies the configured range. It never installs or writes anything.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Serialize;

use crate::cli::args::StatusArgs;
use crate::config::load_config;
use crate::error::Result;
use crate::requirements::probe::{probe, Candidate};
use crate::requirements::registry::CandidateSource;
use crate::requirements::{Invocation, SearchPath, ToolRequirement, VersionRange};
use crate::shell::{CommandRunner, SystemRunner};
use crate::state::{pin_path, read_pin};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The status command implementation.
pub struct StatusCommand {
    install_root: PathBuf,
    args: StatusArgs,
}

/// What `status` found, as printed by `--json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReport {
    pub pin_file: PathBuf,
    /// Pinned invocation, if the pin exists.
    pub pinned: Option<String>,
    /// Version the pinned invocation reports, if it runs.
    pub version: Option<String>,
    pub range: String,
    pub satisfied: bool,
}

impl StatusCommand {
    /// Create a new status command.
    pub fn new(install_root: &Path, args: StatusArgs) -> Self {
        Self {
            install_root: install_root.to_path_buf(),
            args,
        }
    }
}

impl Command for StatusCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let config = load_config(&self.install_root)?;
        let range = config.python_range()?;
        let report = inspect(
            &self.install_root,
            range,
            &SearchPath::discover(),
            &SystemRunner,
        )?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&report)
                .context("Failed to serialize status report")?;
            println!("{}", json);
        } else {
            show(ui, &report);
        }

        if report.satisfied {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}

/// Probe the pinned interpreter under `install_root` against `range`.
pub fn inspect(
    install_root: &Path,
    range: VersionRange,
    search: &SearchPath,
    runner: &dyn CommandRunner,
) -> Result<StatusReport> {
    let mut report = StatusReport {
        pin_file: pin_path(install_root),
        pinned: None,
        version: None,
        range: range.to_string(),
        satisfied: false,
    };
    let Some(invocation) = read_pin(install_root)? else {
        return Ok(report);
    };
    report.pinned = Some(invocation.to_string());

    let Some(executable) = locate_pinned(&invocation, install_root, search) else {
        tracing::debug!("Pinned '{}' is not on the search path", invocation);
        return Ok(report);
    };
    let candidate = Candidate {
        invocation,
        executable,
        source: CandidateSource::Override,
    };
    let requirement = ToolRequirement::python(range);
    let wide_open = ToolRequirement::python(VersionRange::at_least(0, 0));

    match probe(&candidate, &requirement, runner).accepted() {
        Some(result) => {
            report.version = Some(result.version.to_string());
            report.satisfied = true;
        }
        None => {
            // Still report what the pin runs, even when out of range.
            report.version = probe(&candidate, &wide_open, runner)
                .accepted()
                .map(|r| r.version.to_string());
        }
    }
    Ok(report)
}

/// Relative path pins are taken relative to the install root.
fn locate_pinned(
    invocation: &Invocation,
    install_root: &Path,
    search: &SearchPath,
) -> Option<PathBuf> {
    let path = Path::new(&invocation.program);
    if path.is_absolute() || invocation.program.contains(['/', '\\']) {
        let path = install_root.join(path);
        return path.is_file().then_some(path);
    }
    search.locate(&invocation.program).map(|l| l.path)
}

fn show(ui: &mut dyn UserInterface, report: &StatusReport) {
    ui.show_header("nbsetup status");
    match (&report.pinned, &report.version) {
        (None, _) => ui.warning(&format!(
            "No interpreter pinned ({} does not exist)",
            report.pin_file.display()
        )),
        (Some(pinned), None) => ui.error(&format!("Pinned '{}' does not run", pinned)),
        (Some(pinned), Some(version)) if report.satisfied => {
            ui.success(&format!("{} (Python {}) satisfies {}", pinned, version, report.range))
        }
        (Some(pinned), Some(version)) => ui.error(&format!(
            "{} reports Python {}, outside {}",
            pinned, version, report.range
        )),
    }
}

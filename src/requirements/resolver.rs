//! The resolution state machine.
//!
//! ```text
//! UNRESOLVED -> PROBING -> RESOLVED
//!                       -> INSTALLING -> PROBING -> RESOLVED
//!                                                -> FAILED
//!                       -> FAILED
//! ```
//!
//! The installer runs at most once per resolution. After it returns, the
//! search path is read again and every candidate is re-enumerated and
//! re-probed; the installer's exit status alone never counts as success.

use crate::environment::HostPlatform;
use crate::error::{Result, SetupError};
use crate::requirements::candidates::{enumerate, SearchPath};
use crate::requirements::installer::{run_plan, InstallPlan, InstallPolicy};
use crate::requirements::probe::{probe, ProbeOutcome, ProbeResult};
use crate::requirements::registry::{CandidateSource, ToolRequirement};
use crate::shell::CommandRunner;
use std::fmt;

/// Where a resolution currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionState {
    Unresolved,
    Probing,
    Installing,
    Resolved,
    Failed,
}

impl fmt::Display for ResolutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResolutionState::Unresolved => "UNRESOLVED",
            ResolutionState::Probing => "PROBING",
            ResolutionState::Installing => "INSTALLING",
            ResolutionState::Resolved => "RESOLVED",
            ResolutionState::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// Everything a resolver needs from the outside world.
pub struct ResolverContext<'a> {
    pub runner: &'a dyn CommandRunner,
    /// Called before every enumeration so a fresh install is picked up.
    pub search_path: &'a dyn Fn() -> SearchPath,
    pub platform: HostPlatform,
    pub policy: InstallPolicy,
}

/// Requirements resolved together, in the order they were given.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub results: Vec<ProbeResult>,
    /// Whether the install plan ran.
    pub installed: bool,
}

/// Drives one resolution through [`ResolutionState`].
pub struct Resolver<'a> {
    ctx: ResolverContext<'a>,
    state: ResolutionState,
    history: Vec<ResolutionState>,
}

impl<'a> Resolver<'a> {
    pub fn new(ctx: ResolverContext<'a>) -> Self {
        Self {
            ctx,
            state: ResolutionState::Unresolved,
            history: vec![ResolutionState::Unresolved],
        }
    }

    pub fn state(&self) -> ResolutionState {
        self.state
    }

    /// Every state visited, in order.
    pub fn history(&self) -> &[ResolutionState] {
        &self.history
    }

    /// Probe the current candidates for `requirement`; first success wins.
    pub fn find(&self, requirement: &ToolRequirement) -> Option<ProbeResult> {
        let search = (self.ctx.search_path)();
        for candidate in enumerate(requirement, &search, self.ctx.platform) {
            match probe(&candidate, requirement, self.ctx.runner) {
                ProbeOutcome::Accepted(result) => return Some(result),
                outcome if candidate.source == CandidateSource::Override => {
                    tracing::warn!(
                        "{} override '{}' is not usable ({}); trying standard candidates",
                        requirement.name,
                        candidate.invocation,
                        describe(&outcome, requirement)
                    );
                }
                ProbeOutcome::Rejected { version } => {
                    tracing::info!(
                        "Skipping {} {}: outside {}",
                        candidate.invocation,
                        version,
                        requirement.range
                    );
                }
                ProbeOutcome::NotReady { version } => {
                    tracing::warn!(
                        "{} {} is installed but not running",
                        candidate.invocation,
                        version
                    );
                }
                ProbeOutcome::Unavailable => {}
            }
        }
        None
    }

    /// Resolve a single requirement, installing with `plan` if needed.
    pub fn resolve(
        &mut self,
        requirement: &ToolRequirement,
        plan: Option<&InstallPlan>,
    ) -> Result<ProbeResult> {
        let mut resolved = self.resolve_all(std::slice::from_ref(requirement), plan)?;
        // resolve_all returns exactly one result per requirement
        resolved
            .results
            .pop()
            .ok_or_else(|| unmet(requirement))
    }

    /// Resolve several requirements that share one install plan.
    ///
    /// If any of them is missing, the plan runs once and all of them are
    /// probed again.
    pub fn resolve_all(
        &mut self,
        requirements: &[ToolRequirement],
        plan: Option<&InstallPlan>,
    ) -> Result<Resolved> {
        self.transition(ResolutionState::Probing);
        let found: Vec<Option<ProbeResult>> =
            requirements.iter().map(|req| self.find(req)).collect();

        let Some(missing) = first_missing(requirements, &found) else {
            self.transition(ResolutionState::Resolved);
            return Ok(Resolved {
                results: found.into_iter().flatten().collect(),
                installed: false,
            });
        };

        let plan = match (self.ctx.policy, plan) {
            (InstallPolicy::Enabled, Some(plan)) => plan,
            (InstallPolicy::DryRun, Some(plan)) => {
                tracing::info!("Dry run: would install {}", plan.description);
                for command in &plan.commands {
                    tracing::info!("Would run: {}", command);
                }
                return Err(self.fail(unmet(missing)));
            }
            (InstallPolicy::Disabled, _) => {
                tracing::debug!("Installation disabled; {} stays unresolved", missing.name);
                return Err(self.fail(unmet(missing)));
            }
            _ => return Err(self.fail(unmet(missing))),
        };

        self.transition(ResolutionState::Installing);
        if let Err(e) = run_plan(plan, self.ctx.runner) {
            return Err(self.fail(e));
        }

        self.transition(ResolutionState::Probing);
        let found: Vec<Option<ProbeResult>> =
            requirements.iter().map(|req| self.find(req)).collect();
        if let Some(missing) = first_missing(requirements, &found) {
            return Err(self.fail(SetupError::InstalledButUnresolved {
                requirement: missing.name.clone(),
                expected: missing.range.to_string(),
            }));
        }

        self.transition(ResolutionState::Resolved);
        Ok(Resolved {
            results: found.into_iter().flatten().collect(),
            installed: true,
        })
    }

    fn transition(&mut self, next: ResolutionState) {
        tracing::debug!("Resolution {} -> {}", self.state, next);
        self.state = next;
        self.history.push(next);
    }

    fn fail(&mut self, error: SetupError) -> SetupError {
        self.transition(ResolutionState::Failed);
        error
    }
}

fn first_missing<'r>(
    requirements: &'r [ToolRequirement],
    found: &[Option<ProbeResult>],
) -> Option<&'r ToolRequirement> {
    requirements
        .iter()
        .zip(found)
        .find(|(_, result)| result.is_none())
        .map(|(req, _)| req)
}

fn unmet(requirement: &ToolRequirement) -> SetupError {
    SetupError::RequirementUnmet {
        requirement: requirement.name.clone(),
        expected: requirement.range.to_string(),
    }
}

fn describe(outcome: &ProbeOutcome, requirement: &ToolRequirement) -> String {
    match outcome {
        ProbeOutcome::Accepted(result) => format!("accepted at {}", result.version),
        ProbeOutcome::Rejected { version } => {
            format!("version {} is outside {}", version, requirement.range)
        }
        ProbeOutcome::NotReady { version } => format!("version {} is not running", version),
        ProbeOutcome::Unavailable => "it did not report a version".to_string(),
    }
}

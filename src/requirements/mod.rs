//! Tool requirements and their resolution.
//!
//! # Modules
//!
//! - [`version`] - Version parsing and acceptable ranges
//! - [`registry`] - Built-in requirements (Python, Docker, Compose)
//! - [`candidates`] - Ordered candidate enumeration over a search path
//! - [`probe`] - Running a candidate and checking its version
//! - [`installer`] - Per-platform install plans
//! - [`resolver`] - The probe, install, re-probe state machine

pub mod candidates;
pub mod installer;
pub mod probe;
pub mod registry;
pub mod resolver;
pub mod version;

pub use candidates::SearchPath;
pub use installer::{ContainerBackend, InstallPlan, InstallPolicy};
pub use probe::{Invocation, ProbeResult};
pub use registry::{default_python_range, ToolRequirement};
pub use resolver::{Resolved, ResolutionState, Resolver, ResolverContext};
pub use version::{Version, VersionRange};

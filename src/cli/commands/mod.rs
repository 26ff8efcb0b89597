//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results. Commands are
//! routed by [`CommandDispatcher`]; running `nbsetup` with no subcommand
//! resolves Python.

pub mod completions;
pub mod dispatcher;
pub mod docker;
pub mod python;
pub mod status;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};

//! Command-line interface for nbsetup.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, CompletionsArgs, DockerArgs, SetupOptions, StatusArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};

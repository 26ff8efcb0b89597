//! Process execution and host process facts.

pub mod command;
pub mod platform;

pub use command::{display_command, CommandResult, CommandRunner, SystemRunner};
pub use platform::{is_ci, is_elevated};

//! Shell command execution and platform conventions.

pub mod command;
pub mod platform;

pub use command::{execute_captured, spawn_shell, CommandOptions, CommandResult, EnvMap};
pub use platform::{detect_shell, is_ci, Platform, ShellInfo};

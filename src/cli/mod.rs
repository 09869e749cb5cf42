//! Command-line interface.
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations and routing

pub mod args;
pub mod commands;

pub use args::{
    AgentArgs, CheckArgs, Cli, Commands, CompletionsArgs, EnvArgs, ExecArgs, ProjectCommands,
    QueryArgs, RunArgs, StatusArgs,
};
pub use commands::{Command, CommandContext, CommandOutcome, CommandRouter};

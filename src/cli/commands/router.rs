//! Command routing.
//!
//! - [`Command`] trait for implementing commands
//! - [`CommandOutcome`] for uniform result reporting
//! - [`CommandRouter`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands, ProjectCommands};
use crate::dispatch::{CommandDispatcher, TerminalSink};
use crate::error::Result;
use crate::ui::UserInterface;

use super::agent::AgentCommand;
use super::check::CheckCommand;
use super::completions::CompletionsCommand;
use super::env::EnvCommand;
use super::exec::ExecCommand;
use super::project::{
    ProjectAddCommand, ProjectListCommand, ProjectRemoveCommand, ProjectUseCommand,
};
use super::query::QueryCommand;
use super::run::RunCommand;
use super::status::StatusCommand;

/// Trait for command implementations.
///
/// Commands get the dispatcher, and through it the session, so the same
/// code runs against a real terminal or a recording one in tests.
pub trait Command {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome>;
}

/// Result of command execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandOutcome {
    pub success: bool,
    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandOutcome {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// What every command can reach.
pub struct CommandContext<T: TerminalSink> {
    pub dispatcher: CommandDispatcher<T>,
    /// Per-user FluxLoop directory (`$FLUXLOOP_HOME`).
    pub home: PathBuf,
}

impl<T: TerminalSink> CommandContext<T> {
    pub fn new(dispatcher: CommandDispatcher<T>, home: impl Into<PathBuf>) -> Self {
        Self {
            dispatcher,
            home: home.into(),
        }
    }

    pub fn home(&self) -> &Path {
        &self.home
    }
}

/// Routes CLI subcommands to their implementations.
pub struct CommandRouter<T: TerminalSink> {
    ctx: CommandContext<T>,
}

impl<T: TerminalSink> CommandRouter<T> {
    pub fn new(ctx: CommandContext<T>) -> Self {
        Self { ctx }
    }

    pub fn context(&self) -> &CommandContext<T> {
        &self.ctx
    }

    pub fn context_mut(&mut self) -> &mut CommandContext<T> {
        &mut self.ctx
    }

    pub fn into_context(self) -> CommandContext<T> {
        self.ctx
    }

    pub fn dispatch(&mut self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandOutcome> {
        let ctx = &mut self.ctx;
        match &cli.command {
            Commands::Env(args) => EnvCommand::new(args.clone()).execute(ctx, ui),
            Commands::Check(args) => CheckCommand::new(args.clone()).execute(ctx, ui),
            Commands::Run(args) => RunCommand::new(args.clone()).execute(ctx, ui),
            Commands::Exec(args) => ExecCommand::new(args.clone()).execute(ctx, ui),
            Commands::Query(args) => QueryCommand::new(args.clone()).execute(ctx, ui),
            Commands::Status(args) => StatusCommand::new(args.clone()).execute(ctx, ui),
            Commands::Agent(args) => AgentCommand::new(args.clone()).execute(ctx, ui),
            Commands::Project(ProjectCommands::Add(args)) => {
                ProjectAddCommand::new(args.clone()).execute(ctx, ui)
            }
            Commands::Project(ProjectCommands::List(args)) => {
                ProjectListCommand::new(args.clone()).execute(ctx, ui)
            }
            Commands::Project(ProjectCommands::Use(args)) => {
                ProjectUseCommand::new(args.clone()).execute(ctx, ui)
            }
            Commands::Project(ProjectCommands::Remove(args)) => {
                ProjectRemoveCommand::new(args.clone()).execute(ctx, ui)
            }
            Commands::Completions(args) => CompletionsCommand::new(args.clone()).execute(ctx, ui),
        }
    }
}

//! Run command implementation.
//!
//! `fluxloop-env run [ARGS...]` launches the FluxLoop CLI from the active
//! environment in this terminal.

use crate::cli::args::RunArgs;
use crate::dispatch::TerminalSink;
use crate::error::{FluxError, Result};
use crate::ui::UserInterface;

use super::project::pick_project;
use super::router::{Command, CommandContext, CommandOutcome};

pub struct RunCommand {
    args: RunArgs,
}

impl RunCommand {
    pub fn new(args: RunArgs) -> Self {
        Self { args }
    }
}

impl Command for RunCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let primary = ctx.dispatcher.session().tools().primary.clone();
        let cwd = self.args.cwd.as_deref();

        match ctx.dispatcher.launch_interactive(&primary, &self.args.args, cwd) {
            Ok(()) => Ok(CommandOutcome::success()),
            Err(FluxError::NoProjectSelected) => {
                ui.error(&FluxError::NoProjectSelected.to_string());
                if !ui.is_interactive() || !pick_project(ctx.dispatcher.session_mut(), ui)? {
                    return Ok(CommandOutcome::failure(1));
                }
                ctx.dispatcher
                    .launch_interactive(&primary, &self.args.args, cwd)?;
                Ok(CommandOutcome::success())
            }
            Err(e) => Err(e),
        }
    }
}

//! Shell completions generation.

use clap::CommandFactory;

use crate::cli::args::{Cli, CompletionsArgs};
use crate::dispatch::TerminalSink;
use crate::error::Result;
use crate::ui::UserInterface;

use super::router::{Command, CommandContext, CommandOutcome};

pub struct CompletionsCommand {
    args: CompletionsArgs,
}

impl CompletionsCommand {
    pub fn new(args: CompletionsArgs) -> Self {
        Self { args }
    }
}

impl Command for CompletionsCommand {
    fn execute<T: TerminalSink>(
        &self,
        _ctx: &mut CommandContext<T>,
        _ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let mut cmd = Cli::command();
        clap_complete::generate(
            self.args.shell,
            &mut cmd,
            "fluxloop-env",
            &mut std::io::stdout(),
        );
        Ok(CommandOutcome::success())
    }
}

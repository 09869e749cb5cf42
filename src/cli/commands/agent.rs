//! Agent command implementation.
//!
//! `fluxloop-env agent <FILE> [--lines A:B]` runs Flux Agent for a file.

use std::fs;

use crate::cli::args::AgentArgs;
use crate::dispatch::TerminalSink;
use crate::error::{FluxError, Result};
use crate::integration::{select_lines, FluxAgent, IntegrationService};
use crate::ui::UserInterface;

use super::router::{Command, CommandContext, CommandOutcome};

pub struct AgentCommand {
    args: AgentArgs,
}

impl AgentCommand {
    pub fn new(args: AgentArgs) -> Self {
        Self { args }
    }
}

impl Command for AgentCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let file = self
            .args
            .file
            .canonicalize()
            .unwrap_or_else(|_| self.args.file.clone());
        let selection = match self.args.lines {
            Some((start, end)) => Some(select_lines(&fs::read_to_string(&file)?, start, end)),
            None => None,
        };

        let settings = ctx.dispatcher.session().settings().clone();
        let mut service = IntegrationService::new(&mut ctx.dispatcher, ctx.home.clone());

        let mut spinner = ui.start_spinner("Flux Agent is analyzing the repository...");
        let suggestion = match FluxAgent::new(&settings).run(&mut service, &file, selection.as_deref())
        {
            Ok(suggestion) => {
                spinner.finish_success("Suggestion received");
                suggestion
            }
            Err(e) => {
                spinner.finish_error("Flux Agent failed");
                return Err(e);
            }
        };

        if self.args.json {
            let json = serde_json::to_string_pretty(&suggestion)
                .map_err(|e| FluxError::Other(e.into()))?;
            println!("{}", json);
        } else {
            ui.show_header(&suggestion.query);
            println!("{}", suggestion.answer);
        }
        Ok(CommandOutcome::success())
    }
}

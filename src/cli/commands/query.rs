//! Query command implementation.
//!
//! `fluxloop-env query <TEXT>` asks the FluxLoop documentation index.

use crate::cli::args::QueryArgs;
use crate::dispatch::TerminalSink;
use crate::error::Result;
use crate::integration::status::MCP_STATUS;
use crate::integration::{require, IntegrationService};
use crate::ui::UserInterface;

use super::router::{Command, CommandContext, CommandOutcome};

pub struct QueryCommand {
    args: QueryArgs,
}

impl QueryCommand {
    pub fn new(args: QueryArgs) -> Self {
        Self { args }
    }
}

impl Command for QueryCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let query = self.args.query();
        let mut service = IntegrationService::new(&mut ctx.dispatcher, ctx.home.clone());

        let statuses = service.refresh_status();
        require(
            &statuses,
            MCP_STATUS,
            "fluxloop-mcp package is not installed. Install it before running a knowledge search.",
        )?;

        let mut spinner = ui.start_spinner("Searching FluxLoop knowledge base...");
        match service.knowledge_search(&query) {
            Ok(answer) => {
                spinner.finish_success("Answer received");
                ui.show_header(&format!("Q: {}", query));
                // printed in every output mode
                println!("{}", answer);
                Ok(CommandOutcome::success())
            }
            Err(e) => {
                spinner.finish_error("Knowledge search failed");
                Err(e)
            }
        }
    }
}

//! Status command implementation.
//!
//! `fluxloop-env status` checks the FluxLoop CLI, python, the MCP package
//! and the documentation index.

use crate::cli::args::StatusArgs;
use crate::dispatch::TerminalSink;
use crate::error::{FluxError, Result};
use crate::integration::{IntegrationService, StatusState, SystemStatus};
use crate::ui::UserInterface;

use super::router::{Command, CommandContext, CommandOutcome};

pub struct StatusCommand {
    args: StatusArgs,
}

impl StatusCommand {
    pub fn new(args: StatusArgs) -> Self {
        Self { args }
    }
}

pub(crate) fn show_statuses(ui: &mut dyn UserInterface, statuses: &[SystemStatus]) {
    ui.show_header("FluxLoop Status");
    for status in statuses {
        let line = format!("{}: {}", status.label, status.description);
        match status.state {
            StatusState::Ok => ui.success(&line),
            StatusState::Warn => ui.warning(&line),
        }
    }
}

impl Command for StatusCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let mut spinner = ui.start_spinner("Checking FluxLoop tools...");
        let statuses = IntegrationService::new(&mut ctx.dispatcher, ctx.home.clone()).refresh_status();
        spinner.finish_success("Checked FluxLoop tools");

        if self.args.json {
            let json = serde_json::to_string_pretty(&statuses)
                .map_err(|e| FluxError::Other(e.into()))?;
            println!("{}", json);
        } else {
            show_statuses(ui, &statuses);
        }
        Ok(CommandOutcome::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::status::{CLI_STATUS, INDEX_STATUS};
    use crate::ui::MockUI;

    #[test]
    fn show_statuses_splits_by_state() {
        let statuses = vec![
            SystemStatus::new(CLI_STATUS, "FluxLoop CLI", StatusState::Ok, "Installed"),
            SystemStatus::new(
                INDEX_STATUS,
                "MCP Index",
                StatusState::Warn,
                "Index missing. Run scripts/rebuild_index.sh to build it.",
            ),
        ];
        let mut ui = MockUI::new();
        show_statuses(&mut ui, &statuses);

        assert!(ui.has_success("FluxLoop CLI: Installed"));
        assert!(ui.has_warning("MCP Index: Index missing."));
    }
}

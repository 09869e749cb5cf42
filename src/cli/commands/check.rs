//! Check command implementation.
//!
//! `fluxloop-env check [PATH]` reports whether a directory has a usable
//! local FluxLoop environment.

use crate::cli::args::CheckArgs;
use crate::dispatch::TerminalSink;
use crate::environment::{resolve_target_root, EnvironmentCheck};
use crate::error::{FluxError, Result};
use crate::ui::UserInterface;

use super::router::{Command, CommandContext, CommandOutcome};

pub struct CheckCommand {
    args: CheckArgs,
}

impl CheckCommand {
    pub fn new(args: CheckArgs) -> Self {
        Self { args }
    }
}

fn show_check(ui: &mut dyn UserInterface, check: &EnvironmentCheck) {
    ui.show_header("FluxLoop Environment Check");
    ui.key_value("Directory", &check.root.display().to_string());
    ui.key_value("Kind", &check.kind.to_string());

    for (label, path) in [
        ("Python", &check.python_path),
        ("CLI", &check.primary_tool_path),
        ("MCP", &check.auxiliary_tool_path),
    ] {
        let value = path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "missing".to_string());
        ui.key_value(label, &value);
    }

    for note in &check.notes {
        ui.warning(note);
    }
    if check.is_ready() {
        ui.success("Environment is ready.");
    } else {
        ui.error(&format!("Missing: {}", check.missing.join(", ")));
    }
}

impl Command for CheckCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let session = ctx.dispatcher.session();
        let root = match &self.args.path {
            Some(path) => path.clone(),
            None => resolve_target_root(&session.view()).ok_or(FluxError::NoProjectSelected)?,
        };

        let check = session.check_environment(&root);
        if self.args.json {
            let json = serde_json::to_string_pretty(&check)
                .map_err(|e| FluxError::Other(e.into()))?;
            println!("{}", json);
        } else {
            show_check(ui, &check);
        }

        if check.is_ready() {
            Ok(CommandOutcome::success())
        } else {
            Ok(CommandOutcome::failure(1))
        }
    }
}

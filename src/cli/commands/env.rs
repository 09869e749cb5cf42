//! Env command implementation.
//!
//! `fluxloop-env env` shows the active execution environment.

use crate::cli::args::EnvArgs;
use crate::dispatch::TerminalSink;
use crate::environment::{EnvironmentDescriptor, ExecutableSlot, ToolSet};
use crate::error::{FluxError, Result};
use crate::ui::UserInterface;

use super::router::{Command, CommandContext, CommandOutcome};

pub struct EnvCommand {
    args: EnvArgs,
}

impl EnvCommand {
    pub fn new(args: EnvArgs) -> Self {
        Self { args }
    }
}

fn display_path(descriptor: &EnvironmentDescriptor, slot: ExecutableSlot) -> String {
    descriptor
        .path(slot)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "not found".to_string())
}

/// Human-readable block for a descriptor.
pub(crate) fn show_descriptor(
    ui: &mut dyn UserInterface,
    descriptor: &EnvironmentDescriptor,
    tools: &ToolSet,
) {
    ui.show_header("FluxLoop Environment");
    ui.key_value("Source root", &descriptor.root().display().to_string());
    ui.key_value("Kind", &descriptor.kind().to_string());
    if let Some(dir) = descriptor.environment_dir() {
        ui.key_value("Environment", &dir.display().to_string());
    }
    ui.key_value("Python", &display_path(descriptor, ExecutableSlot::Python));
    ui.key_value(
        &tools.name_of(ExecutableSlot::PrimaryTool).to_string(),
        &display_path(descriptor, ExecutableSlot::PrimaryTool),
    );
    ui.key_value(
        &tools.name_of(ExecutableSlot::AuxiliaryTool).to_string(),
        &display_path(descriptor, ExecutableSlot::AuxiliaryTool),
    );
    for note in descriptor.notes() {
        ui.warning(note);
    }
}

impl Command for EnvCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let session = ctx.dispatcher.session_mut();
        let Some(descriptor) = session.environment(self.args.refresh) else {
            if self.args.json {
                println!("null");
            }
            ui.error("No FluxLoop project or source root detected.");
            return Ok(CommandOutcome::failure(2));
        };

        if self.args.json {
            let json = serde_json::to_string_pretty(descriptor.as_ref())
                .map_err(|e| FluxError::Other(e.into()))?;
            println!("{}", json);
        } else {
            show_descriptor(ui, &descriptor, session.tools());
        }
        Ok(CommandOutcome::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands::testing::context;
    use crate::environment::probe::testing::create_fake_binary;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    #[test]
    fn shows_resolved_environment() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().join("ws");
        create_fake_binary(&ws.join(".venv/bin/python"));

        let mut ctx = context(&temp, vec![ws.clone()]);
        let mut ui = MockUI::new();
        let outcome = EnvCommand::new(EnvArgs::default())
            .execute(&mut ctx, &mut ui)
            .unwrap();

        assert!(outcome.success);
        assert_eq!(ui.value_of("Kind"), Some("venv"));
        assert_eq!(
            ui.value_of("Python"),
            Some(ws.join(".venv/bin/python").display().to_string().as_str())
        );
        assert_eq!(ui.value_of("fluxloop"), Some("not found"));
    }

    #[test]
    fn missing_root_is_a_failure() {
        let temp = TempDir::new().unwrap();
        let mut ctx = context(&temp, Vec::new());
        let mut ui = MockUI::new();
        let outcome = EnvCommand::new(EnvArgs::default())
            .execute(&mut ctx, &mut ui)
            .unwrap();

        assert_eq!(outcome.exit_code, 2);
        assert!(ui.has_error("No FluxLoop project or source root detected."));
    }
}

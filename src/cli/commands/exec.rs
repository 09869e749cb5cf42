//! Exec command implementation.
//!
//! `fluxloop-env exec <COMMAND> [ARGS...]` runs a logical command through
//! the active environment, waits for it, and relays its output.

use std::io::Write;

use crate::cli::args::ExecArgs;
use crate::dispatch::{CommandRunner, TerminalSink};
use crate::error::Result;
use crate::ui::UserInterface;

use super::router::{Command, CommandContext, CommandOutcome};

pub struct ExecCommand {
    args: ExecArgs,
}

impl ExecCommand {
    pub fn new(args: ExecArgs) -> Self {
        Self { args }
    }
}

impl Command for ExecCommand {
    fn execute<T: TerminalSink>(
        &self,
        ctx: &mut CommandContext<T>,
        ui: &mut dyn UserInterface,
    ) -> Result<CommandOutcome> {
        let result = ctx.dispatcher.run_captured(
            &self.args.command,
            &self.args.args,
            self.args.cwd.as_deref(),
        );

        std::io::stdout().write_all(result.stdout.as_bytes())?;
        std::io::stderr().write_all(result.stderr.as_bytes())?;

        if result.success {
            Ok(CommandOutcome::success())
        } else {
            if result.exit_code.is_none() {
                ui.error(&format!("{} could not be run", self.args.command));
            }
            Ok(CommandOutcome::failure(result.exit_code.unwrap_or(1)))
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::cli::commands::testing::context;
    use crate::ui::MockUI;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn relays_exit_code() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().join("ws");
        fs::create_dir_all(&ws).unwrap();

        let mut ctx = context(&temp, vec![ws]);
        let mut ui = MockUI::new();
        let outcome = ExecCommand::new(ExecArgs {
            cwd: None,
            command: "sh".to_string(),
            args: vec!["-c".to_string(), "exit 4".to_string()],
        })
        .execute(&mut ctx, &mut ui)
        .unwrap();

        assert_eq!(outcome.exit_code, 4);
        assert!(ui.errors().is_empty());
    }

    #[test]
    fn spawn_failure_is_reported() {
        let temp = TempDir::new().unwrap();
        let ws = temp.path().join("ws");
        fs::create_dir_all(&ws).unwrap();

        let mut ctx = context(&temp, vec![ws]);
        let mut ui = MockUI::new();
        let outcome = ExecCommand::new(ExecArgs {
            cwd: None,
            command: "fluxloop-definitely-missing".to_string(),
            args: Vec::new(),
        })
        .execute(&mut ctx, &mut ui)
        .unwrap();

        assert_eq!(outcome.exit_code, 1);
        assert!(ui.has_error("could not be run"));
    }
}

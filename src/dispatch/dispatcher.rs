//! Logical command dispatch.
//!
//! A logical command name (`fluxloop`, `fluxloop-mcp`, `python3`, or any
//! other program) is mapped onto the active environment's executable and
//! started either interactively or captured.

use std::path::{Path, PathBuf};

use super::env::{process_env, snapshot};
use super::quoting::build_command_line;
use super::sink::{LaunchRequest, TerminalSink};
use crate::environment::{EnvironmentDescriptor, ToolSet};
use crate::error::{FluxError, Result};
use crate::session::Session;
use crate::shell::{execute_captured, CommandOptions, CommandResult, EnvMap};

/// Terminal label for interactive launches.
pub const TERMINAL_NAME: &str = "FluxLoop";

/// Path of the descriptor's executable for a logical command, if the
/// command names one of the interpreter, the primary tool or the
/// auxiliary tool.
pub fn resolve_executable_path(
    descriptor: &EnvironmentDescriptor,
    tools: &ToolSet,
    command: &str,
) -> Option<PathBuf> {
    let slot = tools.slot_for(command)?;
    descriptor.path(slot).map(Path::to_path_buf)
}

/// Runs a command to completion and captures its output.
///
/// Integration flows depend on this rather than on the dispatcher so they
/// can be exercised with canned results.
pub trait CommandRunner {
    fn run_captured(&mut self, name: &str, args: &[String], cwd: Option<&Path>) -> CommandResult;

    /// Directory commands run in by default, if any.
    fn workspace_path(&self) -> Option<PathBuf>;
}

/// Maps logical commands onto the session's environment.
pub struct CommandDispatcher<T: TerminalSink> {
    session: Session,
    terminal: T,
}

impl<T: TerminalSink> CommandDispatcher<T> {
    pub fn new(session: Session, terminal: T) -> Self {
        Self { session, terminal }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn terminal(&self) -> &T {
        &self.terminal
    }

    pub fn terminal_mut(&mut self) -> &mut T {
        &mut self.terminal
    }

    /// Working directory for a command.
    ///
    /// Order: `explicit`, the active project's workspace path, the first
    /// workspace folder.
    pub fn resolve_cwd(&self, explicit: Option<&Path>) -> Result<PathBuf> {
        if let Some(cwd) = explicit {
            return Ok(cwd.to_path_buf());
        }
        if let Some(project) = self.session.active_project() {
            return Ok(project.workspace_path());
        }
        self.session
            .folders()
            .first()
            .cloned()
            .ok_or(FluxError::NoProjectSelected)
    }

    /// Executable for a logical command.
    ///
    /// Falls back to the name itself, left for the shell to find on PATH.
    pub fn resolve_command(&mut self, name: &str) -> String {
        let environment = self.session.environment(false);
        let resolved = environment
            .as_deref()
            .and_then(|env| resolve_executable_path(env, self.session.tools(), name));

        match resolved {
            Some(path) => {
                tracing::debug!("Resolved {} to {}", name, path.display());
                path.to_string_lossy().into_owned()
            }
            None => {
                tracing::warn!(
                    "{} was not resolved from the active environment; using it unresolved",
                    name
                );
                name.to_string()
            }
        }
    }

    /// Environment for a dispatched process.
    pub fn process_env(&mut self) -> EnvMap {
        let environment = self.session.environment(false);
        process_env(
            snapshot(),
            environment.as_deref(),
            &self.session.settings().extra_env(),
            self.session.platform(),
        )
    }

    /// Assemble the interactive command line, including the wrapper.
    pub fn command_line(&mut self, name: &str, args: &[String]) -> String {
        let executable = self.resolve_command(name);
        build_command_line(
            &executable,
            args,
            self.session.settings().execution_wrapper(),
            self.session.platform(),
        )
    }

    /// Start a command in the terminal sink and return immediately.
    ///
    /// Fails with [`FluxError::NoProjectSelected`] when no working
    /// directory can be determined.
    pub fn launch_interactive(
        &mut self,
        name: &str,
        args: &[String],
        cwd: Option<&Path>,
    ) -> Result<()> {
        let cwd = self.resolve_cwd(cwd)?;
        let command_line = self.command_line(name, args);
        let env = self.process_env();

        tracing::info!("> {}", command_line);
        tracing::info!("Working directory: {}", cwd.display());
        if self.session.settings().show_output {
            println!("> {}", command_line);
        }

        self.terminal.launch(LaunchRequest {
            name: TERMINAL_NAME.to_string(),
            command_line,
            cwd,
            env,
        })
    }
}

impl<T: TerminalSink> CommandRunner for CommandDispatcher<T> {
    /// Run a command, wait for it, and capture its output.
    ///
    /// Never fails: a non-zero exit or a spawn failure is a failed result
    /// carrying stderr. Without a resolvable working directory the child
    /// inherits this process's.
    fn run_captured(&mut self, name: &str, args: &[String], cwd: Option<&Path>) -> CommandResult {
        let cwd = self.resolve_cwd(cwd).ok();
        let program = self.resolve_command(name);
        let env = self.process_env();

        tracing::info!("> {} {}", program, args.join(" "));
        let result = execute_captured(
            &program,
            args,
            &CommandOptions {
                cwd,
                env: Some(env),
            },
        );
        if !result.success {
            tracing::debug!(
                "{} exited with {:?}: {}",
                name,
                result.exit_code,
                result.stderr.trim()
            );
        }
        result
    }

    fn workspace_path(&self) -> Option<PathBuf> {
        self.resolve_cwd(None).ok()
    }
}

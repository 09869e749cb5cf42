//! Destinations for interactive launches.

use std::path::PathBuf;
use std::process::Child;

use crate::error::Result;
use crate::shell::{spawn_shell, CommandOptions, EnvMap};

/// Everything needed to start an interactive command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchRequest {
    /// Label for the terminal, e.g. `FluxLoop`.
    pub name: String,
    /// Complete, already quoted shell line.
    pub command_line: String,
    pub cwd: PathBuf,
    /// Complete environment for the child.
    pub env: EnvMap,
}

/// Accepts interactive launches without waiting for them to finish.
pub trait TerminalSink {
    fn launch(&mut self, request: LaunchRequest) -> Result<()>;
}

/// Runs launches in the platform shell attached to this terminal.
///
/// Children are kept so the CLI can wait for them before exiting.
#[derive(Debug, Default)]
pub struct ShellTerminal {
    children: Vec<(String, Child)>,
}

impl ShellTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of launched commands not yet waited for.
    pub fn pending(&self) -> usize {
        self.children.len()
    }

    /// Wait for every launched command. Returns whether all succeeded.
    pub fn wait_all(&mut self) -> Result<bool> {
        let mut all_ok = true;
        for (name, mut child) in self.children.drain(..) {
            let status = child.wait()?;
            tracing::debug!("{} exited with {}", name, status);
            all_ok &= status.success();
        }
        Ok(all_ok)
    }
}

impl TerminalSink for ShellTerminal {
    fn launch(&mut self, request: LaunchRequest) -> Result<()> {
        let options = CommandOptions {
            cwd: Some(request.cwd),
            env: Some(request.env),
        };
        let child = spawn_shell(&request.command_line, &options)?;
        self.children.push((request.name, child));
        Ok(())
    }
}

/// Keeps launch requests instead of running them.
#[derive(Debug, Default)]
pub struct RecordingTerminal {
    pub requests: Vec<LaunchRequest>,
}

impl TerminalSink for RecordingTerminal {
    fn launch(&mut self, request: LaunchRequest) -> Result<()> {
        self.requests.push(request);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(command_line: &str, cwd: PathBuf) -> LaunchRequest {
        LaunchRequest {
            name: "FluxLoop".to_string(),
            command_line: command_line.to_string(),
            cwd,
            env: std::env::vars_os().collect(),
        }
    }

    #[test]
    fn recording_terminal_keeps_requests() {
        let mut terminal = RecordingTerminal::default();
        terminal
            .launch(request("fluxloop status", PathBuf::from("/proj")))
            .unwrap();
        assert_eq!(terminal.requests.len(), 1);
        assert_eq!(terminal.requests[0].command_line, "fluxloop status");
    }

    #[cfg(unix)]
    #[test]
    fn shell_terminal_waits_for_children() {
        let temp = tempfile::TempDir::new().unwrap();
        let mut terminal = ShellTerminal::new();
        terminal
            .launch(request("exit 0", temp.path().to_path_buf()))
            .unwrap();
        terminal
            .launch(request("exit 3", temp.path().to_path_buf()))
            .unwrap();
        assert_eq!(terminal.pending(), 2);

        assert!(!terminal.wait_all().unwrap());
        assert_eq!(terminal.pending(), 0);
    }
}

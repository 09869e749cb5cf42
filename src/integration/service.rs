//! Status checks and tool invocations built on captured runs.

use serde_json::Value;
use std::path::{Path, PathBuf};

use super::status::{
    parse_python_version, StatusState, SystemStatus, CLI_STATUS, INDEX_STATUS, MCP_STATUS,
    PYTHON_STATUS,
};
use crate::dispatch::CommandRunner;
use crate::error::{FluxError, Result};

/// Name of the workflow invocation in error messages.
const WORKFLOW_TOOL: &str = "run_integration_workflow";

/// Python snippet that runs the auxiliary package's integration workflow
/// for `root` and prints the result as JSON.
fn workflow_script(root: &Path) -> String {
    let root = serde_json::to_string(&root.to_string_lossy()).unwrap_or_else(|_| "\".\"".into());
    format!(
        r#"
import json
import pathlib
import sys
from fluxloop_mcp.tools import RunIntegrationWorkflowTool

root_path = pathlib.Path({root}).resolve()
result = RunIntegrationWorkflowTool().run({{"root": root_path.as_posix()}})
json.dump(result, sys.stdout)
"#
    )
}

/// Integration flows over a [`CommandRunner`].
pub struct IntegrationService<'a, R: CommandRunner + ?Sized> {
    runner: &'a mut R,
    home: PathBuf,
}

impl<'a, R: CommandRunner + ?Sized> IntegrationService<'a, R> {
    /// `home` is the per-user FluxLoop directory holding the search index.
    pub fn new(runner: &'a mut R, home: impl Into<PathBuf>) -> Self {
        Self {
            runner,
            home: home.into(),
        }
    }

    /// Default documentation index location.
    pub fn index_dir(&self) -> PathBuf {
        self.home.join("mcp").join("index").join("dev")
    }

    /// Directory flows run in, if one can be determined.
    pub fn workspace_path(&self) -> Option<PathBuf> {
        self.runner.workspace_path()
    }

    /// Check the primary CLI, python, the auxiliary tool and the index.
    pub fn refresh_status(&mut self) -> Vec<SystemStatus> {
        let statuses = vec![
            self.check_cli(),
            self.check_python(),
            self.check_mcp(),
            self.check_index(),
        ];
        for status in &statuses {
            tracing::debug!("{}: {} ({})", status.id, status.state, status.description);
        }
        statuses
    }

    fn version(&mut self, command: &str) -> crate::shell::CommandResult {
        self.runner
            .run_captured(command, &["--version".to_string()], None)
    }

    fn check_cli(&mut self) -> SystemStatus {
        let result = self.version("fluxloop");
        if result.success {
            SystemStatus::new(CLI_STATUS, "FluxLoop CLI", StatusState::Ok, "Installed")
        } else {
            SystemStatus::new(
                CLI_STATUS,
                "FluxLoop CLI",
                StatusState::Warn,
                "Install required (pip install fluxloop-cli)",
            )
        }
    }

    fn check_python(&mut self) -> SystemStatus {
        let result = self.version("python3");
        if result.success {
            let description = parse_python_version(&result.stdout, &result.stderr)
                .unwrap_or_else(|| result.stdout.trim().to_string());
            SystemStatus::new(PYTHON_STATUS, "Python Environment", StatusState::Ok, description)
        } else {
            SystemStatus::new(
                PYTHON_STATUS,
                "Python Environment",
                StatusState::Warn,
                "python3 command not found.",
            )
        }
    }

    fn check_mcp(&mut self) -> SystemStatus {
        let result = self.version("fluxloop-mcp");
        if result.success {
            SystemStatus::new(
                MCP_STATUS,
                "fluxloop-mcp Package",
                StatusState::Ok,
                result.stdout.trim(),
            )
        } else {
            SystemStatus::new(
                MCP_STATUS,
                "fluxloop-mcp Package",
                StatusState::Warn,
                "fluxloop-mcp is not installed. Run \"pip install fluxloop-mcp\".",
            )
        }
    }

    fn check_index(&self) -> SystemStatus {
        if self.index_dir().exists() {
            SystemStatus::new(
                INDEX_STATUS,
                "MCP Index",
                StatusState::Ok,
                "Default index located.",
            )
        } else {
            SystemStatus::new(
                INDEX_STATUS,
                "MCP Index",
                StatusState::Warn,
                "Index missing. Run scripts/rebuild_index.sh to build it.",
            )
        }
    }

    /// Ask the documentation tool a question.
    pub fn knowledge_search(&mut self, query: &str) -> Result<String> {
        let args = vec!["--once".to_string(), "--query".to_string(), query.to_string()];
        let result = self.runner.run_captured("fluxloop-mcp", &args, None);

        if !result.success {
            let stderr = result.stderr.trim();
            return Err(FluxError::ToolFailed {
                tool: "fluxloop-mcp".to_string(),
                stderr: if stderr.is_empty() {
                    "Failed to retrieve MCP response.".to_string()
                } else {
                    stderr.to_string()
                },
            });
        }

        let answer = result.stdout.trim();
        if answer.is_empty() {
            Ok("No response returned.".to_string())
        } else {
            Ok(answer.to_string())
        }
    }

    /// Run the repository analysis workflow for `root` and parse its JSON.
    pub fn run_integration_workflow(&mut self, root: &Path) -> Result<Value> {
        let args = vec!["-c".to_string(), workflow_script(root)];
        let result = self.runner.run_captured("python3", &args, Some(root));

        if !result.success {
            let stderr = result.stderr.trim();
            return Err(FluxError::ToolFailed {
                tool: WORKFLOW_TOOL.to_string(),
                stderr: if stderr.is_empty() {
                    "Failed to execute integration workflow via fluxloop-mcp.".to_string()
                } else {
                    stderr.to_string()
                },
            });
        }

        serde_json::from_str(&result.stdout).map_err(|e| FluxError::MalformedToolOutput {
            tool: WORKFLOW_TOOL.to_string(),
            message: e.to_string(),
        })
    }
}

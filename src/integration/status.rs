//! Readiness of the tools integration flows depend on.

use regex::Regex;
use serde::Serialize;
use std::fmt;

use crate::error::{FluxError, Result};

pub const CLI_STATUS: &str = "fluxloop-cli";
pub const PYTHON_STATUS: &str = "python";
pub const MCP_STATUS: &str = "fluxloop-mcp";
pub const INDEX_STATUS: &str = "mcp-index";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusState {
    Ok,
    Warn,
}

impl fmt::Display for StatusState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusState::Ok => write!(f, "ok"),
            StatusState::Warn => write!(f, "warn"),
        }
    }
}

/// One line of the status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    pub id: String,
    pub label: String,
    pub state: StatusState,
    pub description: String,
}

impl SystemStatus {
    pub fn new(
        id: &str,
        label: &str,
        state: StatusState,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.to_string(),
            label: label.to_string(),
            state,
            description: description.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.state == StatusState::Ok
    }
}

/// Fail with [`FluxError::Prerequisite`] unless status `id` is ok.
pub fn require(statuses: &[SystemStatus], id: &str, message: &str) -> Result<()> {
    if statuses.iter().any(|s| s.id == id && s.is_ok()) {
        Ok(())
    } else {
        Err(FluxError::Prerequisite {
            message: message.to_string(),
        })
    }
}

/// Extract `Python X.Y[.Z]` from `--version` output.
///
/// Older interpreters print the version on stderr, so both streams are
/// searched.
pub fn parse_python_version(stdout: &str, stderr: &str) -> Option<String> {
    let pattern = Regex::new(r"Python\s+(\d+\.\d+(?:\.\d+)?)").ok()?;
    [stdout, stderr]
        .iter()
        .find_map(|text| pattern.captures(text))
        .map(|caps| format!("Python {}", &caps[1]))
}

//! Settings schema.
//!
//! Mirrors the `fluxloop.*` workspace settings of the editor integration.
//! All keys are optional; an empty file is a valid settings file.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default chat model used by Flux Agent.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default chat completion endpoint host.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Strategy used to pick an execution environment.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionMode {
    /// Prefer a local virtual environment, fall back to PATH.
    #[default]
    Auto,
    /// Like auto, but the result is always labelled as the workspace environment.
    Workspace,
    /// Ignore local environments and search PATH only.
    Global,
    /// Like auto, labelled custom, with configured overrides expected.
    Custom,
}

impl fmt::Display for ExecutionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExecutionMode::Auto => "auto",
            ExecutionMode::Workspace => "workspace",
            ExecutionMode::Global => "global",
            ExecutionMode::Custom => "custom",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for ExecutionMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "workspace" => Ok(Self::Workspace),
            "global" => Ok(Self::Global),
            "custom" => Ok(Self::Custom),
            other => Err(format!("unknown execution mode: {}", other)),
        }
    }
}

/// Settings whose change invalidates cached environments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchedSetting {
    TargetSourceRoot,
    ExecutionMode,
    PythonPath,
    McpCommandPath,
    CliPath,
}

impl WatchedSetting {
    /// All watched settings.
    pub const ALL: [WatchedSetting; 5] = [
        WatchedSetting::TargetSourceRoot,
        WatchedSetting::ExecutionMode,
        WatchedSetting::PythonPath,
        WatchedSetting::McpCommandPath,
        WatchedSetting::CliPath,
    ];

    /// The settings-file key.
    pub fn key(&self) -> &'static str {
        match self {
            WatchedSetting::TargetSourceRoot => "target_source_root",
            WatchedSetting::ExecutionMode => "execution_mode",
            WatchedSetting::PythonPath => "python_path",
            WatchedSetting::McpCommandPath => "mcp_command_path",
            WatchedSetting::CliPath => "cli_path",
        }
    }
}

/// Merged settings for a workspace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Environment resolution strategy.
    pub execution_mode: ExecutionMode,

    /// Explicit Python interpreter.
    pub python_path: Option<String>,

    /// Explicit auxiliary tool (`fluxloop-mcp`) executable.
    pub mcp_command_path: Option<String>,

    /// Explicit primary CLI (`fluxloop`) executable.
    pub cli_path: Option<String>,

    /// Directory to search for environments, relative to the project.
    pub target_source_root: Option<String>,

    /// Echo dispatched command lines to stdout as well as the log.
    pub show_output: bool,

    /// Prefix prepended to every interactive command line.
    pub execution_wrapper: Option<String>,

    /// Exported as `FLUXLOOP_COLLECTOR_URL`.
    pub collector_url: Option<String>,

    /// Exported as `FLUXLOOP_API_KEY`.
    pub api_key: Option<String>,

    pub openai_model: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,
}

/// Trimmed, non-empty view of an optional string setting.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn expand_path(value: &str) -> PathBuf {
    PathBuf::from(shellexpand::tilde(value).into_owned())
}

impl Settings {
    /// Python interpreter override, `~` expanded.
    pub fn python_path_override(&self) -> Option<PathBuf> {
        non_empty(&self.python_path).map(expand_path)
    }

    /// Auxiliary tool override, `~` expanded.
    pub fn tool_path_override(&self) -> Option<PathBuf> {
        non_empty(&self.mcp_command_path).map(expand_path)
    }

    /// Primary CLI override, `~` expanded.
    pub fn cli_path_override(&self) -> Option<PathBuf> {
        non_empty(&self.cli_path).map(expand_path)
    }

    /// Configured source root as written (not yet resolved).
    pub fn target_source_root(&self) -> Option<&str> {
        non_empty(&self.target_source_root)
    }

    /// Configured execution wrapper, if any.
    pub fn execution_wrapper(&self) -> Option<&str> {
        non_empty(&self.execution_wrapper)
    }

    /// Extra variables injected into spawned processes, only when non-empty.
    pub fn extra_env(&self) -> Vec<(String, String)> {
        let mut vars = Vec::new();
        if let Some(url) = non_empty(&self.collector_url) {
            vars.push(("FLUXLOOP_COLLECTOR_URL".to_string(), url.to_string()));
        }
        if let Some(key) = non_empty(&self.api_key) {
            vars.push(("FLUXLOOP_API_KEY".to_string(), key.to_string()));
        }
        vars
    }

    /// Chat model, defaulting to [`DEFAULT_OPENAI_MODEL`].
    pub fn openai_model(&self) -> &str {
        non_empty(&self.openai_model).unwrap_or(DEFAULT_OPENAI_MODEL)
    }

    /// Chat endpoint base URL, defaulting to [`DEFAULT_OPENAI_BASE_URL`].
    pub fn openai_base_url(&self) -> &str {
        non_empty(&self.openai_base_url).unwrap_or(DEFAULT_OPENAI_BASE_URL)
    }

    /// Configured OpenAI API key, if any.
    pub fn openai_api_key(&self) -> Option<&str> {
        non_empty(&self.openai_api_key)
    }

    /// Watched settings whose effective value differs between `self` and `other`.
    pub fn changed_keys(&self, other: &Settings) -> Vec<WatchedSetting> {
        WatchedSetting::ALL
            .into_iter()
            .filter(|key| match key {
                WatchedSetting::TargetSourceRoot => {
                    self.target_source_root() != other.target_source_root()
                }
                WatchedSetting::ExecutionMode => self.execution_mode != other.execution_mode,
                WatchedSetting::PythonPath => {
                    non_empty(&self.python_path) != non_empty(&other.python_path)
                }
                WatchedSetting::McpCommandPath => {
                    non_empty(&self.mcp_command_path) != non_empty(&other.mcp_command_path)
                }
                WatchedSetting::CliPath => non_empty(&self.cli_path) != non_empty(&other.cli_path),
            })
            .collect()
    }
}

/// Values given on the command line, laid over the settings files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SettingsOverrides {
    pub execution_mode: Option<ExecutionMode>,
    pub python_path: Option<String>,
}

impl SettingsOverrides {
    pub fn apply(&self, settings: &mut Settings) {
        if let Some(mode) = self.execution_mode {
            settings.execution_mode = mode;
        }
        if let Some(path) = &self.python_path {
            settings.python_path = Some(path.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overrides_replace_file_values() {
        let mut settings = Settings {
            execution_mode: ExecutionMode::Workspace,
            python_path: Some("/from/file".to_string()),
            ..Default::default()
        };
        SettingsOverrides {
            execution_mode: Some(ExecutionMode::Global),
            python_path: None,
        }
        .apply(&mut settings);
        assert_eq!(settings.execution_mode, ExecutionMode::Global);
        assert_eq!(settings.python_path.as_deref(), Some("/from/file"));
    }

    #[test]
    fn execution_mode_defaults_to_auto() {
        assert_eq!(Settings::default().execution_mode, ExecutionMode::Auto);
    }

    #[test]
    fn execution_mode_parses_case_insensitively() {
        assert_eq!("Global".parse::<ExecutionMode>(), Ok(ExecutionMode::Global));
        assert!("sideways".parse::<ExecutionMode>().is_err());
    }

    #[test]
    fn settings_parse_from_yaml() {
        let yaml = r#"
execution_mode: custom
python_path: /opt/py/bin/python
execution_wrapper: "docker exec dev"
"#;
        let settings: Settings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(settings.execution_mode, ExecutionMode::Custom);
        assert_eq!(
            settings.python_path_override(),
            Some(PathBuf::from("/opt/py/bin/python"))
        );
        assert_eq!(settings.execution_wrapper(), Some("docker exec dev"));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<Settings, _> = serde_yaml::from_str("pythonPath: /usr/bin/python");
        assert!(result.is_err());
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let settings = Settings {
            python_path: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.python_path_override(), None);
    }

    #[test]
    fn extra_env_skips_empty_values() {
        let settings = Settings {
            collector_url: Some("http://localhost:8000".to_string()),
            api_key: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            settings.extra_env(),
            vec![(
                "FLUXLOOP_COLLECTOR_URL".to_string(),
                "http://localhost:8000".to_string()
            )]
        );
    }

    #[test]
    fn openai_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.openai_model(), DEFAULT_OPENAI_MODEL);
        assert_eq!(settings.openai_base_url(), DEFAULT_OPENAI_BASE_URL);
        assert_eq!(settings.openai_api_key(), None);
    }

    #[test]
    fn changed_keys_reports_only_watched_differences() {
        let before = Settings::default();
        let after = Settings {
            execution_mode: ExecutionMode::Global,
            show_output: true,
            mcp_command_path: Some("/usr/local/bin/fluxloop-mcp".to_string()),
            ..Default::default()
        };
        assert_eq!(
            before.changed_keys(&after),
            vec![WatchedSetting::ExecutionMode, WatchedSetting::McpCommandPath]
        );
    }

    #[test]
    fn whitespace_only_change_is_not_a_change() {
        let before = Settings::default();
        let after = Settings {
            target_source_root: Some(" ".to_string()),
            ..Default::default()
        };
        assert!(before.changed_keys(&after).is_empty());
    }
}

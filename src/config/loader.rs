//! Settings file discovery and loading.
//!
//! Settings are read fresh on every call; nothing here is cached.

use crate::config::merger::merge_layers;
use crate::config::schema::Settings;
use crate::error::{FluxError, Result};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable that relocates the per-user directory.
pub const HOME_ENV: &str = "FLUXLOOP_HOME";

/// Per-user directory holding user settings, the project registry and the
/// documentation index: `$FLUXLOOP_HOME`, or `~/.fluxloop`.
pub fn fluxloop_home() -> PathBuf {
    if let Some(home) = std::env::var_os(HOME_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(home);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".fluxloop")
}

/// Paths to settings files in merge order (later overrides earlier).
///
/// 1. User settings: `$FLUXLOOP_HOME/settings.yml`
/// 2. Workspace settings: `.fluxloop/settings.yml`
/// 3. Local overrides: `.fluxloop/settings.local.yml`
#[derive(Debug, Clone)]
pub struct SettingsPaths {
    pub user: Option<PathBuf>,
    pub workspace: Option<PathBuf>,
    pub workspace_local: Option<PathBuf>,
}

fn existing(path: PathBuf) -> Option<PathBuf> {
    if path.is_file() {
        Some(path)
    } else {
        None
    }
}

impl SettingsPaths {
    /// Discover settings files for a workspace folder.
    pub fn discover(workspace: Option<&Path>) -> Self {
        Self::discover_in(&fluxloop_home(), workspace)
    }

    /// Discover settings files with an explicit per-user directory.
    pub fn discover_in(user_home: &Path, workspace: Option<&Path>) -> Self {
        let settings_dir = workspace.map(|w| w.join(".fluxloop"));
        Self {
            user: existing(user_home.join("settings.yml")),
            workspace: settings_dir
                .as_ref()
                .and_then(|d| existing(d.join("settings.yml"))),
            workspace_local: settings_dir
                .as_ref()
                .and_then(|d| existing(d.join("settings.local.yml"))),
        }
    }

    /// All existing settings paths in merge order.
    pub fn all_existing(&self) -> Vec<&PathBuf> {
        [&self.user, &self.workspace, &self.workspace_local]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Parse one settings file into a YAML value.
///
/// An empty (or comment-only) file parses to `Null` and contributes nothing.
pub fn load_settings_value(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path)?;
    serde_yaml::from_str(&content).map_err(|e| FluxError::ConfigParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load and merge every existing settings file.
pub fn load_settings_from(paths: &SettingsPaths) -> Result<Settings> {
    let mut layers = Vec::new();
    for path in paths.all_existing() {
        let value = load_settings_value(path)?;
        if !value.is_null() {
            tracing::debug!("Loaded settings layer {}", path.display());
            layers.push(value);
        }
    }

    let merged = merge_layers(&layers);
    serde_yaml::from_value(merged).map_err(|e| FluxError::ConfigParseError {
        path: paths
            .all_existing()
            .last()
            .map(|p| p.to_path_buf())
            .unwrap_or_default(),
        message: e.to_string(),
    })
}

/// Load settings for a workspace folder using the default user directory.
pub fn load_settings(workspace: Option<&Path>) -> Result<Settings> {
    load_settings_from(&SettingsPaths::discover(workspace))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;
    use tempfile::TempDir;

    fn write(dir: &Path, rel: &str, content: &str) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    #[test]
    fn no_files_yields_defaults() {
        let home = TempDir::new().unwrap();
        let workspace = TempDir::new().unwrap();
        let paths = SettingsPaths::discover_in(home.path(), Some(workspace.path()));
        assert!(paths.all_existing().is_empty());
        assert_eq!(load_settings_from(&paths).unwrap(), Settings::default());
    }

    #[test]
    fn workspace_overrides_user_and_local_overrides_workspace() {
        let home = TempDir::new().unwrap();
        let workspace = TempDir::new().unwrap();
        write(
            home.path(),
            "settings.yml",
            "execution_mode: global\ncollector_url: http://user",
        );
        write(
            workspace.path(),
            ".fluxloop/settings.yml",
            "execution_mode: workspace\npython_path: /ws/python",
        );
        write(
            workspace.path(),
            ".fluxloop/settings.local.yml",
            "python_path: /local/python",
        );

        let paths = SettingsPaths::discover_in(home.path(), Some(workspace.path()));
        assert_eq!(paths.all_existing().len(), 3);

        let settings = load_settings_from(&paths).unwrap();
        assert_eq!(settings.execution_mode, ExecutionMode::Workspace);
        assert_eq!(settings.python_path.as_deref(), Some("/local/python"));
        assert_eq!(settings.collector_url.as_deref(), Some("http://user"));
    }

    #[test]
    fn empty_file_is_ignored() {
        let home = TempDir::new().unwrap();
        write(home.path(), "settings.yml", "# nothing yet\n");
        let paths = SettingsPaths::discover_in(home.path(), None);
        assert_eq!(load_settings_from(&paths).unwrap(), Settings::default());
    }

    #[test]
    fn invalid_yaml_reports_path() {
        let home = TempDir::new().unwrap();
        write(home.path(), "settings.yml", "execution_mode: [unclosed");
        let paths = SettingsPaths::discover_in(home.path(), None);
        let err = load_settings_from(&paths).unwrap_err();
        match err {
            FluxError::ConfigParseError { path, .. } => {
                assert!(path.ends_with("settings.yml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unknown_mode_is_a_parse_error() {
        let home = TempDir::new().unwrap();
        write(home.path(), "settings.yml", "execution_mode: sideways");
        let paths = SettingsPaths::discover_in(home.path(), None);
        assert!(matches!(
            load_settings_from(&paths),
            Err(FluxError::ConfigParseError { .. })
        ));
    }
}

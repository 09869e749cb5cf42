//! Registered FluxLoop projects and the active selection.
//!
//! The registry is a single JSON file under the per-user directory. It is
//! small, read once per invocation, and rewritten atomically on change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::fluxloop_home;
use crate::error::{FluxError, Result};

/// Files that mark a project as configured.
const REQUIRED_CONFIG_FILES: [&str; 3] = ["project.yaml", "input.yaml", "simulation.yaml"];

/// One registered project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    /// 16 hex characters derived from the project path.
    pub id: String,
    pub name: String,
    /// Absolute project directory.
    pub path: PathBuf,
    /// Source directory, relative to `path` or absolute.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    pub last_opened: DateTime<Utc>,
    #[serde(default)]
    pub has_config: bool,
}

impl ProjectEntry {
    /// Create an entry for `path` as given, without canonicalizing it.
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            id: project_id(&path),
            name: name.into(),
            has_config: has_config(&path),
            path,
            source_root: None,
            last_opened: Utc::now(),
        }
    }

    pub fn with_source_root(mut self, source_root: impl Into<String>) -> Self {
        let source_root = source_root.into();
        let trimmed = source_root.trim();
        self.source_root = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        self
    }

    /// Directory commands run in: the source root when one is declared,
    /// otherwise the project directory.
    pub fn workspace_path(&self) -> PathBuf {
        match &self.source_root {
            Some(source_root) => self.path.join(source_root),
            None => self.path.clone(),
        }
    }

    /// The `.venv` inside a declared source root.
    pub fn source_venv(&self) -> Option<PathBuf> {
        self.source_root
            .as_ref()
            .map(|source_root| self.path.join(source_root).join(".venv"))
    }
}

/// Stable id for a project directory.
///
/// 8 bytes of SHA256 over the path, hex encoded.
pub fn project_id(path: &Path) -> String {
    let hash = Sha256::digest(path.to_string_lossy().as_bytes());
    hex::encode(&hash[..8])
}

/// Whether `configs/` holds every required configuration file.
pub fn has_config(path: &Path) -> bool {
    let config_dir = path.join("configs");
    config_dir.is_dir()
        && REQUIRED_CONFIG_FILES
            .iter()
            .all(|file| config_dir.join(file).is_file())
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct RegistryFile {
    #[serde(default)]
    active: Option<String>,
    #[serde(default)]
    projects: Vec<ProjectEntry>,
}

/// Persistent list of projects.
#[derive(Debug)]
pub struct ProjectRegistry {
    file: PathBuf,
    projects: Vec<ProjectEntry>,
    active: Option<String>,
}

impl ProjectRegistry {
    /// Default registry location: `$FLUXLOOP_HOME/projects.json`.
    pub fn default_path() -> PathBuf {
        fluxloop_home().join("projects.json")
    }

    /// Empty registry that will be saved to `file`.
    pub fn empty(file: impl Into<PathBuf>) -> Self {
        Self {
            file: file.into(),
            projects: Vec::new(),
            active: None,
        }
    }

    /// Load the registry, or an empty one if the file does not exist.
    ///
    /// `has_config` is recomputed for every entry.
    pub fn load(file: impl Into<PathBuf>) -> Result<Self> {
        let file = file.into();
        if !file.exists() {
            return Ok(Self::empty(file));
        }

        let content = fs::read_to_string(&file)?;
        let stored: RegistryFile =
            serde_json::from_str(&content).map_err(|e| FluxError::ConfigParseError {
                path: file.clone(),
                message: e.to_string(),
            })?;

        let mut registry = Self {
            file,
            projects: stored.projects,
            active: stored.active,
        };
        if registry.active().is_none() {
            registry.active = None;
        }
        registry.refresh_metadata();
        Ok(registry)
    }

    /// Load from [`ProjectRegistry::default_path`].
    pub fn load_default() -> Result<Self> {
        Self::load(Self::default_path())
    }

    /// Save using write-to-temp-then-rename.
    pub fn save(&self) -> Result<()> {
        if let Some(dir) = self.file.parent() {
            fs::create_dir_all(dir)?;
        }

        let stored = RegistryFile {
            active: self.active.clone(),
            projects: self.projects.clone(),
        };
        let content = serde_json::to_string_pretty(&stored)
            .map_err(|e| FluxError::Other(anyhow::anyhow!("Failed to serialize projects: {}", e)))?;

        let temp_path = self.file.with_extension("json.tmp");
        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &self.file)?;
        Ok(())
    }

    pub fn file(&self) -> &Path {
        &self.file
    }

    /// Register a directory. Re-adding a known path updates its entry.
    ///
    /// The directory must exist. The name defaults to the directory name.
    pub fn add(
        &mut self,
        path: &Path,
        name: Option<&str>,
        source_root: Option<&str>,
        set_active: bool,
    ) -> Result<ProjectEntry> {
        let path = path.canonicalize()?;
        let name = name
            .map(str::to_string)
            .or_else(|| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(str::to_string)
            })
            .unwrap_or_else(|| "project".to_string());

        let mut entry = ProjectEntry::new(&path, name);
        if let Some(source_root) = source_root {
            entry = entry.with_source_root(source_root);
        }

        match self.projects.iter_mut().find(|p| p.path == path) {
            Some(existing) => {
                entry.id = existing.id.clone();
                if source_root.is_none() {
                    entry.source_root = existing.source_root.clone();
                }
                *existing = entry.clone();
            }
            None => self.projects.push(entry.clone()),
        }

        if set_active {
            self.active = Some(entry.id.clone());
        }
        tracing::debug!("Registered project {} at {}", entry.id, entry.path.display());
        Ok(entry)
    }

    /// Unregister a project. When it was active, the first remaining
    /// project becomes active.
    pub fn remove(&mut self, id: &str) -> Result<ProjectEntry> {
        let index = self
            .projects
            .iter()
            .position(|p| p.id == id)
            .ok_or_else(|| FluxError::UnknownProject { id: id.to_string() })?;
        let removed = self.projects.remove(index);

        if self.active.as_deref() == Some(id) {
            self.active = self.projects.first().map(|p| p.id.clone());
        }
        Ok(removed)
    }

    /// Select the active project, or clear the selection with `None`.
    ///
    /// Returns whether the selection changed.
    pub fn set_active(&mut self, id: Option<&str>) -> Result<bool> {
        if self.active.as_deref() == id {
            return Ok(false);
        }

        if let Some(id) = id {
            let project = self
                .projects
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| FluxError::UnknownProject { id: id.to_string() })?;
            project.last_opened = Utc::now();
            project.has_config = has_config(&project.path);
        }

        self.active = id.map(str::to_string);
        Ok(true)
    }

    pub fn active(&self) -> Option<&ProjectEntry> {
        let id = self.active.as_deref()?;
        self.projects.iter().find(|p| p.id == id)
    }

    /// Look up a project by id, then name, then path.
    pub fn find(&self, key: &str) -> Option<&ProjectEntry> {
        if let Some(project) = self.projects.iter().find(|p| p.id == key) {
            return Some(project);
        }
        if let Some(project) = self.projects.iter().find(|p| p.name == key) {
            return Some(project);
        }
        let path = Path::new(key);
        let path = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
        self.projects.iter().find(|p| p.path == path)
    }

    /// Projects, most recently opened first, ties broken by name.
    pub fn list(&self) -> Vec<&ProjectEntry> {
        let mut projects: Vec<&ProjectEntry> = self.projects.iter().collect();
        projects.sort_by(|a, b| {
            b.last_opened
                .cmp(&a.last_opened)
                .then_with(|| a.name.cmp(&b.name))
        });
        projects
    }

    pub fn is_empty(&self) -> bool {
        self.projects.is_empty()
    }

    /// Recompute `has_config`. Returns whether anything changed.
    pub fn refresh_metadata(&mut self) -> bool {
        let mut changed = false;
        for project in &mut self.projects {
            let current = has_config(&project.path);
            if project.has_config != current {
                project.has_config = current;
                changed = true;
            }
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use tempfile::TempDir;

    fn registry(temp: &TempDir) -> ProjectRegistry {
        ProjectRegistry::empty(temp.path().join("home").join("projects.json"))
    }

    fn project_dir(temp: &TempDir, name: &str) -> PathBuf {
        let dir = temp.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir.canonicalize().unwrap()
    }

    #[test]
    fn project_id_is_stable_hex() {
        let id = project_id(Path::new("/work/agent"));
        assert_eq!(id.len(), 16);
        assert_eq!(id, project_id(Path::new("/work/agent")));
        assert_ne!(id, project_id(Path::new("/work/other")));
    }

    #[test]
    fn has_config_requires_all_files() {
        let temp = TempDir::new().unwrap();
        let configs = temp.path().join("configs");
        fs::create_dir_all(&configs).unwrap();
        fs::write(configs.join("project.yaml"), "").unwrap();
        fs::write(configs.join("input.yaml"), "").unwrap();
        assert!(!has_config(temp.path()));

        fs::write(configs.join("simulation.yaml"), "").unwrap();
        assert!(has_config(temp.path()));
    }

    #[test]
    fn workspace_path_uses_source_root() {
        let entry = ProjectEntry::new("/work/agent", "agent");
        assert_eq!(entry.workspace_path(), PathBuf::from("/work/agent"));
        assert_eq!(entry.source_venv(), None);

        let entry = entry.with_source_root("src");
        assert_eq!(entry.workspace_path(), PathBuf::from("/work/agent/src"));
        assert_eq!(
            entry.source_venv(),
            Some(PathBuf::from("/work/agent/src/.venv"))
        );

        let entry = ProjectEntry::new("/work/agent", "agent").with_source_root("/abs/src");
        assert_eq!(entry.workspace_path(), PathBuf::from("/abs/src"));
    }

    #[test]
    fn add_sets_active_and_defaults_name() {
        let temp = TempDir::new().unwrap();
        let dir = project_dir(&temp, "support-bot");
        let mut registry = registry(&temp);

        let entry = registry.add(&dir, None, None, true).unwrap();
        assert_eq!(entry.name, "support-bot");
        assert_eq!(entry.path, dir);
        assert_eq!(registry.active().map(|p| p.id.as_str()), Some(entry.id.as_str()));
    }

    #[test]
    fn re_adding_updates_existing_entry() {
        let temp = TempDir::new().unwrap();
        let dir = project_dir(&temp, "agent");
        let mut registry = registry(&temp);

        let first = registry.add(&dir, Some("Agent"), Some("src"), false).unwrap();
        let second = registry.add(&dir, Some("Renamed"), None, false).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(registry.list().len(), 1);
        assert_eq!(registry.list()[0].name, "Renamed");
        assert_eq!(registry.list()[0].source_root.as_deref(), Some("src"));
        assert!(registry.active().is_none());
    }

    #[test]
    fn add_missing_directory_fails() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry(&temp);
        let result = registry.add(&temp.path().join("missing"), None, None, true);
        assert!(matches!(result, Err(FluxError::Io(_))));
    }

    #[test]
    fn remove_active_falls_back_to_first_remaining() {
        let temp = TempDir::new().unwrap();
        let a = project_dir(&temp, "a");
        let b = project_dir(&temp, "b");
        let mut registry = registry(&temp);

        let first = registry.add(&a, None, None, false).unwrap();
        let second = registry.add(&b, None, None, true).unwrap();

        registry.remove(&second.id).unwrap();
        assert_eq!(registry.active().map(|p| p.id.clone()), Some(first.id.clone()));

        registry.remove(&first.id).unwrap();
        assert!(registry.active().is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn remove_unknown_project_fails() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry(&temp);
        assert!(matches!(
            registry.remove("deadbeef"),
            Err(FluxError::UnknownProject { .. })
        ));
    }

    #[test]
    fn set_active_reports_changes() {
        let temp = TempDir::new().unwrap();
        let dir = project_dir(&temp, "agent");
        let mut registry = registry(&temp);
        let entry = registry.add(&dir, None, None, false).unwrap();

        assert!(registry.set_active(Some(&entry.id)).unwrap());
        assert!(!registry.set_active(Some(&entry.id)).unwrap());
        assert!(registry.set_active(None).unwrap());
        assert!(registry.active().is_none());
        assert!(registry.set_active(Some("nope")).is_err());
    }

    #[test]
    fn find_by_id_or_path() {
        let temp = TempDir::new().unwrap();
        let dir = project_dir(&temp, "agent");
        let mut registry = registry(&temp);
        let entry = registry.add(&dir, None, None, false).unwrap();

        assert_eq!(registry.find(&entry.id).map(|p| &p.path), Some(&dir));
        assert_eq!(
            registry.find(dir.to_str().unwrap()).map(|p| &p.id),
            Some(&entry.id)
        );
        assert!(registry.find("unknown").is_none());
    }

    #[test]
    fn list_orders_by_recency_then_name() {
        let temp = TempDir::new().unwrap();
        let mut registry = registry(&temp);
        let now = Utc::now();

        for (name, age) in [("beta", 0), ("alpha", 0), ("old", 5)] {
            let dir = project_dir(&temp, name);
            registry.add(&dir, None, None, false).unwrap();
            let entry = registry
                .projects
                .iter_mut()
                .find(|p| p.name == name)
                .unwrap();
            entry.last_opened = now - Duration::minutes(age);
        }

        let names: Vec<&str> = registry.list().iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "beta", "old"]);
    }

    #[test]
    fn save_and_load_round_trip_active_selection() {
        let temp = TempDir::new().unwrap();
        let dir = project_dir(&temp, "agent");
        let mut registry = registry(&temp);
        let entry = registry.add(&dir, None, Some("src"), true).unwrap();
        registry.save().unwrap();

        let loaded = ProjectRegistry::load(registry.file()).unwrap();
        let active = loaded.active().unwrap();
        assert_eq!(active.id, entry.id);
        assert_eq!(active.source_root.as_deref(), Some("src"));
    }

    #[test]
    fn load_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let loaded = ProjectRegistry::load(temp.path().join("projects.json")).unwrap();
        assert!(loaded.is_empty());
        assert!(loaded.active().is_none());
    }

    #[test]
    fn load_corrupt_file_is_parse_error() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("projects.json");
        fs::write(&file, "{ not json").unwrap();
        assert!(matches!(
            ProjectRegistry::load(&file),
            Err(FluxError::ConfigParseError { .. })
        ));
    }
}

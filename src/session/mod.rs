//! Per-invocation context.
//!
//! A [`Session`] owns everything environment resolution depends on: the
//! merged settings, the workspace folders, the project registry and the
//! [`EnvironmentManager`]. Every mutation goes through the session so the
//! manager sees the matching [`ChangeEvent`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::{load_settings, Settings, SettingsOverrides, WatchedSetting};
use crate::environment::{
    ChangeEvent, EnvironmentCheck, EnvironmentDescriptor, EnvironmentManager, SubscriptionId,
    ToolSet, WorkspaceView,
};
use crate::error::Result;
use crate::project::{ProjectEntry, ProjectRegistry};
use crate::shell::Platform;

fn workspace_view<'a>(
    settings: &'a Settings,
    registry: &'a ProjectRegistry,
    folders: &'a [PathBuf],
    cwd: &'a Path,
) -> WorkspaceView<'a> {
    WorkspaceView {
        settings,
        project: registry.active(),
        folders,
        cwd,
    }
}

/// Settings, folders, projects and the active environment.
pub struct Session {
    settings: Settings,
    overrides: SettingsOverrides,
    folders: Vec<PathBuf>,
    cwd: PathBuf,
    registry: ProjectRegistry,
    manager: EnvironmentManager,
}

impl Session {
    /// Assemble a session from already loaded parts.
    pub fn new(
        settings: Settings,
        folders: Vec<PathBuf>,
        registry: ProjectRegistry,
        manager: EnvironmentManager,
    ) -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            settings,
            overrides: SettingsOverrides::default(),
            folders,
            cwd,
            registry,
            manager,
        }
    }

    /// Load settings for the first folder and the default project registry.
    pub fn load(folders: Vec<PathBuf>, overrides: SettingsOverrides) -> Result<Self> {
        let mut settings = load_settings(folders.first().map(PathBuf::as_path))?;
        overrides.apply(&mut settings);
        let registry = ProjectRegistry::load_default()?;

        let mut session = Self::new(settings, folders, registry, EnvironmentManager::default());
        session.overrides = overrides;
        Ok(session)
    }

    pub fn with_cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = cwd.into();
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    pub fn registry(&self) -> &ProjectRegistry {
        &self.registry
    }

    pub fn active_project(&self) -> Option<&ProjectEntry> {
        self.registry.active()
    }

    pub fn tools(&self) -> &ToolSet {
        self.manager.resolver().tools()
    }

    pub fn platform(&self) -> Platform {
        self.manager.resolver().platform()
    }

    /// Read-only view used for resolution decisions.
    pub fn view(&self) -> WorkspaceView<'_> {
        workspace_view(&self.settings, &self.registry, &self.folders, &self.cwd)
    }

    fn emit(&mut self, event: ChangeEvent) -> Option<Arc<EnvironmentDescriptor>> {
        let view = workspace_view(&self.settings, &self.registry, &self.folders, &self.cwd);
        self.manager.handle(&event, &view)
    }

    /// The active environment, resolving it on first use or when forced.
    pub fn environment(&mut self, force: bool) -> Option<Arc<EnvironmentDescriptor>> {
        let view = workspace_view(&self.settings, &self.registry, &self.folders, &self.cwd);
        self.manager.resolved(&view, force)
    }

    /// The environment from the last resolution, without resolving.
    pub fn active_environment(&self) -> Option<Arc<EnvironmentDescriptor>> {
        self.manager.active()
    }

    /// Local-only readiness report for `root`.
    pub fn check_environment(&self, root: &Path) -> EnvironmentCheck {
        self.manager.check_environment(root, &self.view())
    }

    pub fn subscribe(
        &mut self,
        listener: impl FnMut(Option<&EnvironmentDescriptor>) + 'static,
    ) -> SubscriptionId {
        self.manager.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.manager.unsubscribe(id)
    }

    /// Replace the settings, refreshing the environment when a watched
    /// key changed. Returns the changed keys.
    pub fn set_settings(&mut self, settings: Settings) -> Vec<WatchedSetting> {
        let changed = self.settings.changed_keys(&settings);
        self.settings = settings;
        if !changed.is_empty() {
            tracing::debug!(
                "Settings changed: {}",
                changed
                    .iter()
                    .map(|k| k.key())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            self.emit(ChangeEvent::ConfigurationChanged(changed.clone()));
        }
        changed
    }

    /// Re-read the settings files and apply the command-line overrides again.
    pub fn reload_settings(&mut self) -> Result<Vec<WatchedSetting>> {
        let mut settings = load_settings(self.folders.first().map(PathBuf::as_path))?;
        self.overrides.apply(&mut settings);
        Ok(self.set_settings(settings))
    }

    /// Replace the workspace folders. Cached resolutions are discarded.
    pub fn set_workspace_folders(&mut self, folders: Vec<PathBuf>) {
        self.folders = folders;
        self.emit(ChangeEvent::WorkspaceFoldersChanged);
    }

    /// Select the active project and persist the choice.
    pub fn set_active_project(&mut self, id: Option<&str>) -> Result<()> {
        if self.registry.set_active(id)? {
            self.registry.save()?;
            self.emit(ChangeEvent::ActiveProjectChanged);
        }
        Ok(())
    }

    /// Register a project directory and persist the registry.
    pub fn add_project(
        &mut self,
        path: &Path,
        name: Option<&str>,
        source_root: Option<&str>,
        activate: bool,
    ) -> Result<ProjectEntry> {
        let previous = self.registry.active().map(|p| p.id.clone());
        let entry = self.registry.add(path, name, source_root, activate)?;
        self.registry.save()?;
        if self.registry.active().map(|p| p.id.clone()) != previous {
            self.emit(ChangeEvent::ActiveProjectChanged);
        }
        Ok(entry)
    }

    /// Unregister a project and persist the registry.
    pub fn remove_project(&mut self, id: &str) -> Result<ProjectEntry> {
        let previous = self.registry.active().map(|p| p.id.clone());
        let removed = self.registry.remove(id)?;
        self.registry.save()?;
        if self.registry.active().map(|p| p.id.clone()) != previous {
            self.emit(ChangeEvent::ActiveProjectChanged);
        }
        Ok(removed)
    }
}

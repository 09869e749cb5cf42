//! Active environment tracking.
//!
//! The manager decides which directory to resolve for the current
//! workspace, keeps the most recent result, reacts to change events, and
//! notifies subscribers.

use super::descriptor::EnvironmentDescriptor;
use super::resolver::{EnvironmentCheck, EnvironmentResolver, ExecutionConfiguration};
use crate::config::{Settings, WatchedSetting};
use crate::project::ProjectEntry;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// The parts of the session that influence resolution.
#[derive(Debug, Clone, Copy)]
pub struct WorkspaceView<'a> {
    pub settings: &'a Settings,
    pub project: Option<&'a ProjectEntry>,
    pub folders: &'a [PathBuf],
    /// Base for a relative source root when there is no project or folder.
    pub cwd: &'a Path,
}

/// Something that may change the active environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    WorkspaceFoldersChanged,
    ConfigurationChanged(Vec<WatchedSetting>),
    ActiveProjectChanged,
}

impl ChangeEvent {
    /// Whether cached resolutions are stale after this event.
    pub fn invalidates_cache(&self) -> bool {
        match self {
            ChangeEvent::WorkspaceFoldersChanged => true,
            ChangeEvent::ConfigurationChanged(keys) => !keys.is_empty(),
            ChangeEvent::ActiveProjectChanged => false,
        }
    }
}

/// Handle returned by [`EnvironmentManager::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(Option<&EnvironmentDescriptor>)>;

/// Directory to resolve for the workspace.
///
/// Order: the `target_source_root` setting (absolute, or relative to the
/// project, the first folder, or `cwd`), the project's source root, the
/// project directory, the first workspace folder.
pub fn resolve_target_root(view: &WorkspaceView<'_>) -> Option<PathBuf> {
    let project_path = view.project.map(|p| p.path.as_path());
    let first_folder = view.folders.first().map(PathBuf::as_path);

    if let Some(configured) = view.settings.target_source_root() {
        let expanded = PathBuf::from(shellexpand::tilde(configured).into_owned());
        if expanded.is_absolute() {
            return Some(expanded);
        }
        let base = project_path.or(first_folder).unwrap_or(view.cwd);
        return Some(base.join(expanded));
    }

    if let Some(project) = view.project {
        return Some(project.workspace_path());
    }

    first_folder.map(Path::to_path_buf)
}

/// Configuration for the next resolution, derived fresh from settings.
pub fn execution_configuration(view: &WorkspaceView<'_>) -> ExecutionConfiguration {
    ExecutionConfiguration::from_settings(
        view.settings,
        view.project.and_then(ProjectEntry::source_venv),
    )
}

/// Owns the resolver and the currently active environment.
pub struct EnvironmentManager {
    resolver: EnvironmentResolver,
    current: Option<Arc<EnvironmentDescriptor>>,
    last_signature: Option<String>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_id: u64,
}

impl Default for EnvironmentManager {
    fn default() -> Self {
        Self::new(EnvironmentResolver::new())
    }
}

impl EnvironmentManager {
    pub fn new(resolver: EnvironmentResolver) -> Self {
        Self {
            resolver,
            current: None,
            last_signature: None,
            listeners: Vec::new(),
            next_id: 0,
        }
    }

    pub fn resolver(&self) -> &EnvironmentResolver {
        &self.resolver
    }

    pub fn resolver_mut(&mut self) -> &mut EnvironmentResolver {
        &mut self.resolver
    }

    /// The environment from the last refresh, without resolving.
    pub fn active(&self) -> Option<Arc<EnvironmentDescriptor>> {
        self.current.clone()
    }

    /// The active environment, refreshing first when forced or when there
    /// is none yet.
    pub fn resolved(
        &mut self,
        view: &WorkspaceView<'_>,
        force: bool,
    ) -> Option<Arc<EnvironmentDescriptor>> {
        if force || self.current.is_none() {
            return self.refresh(view);
        }
        self.current.clone()
    }

    /// Resolve the environment for the workspace and make it active.
    ///
    /// Returns `None` when there is nothing to resolve or the target root
    /// does not exist. Subscribers are notified either way.
    pub fn refresh(&mut self, view: &WorkspaceView<'_>) -> Option<Arc<EnvironmentDescriptor>> {
        let Some(root) = resolve_target_root(view) else {
            tracing::info!("No FluxLoop project or source root detected.");
            return self.set_current(None);
        };

        let config = execution_configuration(view);
        match self.resolver.try_resolve(&root, &config) {
            Ok(descriptor) => {
                self.log_environment(&descriptor);
                self.set_current(Some(descriptor))
            }
            Err(e) => {
                tracing::warn!("Configured source root does not exist: {}", root.display());
                tracing::debug!("{}", e);
                self.set_current(None)
            }
        }
    }

    /// React to a change event.
    ///
    /// Folder changes and watched-setting changes discard every cached
    /// resolution before refreshing; an active-project change only
    /// refreshes.
    pub fn handle(
        &mut self,
        event: &ChangeEvent,
        view: &WorkspaceView<'_>,
    ) -> Option<Arc<EnvironmentDescriptor>> {
        if let ChangeEvent::ConfigurationChanged(keys) = event {
            if keys.is_empty() {
                return self.current.clone();
            }
        }
        if event.invalidates_cache() {
            self.resolver.clear_cache();
        }
        tracing::debug!("Refreshing environment after {:?}", event);
        self.refresh(view)
    }

    /// Register a listener for environment changes.
    pub fn subscribe(
        &mut self,
        listener: impl FnMut(Option<&EnvironmentDescriptor>) + 'static,
    ) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Remove a listener. Returns whether it was registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(existing, _)| *existing != id);
        self.listeners.len() != before
    }

    /// Drop every listener.
    pub fn dispose(&mut self) {
        self.listeners.clear();
    }

    /// Local-only readiness report for `root`.
    pub fn check_environment(&self, root: &Path, view: &WorkspaceView<'_>) -> EnvironmentCheck {
        let project_venv = view.project.and_then(ProjectEntry::source_venv);
        self.resolver.check(root, project_venv.as_deref())
    }

    fn set_current(
        &mut self,
        descriptor: Option<Arc<EnvironmentDescriptor>>,
    ) -> Option<Arc<EnvironmentDescriptor>> {
        self.current = descriptor;
        let current = self.current.as_deref();
        for (_, listener) in &mut self.listeners {
            listener(current);
        }
        self.current.clone()
    }

    /// Log the environment block unless it matches the last one logged.
    fn log_environment(&mut self, descriptor: &EnvironmentDescriptor) -> bool {
        let signature = serde_json::to_string(descriptor).unwrap_or_default();
        if self.last_signature.as_deref() == Some(signature.as_str()) {
            return false;
        }
        self.last_signature = Some(signature);

        let show = |path: Option<&Path>| {
            path.map(|p| p.display().to_string())
                .unwrap_or_else(|| "not found".to_string())
        };
        let tools = self.resolver.tools();

        tracing::info!("Source root: {}", descriptor.root().display());
        tracing::info!("Environment type: {}", descriptor.kind());
        tracing::info!("Python: {}", show(descriptor.python_path()));
        tracing::info!("{}: {}", tools.primary, show(descriptor.primary_tool_path()));
        tracing::info!("{}: {}", tools.auxiliary, show(descriptor.auxiliary_tool_path()));
        for note in descriptor.notes() {
            tracing::info!("  - {}", note);
        }
        true
    }
}

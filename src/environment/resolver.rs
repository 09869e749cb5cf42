//! Environment resolution.
//!
//! Turns a root directory and an [`ExecutionConfiguration`] into a shared
//! [`EnvironmentDescriptor`]. The strategy is:
//!
//! 1. Reuse a cached descriptor for the same root and configuration
//! 2. Refuse roots that are not directories (uncached `Unknown` result)
//! 3. Discover according to the execution mode
//! 4. Apply configured path overrides last

use super::cache::{CacheKey, ResolutionCache};
use super::descriptor::{EnvironmentDescriptor, EnvironmentKind, ExecutableSlot, ToolSet};
use super::discovery::Discovery;
use super::probe::{parse_system_path, FileProbe, RealFs};
use crate::config::{ExecutionMode, Settings};
use crate::error::{FluxError, Result};
use crate::shell::Platform;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Everything besides the root that influences resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ExecutionConfiguration {
    pub execution_mode: ExecutionMode,
    /// Replaces the discovered interpreter.
    pub python_path_override: Option<PathBuf>,
    /// Replaces the discovered auxiliary tool.
    pub tool_path_override: Option<PathBuf>,
    /// Replaces the discovered primary tool.
    pub cli_path_override: Option<PathBuf>,
    /// Extra `.venv` candidate from the active project's source root.
    pub project_venv: Option<PathBuf>,
}

impl ExecutionConfiguration {
    pub fn from_settings(settings: &Settings, project_venv: Option<PathBuf>) -> Self {
        Self {
            execution_mode: settings.execution_mode,
            python_path_override: settings.python_path_override(),
            tool_path_override: settings.tool_path_override(),
            cli_path_override: settings.cli_path_override(),
            project_venv,
        }
    }
}

/// Readiness report for a directory, used by setup flows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentCheck {
    pub root: PathBuf,
    pub kind: EnvironmentKind,
    pub has_environment: bool,
    pub has_python: bool,
    pub has_primary_tool: bool,
    pub has_auxiliary_tool: bool,
    pub python_path: Option<PathBuf>,
    pub primary_tool_path: Option<PathBuf>,
    pub auxiliary_tool_path: Option<PathBuf>,
    /// Human-readable labels of what is missing.
    pub missing: Vec<String>,
    pub notes: Vec<String>,
}

impl EnvironmentCheck {
    /// Whether everything needed to run the tools is present.
    pub fn is_ready(&self) -> bool {
        self.missing.is_empty()
    }
}

/// Resolves and caches execution environments.
pub struct EnvironmentResolver {
    probe: Box<dyn FileProbe>,
    platform: Platform,
    tools: ToolSet,
    search_path: Vec<PathBuf>,
    cache: ResolutionCache,
}

impl Default for EnvironmentResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl EnvironmentResolver {
    /// Resolver over the real filesystem and the process PATH.
    pub fn new() -> Self {
        Self::with_probe(RealFs).with_search_path(parse_system_path())
    }

    /// Resolver over a custom probe with an empty search path.
    pub fn with_probe(probe: impl FileProbe + 'static) -> Self {
        Self {
            probe: Box::new(probe),
            platform: Platform::current(),
            tools: ToolSet::default(),
            search_path: Vec::new(),
            cache: ResolutionCache::new(),
        }
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self.cache.clear();
        self
    }

    pub fn with_tools(mut self, tools: ToolSet) -> Self {
        self.tools = tools;
        self.cache.clear();
        self
    }

    /// Directories searched for global executables.
    pub fn with_search_path(mut self, search_path: Vec<PathBuf>) -> Self {
        self.search_path = search_path;
        self.cache.clear();
        self
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn tools(&self) -> &ToolSet {
        &self.tools
    }

    /// Drop every cached descriptor.
    pub fn clear_cache(&mut self) {
        tracing::debug!("Clearing {} cached environment(s)", self.cache.len());
        self.cache.clear();
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    fn discovery(&self) -> Discovery<'_> {
        Discovery::new(self.probe.as_ref(), self.platform, &self.tools)
    }

    /// Resolve the environment for `root`.
    ///
    /// Repeated calls with the same root and configuration return the same
    /// `Arc` without touching the filesystem. A root that is not a directory
    /// yields an `Unknown` descriptor that is not cached.
    pub fn resolve(
        &mut self,
        root: &Path,
        config: &ExecutionConfiguration,
    ) -> Arc<EnvironmentDescriptor> {
        self.try_resolve(root, config).unwrap_or_else(|_| {
            Arc::new(EnvironmentDescriptor::unknown(
                root,
                format!("Directory does not exist: {}", root.display()),
            ))
        })
    }

    /// Like [`EnvironmentResolver::resolve`], but a missing root is reported
    /// as [`FluxError::NoEnvironment`].
    pub fn try_resolve(
        &mut self,
        root: &Path,
        config: &ExecutionConfiguration,
    ) -> Result<Arc<EnvironmentDescriptor>> {
        let key = CacheKey::new(root, config);
        if let Some(hit) = self.cache.get(&key) {
            tracing::trace!("Environment cache hit for {}", root.display());
            return Ok(hit);
        }

        if !self.probe.is_dir(root) {
            tracing::debug!("Resolution root {} does not exist", root.display());
            return Err(FluxError::NoEnvironment {
                root: root.to_path_buf(),
            });
        }

        let detected = self.detect(root, config);
        let descriptor = self.apply_overrides(detected, config);
        debug_assert!(descriptor.satisfies_kind_invariant());

        tracing::debug!(
            "Resolved {} environment for {} ({} mode)",
            descriptor.kind(),
            root.display(),
            config.execution_mode
        );
        Ok(self.cache.insert(key, descriptor))
    }

    fn detect(&self, root: &Path, config: &ExecutionConfiguration) -> EnvironmentDescriptor {
        let discovery = self.discovery();
        let local = || discovery.detect_local(root, config.project_venv.as_deref());
        let global = || discovery.detect_global(root, &self.search_path);

        match config.execution_mode {
            ExecutionMode::Global => global()
                .with_note("Execution mode set to global; workspace environments are ignored."),
            ExecutionMode::Workspace => match local() {
                Some(found) => found.with_note("Execution mode set to workspace."),
                None => global().with_kind(EnvironmentKind::Workspace).with_note(
                    "Execution mode set to workspace but no local environment was found. Using PATH fallback.",
                ),
            },
            ExecutionMode::Custom => local()
                .unwrap_or_else(global)
                .with_kind(EnvironmentKind::Custom)
                .with_note("Execution mode set to custom; applying configured overrides."),
            ExecutionMode::Auto => local().unwrap_or_else(global),
        }
    }

    fn apply_overrides(
        &self,
        mut descriptor: EnvironmentDescriptor,
        config: &ExecutionConfiguration,
    ) -> EnvironmentDescriptor {
        let slots = [
            (ExecutableSlot::Python, &config.python_path_override, "python_path"),
            (ExecutableSlot::PrimaryTool, &config.cli_path_override, "cli_path"),
            (
                ExecutableSlot::AuxiliaryTool,
                &config.tool_path_override,
                "mcp_command_path",
            ),
        ];

        for (slot, override_path, setting) in slots {
            let name = match slot {
                ExecutableSlot::Python => "Python",
                _ => self.tools.name_of(slot),
            };
            match override_path {
                Some(path) => {
                    descriptor = descriptor
                        .with_path(slot, Some(path.clone()))
                        .with_note(format!("{} executable overridden via {}.", name, setting));
                }
                None if config.execution_mode == ExecutionMode::Custom
                    && descriptor.path(slot).is_none() =>
                {
                    descriptor = descriptor.with_note(format!(
                        "Custom execution mode: {} executable is not set.",
                        name
                    ));
                }
                None => {}
            }
        }

        if descriptor.kind() == EnvironmentKind::Unknown && descriptor.has_any_executable() {
            descriptor = descriptor.with_kind(EnvironmentKind::Custom);
        }
        descriptor
    }

    /// Report which executables a directory's local environment provides.
    ///
    /// Only local candidates are inspected; PATH is ignored. Nothing is cached.
    pub fn check(&self, root: &Path, project_venv: Option<&Path>) -> EnvironmentCheck {
        let mut notes = Vec::new();
        let mut found = None;

        if !self.probe.is_dir(root) {
            notes.push(format!("Directory does not exist: {}", root.display()));
        } else {
            match self.discovery().detect_local(root, project_venv) {
                Some(descriptor) => {
                    notes.extend(descriptor.notes().iter().cloned());
                    found = Some(descriptor);
                }
                None => notes.push("No virtual environment found in target source root.".into()),
            }
        }

        let path = |slot| {
            found
                .as_ref()
                .and_then(|d| d.path(slot))
                .map(Path::to_path_buf)
        };
        let python_path = path(ExecutableSlot::Python);
        let primary_tool_path = path(ExecutableSlot::PrimaryTool);
        let auxiliary_tool_path = path(ExecutableSlot::AuxiliaryTool);

        let mut missing = Vec::new();
        if python_path.is_none() {
            missing.push("Python interpreter".to_string());
        }
        if primary_tool_path.is_none() {
            missing.push(format!("FluxLoop CLI ({})", self.tools.primary));
        }
        if auxiliary_tool_path.is_none() {
            missing.push(format!("FluxLoop MCP ({})", self.tools.auxiliary));
        }

        EnvironmentCheck {
            root: root.to_path_buf(),
            kind: found
                .as_ref()
                .map(|d| d.kind())
                .unwrap_or(EnvironmentKind::Unknown),
            has_environment: found.is_some(),
            has_python: python_path.is_some(),
            has_primary_tool: primary_tool_path.is_some(),
            has_auxiliary_tool: auxiliary_tool_path.is_some(),
            python_path,
            primary_tool_path,
            auxiliary_tool_path,
            missing,
            notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::probe::testing::{create_fake_binary, CountingFs};
    use std::fs;
    use tempfile::TempDir;

    /// Resolver isolated from the host PATH.
    fn resolver() -> EnvironmentResolver {
        EnvironmentResolver::with_probe(RealFs).with_platform(Platform::Posix)
    }

    fn config(mode: ExecutionMode) -> ExecutionConfiguration {
        ExecutionConfiguration {
            execution_mode: mode,
            ..Default::default()
        }
    }

    #[test]
    fn missing_root_is_unknown_and_uncached() {
        let temp = TempDir::new().unwrap();
        let missing = temp.path().join("gone");
        let mut resolver = resolver();

        let first = resolver.resolve(&missing, &ExecutionConfiguration::default());
        assert_eq!(first.kind(), EnvironmentKind::Unknown);
        assert!(!first.has_any_executable());
        assert_eq!(
            first.notes(),
            &[format!("Directory does not exist: {}", missing.display())]
        );
        assert_eq!(resolver.cached_len(), 0);

        let second = resolver.resolve(&missing, &ExecutionConfiguration::default());
        assert!(!Arc::ptr_eq(&first, &second));

        assert!(matches!(
            resolver.try_resolve(&missing, &ExecutionConfiguration::default()),
            Err(FluxError::NoEnvironment { .. })
        ));
    }

    #[test]
    fn end_to_end_venv_with_custom_tool_name() {
        let temp = TempDir::new().unwrap();
        let proj = temp.path().join("proj");
        create_fake_binary(&proj.join(".venv/bin/python"));
        create_fake_binary(&proj.join(".venv/bin/mytool"));

        let mut resolver = resolver().with_tools(ToolSet::new("mytool", "mytool-mcp"));
        let env = resolver.resolve(&proj, &config(ExecutionMode::Auto));

        assert_eq!(env.kind(), EnvironmentKind::Venv);
        assert_eq!(env.python_path(), Some(proj.join(".venv/bin/python").as_path()));
        assert_eq!(
            env.primary_tool_path(),
            Some(proj.join(".venv/bin/mytool").as_path())
        );
        assert!(env.auxiliary_tool_path().is_none());

        let not_found: Vec<&String> = env
            .notes()
            .iter()
            .filter(|n| n.contains("not found"))
            .collect();
        assert_eq!(not_found.len(), 1);
        assert!(not_found[0].starts_with("mytool-mcp not found under"));
        assert!(!env.notes().iter().any(|n| n.contains("No python")));
    }

    #[test]
    fn python_only_venv() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join(".venv/bin/python"));

        let mut resolver = resolver();
        let env = resolver.resolve(temp.path(), &ExecutionConfiguration::default());
        assert!(env.python_path().is_some());
        assert!(env.primary_tool_path().is_none());
        assert!(env.auxiliary_tool_path().is_none());
        assert!(env
            .notes()
            .iter()
            .any(|n| n.contains("Python found") && n.contains("tools were not found")));
    }

    #[test]
    fn cache_hit_returns_same_descriptor_without_probing() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join(".venv/bin/python"));

        let probe = CountingFs::default();
        let mut resolver = EnvironmentResolver::with_probe(probe.clone());
        let config = ExecutionConfiguration::default();

        let first = resolver.resolve(temp.path(), &config);
        let probes_after_first = probe.count();
        assert!(probes_after_first > 0);

        let second = resolver.resolve(temp.path(), &config);
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(probe.count(), probes_after_first);
    }

    #[test]
    fn clearing_cache_forces_fresh_resolution() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver();
        let config = ExecutionConfiguration::default();

        let first = resolver.resolve(temp.path(), &config);
        resolver.clear_cache();
        let second = resolver.resolve(temp.path(), &config);
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(first, second);
    }

    #[test]
    fn different_configuration_is_a_different_entry() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver();

        let auto = resolver.resolve(temp.path(), &config(ExecutionMode::Auto));
        let global = resolver.resolve(temp.path(), &config(ExecutionMode::Global));
        assert!(!Arc::ptr_eq(&auto, &global));
        assert_eq!(resolver.cached_len(), 2);
    }

    #[test]
    fn global_mode_ignores_local_environment() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join(".venv/bin/python"));
        let path_dir = temp.path().join("usr-bin");
        create_fake_binary(&path_dir.join("fluxloop"));

        let mut resolver = resolver().with_search_path(vec![path_dir.clone()]);
        let env = resolver.resolve(temp.path(), &config(ExecutionMode::Global));

        assert_eq!(env.kind(), EnvironmentKind::Global);
        assert!(env.environment_dir().is_none());
        assert!(env.python_path().is_none());
        assert_eq!(env.primary_tool_path(), Some(path_dir.join("fluxloop").as_path()));
        assert_eq!(
            env.notes().last().map(String::as_str),
            Some("Execution mode set to global; workspace environments are ignored.")
        );
    }

    #[test]
    fn workspace_mode_labels_path_fallback() {
        let temp = TempDir::new().unwrap();
        let path_dir = temp.path().join("usr-bin");
        create_fake_binary(&path_dir.join("fluxloop"));

        let mut resolver = resolver().with_search_path(vec![path_dir.clone()]);
        let env = resolver.resolve(temp.path(), &config(ExecutionMode::Workspace));

        assert_eq!(env.kind(), EnvironmentKind::Workspace);
        assert!(env.environment_dir().is_none());
        assert_eq!(env.primary_tool_path(), Some(path_dir.join("fluxloop").as_path()));
        assert!(env
            .notes()
            .iter()
            .any(|n| n.ends_with("Using PATH fallback.")));
    }

    #[test]
    fn workspace_mode_keeps_local_kind() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join("venv/bin/fluxloop"));

        let mut resolver = resolver();
        let env = resolver.resolve(temp.path(), &config(ExecutionMode::Workspace));
        assert_eq!(env.kind(), EnvironmentKind::Venv);
        assert!(env
            .notes()
            .contains(&"Execution mode set to workspace.".to_string()));
    }

    #[test]
    fn custom_mode_flags_missing_overrides() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver();
        let config = ExecutionConfiguration {
            execution_mode: ExecutionMode::Custom,
            python_path_override: Some(PathBuf::from("/opt/py/bin/python")),
            ..Default::default()
        };
        let env = resolver.resolve(temp.path(), &config);

        assert_eq!(env.kind(), EnvironmentKind::Custom);
        assert_eq!(env.python_path(), Some(Path::new("/opt/py/bin/python")));
        let notes = env.notes();
        assert!(notes.contains(&"Python executable overridden via python_path.".to_string()));
        assert!(notes.contains(&"Custom execution mode: fluxloop executable is not set.".to_string()));
        assert!(notes
            .contains(&"Custom execution mode: fluxloop-mcp executable is not set.".to_string()));
    }

    #[test]
    fn override_wins_over_discovery() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join(".venv/bin/python"));
        create_fake_binary(&temp.path().join(".venv/bin/fluxloop-mcp"));

        let mut resolver = resolver();
        let config = ExecutionConfiguration {
            python_path_override: Some(PathBuf::from("/elsewhere/python")),
            tool_path_override: Some(PathBuf::from("/elsewhere/fluxloop-mcp")),
            ..Default::default()
        };
        let env = resolver.resolve(temp.path(), &config);

        assert_eq!(env.kind(), EnvironmentKind::Venv);
        assert_eq!(env.python_path(), Some(Path::new("/elsewhere/python")));
        assert_eq!(
            env.auxiliary_tool_path(),
            Some(Path::new("/elsewhere/fluxloop-mcp"))
        );
        assert!(env
            .notes()
            .contains(&"fluxloop-mcp executable overridden via mcp_command_path.".to_string()));
    }

    #[test]
    fn override_on_empty_result_is_custom() {
        let temp = TempDir::new().unwrap();
        let mut resolver = resolver();
        let config = ExecutionConfiguration {
            cli_path_override: Some(PathBuf::from("/opt/fluxloop")),
            ..Default::default()
        };
        let env = resolver.resolve(temp.path(), &config);
        assert_eq!(env.kind(), EnvironmentKind::Custom);
        assert!(env.satisfies_kind_invariant());
    }

    #[test]
    fn project_venv_is_searched_last() {
        let temp = TempDir::new().unwrap();
        let src_venv = temp.path().join("src/.venv");
        create_fake_binary(&src_venv.join("bin/fluxloop"));

        let mut resolver = resolver();
        let without = resolver.resolve(temp.path(), &ExecutionConfiguration::default());
        assert_eq!(without.kind(), EnvironmentKind::Unknown);

        let with = resolver.resolve(
            temp.path(),
            &ExecutionConfiguration {
                project_venv: Some(src_venv.clone()),
                ..Default::default()
            },
        );
        assert_eq!(with.kind(), EnvironmentKind::Venv);
        assert_eq!(with.environment_dir(), Some(src_venv.as_path()));
    }

    #[test]
    fn check_reports_missing_labels() {
        let temp = TempDir::new().unwrap();
        create_fake_binary(&temp.path().join(".venv/bin/python"));
        create_fake_binary(&temp.path().join(".venv/bin/fluxloop"));

        let check = resolver().check(temp.path(), None);
        assert!(check.has_environment);
        assert!(check.has_python);
        assert!(check.has_primary_tool);
        assert!(!check.has_auxiliary_tool);
        assert_eq!(check.missing, vec!["FluxLoop MCP (fluxloop-mcp)".to_string()]);
        assert!(!check.is_ready());
    }

    #[test]
    fn check_on_missing_directory() {
        let temp = TempDir::new().unwrap();
        let check = resolver().check(&temp.path().join("nope"), None);
        assert!(!check.has_environment);
        assert_eq!(check.kind, EnvironmentKind::Unknown);
        assert_eq!(check.missing.len(), 3);
        assert!(check.notes[0].starts_with("Directory does not exist"));
    }

    #[test]
    fn check_on_empty_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".venv")).unwrap();
        let check = resolver().check(temp.path(), None);
        assert!(!check.has_environment);
        assert_eq!(
            check.notes,
            vec!["No virtual environment found in target source root.".to_string()]
        );
    }
}

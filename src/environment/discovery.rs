//! Local and PATH-based environment discovery.
//!
//! Discovery never fails: anything it cannot find is recorded as a note
//! on the returned descriptor.

use super::descriptor::{
    EnvironmentDescriptor, EnvironmentKind, ExecutableSlot, ToolSet, GLOBAL_PYTHON_NAMES,
    PYTHON_NAME,
};
use super::probe::{find_in_dir, find_on_path, FileProbe};
use crate::shell::Platform;
use std::path::{Path, PathBuf};

/// Directory names searched under the root, in priority order.
const LOCAL_CANDIDATES: [(&str, EnvironmentKind); 5] = [
    (".venv", EnvironmentKind::Venv),
    ("venv", EnvironmentKind::Venv),
    ("env", EnvironmentKind::Venv),
    (".env", EnvironmentKind::Venv),
    (".conda", EnvironmentKind::Conda),
];

/// A directory that may hold an environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateDir {
    pub path: PathBuf,
    pub kind: EnvironmentKind,
}

/// Scans the filesystem for executables.
pub struct Discovery<'a> {
    probe: &'a dyn FileProbe,
    platform: Platform,
    tools: &'a ToolSet,
}

impl<'a> Discovery<'a> {
    pub fn new(probe: &'a dyn FileProbe, platform: Platform, tools: &'a ToolSet) -> Self {
        Self {
            probe,
            platform,
            tools,
        }
    }

    /// Existing candidate directories under `root`, followed by the project's
    /// own `.venv` when it is not already among them.
    pub fn candidate_dirs(&self, root: &Path, project_venv: Option<&Path>) -> Vec<CandidateDir> {
        let mut candidates: Vec<CandidateDir> = LOCAL_CANDIDATES
            .iter()
            .map(|(name, kind)| CandidateDir {
                path: root.join(name),
                kind: *kind,
            })
            .collect();

        if let Some(venv) = project_venv {
            if !candidates.iter().any(|c| c.path == venv) {
                candidates.push(CandidateDir {
                    path: venv.to_path_buf(),
                    kind: EnvironmentKind::Venv,
                });
            }
        }

        candidates.retain(|c| self.probe.is_dir(&c.path));
        candidates
    }

    /// Inspect one candidate. Returns `None` when it holds none of the
    /// three executables.
    pub fn inspect(&self, root: &Path, candidate: &CandidateDir) -> Option<EnvironmentDescriptor> {
        let bin = candidate.path.join(self.platform.bin_dir_name());
        let python = find_in_dir(self.probe, &bin, PYTHON_NAME, self.platform);
        let primary = find_in_dir(self.probe, &bin, &self.tools.primary, self.platform);
        let auxiliary = find_in_dir(self.probe, &bin, &self.tools.auxiliary, self.platform);

        if python.is_none() && primary.is_none() && auxiliary.is_none() {
            return None;
        }

        let mut descriptor = EnvironmentDescriptor::new(root, candidate.kind)
            .with_environment_dir(Some(candidate.path.clone()));

        if python.is_none() {
            descriptor = descriptor.with_note(format!(
                "No python executable found under {}",
                candidate.path.display()
            ));
        }
        if primary.is_none() {
            descriptor = descriptor.with_note(format!(
                "{} not found under {}",
                self.tools.primary,
                bin.display()
            ));
        }
        if auxiliary.is_none() {
            descriptor = descriptor.with_note(format!(
                "{} not found under {}",
                self.tools.auxiliary,
                bin.display()
            ));
        }
        if python.is_some() && primary.is_none() && auxiliary.is_none() {
            descriptor = descriptor
                .with_note("Python found, but fluxloop tools were not found in this environment.");
        }

        Some(
            descriptor
                .with_path(ExecutableSlot::Python, python)
                .with_path(ExecutableSlot::PrimaryTool, primary)
                .with_path(ExecutableSlot::AuxiliaryTool, auxiliary),
        )
    }

    /// The first candidate directory that holds any executable.
    pub fn detect_local(
        &self,
        root: &Path,
        project_venv: Option<&Path>,
    ) -> Option<EnvironmentDescriptor> {
        self.candidate_dirs(root, project_venv)
            .iter()
            .find_map(|candidate| self.inspect(root, candidate))
    }

    /// Search PATH for the interpreter and both tools.
    ///
    /// The result is `Global` when anything was found and `Unknown` otherwise.
    pub fn detect_global(&self, root: &Path, search_path: &[PathBuf]) -> EnvironmentDescriptor {
        let mut descriptor = EnvironmentDescriptor::new(root, EnvironmentKind::Unknown).with_note(
            format!("Inspecting global PATH for {} executables.", self.tools.primary),
        );

        let python = GLOBAL_PYTHON_NAMES
            .iter()
            .find_map(|name| find_on_path(self.probe, name, search_path, self.platform));
        if python.is_none() {
            descriptor = descriptor.with_note("Global python interpreter not found on PATH.");
        }

        let primary = find_on_path(self.probe, &self.tools.primary, search_path, self.platform);
        if primary.is_none() {
            descriptor =
                descriptor.with_note(format!("{} not found on PATH.", self.tools.primary));
        }

        let auxiliary = find_on_path(self.probe, &self.tools.auxiliary, search_path, self.platform);
        if auxiliary.is_none() {
            descriptor =
                descriptor.with_note(format!("{} not found on PATH.", self.tools.auxiliary));
        }

        let descriptor = descriptor
            .with_path(ExecutableSlot::Python, python)
            .with_path(ExecutableSlot::PrimaryTool, primary)
            .with_path(ExecutableSlot::AuxiliaryTool, auxiliary);

        if descriptor.has_any_executable() {
            descriptor.with_kind(EnvironmentKind::Global)
        } else {
            descriptor
        }
    }
}

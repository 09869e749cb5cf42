//! Resolved execution environment.

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Where a resolved environment came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EnvironmentKind {
    /// A virtualenv directory under the root.
    Venv,
    /// A `.conda` directory under the root.
    Conda,
    /// Workspace mode, including its PATH fallback.
    Workspace,
    /// Executables found on PATH.
    Global,
    /// Custom mode, or overrides filling an otherwise empty result.
    Custom,
    /// Nothing was found.
    Unknown,
}

impl fmt::Display for EnvironmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EnvironmentKind::Venv => "venv",
            EnvironmentKind::Conda => "conda",
            EnvironmentKind::Workspace => "workspace",
            EnvironmentKind::Global => "global",
            EnvironmentKind::Custom => "custom",
            EnvironmentKind::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// The three executables an environment can provide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExecutableSlot {
    Python,
    PrimaryTool,
    AuxiliaryTool,
}

/// Logical names of the tools resolved alongside the interpreter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ToolSet {
    /// The main CLI (`fluxloop`).
    pub primary: String,
    /// The auxiliary documentation tool (`fluxloop-mcp`).
    pub auxiliary: String,
}

/// Interpreter name probed inside environment directories.
pub const PYTHON_NAME: &str = "python";

/// Interpreter names probed on PATH, in order.
pub const GLOBAL_PYTHON_NAMES: [&str; 2] = ["python3", "python"];

impl Default for ToolSet {
    fn default() -> Self {
        Self {
            primary: "fluxloop".to_string(),
            auxiliary: "fluxloop-mcp".to_string(),
        }
    }
}

impl ToolSet {
    /// Create a tool set with custom names.
    pub fn new(primary: impl Into<String>, auxiliary: impl Into<String>) -> Self {
        Self {
            primary: primary.into(),
            auxiliary: auxiliary.into(),
        }
    }

    /// Map a logical command name (or a path to one) onto a slot.
    ///
    /// Matching uses the file name without a Windows executable suffix, so
    /// `fluxloop.exe` and `/usr/bin/python3` both resolve.
    pub fn slot_for(&self, command: &str) -> Option<ExecutableSlot> {
        let base = Path::new(command)
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(command)
            .to_lowercase();
        let base = [".exe", ".cmd", ".bat"]
            .iter()
            .find_map(|suffix| base.strip_suffix(suffix))
            .unwrap_or(&base);

        if base == PYTHON_NAME || GLOBAL_PYTHON_NAMES.contains(&base) {
            Some(ExecutableSlot::Python)
        } else if base == self.auxiliary.to_lowercase() {
            Some(ExecutableSlot::AuxiliaryTool)
        } else if base == self.primary.to_lowercase() {
            Some(ExecutableSlot::PrimaryTool)
        } else {
            None
        }
    }

    /// Display name of a slot.
    pub fn name_of(&self, slot: ExecutableSlot) -> &str {
        match slot {
            ExecutableSlot::Python => PYTHON_NAME,
            ExecutableSlot::PrimaryTool => &self.primary,
            ExecutableSlot::AuxiliaryTool => &self.auxiliary,
        }
    }
}

/// One resolved execution environment.
///
/// Descriptors are shared behind `Arc` and never mutated; the `with_*`
/// methods consume and return a modified copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentDescriptor {
    root: PathBuf,
    environment_dir: Option<PathBuf>,
    python_path: Option<PathBuf>,
    primary_tool_path: Option<PathBuf>,
    auxiliary_tool_path: Option<PathBuf>,
    kind: EnvironmentKind,
    notes: Vec<String>,
}

impl EnvironmentDescriptor {
    /// Create an empty descriptor anchored at `root`.
    pub fn new(root: impl Into<PathBuf>, kind: EnvironmentKind) -> Self {
        Self {
            root: root.into(),
            environment_dir: None,
            python_path: None,
            primary_tool_path: None,
            auxiliary_tool_path: None,
            kind,
            notes: Vec::new(),
        }
    }

    /// Descriptor for a root that cannot be searched.
    pub fn unknown(root: impl Into<PathBuf>, note: impl Into<String>) -> Self {
        Self::new(root, EnvironmentKind::Unknown).with_note(note)
    }

    pub fn with_environment_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.environment_dir = dir;
        self
    }

    pub fn with_path(mut self, slot: ExecutableSlot, path: Option<PathBuf>) -> Self {
        match slot {
            ExecutableSlot::Python => self.python_path = path,
            ExecutableSlot::PrimaryTool => self.primary_tool_path = path,
            ExecutableSlot::AuxiliaryTool => self.auxiliary_tool_path = path,
        }
        self
    }

    pub fn with_kind(mut self, kind: EnvironmentKind) -> Self {
        self.kind = kind;
        self
    }

    /// Append a diagnostic note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The candidate directory that won the local scan, if any.
    pub fn environment_dir(&self) -> Option<&Path> {
        self.environment_dir.as_deref()
    }

    pub fn python_path(&self) -> Option<&Path> {
        self.python_path.as_deref()
    }

    pub fn primary_tool_path(&self) -> Option<&Path> {
        self.primary_tool_path.as_deref()
    }

    pub fn auxiliary_tool_path(&self) -> Option<&Path> {
        self.auxiliary_tool_path.as_deref()
    }

    /// Path for a slot.
    pub fn path(&self, slot: ExecutableSlot) -> Option<&Path> {
        match slot {
            ExecutableSlot::Python => self.python_path(),
            ExecutableSlot::PrimaryTool => self.primary_tool_path(),
            ExecutableSlot::AuxiliaryTool => self.auxiliary_tool_path(),
        }
    }

    pub fn kind(&self) -> EnvironmentKind {
        self.kind
    }

    pub fn notes(&self) -> &[String] {
        &self.notes
    }

    /// Whether any executable was found.
    pub fn has_any_executable(&self) -> bool {
        self.python_path.is_some()
            || self.primary_tool_path.is_some()
            || self.auxiliary_tool_path.is_some()
    }

    /// `Unknown` is only used when nothing was found.
    pub fn satisfies_kind_invariant(&self) -> bool {
        self.kind != EnvironmentKind::Unknown || !self.has_any_executable()
    }

    /// Directories to prepend to PATH, deduplicated and in priority order:
    /// the environment's own bin directory, then the directory of each
    /// executable.
    pub fn bin_directories(&self, bin_dir_name: &str) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = Vec::new();
        let mut push = |dir: PathBuf| {
            if !dir.as_os_str().is_empty() && !dirs.contains(&dir) {
                dirs.push(dir);
            }
        };

        if let Some(env_dir) = &self.environment_dir {
            push(env_dir.join(bin_dir_name));
        }
        for path in [
            &self.python_path,
            &self.primary_tool_path,
            &self.auxiliary_tool_path,
        ]
        .into_iter()
        .flatten()
        {
            if let Some(parent) = path.parent() {
                push(parent.to_path_buf());
            }
        }

        dirs
    }
}

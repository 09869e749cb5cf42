//! Filesystem probing for executables.

use crate::shell::Platform;
use std::path::{Path, PathBuf};

/// Read-only view of the filesystem used during discovery.
///
/// Resolution only ever asks these three questions, which keeps it
/// testable against an instrumented or in-memory implementation.
pub trait FileProbe {
    fn is_dir(&self, path: &Path) -> bool;

    fn is_file(&self, path: &Path) -> bool;

    /// Whether `path` is a regular file the current user may execute.
    fn is_executable(&self, path: &Path) -> bool;
}

/// The real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct RealFs;

impl FileProbe for RealFs {
    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn is_file(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn is_executable(&self, path: &Path) -> bool {
        path.is_file() && is_executable(path)
    }
}

/// Check whether a file has executable permission bits set.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    path.metadata()
        .map(|m| m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// On Windows, executability is determined by file extension, not permission bits.
#[cfg(not(unix))]
pub fn is_executable(_path: &Path) -> bool {
    true
}

/// Find `name` inside `dir`, trying each platform suffix in order.
pub fn find_in_dir(
    probe: &dyn FileProbe,
    dir: &Path,
    name: &str,
    platform: Platform,
) -> Option<PathBuf> {
    platform
        .executable_suffixes()
        .iter()
        .map(|suffix| dir.join(format!("{}{}", name, suffix)))
        .find(|candidate| probe.is_file(candidate))
}

/// Resolve an executable by iterating over PATH entries.
///
/// Returns the first match that exists and is executable.
pub fn find_on_path(
    probe: &dyn FileProbe,
    name: &str,
    path_entries: &[PathBuf],
    platform: Platform,
) -> Option<PathBuf> {
    path_entries.iter().find_map(|dir| {
        platform
            .executable_suffixes()
            .iter()
            .map(|suffix| dir.join(format!("{}{}", name, suffix)))
            .find(|candidate| probe.is_executable(candidate))
    })
}

/// Parse the system PATH environment variable into a list of directories.
pub fn parse_system_path() -> Vec<PathBuf> {
    std::env::var_os("PATH")
        .map(|path| std::env::split_paths(&path).collect())
        .unwrap_or_default()
}

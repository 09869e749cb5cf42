//! Platform conventions for executables, PATH handling, and shells.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

/// Host operating-system family.
///
/// Resolution and quoting take the platform as a value so both conventions
/// can be exercised from any host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Platform {
    /// Linux, macOS and other POSIX-like systems.
    Posix,
    /// Windows (`cmd`, `Scripts/`, `.exe`).
    Windows,
}

impl Platform {
    /// The platform this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else {
            Platform::Posix
        }
    }

    /// Name of the executables directory inside a virtual environment.
    pub fn bin_dir_name(&self) -> &'static str {
        match self {
            Platform::Posix => "bin",
            Platform::Windows => "Scripts",
        }
    }

    /// Suffixes probed after an executable name, in order.
    pub fn executable_suffixes(&self) -> &'static [&'static str] {
        match self {
            Platform::Posix => &["", ".sh"],
            Platform::Windows => &[".exe", ".cmd", ".bat", ""],
        }
    }

    /// Separator between PATH entries.
    pub fn path_separator(&self) -> char {
        match self {
            Platform::Posix => ':',
            Platform::Windows => ';',
        }
    }

    /// Environment keys that carry the search path.
    ///
    /// Windows environments commonly spell it `Path`; both are written.
    pub fn path_keys(&self) -> &'static [&'static str] {
        match self {
            Platform::Posix => &["PATH"],
            Platform::Windows => &["PATH", "Path"],
        }
    }

    /// Split a PATH value into its entries, dropping empty segments.
    ///
    /// Values that are not valid Unicode can only come from the host, so
    /// they are split with the host's own rules.
    pub fn split_path(&self, value: &OsStr) -> Vec<PathBuf> {
        match value.to_str() {
            Some(text) => text
                .split(self.path_separator())
                .filter(|segment| !segment.is_empty())
                .map(PathBuf::from)
                .collect(),
            None => std::env::split_paths(value)
                .filter(|entry| !entry.as_os_str().is_empty())
                .collect(),
        }
    }

    /// Join PATH entries with this platform's separator.
    pub fn join_path(&self, entries: &[PathBuf]) -> OsString {
        let mut joined = OsString::new();
        for (i, entry) in entries.iter().enumerate() {
            if i > 0 {
                joined.push(self.path_separator().to_string());
            }
            joined.push(entry);
        }
        joined
    }
}

/// Shell used to run interactive command lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellInfo {
    /// Shell executable.
    pub executable: PathBuf,
    /// Flag that passes a command string to the shell.
    pub command_flag: &'static str,
}

/// Detect the shell for the current platform.
///
/// Uses `$SHELL` (falling back to `/bin/sh`) on POSIX and `%COMSPEC%`
/// (falling back to `cmd.exe`) on Windows. The POSIX flag is plain `-c`:
/// a login shell would re-read rc files and could reorder the PATH that
/// the dispatcher prepared.
pub fn detect_shell() -> ShellInfo {
    match Platform::current() {
        Platform::Windows => ShellInfo {
            executable: std::env::var("COMSPEC")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("cmd.exe")),
            command_flag: "/C",
        },
        Platform::Posix => ShellInfo {
            executable: std::env::var("SHELL")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("/bin/sh")),
            command_flag: "-c",
        },
    }
}

/// Check if running in a CI environment.
///
/// Used to force non-interactive mode in `main()`.
pub fn is_ci() -> bool {
    std::env::var("CI").is_ok()
        || std::env::var("GITHUB_ACTIONS").is_ok()
        || std::env::var("GITLAB_CI").is_ok()
        || std::env::var("CIRCLECI").is_ok()
        || std::env::var("TRAVIS").is_ok()
        || std::env::var("JENKINS_URL").is_ok()
}

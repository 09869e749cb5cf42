//! Environment variables for dispatched processes.

use std::ffi::{OsStr, OsString};
use std::path::PathBuf;

use crate::environment::EnvironmentDescriptor;
use crate::shell::{EnvMap, Platform};

/// Snapshot of the current process environment, including variables that
/// are not valid Unicode.
pub fn snapshot() -> EnvMap {
    std::env::vars_os().collect()
}

/// Build the environment for a child process.
///
/// Starts from `base`, prepends the descriptor's bin directories to the
/// search path, then applies `extra` (later entries win). On Windows both
/// `PATH` and `Path` are written.
pub fn process_env(
    mut base: EnvMap,
    descriptor: Option<&EnvironmentDescriptor>,
    extra: &[(String, String)],
    platform: Platform,
) -> EnvMap {
    if let Some(descriptor) = descriptor {
        let bin_dirs = descriptor.bin_directories(platform.bin_dir_name());
        if !bin_dirs.is_empty() {
            let inherited = platform
                .path_keys()
                .iter()
                .find_map(|key| base.get(OsStr::new(key)))
                .map(|value| platform.split_path(value))
                .unwrap_or_default();

            let mut entries: Vec<PathBuf> = Vec::with_capacity(bin_dirs.len() + inherited.len());
            for entry in bin_dirs.into_iter().chain(inherited) {
                if !entries.contains(&entry) {
                    entries.push(entry);
                }
            }

            let combined = platform.join_path(&entries);
            for key in platform.path_keys() {
                base.insert(OsString::from(*key), combined.clone());
            }
        }
    }

    for (key, value) in extra {
        base.insert(OsString::from(key), OsString::from(value));
    }
    base
}

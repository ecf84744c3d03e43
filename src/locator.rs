//! Executable lookup over the directories of `PATH`.
//!
//! Nothing is cached: every call rescans the directories, so executables that
//! appear or disappear between two prompts are picked up immediately.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

/// Ordered list of directories searched for bare command names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchPath {
    dirs: Vec<PathBuf>,
}

impl SearchPath {
    pub fn new(dirs: Vec<PathBuf>) -> Self {
        Self { dirs }
    }

    /// Splits a `PATH`-style value using the platform separator.
    pub fn parse(value: impl AsRef<OsStr>) -> Self {
        Self::new(std::env::split_paths(value.as_ref()).collect())
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }

    /// Resolve a command name the way a typical shell would.
    ///
    /// Behavior:
    /// - Empty name: `None`.
    /// - Name of an existing regular file (`/bin/sh`, `./foo`, or a bare `foo`
    ///   in the working directory): returned as-is, without looking at the
    ///   search path.
    /// - Otherwise the first directory, in order, holding a regular executable
    ///   file of that name wins. Missing directories are skipped.
    pub fn locate(&self, name: &str) -> Option<PathBuf> {
        if name.is_empty() {
            return None;
        }

        let path = Path::new(name);
        if path.is_file() {
            return Some(path.to_path_buf());
        }

        self.dirs
            .iter()
            .map(|dir| dir.join(name))
            .find(|candidate| is_executable(candidate))
    }

    /// Names of executables, across all directories, that start with `prefix`.
    ///
    /// Directory order does not matter here; duplicates collapse and the result is sorted.
    pub fn candidates(&self, prefix: &str) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        for dir in &self.dirs {
            let Ok(entries) = fs::read_dir(dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let Ok(name) = entry.file_name().into_string() else {
                    continue;
                };
                if name.starts_with(prefix) && is_executable(&entry.path()) {
                    names.insert(name);
                }
            }
        }
        names
    }
}

/// Regular file with at least one execute bit set. Symlinks are followed.
#[cfg(unix)]
pub fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;
    fs::metadata(path)
        .map(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

#[cfg(not(unix))]
pub fn is_executable(path: &Path) -> bool {
    path.is_file()
}

//! Path-string helpers used in front of the guard.
//!
//! Directory paths are spelled with a trailing `/`, file paths without one.

use std::path::{Component, Path, PathBuf};

use crate::core::security::normalize;

/// Base directory that relative inputs are resolved against.
///
/// Built once from configuration and passed around explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkDir {
    base: PathBuf,
}

impl WorkDir {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn as_path(&self) -> &Path {
        &self.base
    }

    /// Resolve `path` against the work directory.
    ///
    /// Absolute inputs are kept as they are. `..` is not folded, so the
    /// result names the same entry the kernel would reach.
    pub fn absolute(&self, path: impl AsRef<Path>) -> PathBuf {
        self.base.join(path)
    }

    /// Join `file` under the work directory without letting it escape.
    pub fn join(&self, file: impl AsRef<Path>) -> PathBuf {
        join_within(&self.base, file)
    }
}

/// Join `file` onto `base`; if the result would leave `base`, return `base`.
///
/// A leading `/` in `file` does not reset the join.
pub fn join_within(base: impl AsRef<Path>, file: impl AsRef<Path>) -> PathBuf {
    let base = normalize(base.as_ref());
    let relative: PathBuf = file
        .as_ref()
        .components()
        .filter(|c| !matches!(c, Component::RootDir | Component::Prefix(_)))
        .collect();
    let joined = normalize(&base.join(relative));
    if joined.starts_with(&base) {
        joined
    } else {
        base
    }
}

/// Whether `path` names a directory, i.e. ends with `/`.
pub fn is_directory(path: &str) -> bool {
    path.ends_with('/')
}

/// Ensure `path` ends with `/`. Empty input is the root.
pub fn enforce_directory(path: &str) -> String {
    if path.is_empty() {
        "/".to_string()
    } else if is_directory(path) {
        path.to_string()
    } else {
        format!("{path}/")
    }
}

/// Split `path` into its directory (with trailing `/`) and file name.
///
/// Directory paths yield an empty file name. Empty input is the root.
pub fn split_path(path: &str) -> (String, String) {
    let path = if path.is_empty() { "/" } else { path };
    let filename = if is_directory(path) {
        ""
    } else {
        path.rsplit_once('/').map_or(path, |(_, name)| name)
    };
    let root = &path[..path.len() - filename.len()];
    let root = if root.is_empty() { "/" } else { root };
    (root.to_string(), filename.to_string())
}

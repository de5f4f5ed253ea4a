//! Lexical path cleaning.
//!
//! Pure string-level operations; nothing here touches the filesystem except
//! [`absolute`], which reads the process working directory.

use std::io;
use std::path::{Component, Path, PathBuf};

/// Lexically normalize a path.
///
/// Collapses repeated separators, drops `.` segments and folds `..` into its
/// parent. `..` directly under the root stays at the root; leading `..` of a
/// relative path is kept. An empty result becomes `.`.
pub fn normalize(path: &Path) -> PathBuf {
    let mut parts: Vec<Component<'_>> = Vec::new();

    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match parts.last() {
                Some(Component::Normal(_)) => {
                    parts.pop();
                }
                Some(Component::RootDir | Component::Prefix(_)) => {}
                _ => parts.push(component),
            },
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        return PathBuf::from(".");
    }
    parts.iter().collect()
}

/// Absolute form of `path`, interpreted against the process cwd.
///
/// `..` segments are left in place: they must be resolved by the kernel,
/// after any symlink in front of them, exactly as the native call will.
pub fn absolute(path: &Path) -> io::Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(path))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(s: &str) -> PathBuf {
        normalize(Path::new(s))
    }

    #[test]
    fn test_collapses_separators_and_dots() {
        assert_eq!(norm("/a//b/./c/"), PathBuf::from("/a/b/c"));
        assert_eq!(norm("./a/./b"), PathBuf::from("a/b"));
    }

    #[test]
    fn test_folds_parent_segments() {
        assert_eq!(norm("/a/b/../c"), PathBuf::from("/a/c"));
        assert_eq!(norm("/a/b/../../.."), PathBuf::from("/"));
        assert_eq!(norm("a/../../b"), PathBuf::from("../b"));
    }

    #[test]
    fn test_empty_and_root() {
        assert_eq!(norm(""), PathBuf::from("."));
        assert_eq!(norm("a/.."), PathBuf::from("."));
        assert_eq!(norm("/"), PathBuf::from("/"));
        assert_eq!(norm("/.."), PathBuf::from("/"));
    }

    #[test]
    fn test_absolute_joins_cwd_without_folding() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(absolute(Path::new("x/../y")).unwrap(), cwd.join("x/../y"));
        assert_eq!(absolute(Path::new("")).unwrap(), cwd);
        assert_eq!(absolute(Path::new("/a/../b")).unwrap(), PathBuf::from("/a/../b"));
    }
}

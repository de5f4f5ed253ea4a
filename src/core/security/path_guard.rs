use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::normalize::{absolute, normalize};
use crate::core::error::{Error, Result};

/// A gate consulted before every guarded filesystem call.
pub trait Verifier: Send + Sync {
    /// Succeeds only if `path` is safe to hand to a native filesystem call.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Rejected`] when the path must not be used.
    fn verify_safe(&self, path: &Path) -> Result<()>;
}

/// Why a path was refused. Internal detail: logged, never returned.
#[derive(Debug, thiserror::Error)]
pub(crate) enum Rejection {
    #[error("'{requested}' resolves to '{resolved}'")]
    SymlinkDivergence { requested: PathBuf, resolved: PathBuf },

    #[error("'{path}' is a dangling symlink")]
    DanglingSymlink { path: PathBuf },

    #[error("cannot resolve '{path}': {source}")]
    Resolution {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Rejection {
    fn reason(&self) -> UnsafeReason {
        match self {
            Self::SymlinkDivergence { .. } => UnsafeReason::Symlink,
            Self::DanglingSymlink { .. } => UnsafeReason::DanglingSymlink,
            Self::Resolution { .. } => UnsafeReason::Unresolvable,
        }
    }
}

/// Coarse category of an unsafe verdict. Carries no path information.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnsafeReason {
    /// A symbolic link sits somewhere on the existing part of the path.
    Symlink,
    /// The deepest existing entry is a symbolic link with a missing target.
    DanglingSymlink,
    /// The path could not be resolved for a reason other than "not found".
    Unresolvable,
}

/// Outcome of evaluating one candidate path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "reason", rename_all = "snake_case")]
pub enum Verdict {
    Safe,
    Unsafe(UnsafeReason),
}

impl Verdict {
    pub fn is_safe(&self) -> bool {
        matches!(self, Self::Safe)
    }
}

/// Refuses any path with a symbolic link in its existing ancestor chain.
///
/// The guard resolves the longest existing prefix of the requested path and
/// requires the result to equal that prefix after lexical normalization. A
/// leaf that does not exist yet is accepted as long as everything above it is
/// clean, so the guard can precede `mkdir` and `open(O_CREAT)`.
///
/// Stateless: every call observes the filesystem as it is at that moment.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathGuard;

impl PathGuard {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate `path` and report a verdict without logging.
    pub fn verdict(&self, path: impl AsRef<Path>) -> Verdict {
        match self.inspect(path.as_ref()) {
            Ok(()) => Verdict::Safe,
            Err(rejection) => Verdict::Unsafe(rejection.reason()),
        }
    }

    /// Walk upward from `path` to its longest existing prefix and compare
    /// that prefix with its fully resolved form.
    ///
    /// The prefix handed to the kernel keeps its `..` segments, so a link
    /// followed by `..` resolves the same way it will for the native call.
    pub(crate) fn inspect(&self, path: &Path) -> std::result::Result<(), Rejection> {
        let mut candidate = absolute(path).map_err(|source| Rejection::Resolution {
            path: path.to_path_buf(),
            source,
        })?;

        // Each pass drops one trailing component; `/` always resolves.
        loop {
            match fs::canonicalize(&candidate) {
                Ok(resolved) => {
                    let requested = normalize(&candidate);
                    if resolved == requested {
                        return Ok(());
                    }
                    return Err(Rejection::SymlinkDivergence {
                        requested: candidate,
                        resolved,
                    });
                }
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    let is_link = fs::symlink_metadata(&candidate)
                        .is_ok_and(|meta| meta.file_type().is_symlink());
                    if is_link {
                        return Err(Rejection::DanglingSymlink { path: candidate });
                    }
                    if !candidate.pop() {
                        return Err(Rejection::Resolution {
                            path: candidate,
                            source: e,
                        });
                    }
                }
                Err(source) => {
                    return Err(Rejection::Resolution {
                        path: candidate,
                        source,
                    });
                }
            }
        }
    }
}

impl Verifier for PathGuard {
    fn verify_safe(&self, path: &Path) -> Result<()> {
        self.inspect(path).map_err(|rejection| {
            debug!(path = %path.display(), error = %rejection, "path rejected by guard");
            Error::Rejected
        })
    }
}

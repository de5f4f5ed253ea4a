//! Symlink-safe filesystem operations.
//!
//! This crate puts a path guard in front of `open`, `mkdir`, `remove`,
//! `remove_all` and `rename`. An operation only reaches the OS when no
//! symbolic link appears anywhere in the existing part of its path(s).
//!
//! # Architecture
//!
//! - **core**: configuration, error handling and the path guard
//! - **fs**: guarded operations and path-string helpers
//!
//! # Example
//!
//! ```rust,no_run
//! use safefs::{GuardedFs, OpenFlags};
//!
//! fn main() -> safefs::Result<()> {
//!     let gfs = GuardedFs::new();
//!     gfs.mkdir("/srv/data/incoming", 0o755)?;
//!     let _file = gfs.open("/srv/data/incoming/report.txt", &OpenFlags::write_truncate(0o644))?;
//!     gfs.rename("/srv/data/incoming/report.txt", "/srv/data/report.txt")?;
//!     Ok(())
//! }
//! ```

#[cfg(not(unix))]
compile_error!("safefs relies on POSIX symlink semantics and O_NOFOLLOW");

pub mod core;
pub mod fs;

// Re-export commonly used types for convenience
pub use crate::core::{Config, Error, PathGuard, Result, UnsafeReason, Verdict, Verifier};
pub use crate::fs::{GuardedFs, OpenFlags, WorkDir};

//! Guarded filesystem operations and the path helpers that feed them.

pub mod guarded;
pub mod paths;

pub use guarded::{GuardedFs, OpenFlags};
pub use paths::{WorkDir, enforce_directory, is_directory, join_within, split_path};

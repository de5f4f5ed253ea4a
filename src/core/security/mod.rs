// Security module for symlink-safe path verification
//
// This module decides whether a path may be handed to a native filesystem
// call. A path is accepted only when no symbolic link appears anywhere in
// the existing part of it.

pub mod normalize;
pub mod path_guard;

pub use normalize::{absolute, normalize};
pub use path_guard::{PathGuard, UnsafeReason, Verdict, Verifier};

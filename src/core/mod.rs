//! Core module containing shared infrastructure components.
//!
//! This module provides the building blocks every guarded operation relies
//! on: configuration, error handling and the path guard itself.

pub mod config;
pub mod error;
pub mod security;

pub use config::Config;
pub use error::{Error, Result};
pub use security::{PathGuard, UnsafeReason, Verdict, Verifier};

//! Configuration management for safefs.
//!
//! The configuration is read once, at startup, from environment variables
//! (and an optional `.env` file). Everything downstream receives explicit
//! values; nothing in the library reads the environment on its own.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

use crate::fs::paths::WorkDir;

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path resolution settings.
    pub paths: PathsConfig,

    /// Permission bits used when creating files and directories.
    pub permissions: PermissionsConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Path resolution configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Base directory that relative paths are joined onto.
    pub work_dir: PathBuf,
}

/// Permission bits for newly created entries.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PermissionsConfig {
    /// Mode for directories created by `mkdir`.
    pub dir_mode: u32,

    /// Mode for files created by `open` with a create flag.
    pub file_mode: u32,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl LoggingConfig {
    /// Read only the logging settings, so the subscriber can be installed
    /// before the rest of the configuration reports on what it loaded.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut logging = Self::default();
        if let Ok(level) = std::env::var("SAFEFS_LOG_LEVEL") {
            logging.level = level;
        }
        logging
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            work_dir: executable_dir(),
        }
    }
}

impl Default for PermissionsConfig {
    fn default() -> Self {
        Self {
            dir_mode: 0o755,
            file_mode: 0o644,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            paths: PathsConfig::default(),
            permissions: PermissionsConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Variables are prefixed with `SAFEFS_`. The work directory also honours
    /// the bare `WORK_DIR` variable. Overrides and rejected values are
    /// reported through `tracing`, so install the subscriber first (see
    /// [`LoggingConfig::from_env`]).
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self {
            logging: LoggingConfig::from_env(),
            ..Self::default()
        };

        let work_dir = std::env::var_os("SAFEFS_WORK_DIR").or_else(|| std::env::var_os("WORK_DIR"));
        if let Some(dir) = work_dir {
            if dir.is_empty() {
                warn!("Empty work directory override ignored");
            } else {
                config.paths.work_dir = PathBuf::from(dir);
                info!("Work directory set to {:?}", config.paths.work_dir);
            }
        }

        if let Ok(raw) = std::env::var("SAFEFS_DIR_MODE") {
            match parse_mode(&raw) {
                Some(mode) => config.permissions.dir_mode = mode,
                None => warn!(
                    "Invalid SAFEFS_DIR_MODE '{}', keeping {:o}",
                    raw, config.permissions.dir_mode
                ),
            }
        }

        if let Ok(raw) = std::env::var("SAFEFS_FILE_MODE") {
            match parse_mode(&raw) {
                Some(mode) => config.permissions.file_mode = mode,
                None => warn!(
                    "Invalid SAFEFS_FILE_MODE '{}', keeping {:o}",
                    raw, config.permissions.file_mode
                ),
            }
        }

        config
    }

    /// Replace the work directory.
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.paths.work_dir = dir.into();
        self
    }

    /// The work directory as a path-joining helper.
    pub fn work_dir(&self) -> WorkDir {
        WorkDir::new(self.paths.work_dir.clone())
    }
}

/// Parse an octal permission string such as `755` or `0o750`.
pub fn parse_mode(raw: &str) -> Option<u32> {
    let digits = raw.trim();
    let digits = digits.strip_prefix("0o").unwrap_or(digits);
    let mode = u32::from_str_radix(digits, 8).ok()?;
    (mode <= 0o7777).then_some(mode)
}

/// Directory holding the running executable, or `/` when it cannot be found.
fn executable_dir() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("/"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Mutex to ensure env var tests run serially
    static ENV_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn clear_env() {
        unsafe {
            std::env::remove_var("SAFEFS_WORK_DIR");
            std::env::remove_var("WORK_DIR");
            std::env::remove_var("SAFEFS_DIR_MODE");
            std::env::remove_var("SAFEFS_FILE_MODE");
            std::env::remove_var("SAFEFS_LOG_LEVEL");
        }
    }

    #[test]
    fn test_work_dir_from_env() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("SAFEFS_WORK_DIR", "/srv/data");
        }
        let config = Config::from_env();
        assert_eq!(config.paths.work_dir, PathBuf::from("/srv/data"));
        clear_env();
    }

    #[test]
    fn test_plain_work_dir_fallback() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("WORK_DIR", "/var/lib/app");
        }
        let config = Config::from_env();
        assert_eq!(config.paths.work_dir, PathBuf::from("/var/lib/app"));
        clear_env();
    }

    #[test]
    fn test_default_work_dir_is_executable_dir() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        let config = Config::from_env();
        let exe = std::env::current_exe().unwrap();
        assert_eq!(config.paths.work_dir, exe.parent().unwrap());
    }

    #[test]
    fn test_invalid_mode_keeps_default() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        unsafe {
            std::env::set_var("SAFEFS_DIR_MODE", "rwx");
            std::env::set_var("SAFEFS_FILE_MODE", "600");
        }
        let config = Config::from_env();
        assert_eq!(config.permissions.dir_mode, 0o755);
        assert_eq!(config.permissions.file_mode, 0o600);
        clear_env();
    }

    #[test]
    fn test_log_level_readable_on_its_own() {
        let _lock = ENV_TEST_LOCK.lock().unwrap();
        clear_env();
        assert_eq!(LoggingConfig::from_env().level, "info");

        unsafe {
            std::env::set_var("SAFEFS_LOG_LEVEL", "debug");
        }
        assert_eq!(LoggingConfig::from_env().level, "debug");
        assert_eq!(Config::from_env().logging.level, "debug");
        clear_env();
    }

    #[test]
    fn test_parse_mode() {
        assert_eq!(parse_mode("755"), Some(0o755));
        assert_eq!(parse_mode("0o700"), Some(0o700));
        assert_eq!(parse_mode(" 644 "), Some(0o644));
        assert_eq!(parse_mode("899"), None);
        assert_eq!(parse_mode("77777"), None);
    }

    #[test]
    fn test_with_work_dir() {
        let config = Config::new().with_work_dir("/opt/root");
        assert_eq!(config.work_dir().as_path(), std::path::Path::new("/opt/root"));
    }
}

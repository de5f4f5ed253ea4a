//! safefs command-line entry point.
//!
//! Initializes logging, loads configuration and runs a single guarded
//! filesystem operation. Relative paths are joined onto the configured work
//! directory as given; `..` is left for the kernel to resolve.

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use safefs::core::config::{LoggingConfig, parse_mode};
use safefs::{Config, GuardedFs, OpenFlags, Verdict, WorkDir};

#[derive(Debug, Parser)]
#[command(name = "safefs", version, about = "Filesystem operations that refuse symlinked paths")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Report whether each path is safe, as JSON lines
    Check { paths: Vec<PathBuf> },

    /// Create a directory
    Mkdir {
        path: PathBuf,
        /// Octal permission bits (defaults to SAFEFS_DIR_MODE)
        #[arg(long)]
        mode: Option<String>,
    },

    /// Remove a file or empty directory
    Rm {
        path: PathBuf,
        /// Remove directories and their contents
        #[arg(short, long)]
        recursive: bool,
    },

    /// Rename or move a file or directory
    Mv { from: PathBuf, to: PathBuf },

    /// Copy a file to stdout
    Cat { path: PathBuf },

    /// Write stdin to a file, creating it if needed
    Write {
        path: PathBuf,
        /// Append instead of truncating
        #[arg(short, long)]
        append: bool,
    },
}

#[derive(Debug, Serialize)]
struct CheckReport {
    path: PathBuf,
    verdict: Verdict,
}

fn main() -> Result<()> {
    // Initialize logging first so configuration warnings are not lost
    init_logging(&LoggingConfig::from_env().level);

    // Load configuration from environment
    let config = Config::from_env();

    let args = Args::parse();
    let work_dir = config.work_dir();
    let gfs = GuardedFs::new();

    info!("Work directory: {}", work_dir.as_path().display());

    run(args.command, &config, &work_dir, &gfs)
}

fn run(command: Command, config: &Config, work_dir: &WorkDir, gfs: &GuardedFs) -> Result<()> {
    match command {
        Command::Check { paths } => {
            let mut stdout = io::stdout().lock();
            for path in paths {
                let path = work_dir.absolute(path);
                let report = CheckReport {
                    verdict: gfs.verifier().verdict(&path),
                    path,
                };
                writeln!(stdout, "{}", serde_json::to_string(&report)?)?;
            }
        }
        Command::Mkdir { path, mode } => {
            let mode = match mode {
                Some(raw) => parse_mode(&raw).with_context(|| format!("invalid mode '{raw}'"))?,
                None => config.permissions.dir_mode,
            };
            let path = work_dir.absolute(path);
            gfs.mkdir(&path, mode)
                .with_context(|| format!("mkdir {}", path.display()))?;
        }
        Command::Rm { path, recursive } => {
            let path = work_dir.absolute(path);
            let result = if recursive {
                gfs.remove_all(&path)
            } else {
                gfs.remove(&path)
            };
            result.with_context(|| format!("rm {}", path.display()))?;
        }
        Command::Mv { from, to } => {
            let (from, to) = (work_dir.absolute(from), work_dir.absolute(to));
            gfs.rename(&from, &to)
                .with_context(|| format!("mv {} {}", from.display(), to.display()))?;
        }
        Command::Cat { path } => {
            let path = work_dir.absolute(path);
            let mut file = gfs
                .open(&path, &OpenFlags::read_only())
                .with_context(|| format!("cat {}", path.display()))?;
            io::copy(&mut file, &mut io::stdout().lock())?;
        }
        Command::Write { path, append } => {
            let path = work_dir.absolute(path);
            let mode = config.permissions.file_mode;
            let flags = if append {
                OpenFlags::append_create(mode)
            } else {
                OpenFlags::write_truncate(mode)
            };
            let mut file = gfs
                .open(&path, &flags)
                .with_context(|| format!("write {}", path.display()))?;
            let written = io::copy(&mut io::stdin().lock(), &mut file)?;
            file.sync_all()?;
            info!("Wrote {} bytes to {}", written, path.display());
        }
    }
    Ok(())
}

/// Initialize the logging subsystem.
///
/// Logs go to stderr so command output on stdout stays clean.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .init();
}

//! Guarded wrappers around native filesystem calls.
//!
//! Each operation verifies its path(s) with a [`Verifier`] and then hands
//! off to the corresponding `std::fs` call. Native errors are returned
//! unchanged; a failed verification becomes [`Error::Rejected`].

use std::fs::{self, DirBuilder, File, OpenOptions};
use std::io;
use std::os::unix::fs::{DirBuilderExt, OpenOptionsExt};
use std::path::Path;
use tracing::{debug, instrument};

use crate::core::error::{Error, Result};
use crate::core::security::{PathGuard, Verifier};

/// Caller-chosen flags for [`GuardedFs::open`].
///
/// `O_NOFOLLOW` is always added on top of these when the file is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFlags {
    read: bool,
    write: bool,
    append: bool,
    truncate: bool,
    create: bool,
    create_new: bool,
    mode: u32,
    custom: i32,
}

impl Default for OpenFlags {
    fn default() -> Self {
        Self {
            read: false,
            write: false,
            append: false,
            truncate: false,
            create: false,
            create_new: false,
            mode: 0o666,
            custom: 0,
        }
    }
}

impl OpenFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open an existing file for reading.
    pub fn read_only() -> Self {
        Self::new().read(true)
    }

    /// Create or truncate a file for writing.
    pub fn write_truncate(mode: u32) -> Self {
        Self::new().write(true).create(true).truncate(true).mode(mode)
    }

    /// Create a file if needed and append to it.
    pub fn append_create(mode: u32) -> Self {
        Self::new().append(true).create(true).mode(mode)
    }

    pub fn read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    pub fn write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    pub fn append(mut self, append: bool) -> Self {
        self.append = append;
        self
    }

    pub fn truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn create(mut self, create: bool) -> Self {
        self.create = create;
        self
    }

    pub fn create_new(mut self, create_new: bool) -> Self {
        self.create_new = create_new;
        self
    }

    /// Permission bits for a newly created file (before umask).
    pub fn mode(mut self, mode: u32) -> Self {
        self.mode = mode;
        self
    }

    /// Extra raw `open(2)` flags, e.g. `libc::O_SYNC`.
    pub fn custom_flags(mut self, flags: i32) -> Self {
        self.custom = flags;
        self
    }

    /// Native options for these flags, with `O_NOFOLLOW` forced on.
    pub(crate) fn to_options(self) -> OpenOptions {
        let mut options = OpenOptions::new();
        options
            .read(self.read)
            .write(self.write)
            .append(self.append)
            .truncate(self.truncate)
            .create(self.create)
            .create_new(self.create_new)
            .mode(self.mode)
            .custom_flags(self.custom | libc::O_NOFOLLOW);
        options
    }
}

/// Filesystem operations that refuse to run on paths containing symlinks.
///
/// The check and the native call are two separate steps, so a symlink
/// planted in between is not caught by the verifier. `open` covers its own
/// leaf with `O_NOFOLLOW`; the other operations have no such primitive.
#[derive(Debug, Clone, Default)]
pub struct GuardedFs<V = PathGuard> {
    verifier: V,
}

impl GuardedFs<PathGuard> {
    pub fn new() -> Self {
        Self::with_verifier(PathGuard::new())
    }
}

impl<V: Verifier> GuardedFs<V> {
    /// Build with a custom verifier.
    pub fn with_verifier(verifier: V) -> Self {
        Self { verifier }
    }

    pub fn verifier(&self) -> &V {
        &self.verifier
    }

    /// Verify `path` without touching it.
    pub fn verify(&self, path: impl AsRef<Path>) -> Result<()> {
        self.verifier.verify_safe(path.as_ref())
    }

    /// Open `path` with `flags`, never following a symlink at the leaf.
    ///
    /// # Errors
    ///
    /// [`Error::Rejected`] if the path fails verification, otherwise the
    /// native open error (`ELOOP` if the leaf became a symlink).
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(&self, path: impl AsRef<Path>, flags: &OpenFlags) -> Result<File> {
        let path = path.as_ref();
        self.verifier.verify_safe(path)?;
        let file = flags.to_options().open(path)?;
        debug!("opened");
        Ok(file)
    }

    /// Create a single directory with the given permission bits.
    ///
    /// Fails natively if `path` exists or its parent is missing.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display(), mode = %format!("{mode:o}")))]
    pub fn mkdir(&self, path: impl AsRef<Path>, mode: u32) -> Result<()> {
        let path = path.as_ref();
        self.verifier.verify_safe(path)?;
        DirBuilder::new().mode(mode).create(path)?;
        debug!("directory created");
        Ok(())
    }

    /// Remove a file or an empty directory.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn remove(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.verifier.verify_safe(path)?;
        if fs::symlink_metadata(path)?.is_dir() {
            fs::remove_dir(path)?;
        } else {
            fs::remove_file(path)?;
        }
        debug!("removed");
        Ok(())
    }

    /// Remove `path` and everything below it.
    ///
    /// Only `path` itself is verified; entries found while descending are
    /// trusted. A missing `path` is not an error.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn remove_all(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        self.verifier.verify_safe(path)?;
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(Error::Io(e)),
        };
        if meta.is_dir() {
            fs::remove_dir_all(path)?;
        } else {
            fs::remove_file(path)?;
        }
        debug!("removed recursively");
        Ok(())
    }

    /// Rename `from` to `to`. Both endpoints must pass verification.
    #[instrument(level = "debug", skip_all, fields(from = %from.as_ref().display(), to = %to.as_ref().display()))]
    pub fn rename(&self, from: impl AsRef<Path>, to: impl AsRef<Path>) -> Result<()> {
        let (from, to) = (from.as_ref(), to.as_ref());
        self.verifier.verify_safe(from)?;
        self.verifier.verify_safe(to)?;
        fs::rename(from, to)?;
        debug!("renamed");
        Ok(())
    }
}

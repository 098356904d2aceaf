//! Sandboxed virtual filesystem backend.
//!
//! The virtual filesystem is a collaborator: it exposes existence, stat,
//! mkdir and delete primitives plus read/write/append handles, and the
//! streams and archive store in this crate call into it. A backend implements
//! [`VirtualFs`]; [`SandboxFs`] is the bundled implementation, rooted at a
//! directory on the native filesystem.
//!
//! # Handle model
//!
//! A [`VfsHandle`] is opened for exactly one direction. Read handles reject
//! writes and write or append handles reject reads. Streams that need both
//! directions over one path switch handles internally, see
//! [`VfsFileStream`](crate::VfsFileStream).
//!
//! # Initialization
//!
//! [`Vfs`] wraps a backend together with an explicit initialization state.
//! [`Vfs::initialize`] may be called any number of times; only the first call
//! reaches the backend. Opening a stream through an uninitialized [`Vfs`]
//! fails with [`Error::NotInitialized`].
//!
//! ```rust,no_run
//! use assetio::{FileMode, SandboxFs, Vfs};
//!
//! let vfs = Vfs::new(SandboxFs::new("/srv/game/user"));
//! vfs.initialize()?;
//! assert!(vfs.is_initialized());
//!
//! let mut stream = vfs.open_stream("saves/park1.sv6", FileMode::Write)?;
//! # Ok::<(), assetio::Error>(())
//! ```

mod sandbox;

pub use sandbox::SandboxFs;

use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::stream::{FileMode, VfsFileStream};
use crate::{Error, Result};

/// Modification time reported by [`Vfs::modified_time`] when the backend
/// cannot stat the path.
pub const FALLBACK_MODIFIED_TIME: i64 = 100;

/// Type of a virtual filesystem node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileType {
    /// A regular file.
    Regular,
    /// A directory.
    Directory,
    /// A symbolic link.
    Symlink,
    /// Anything else.
    Other,
}

/// Metadata returned by [`VirtualFs::stat`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VfsStat {
    /// Node type.
    pub file_type: FileType,
    /// Size in bytes.
    pub size: u64,
    /// Last modification time, in seconds since the Unix epoch.
    pub modtime: i64,
}

/// Direction a [`VfsHandle`] was opened for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleMode {
    /// Opened with [`VirtualFs::open_read`].
    Read,
    /// Opened with [`VirtualFs::open_write`].
    Write,
    /// Opened with [`VirtualFs::open_append`].
    Append,
}

impl HandleMode {
    /// Returns `true` if the handle accepts reads.
    pub fn is_readable(self) -> bool {
        matches!(self, HandleMode::Read)
    }

    /// Returns `true` if the handle accepts writes.
    pub fn is_writable(self) -> bool {
        !self.is_readable()
    }
}

/// An open file handle on a virtual filesystem.
pub trait VfsHandle: Send {
    /// Returns the direction this handle was opened for.
    fn mode(&self) -> HandleMode;

    /// Returns the current offset.
    fn tell(&mut self) -> io::Result<u64>;

    /// Moves to an absolute offset.
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Returns the current length of the underlying file.
    fn length(&mut self) -> io::Result<u64>;

    /// Reads up to `buf.len()` bytes, returning the number read.
    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Writes all of `buf`.
    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()>;

    /// Flushes buffered data to the backend.
    fn flush(&mut self) -> io::Result<()>;
}

/// Primitives a virtual filesystem backend provides.
///
/// Paths are slash separated and relative to the backend's root.
pub trait VirtualFs: Send + Sync {
    /// Performs process-wide backend setup.
    fn init(&self) -> io::Result<()>;

    /// Returns `true` if the path exists.
    fn exists(&self, path: &str) -> bool;

    /// Returns metadata for the path.
    fn stat(&self, path: &str) -> io::Result<VfsStat>;

    /// Creates a directory and any missing parents.
    fn mkdir(&self, path: &str) -> bool;

    /// Deletes a file or an empty directory.
    fn delete(&self, path: &str) -> bool;

    /// Opens an existing file for reading.
    fn open_read(&self, path: &str) -> io::Result<Box<dyn VfsHandle>>;

    /// Opens a file for writing, creating or truncating it.
    fn open_write(&self, path: &str) -> io::Result<Box<dyn VfsHandle>>;

    /// Opens a file for writing without truncating it, creating it if absent.
    /// The handle is positioned at the end of the file.
    fn open_append(&self, path: &str) -> io::Result<Box<dyn VfsHandle>>;
}

/// Acquires a mutex lock, recovering from poisoning if necessary.
fn lock_or_recover<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| {
        log::warn!("Vfs init mutex was poisoned, recovering");
        poisoned.into_inner()
    })
}

/// A shared virtual filesystem with explicit one-time initialization.
///
/// Cloning is cheap and clones share both the backend and the
/// initialization state.
#[derive(Clone)]
pub struct Vfs {
    backend: Arc<dyn VirtualFs>,
    initialized: Arc<Mutex<bool>>,
}

impl std::fmt::Debug for Vfs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Vfs")
            .field("initialized", &self.is_initialized())
            .finish_non_exhaustive()
    }
}

impl Vfs {
    /// Wraps a backend. The result is not yet initialized.
    pub fn new(backend: impl VirtualFs + 'static) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    /// Wraps an already shared backend.
    pub fn from_arc(backend: Arc<dyn VirtualFs>) -> Self {
        Self {
            backend,
            initialized: Arc::new(Mutex::new(false)),
        }
    }

    /// Initializes the backend. Subsequent calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the backend fails to initialize. The state
    /// stays uninitialized so the call may be retried.
    pub fn initialize(&self) -> Result<()> {
        let mut initialized = lock_or_recover(&self.initialized);
        if *initialized {
            return Ok(());
        }
        self.backend.init()?;
        *initialized = true;
        log::debug!("virtual filesystem initialized");
        Ok(())
    }

    /// Returns `true` once [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        *lock_or_recover(&self.initialized)
    }

    /// Returns the backend after checking initialization.
    pub(crate) fn backend(&self) -> Result<&dyn VirtualFs> {
        if self.is_initialized() {
            Ok(self.backend.as_ref())
        } else {
            Err(Error::NotInitialized)
        }
    }

    fn ready_backend(&self, op: &str, path: &str) -> Option<&dyn VirtualFs> {
        match self.backend() {
            Ok(backend) => Some(backend),
            Err(_) => {
                log::debug!("{op}('{path}') called before the virtual filesystem was initialized");
                None
            }
        }
    }

    /// Opens a stream over `path` in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] before [`initialize`](Self::initialize),
    /// and [`Error::NotFound`] if the backend cannot open the path.
    pub fn open_stream(&self, path: &str, mode: FileMode) -> Result<VfsFileStream> {
        VfsFileStream::open(self, path, mode)
    }

    /// Returns `true` if `path` exists.
    ///
    /// Directories count as existing. Use
    /// [`directory_exists`](Self::directory_exists) to tell them apart.
    pub fn file_exists(&self, path: &str) -> bool {
        self.ready_backend("file_exists", path)
            .is_some_and(|backend| backend.exists(path))
    }

    /// Returns `true` if `path` exists and is a directory.
    pub fn directory_exists(&self, path: &str) -> bool {
        let Some(backend) = self.ready_backend("directory_exists", path) else {
            return false;
        };
        if !backend.exists(path) {
            return false;
        }
        matches!(backend.stat(path), Ok(stat) if stat.file_type == FileType::Directory)
    }

    /// Creates `path` and any missing parents. Returns `true` on success.
    pub fn ensure_directory_exists(&self, path: &str) -> bool {
        let Some(backend) = self.ready_backend("ensure_directory_exists", path) else {
            return false;
        };
        backend.mkdir(path)
    }

    /// Deletes a file. Returns `true` on success.
    pub fn delete_file(&self, path: &str) -> bool {
        let Some(backend) = self.ready_backend("delete_file", path) else {
            return false;
        };
        backend.delete(path)
    }

    /// Deletes an empty directory. Returns `true` on success.
    pub fn delete_directory(&self, path: &str) -> bool {
        let Some(backend) = self.ready_backend("delete_directory", path) else {
            return false;
        };
        backend.delete(path)
    }

    /// Returns the modification time of `path` in seconds since the Unix
    /// epoch, or [`FALLBACK_MODIFIED_TIME`] if it cannot be determined.
    pub fn modified_time(&self, path: &str) -> i64 {
        let Some(backend) = self.ready_backend("modified_time", path) else {
            return FALLBACK_MODIFIED_TIME;
        };
        match backend.stat(path) {
            Ok(stat) => stat.modtime,
            Err(e) => {
                log::debug!("stat('{path}') failed: {e}");
                FALLBACK_MODIFIED_TIME
            }
        }
    }
}

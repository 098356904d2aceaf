//! Directory-rooted virtual filesystem.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Component, Path, PathBuf};
use std::time::UNIX_EPOCH;

use super::{FileType, HandleMode, VfsHandle, VfsStat, VirtualFs};

/// A [`VirtualFs`] confined to one directory of the native filesystem.
///
/// Virtual paths are slash separated. Backslashes are accepted and treated
/// as separators. Paths that are absolute or contain `..` are rejected with
/// [`io::ErrorKind::PermissionDenied`], so nothing outside the root is
/// reachable.
#[derive(Debug, Clone)]
pub struct SandboxFs {
    root: PathBuf,
}

impl SandboxFs {
    /// Creates a sandbox rooted at `root`. The directory is created on
    /// [`init`](VirtualFs::init) if it does not exist.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the sandbox root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a virtual path to a native path below the root.
    fn resolve(&self, path: &str) -> io::Result<PathBuf> {
        let normalized = path.replace('\\', "/");
        let mut resolved = self.root.clone();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        format!("path escapes sandbox: {path}"),
                    ));
                }
                _ => {}
            }
            if Path::new(segment)
                .components()
                .any(|c| !matches!(c, Component::Normal(_)))
            {
                return Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    format!("invalid path segment '{segment}' in {path}"),
                ));
            }
            resolved.push(segment);
        }
        Ok(resolved)
    }

    fn open_with(
        &self,
        path: &str,
        options: &OpenOptions,
        mode: HandleMode,
    ) -> io::Result<Box<dyn VfsHandle>> {
        let native = self.resolve(path)?;
        if native.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{path} is a directory"),
            ));
        }
        let mut file = options.open(&native)?;
        if mode == HandleMode::Append {
            file.seek(SeekFrom::End(0))?;
        }
        Ok(Box::new(SandboxHandle { file, mode }))
    }
}

impl VirtualFs for SandboxFs {
    fn init(&self) -> io::Result<()> {
        fs::create_dir_all(&self.root)
    }

    fn exists(&self, path: &str) -> bool {
        self.resolve(path).map(|p| p.exists()).unwrap_or(false)
    }

    fn stat(&self, path: &str) -> io::Result<VfsStat> {
        let metadata = fs::symlink_metadata(self.resolve(path)?)?;
        let file_type = if metadata.is_file() {
            FileType::Regular
        } else if metadata.is_dir() {
            FileType::Directory
        } else if metadata.file_type().is_symlink() {
            FileType::Symlink
        } else {
            FileType::Other
        };
        let modtime = metadata
            .modified()
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok())
            .map(|d| d.as_secs() as i64)
            .unwrap_or(0);
        Ok(VfsStat {
            file_type,
            size: metadata.len(),
            modtime,
        })
    }

    fn mkdir(&self, path: &str) -> bool {
        match self.resolve(path).and_then(fs::create_dir_all) {
            Ok(()) => true,
            Err(e) => {
                log::debug!("mkdir('{path}') failed: {e}");
                false
            }
        }
    }

    fn delete(&self, path: &str) -> bool {
        let result = self.resolve(path).and_then(|native| {
            if native.is_dir() {
                fs::remove_dir(native)
            } else {
                fs::remove_file(native)
            }
        });
        match result {
            Ok(()) => true,
            Err(e) => {
                log::debug!("delete('{path}') failed: {e}");
                false
            }
        }
    }

    fn open_read(&self, path: &str) -> io::Result<Box<dyn VfsHandle>> {
        self.open_with(path, OpenOptions::new().read(true), HandleMode::Read)
    }

    fn open_write(&self, path: &str) -> io::Result<Box<dyn VfsHandle>> {
        self.open_with(
            path,
            OpenOptions::new().write(true).create(true).truncate(true),
            HandleMode::Write,
        )
    }

    fn open_append(&self, path: &str) -> io::Result<Box<dyn VfsHandle>> {
        // Positioned writes must stay possible, so no O_APPEND here.
        self.open_with(
            path,
            OpenOptions::new().write(true).create(true).truncate(false),
            HandleMode::Append,
        )
    }
}

/// A single-direction handle onto a sandboxed file.
#[derive(Debug)]
struct SandboxHandle {
    file: File,
    mode: HandleMode,
}

impl SandboxHandle {
    fn wrong_direction(&self, op: &str) -> io::Error {
        io::Error::new(
            io::ErrorKind::PermissionDenied,
            format!("cannot {op} a handle opened for {:?}", self.mode),
        )
    }
}

impl VfsHandle for SandboxHandle {
    fn mode(&self) -> HandleMode {
        self.mode
    }

    fn tell(&mut self) -> io::Result<u64> {
        self.file.stream_position()
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.file.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn length(&mut self) -> io::Result<u64> {
        Ok(self.file.metadata()?.len())
    }

    fn read_bytes(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        if !self.mode.is_readable() {
            return Err(self.wrong_direction("read"));
        }
        let mut total = 0;
        while total < buf.len() {
            match self.file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(total)
    }

    fn write_bytes(&mut self, buf: &[u8]) -> io::Result<()> {
        if !self.mode.is_writable() {
            return Err(self.wrong_direction("write"));
        }
        self.file.write_all(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

//! Stream over a virtual filesystem handle.

use std::io;

use super::{FileMode, SeekableStream};
use crate::vfs::{FileType, Vfs, VfsHandle};
use crate::{Error, Result};

/// A [`SeekableStream`] over a file on a [`Vfs`].
///
/// Virtual filesystem handles are opened for a single direction. A stream
/// opened with [`FileMode::Write`] holds a write handle and, on every read,
/// briefly swaps it for a read handle: the writer is flushed and dropped, a
/// reader is opened at the current position, and afterwards a non-truncating
/// writer is reopened at the position just past the bytes read. Callers only
/// observe the extra cost; position and length bookkeeping are unaffected.
pub struct VfsFileStream {
    vfs: Vfs,
    path: String,
    mode: FileMode,
    handle: Option<Box<dyn VfsHandle>>,
    size: u64,
    position: u64,
    disposed: bool,
}

impl std::fmt::Debug for VfsFileStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VfsFileStream")
            .field("path", &self.path)
            .field("mode", &self.mode)
            .field("size", &self.size)
            .field("position", &self.position)
            .field("disposed", &self.disposed)
            .finish()
    }
}

impl VfsFileStream {
    /// Opens `path` on `vfs` in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotInitialized`] if `vfs` has not been initialized,
    /// and [`Error::NotFound`] carrying the path if the backend cannot open
    /// it or [`FileMode::Open`] targets anything but a regular file.
    pub fn open(vfs: &Vfs, path: &str, mode: FileMode) -> Result<Self> {
        let backend = vfs.backend()?;
        let handle = match mode {
            FileMode::Open => {
                match backend.stat(path) {
                    Ok(stat) if stat.file_type == FileType::Regular => {}
                    Ok(_) => return Err(Error::not_found(path)),
                    Err(e) => return Err(Error::open_failed(path, e)),
                }
                backend.open_read(path)
            }
            FileMode::Write => backend.open_write(path),
            FileMode::Append => backend.open_append(path),
        };
        let mut handle = handle.map_err(|e| Error::open_failed(path, e))?;

        let size = handle
            .length()
            .and_then(|size| handle.seek(0).map(|()| size))
            .map_err(|e| Error::open_failed(path, e))?;
        let position = if mode == FileMode::Append { size } else { 0 };
        if position != 0 {
            handle.seek(position)?;
        }

        log::trace!("opened virtual '{}' ({:?}, {} bytes)", path, mode, size);
        Ok(Self {
            vfs: vfs.clone(),
            path: path.to_string(),
            mode,
            handle: Some(handle),
            size,
            position,
            disposed: false,
        })
    }

    /// Returns the virtual path this stream was opened with.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the mode this stream was opened with.
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Flushes and releases the handle. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        if self.disposed {
            return Ok(());
        }
        self.disposed = true;
        if let Some(mut handle) = self.handle.take() {
            if handle.mode().is_writable() {
                handle.flush()?;
            }
        }
        Ok(())
    }

    /// Returns `true` once the stream has been closed.
    pub fn is_closed(&self) -> bool {
        self.disposed
    }

    fn handle(&mut self) -> Result<&mut Box<dyn VfsHandle>> {
        if self.disposed {
            return Err(Error::StreamClosed);
        }
        self.handle.as_mut().ok_or_else(|| {
            Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "handle was lost while switching directions",
            ))
        })
    }

    /// Reads at the current position, switching handles when the current
    /// one cannot read. Returns the number of bytes read.
    fn read_raw(&mut self, buf: &mut [u8]) -> Result<usize> {
        let handle = self.handle()?;
        if handle.mode().is_readable() {
            let n = handle.read_bytes(buf)?;
            self.position += n as u64;
            return Ok(n);
        }

        let backend = self.vfs.backend()?;
        if let Some(mut writer) = self.handle.take() {
            writer.flush()?;
        }

        let read = backend.open_read(&self.path).and_then(|mut reader| {
            reader.seek(self.position)?;
            reader.read_bytes(buf)
        });
        let resume = self.position + read.as_ref().map_or(0, |n| *n as u64);

        let writer = backend.open_append(&self.path).and_then(|mut writer| {
            writer.seek(resume)?;
            Ok(writer)
        });
        match writer {
            Ok(writer) => self.handle = Some(writer),
            Err(e) => {
                log::warn!("failed to reopen '{}' for writing: {}", self.path, e);
                return Err(e.into());
            }
        }

        let n = read?;
        self.position = resume;
        Ok(n)
    }
}

impl SeekableStream for VfsFileStream {
    fn can_read(&self) -> bool {
        self.mode.can_read()
    }

    fn can_write(&self) -> bool {
        self.mode.can_write()
    }

    fn len(&self) -> u64 {
        self.size
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) -> Result<()> {
        self.handle()?.seek(position)?;
        self.position = position;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        if !self.can_read() {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "stream is write-only",
            )));
        }
        if self.position.saturating_add(buf.len() as u64) > self.size {
            return Err(Error::read_past_end());
        }
        let start = self.position;
        let n = self.read_raw(buf)?;
        if n != buf.len() {
            self.set_position(start)?;
            return Err(Error::read_past_end());
        }
        Ok(())
    }

    fn try_read(&mut self, buf: &mut [u8]) -> usize {
        if !self.can_read() {
            return 0;
        }
        match self.read_raw(buf) {
            Ok(n) => n,
            Err(e) => {
                log::debug!("try_read on '{}' failed: {}", self.path, e);
                0
            }
        }
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if !self.can_write() {
            return Err(Error::ReadOnly);
        }
        self.handle()?.write_bytes(buf)?;
        self.position += buf.len() as u64;
        self.size = self.size.max(self.position);
        Ok(())
    }
}

impl Drop for VfsFileStream {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to close virtual '{}': {}", self.path, e);
        }
    }
}

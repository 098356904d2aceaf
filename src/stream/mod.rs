//! Seekable byte streams.
//!
//! Every backend in this crate exposes its data through [`SeekableStream`]:
//!
//! | Type | Backend |
//! |------|---------|
//! | [`FileStream`] | A native file descriptor |
//! | [`VfsFileStream`] | A handle on a [`Vfs`](crate::Vfs) backend |
//! | [`MemoryStream`] | An owned byte buffer, used for archive entries |
//!
//! # Read semantics
//!
//! Two read entry points exist with different failure behavior:
//!
//! - [`SeekableStream::read`] fills the whole buffer or fails. Requesting more
//!   bytes than remain is an error and leaves the buffer and position
//!   untouched.
//! - [`SeekableStream::try_read`] never fails. It returns how many bytes were
//!   actually read, which may be zero.
//!
//! # Write semantics
//!
//! A successful write advances the position and grows the length to
//! `max(length, position)`. Writes never shrink a stream.
//!
//! # Example
//!
//! ```rust
//! use assetio::{MemoryStream, SeekOrigin, SeekableStream};
//!
//! let mut stream = MemoryStream::new();
//! stream.write(b"RIFF\x04\x00\x00\x00WAVE")?;
//! stream.seek(4, SeekOrigin::Begin)?;
//! assert_eq!(stream.read_u32_le()?, 4);
//!
//! let mut rest = [0u8; 8];
//! assert!(stream.read(&mut rest).is_err());
//! assert_eq!(stream.try_read(&mut rest), 4);
//! # Ok::<(), assetio::Error>(())
//! ```

mod file;
mod memory;
mod vfs;

pub use file::FileStream;
pub use memory::MemoryStream;
pub use vfs::VfsFileStream;

use std::io;

use crate::{Error, Result};

/// How a stream is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileMode {
    /// Read only. The path must exist and be a regular file.
    Open,
    /// Read and write. The file is created or truncated.
    Write,
    /// Write only, positioned at the end. The file is created if absent.
    Append,
}

impl FileMode {
    /// Returns `true` if streams opened in this mode can be read.
    pub fn can_read(self) -> bool {
        matches!(self, FileMode::Open | FileMode::Write)
    }

    /// Returns `true` if streams opened in this mode can be written.
    pub fn can_write(self) -> bool {
        matches!(self, FileMode::Write | FileMode::Append)
    }
}

/// Reference point for [`SeekableStream::seek`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekOrigin {
    /// Offset from the start of the stream.
    Begin,
    /// Offset from the current position.
    Current,
    /// Offset from the current length.
    End,
}

/// Computes the absolute target of a seek.
///
/// Negative targets and overflow are rejected with
/// [`io::ErrorKind::InvalidInput`].
pub(crate) fn resolve_seek(position: u64, length: u64, offset: i64, origin: SeekOrigin) -> Result<u64> {
    let base = match origin {
        SeekOrigin::Begin => 0,
        SeekOrigin::Current => position,
        SeekOrigin::End => length,
    };
    base.checked_add_signed(offset).ok_or_else(|| {
        Error::Io(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid seek to {offset} from {origin:?}"),
        ))
    })
}

/// Positioned read/write access to a sized byte stream.
pub trait SeekableStream {
    /// Returns `true` if the stream supports reads.
    fn can_read(&self) -> bool;

    /// Returns `true` if the stream supports writes.
    fn can_write(&self) -> bool;

    /// Returns the current logical length.
    fn len(&self) -> u64;

    /// Returns `true` if the stream is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the current position.
    fn position(&self) -> u64;

    /// Moves to an absolute position.
    fn set_position(&mut self, position: u64) -> Result<()>;

    /// Moves relative to `origin` and returns the new position.
    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        let target = resolve_seek(self.position(), self.len(), offset, origin)?;
        self.set_position(target)?;
        Ok(target)
    }

    /// Fills `buf` completely.
    ///
    /// # Errors
    ///
    /// Fails with an [`io::ErrorKind::UnexpectedEof`] error if fewer than
    /// `buf.len()` bytes remain. Nothing is read in that case.
    fn read(&mut self, buf: &mut [u8]) -> Result<()>;

    /// Reads up to `buf.len()` bytes and returns how many were read.
    fn try_read(&mut self, buf: &mut [u8]) -> usize;

    /// Writes all of `buf` at the current position.
    fn write(&mut self, buf: &[u8]) -> Result<()>;

    /// Reads a little-endian `u16`.
    fn read_u16_le(&mut self) -> Result<u16> {
        let mut buf = [0u8; 2];
        self.read(&mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }

    /// Reads a little-endian `u32`.
    fn read_u32_le(&mut self) -> Result<u32> {
        let mut buf = [0u8; 4];
        self.read(&mut buf)?;
        Ok(u32::from_le_bytes(buf))
    }

    /// Reads everything from the current position to the end.
    fn read_to_vec(&mut self) -> Result<Vec<u8>> {
        let remaining = self.len().saturating_sub(self.position());
        let remaining = usize::try_from(remaining).map_err(|_| {
            Error::Io(io::Error::new(
                io::ErrorKind::OutOfMemory,
                "stream too large to buffer",
            ))
        })?;
        let mut buf = vec![0u8; remaining];
        self.read(&mut buf)?;
        Ok(buf)
    }
}

impl<S: SeekableStream + ?Sized> SeekableStream for Box<S> {
    fn can_read(&self) -> bool {
        (**self).can_read()
    }

    fn can_write(&self) -> bool {
        (**self).can_write()
    }

    fn len(&self) -> u64 {
        (**self).len()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn set_position(&mut self, position: u64) -> Result<()> {
        (**self).set_position(position)
    }

    fn seek(&mut self, offset: i64, origin: SeekOrigin) -> Result<u64> {
        (**self).seek(offset, origin)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        (**self).read(buf)
    }

    fn try_read(&mut self, buf: &mut [u8]) -> usize {
        (**self).try_read(buf)
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        (**self).write(buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_seek() {
        assert_eq!(resolve_seek(5, 10, 3, SeekOrigin::Begin).unwrap(), 3);
        assert_eq!(resolve_seek(5, 10, -2, SeekOrigin::Current).unwrap(), 3);
        assert_eq!(resolve_seek(5, 10, 0, SeekOrigin::End).unwrap(), 10);
        assert_eq!(resolve_seek(5, 10, 4, SeekOrigin::End).unwrap(), 14);
        assert!(resolve_seek(5, 10, -6, SeekOrigin::Current).is_err());
        assert!(resolve_seek(0, 0, -1, SeekOrigin::Begin).is_err());
    }

    #[test]
    fn test_mode_capabilities() {
        assert!(FileMode::Open.can_read() && !FileMode::Open.can_write());
        assert!(FileMode::Write.can_read() && FileMode::Write.can_write());
        assert!(!FileMode::Append.can_read() && FileMode::Append.can_write());
    }

    #[test]
    fn test_boxed_stream_dispatch() {
        let mut stream: Box<dyn SeekableStream> = Box::new(MemoryStream::from_vec(vec![1, 0, 2, 0, 0, 0]));
        assert_eq!(stream.read_u16_le().unwrap(), 1);
        assert_eq!(stream.read_u32_le().unwrap(), 2);
        assert!(stream.read_u16_le().is_err());
        assert_eq!(stream.seek(-2, SeekOrigin::End).unwrap(), 4);
        assert_eq!(stream.read_to_vec().unwrap(), vec![0, 0]);
    }
}

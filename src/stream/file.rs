//! Native file stream.

use std::fs::{File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use super::{FileMode, SeekableStream};
use crate::{Error, Result};

/// A [`SeekableStream`] over a file on the native filesystem.
///
/// The length is measured once at open time and then maintained by every
/// successful write, so [`len`](SeekableStream::len) never touches the disk.
///
/// # Example
///
/// ```rust,no_run
/// use assetio::{FileMode, FileStream, SeekableStream};
///
/// let mut stream = FileStream::open("park.sv6", FileMode::Write)?;
/// stream.write(b"header")?;
/// stream.set_position(0)?;
///
/// let mut header = [0u8; 6];
/// stream.read(&mut header)?;
/// stream.close()?;
/// # Ok::<(), assetio::Error>(())
/// ```
#[derive(Debug)]
pub struct FileStream {
    file: Option<File>,
    path: PathBuf,
    mode: FileMode,
    size: u64,
    position: u64,
}

impl FileStream {
    /// Opens `path` in the given mode.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] carrying the path if the file cannot be
    /// opened, or if [`FileMode::Open`] is used on anything other than a
    /// regular file.
    pub fn open(path: impl AsRef<Path>, mode: FileMode) -> Result<Self> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let file = match mode {
            FileMode::Open => {
                let metadata =
                    std::fs::metadata(path).map_err(|e| Error::open_failed(&display, e))?;
                if !metadata.is_file() {
                    return Err(Error::not_found(display));
                }
                File::open(path)
            }
            FileMode::Write => OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .truncate(true)
                .open(path),
            FileMode::Append => OpenOptions::new().append(true).create(true).open(path),
        };
        let mut file = file.map_err(|e| Error::open_failed(&display, e))?;

        let size = file
            .seek(SeekFrom::End(0))
            .and_then(|size| file.seek(SeekFrom::Start(0)).map(|_| size))
            .map_err(|e| Error::open_failed(&display, e))?;
        let position = if mode == FileMode::Append { size } else { 0 };
        if position != 0 {
            file.seek(SeekFrom::Start(position))?;
        }

        log::trace!("opened '{}' ({:?}, {} bytes)", display, mode, size);
        Ok(Self {
            file: Some(file),
            path: path.to_path_buf(),
            mode,
            size,
            position,
        })
    }

    /// Returns the path this stream was opened with.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the mode this stream was opened with.
    pub fn mode(&self) -> FileMode {
        self.mode
    }

    /// Flushes and releases the file handle.
    ///
    /// Closing twice is a no-op. Any later operation on the stream fails with
    /// [`Error::StreamClosed`].
    pub fn close(&mut self) -> Result<()> {
        match self.file.take() {
            Some(mut file) => {
                if self.mode.can_write() {
                    file.flush()?;
                }
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Returns `true` once the stream has been closed.
    pub fn is_closed(&self) -> bool {
        self.file.is_none()
    }

    fn file(&mut self) -> Result<&mut File> {
        self.file.as_mut().ok_or(Error::StreamClosed)
    }
}

impl SeekableStream for FileStream {
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
        self.file()?.seek(SeekFrom::Start(position))?;
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
        let result = self.file()?.read_exact(buf);
        if let Err(e) = result {
            // The file may have shrunk since it was opened.
            self.set_position(self.position)?;
            return Err(e.into());
        }
        self.position += buf.len() as u64;
        Ok(())
    }

    fn try_read(&mut self, buf: &mut [u8]) -> usize {
        if !self.can_read() {
            return 0;
        }
        let Some(file) = self.file.as_mut() else {
            return 0;
        };
        let mut total = 0;
        while total < buf.len() {
            match file.read(&mut buf[total..]) {
                Ok(0) => break,
                Ok(n) => total += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    log::debug!("try_read on '{}' stopped early: {}", self.path.display(), e);
                    break;
                }
            }
        }
        self.position += total as u64;
        total
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if !self.can_write() {
            return Err(Error::ReadOnly);
        }
        let file = self.file()?;
        file.write_all(buf)?;
        // Append mode ignores the seek position, so ask the OS where we are.
        let position = file.stream_position()?;
        self.position = position;
        self.size = self.size.max(position);
        Ok(())
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            log::warn!("failed to close '{}': {}", self.path.display(), e);
        }
    }
}

//! The ZIP archive store.

use std::collections::HashSet;
use std::fmt;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use ::zip::write::{SimpleFileOptions, ZipWriter};
use ::zip::CompressionMethod;

use super::options::ArchiveOptions;
use crate::stream::{FileMode, FileStream, MemoryStream, SeekableStream};
use crate::vfs::Vfs;
use crate::{Error, Result};

type SourceArchive = ::zip::ZipArchive<Cursor<Vec<u8>>>;

/// How an archive is opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZipAccess {
    /// The container must exist. Mutations fail with [`Error::ReadOnly`].
    Read,
    /// The container is created if absent and rewritten when the archive is
    /// closed.
    Write,
}

/// Where the container bytes live.
#[derive(Debug, Clone)]
enum Container {
    Native(PathBuf),
    Virtual { vfs: Vfs, path: String },
    Memory,
}

impl Container {
    fn describe(&self) -> String {
        match self {
            Container::Native(path) => path.display().to_string(),
            Container::Virtual { path, .. } => path.clone(),
            Container::Memory => "<memory>".to_string(),
        }
    }

    /// Loads the container. Returns `None` when a write-mode container does
    /// not exist yet.
    fn load(&self, access: ZipAccess) -> Result<Option<Vec<u8>>> {
        let bytes = match self {
            Container::Native(path) => {
                if access == ZipAccess::Write && !path.exists() {
                    return Ok(None);
                }
                FileStream::open(path, FileMode::Open)?.read_to_vec()?
            }
            Container::Virtual { vfs, path } => {
                if access == ZipAccess::Write && vfs.backend()?.stat(path).is_err() {
                    return Ok(None);
                }
                vfs.open_stream(path, FileMode::Open)?.read_to_vec()?
            }
            Container::Memory => return Ok(None),
        };
        Ok(Some(bytes))
    }

    fn persist(&self, bytes: &[u8]) -> Result<()> {
        match self {
            Container::Native(path) => {
                let mut stream = FileStream::open(path, FileMode::Write)?;
                stream.write(bytes)?;
                stream.close()
            }
            Container::Virtual { vfs, path } => {
                let mut stream = vfs.open_stream(path, FileMode::Write)?;
                stream.write(bytes)?;
                stream.close()
            }
            Container::Memory => Err(Error::ReadOnly),
        }
    }
}

/// Where an entry's payload comes from.
#[derive(Debug, Clone, Copy)]
enum EntrySource {
    /// Entry `index` of the loaded container, with its declared size.
    Existing { index: usize, size: u64 },
    /// Supplied through [`ZipArchive::set_entry`], held in the buffer pool.
    Pending { buffer: usize },
}

#[derive(Debug, Clone)]
struct EntryRecord {
    name: String,
    source: EntrySource,
}

/// Compares entry paths, treating `\` and `/` as the same separator.
fn paths_match(a: &str, b: &str) -> bool {
    let normalize = |c: char| if c == '\\' { '/' } else { c };
    a.len() == b.len() && a.chars().map(normalize).eq(b.chars().map(normalize))
}

/// Lists the entries of a loaded container in directory order.
fn list_entries(source: &mut SourceArchive) -> Vec<EntryRecord> {
    (0..source.len())
        .map(|index| {
            let stat = source
                .by_index_raw(index)
                .map(|file| (file.name().to_string(), file.size()));
            let (name, size) = match stat {
                Ok(stat) => stat,
                Err(e) => {
                    let name = source.name_for_index(index).unwrap_or_default().to_string();
                    log::debug!("unable to stat archive entry {index} '{name}': {e}");
                    (name, 0)
                }
            };
            EntryRecord {
                name,
                source: EntrySource::Existing { index, size },
            }
        })
        .collect()
}

/// A ZIP container exposed as a table of named entries.
///
/// Entry paths are compared case-sensitively after converting backslashes
/// to forward slashes. When several entries share a path the first one
/// wins. Names are stored exactly as given.
///
/// Buffers passed to [`set_entry`](Self::set_entry) are owned by the archive
/// and kept in an append-only pool until the archive is closed. The container
/// is rewritten exactly once, when the archive is closed or dropped.
///
/// # Example
///
/// ```rust,no_run
/// use assetio::{ZipAccess, ZipArchive};
///
/// let mut archive = ZipArchive::open("objects.zip", ZipAccess::Write)?;
/// archive.set_entry("images/logo.png", vec![0x89, b'P', b'N', b'G'])?;
/// archive.close()?;
///
/// let mut archive = ZipArchive::open("objects.zip", ZipAccess::Read)?;
/// let logo = archive.read_entry("images\\logo.png");
/// assert_eq!(logo.len(), 4);
/// # Ok::<(), assetio::Error>(())
/// ```
pub struct ZipArchive {
    container: Container,
    access: ZipAccess,
    options: ArchiveOptions,
    source: Option<SourceArchive>,
    entries: Vec<EntryRecord>,
    write_buffers: Vec<Vec<u8>>,
    created: bool,
    dirty: bool,
    closed: bool,
}

impl fmt::Debug for ZipArchive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZipArchive")
            .field("container", &self.container.describe())
            .field("access", &self.access)
            .field("entries", &self.entries.len())
            .field("write_buffers", &self.write_buffers.len())
            .field("dirty", &self.dirty)
            .finish_non_exhaustive()
    }
}

impl ZipArchive {
    /// Opens an archive on the native filesystem with default options.
    ///
    /// # Errors
    ///
    /// In [`ZipAccess::Read`] mode, returns [`Error::NotFound`] if the file
    /// cannot be opened. In both modes, returns a format error if an existing
    /// file is not a readable ZIP archive.
    pub fn open(path: impl AsRef<Path>, access: ZipAccess) -> Result<Self> {
        Self::open_with_options(path, access, ArchiveOptions::default())
    }

    /// Opens an archive on the native filesystem.
    pub fn open_with_options(
        path: impl AsRef<Path>,
        access: ZipAccess,
        options: ArchiveOptions,
    ) -> Result<Self> {
        Self::from_container(
            Container::Native(path.as_ref().to_path_buf()),
            access,
            options,
        )
    }

    /// Opens an archive stored on a virtual filesystem.
    ///
    /// The whole container is loaded into memory before its directory is
    /// parsed.
    pub fn open_vfs(vfs: &Vfs, path: &str, access: ZipAccess) -> Result<Self> {
        Self::from_container(
            Container::Virtual {
                vfs: vfs.clone(),
                path: path.to_string(),
            },
            access,
            ArchiveOptions::default(),
        )
    }

    /// Opens a read-only archive over an in-memory container.
    ///
    /// # Errors
    ///
    /// Returns a format error if `bytes` is not a readable ZIP archive.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self> {
        Self::from_loaded(
            Container::Memory,
            ZipAccess::Read,
            ArchiveOptions::default(),
            Some(bytes),
        )
    }

    /// Opens an archive, returning `None` instead of an error.
    ///
    /// Intended for optional content that callers can proceed without.
    pub fn try_open(path: impl AsRef<Path>, access: ZipAccess) -> Option<Self> {
        let path = path.as_ref();
        match Self::open(path, access) {
            Ok(archive) => Some(archive),
            Err(e) => {
                log::debug!("unable to open archive '{}': {}", path.display(), e);
                None
            }
        }
    }

    /// Opens an archive on a virtual filesystem, returning `None` instead of
    /// an error.
    pub fn try_open_vfs(vfs: &Vfs, path: &str, access: ZipAccess) -> Option<Self> {
        match Self::open_vfs(vfs, path, access) {
            Ok(archive) => Some(archive),
            Err(e) => {
                log::debug!("unable to open archive '{}': {}", path, e);
                None
            }
        }
    }

    fn from_container(
        container: Container,
        access: ZipAccess,
        options: ArchiveOptions,
    ) -> Result<Self> {
        let loaded = container.load(access)?;
        Self::from_loaded(container, access, options, loaded)
    }

    fn from_loaded(
        container: Container,
        access: ZipAccess,
        options: ArchiveOptions,
        loaded: Option<Vec<u8>>,
    ) -> Result<Self> {
        let created = loaded.is_none();
        let bytes = loaded.unwrap_or_default();

        // An empty file opened for writing is treated as an empty archive.
        let mut source = if bytes.is_empty() && access == ZipAccess::Write {
            None
        } else {
            Some(::zip::ZipArchive::new(Cursor::new(bytes))?)
        };
        let entries = source.as_mut().map(list_entries).unwrap_or_default();

        log::debug!(
            "opened archive '{}' ({:?}, {} entries{})",
            container.describe(),
            access,
            entries.len(),
            if created { ", new" } else { "" }
        );
        Ok(Self {
            container,
            access,
            options,
            source,
            entries,
            write_buffers: Vec::new(),
            created,
            dirty: false,
            closed: false,
        })
    }

    /// Returns the access mode.
    pub fn access(&self) -> ZipAccess {
        self.access
    }

    /// Returns the number of entries.
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    /// Returns the name of the entry at `index`, or an empty string if there
    /// is no such entry.
    pub fn entry_name(&self, index: usize) -> String {
        self.entries
            .get(index)
            .map(|entry| entry.name.clone())
            .unwrap_or_default()
    }

    /// Returns the uncompressed size of the entry at `index`, or 0 if there
    /// is no such entry.
    pub fn entry_size(&self, index: usize) -> u64 {
        match self.entries.get(index).map(|entry| entry.source) {
            Some(EntrySource::Existing { size, .. }) => size,
            Some(EntrySource::Pending { buffer }) => self
                .write_buffers
                .get(buffer)
                .map_or(0, |data| data.len() as u64),
            None => 0,
        }
    }

    /// Returns the index of the first entry matching `path`.
    pub fn index_of(&self, path: &str) -> Option<usize> {
        self.entries
            .iter()
            .position(|entry| paths_match(&entry.name, path))
    }

    /// Reads and verifies the entry at `index`.
    ///
    /// # Errors
    ///
    /// Returns an error if the index is out of range, the entry is encrypted
    /// or uses an unsupported method, its CRC-32 does not match, or it does
    /// not decode to exactly its declared size.
    pub fn read_entry_at(&mut self, index: usize) -> Result<Vec<u8>> {
        let source = self
            .entries
            .get(index)
            .map(|entry| entry.source)
            .ok_or_else(|| {
                Error::InvalidFormat(format!(
                    "entry index {index} out of range (archive has {} entries)",
                    self.entries.len()
                ))
            })?;
        match source {
            EntrySource::Pending { buffer } => Ok(self.buffer(buffer)?.to_vec()),
            EntrySource::Existing { index, size } => {
                let archive = self.source.as_mut().ok_or(Error::StreamClosed)?;
                let mut file = archive.by_index(index)?;
                let mut data = Vec::new();
                // One byte past the declared size exposes oversized entries.
                (&mut file).take(size.saturating_add(1)).read_to_end(&mut data)?;
                if data.len() as u64 != size {
                    return Err(Error::Truncated {
                        expected: size,
                        actual: data.len() as u64,
                    });
                }
                Ok(data)
            }
        }
    }

    /// Reads the entry at `path`.
    ///
    /// Returns an empty vector if no entry matches, or if the entry cannot
    /// be read back in full with a matching checksum. Partial data is never
    /// returned.
    pub fn read_entry(&mut self, path: &str) -> Vec<u8> {
        let Some(index) = self.index_of(path) else {
            log::debug!("archive entry '{}' not found", path);
            return Vec::new();
        };
        match self.read_entry_at(index) {
            Ok(data) => data,
            Err(e @ (Error::Io(_) | Error::Truncated { .. })) => {
                log::warn!("discarding archive entry '{}': {}", path, e);
                Vec::new()
            }
            Err(e) => {
                log::debug!("unable to read archive entry '{}': {}", path, e);
                Vec::new()
            }
        }
    }

    /// Returns the entry at `path` as a read-only stream, or `None` if it is
    /// missing or unreadable.
    pub fn open_entry_stream(&mut self, path: &str) -> Option<MemoryStream> {
        let index = self.index_of(path)?;
        match self.read_entry_at(index) {
            Ok(data) => Some(MemoryStream::read_only(data)),
            Err(e) => {
                log::debug!("unable to open archive entry '{}': {}", path, e);
                None
            }
        }
    }

    /// Adds an entry, or replaces the data of the first entry matching
    /// `path`.
    ///
    /// The archive takes ownership of `data` and keeps it until it is closed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] in [`ZipAccess::Read`] mode.
    pub fn set_entry(&mut self, path: &str, data: Vec<u8>) -> Result<()> {
        self.check_writable()?;
        let buffer = self.write_buffers.len();
        self.write_buffers.push(data);
        let source = EntrySource::Pending { buffer };
        match self.index_of(path) {
            Some(index) => self.entries[index].source = source,
            None => self.entries.push(EntryRecord {
                name: path.to_string(),
                source,
            }),
        }
        self.dirty = true;
        Ok(())
    }

    /// Removes the first entry matching `path`. Returns `false` if none did.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] in [`ZipAccess::Read`] mode.
    pub fn delete_entry(&mut self, path: &str) -> Result<bool> {
        self.check_writable()?;
        let Some(index) = self.index_of(path) else {
            return Ok(false);
        };
        self.entries.remove(index);
        self.dirty = true;
        Ok(true)
    }

    /// Renames the first entry matching `path` in place. Returns `false` if
    /// none did.
    ///
    /// If another entry already carries `new_path` exactly, the earlier of
    /// the two is kept when the archive is written.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReadOnly`] in [`ZipAccess::Read`] mode.
    pub fn rename_entry(&mut self, path: &str, new_path: &str) -> Result<bool> {
        self.check_writable()?;
        let Some(index) = self.index_of(path) else {
            return Ok(false);
        };
        self.entries[index].name = new_path.to_string();
        self.dirty = true;
        Ok(true)
    }

    /// Finalizes the archive, writing the container if it was created or
    /// modified, and releases the buffer pool.
    ///
    /// Dropping the archive does the same but can only log failures.
    pub fn close(mut self) -> Result<()> {
        self.finish()
    }

    fn finish(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;

        let result = if self.access == ZipAccess::Write && (self.dirty || self.created) {
            self.serialize()
                .and_then(|bytes| self.container.persist(&bytes))
        } else {
            Ok(())
        };
        if result.is_ok() && self.access == ZipAccess::Write {
            log::debug!(
                "finalized archive '{}' ({} entries)",
                self.container.describe(),
                self.entries.len()
            );
        }
        self.write_buffers.clear();
        self.source = None;
        result
    }

    fn check_writable(&self) -> Result<()> {
        match self.access {
            ZipAccess::Read => Err(Error::ReadOnly),
            ZipAccess::Write => Ok(()),
        }
    }

    fn buffer(&self, index: usize) -> Result<&[u8]> {
        self.write_buffers
            .get(index)
            .map(Vec::as_slice)
            .ok_or(Error::StreamClosed)
    }

    /// Returns the writer options for new entries.
    fn file_options(&self) -> SimpleFileOptions {
        match (self.options.compression_method(), self.options.compression_level()) {
            #[cfg(feature = "deflate")]
            (super::EntryMethod::Deflate, level @ 1..) => SimpleFileOptions::default()
                .compression_method(CompressionMethod::Deflated)
                .compression_level(Some(i64::from(level))),
            _ => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        }
    }

    /// Produces the complete container.
    ///
    /// Existing entries are copied without recompression. Entries whose name
    /// repeats an earlier one exactly are skipped.
    fn serialize(&mut self) -> Result<Vec<u8>> {
        let options = self.file_options();
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let mut written = HashSet::new();

        for entry in &self.entries {
            if !written.insert(entry.name.as_str()) {
                log::warn!("skipping duplicate archive entry '{}'", entry.name);
                continue;
            }
            match entry.source {
                EntrySource::Existing { index, .. } => {
                    let source = self.source.as_mut().ok_or(Error::StreamClosed)?;
                    let file = source.by_index_raw(index)?;
                    writer.raw_copy_file_rename(file, entry.name.as_str())?;
                }
                EntrySource::Pending { buffer } => {
                    let data = self.write_buffers.get(buffer).ok_or(Error::StreamClosed)?;
                    writer.start_file(entry.name.as_str(), options)?;
                    writer.write_all(data)?;
                }
            }
        }
        Ok(writer.finish()?.into_inner())
    }
}

impl Drop for ZipArchive {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::warn!(
                "failed to finalize archive '{}': {}",
                self.container.describe(),
                e
            );
        }
    }
}

//! ZIP archive store.
//!
//! [`ZipArchive`] presents a ZIP container as a flat table of named entries
//! that can be read, added, replaced, deleted and renamed. The container is
//! loaded into memory when the archive is opened and handed to the [`zip`]
//! crate. In [`ZipAccess::Write`] mode it is rewritten once, when the archive
//! is closed: untouched entries are copied over without recompression and
//! new buffers are encoded with the configured [`ArchiveOptions`].
//!
//! # Supported Features
//!
//! | Feature | Support |
//! |---------|---------|
//! | Stored entries | Read and write |
//! | Deflate entries | Read and write (`deflate` feature) |
//! | UTF-8 names | Read and write |
//! | Data descriptors | Read |
//! | ZIP64 | Read |
//! | Encryption | Listed, not readable |
//!
//! Entries that cannot be decoded are listed normally but read back as empty.
//!
//! # Example
//!
//! ```rust,no_run
//! use assetio::{SeekableStream, ZipAccess, ZipArchive};
//!
//! let mut archive = ZipArchive::open("sounds.zip", ZipAccess::Read)?;
//! for i in 0..archive.entry_count() {
//!     println!("{} ({} bytes)", archive.entry_name(i), archive.entry_size(i));
//! }
//!
//! if let Some(stream) = archive.open_entry_stream("music/css1.wav") {
//!     println!("entry stream of {} bytes", stream.len());
//! }
//! # Ok::<(), assetio::Error>(())
//! ```

mod archive;
mod options;

pub use archive::{ZipAccess, ZipArchive};
pub use options::{ArchiveOptions, EntryMethod};

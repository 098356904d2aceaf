//! # assetio
//!
//! Unified seekable byte streams over native files, sandboxed virtual
//! filesystems and memory, a ZIP archive store built on them, and a
//! streaming RIFF/WAVE reader that serves PCM data without loading it.
//!
//! ## Quick Start
//!
//! ### Reading and Writing Streams
//!
//! ```rust,no_run
//! use assetio::{FileMode, FileStream, Result, SeekableStream};
//!
//! fn main() -> Result<()> {
//!     let mut stream = FileStream::open("config.bin", FileMode::Write)?;
//!     stream.write(b"\x01\x00\x00\x00")?;
//!
//!     stream.set_position(0)?;
//!     assert_eq!(stream.read_u32_le()?, 1);
//!     assert_eq!(stream.len(), 4);
//!     Ok(())
//! }
//! ```
//!
//! ### Working with Archives
//!
//! ```rust,no_run
//! use assetio::{Result, ZipAccess, ZipArchive};
//!
//! fn main() -> Result<()> {
//!     let mut archive = ZipArchive::open("park.zip", ZipAccess::Write)?;
//!     archive.set_entry("park.json", br#"{"name":"Forest Frontiers"}"#.to_vec())?;
//!     archive.close()?;
//!
//!     // Optional content: a missing pack is not an error.
//!     if let Some(mut archive) = ZipArchive::try_open("extras.zip", ZipAccess::Read) {
//!         let data = archive.read_entry("objects\\ride.dat");
//!         println!("{} bytes", data.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ### Streaming Audio
//!
//! ```rust,no_run
//! use assetio::{SampleEncoding, WavStream};
//!
//! if let Some(mut wav) = WavStream::open_path("sound.wav") {
//!     assert!(matches!(
//!         wav.format().encoding,
//!         SampleEncoding::U8 | SampleEncoding::S16Le
//!     ));
//!     let mut pcm = vec![0u8; 1024];
//!     let n = wav.read(&mut pcm, 0);
//!     assert!(n as u64 <= wav.length());
//! }
//! ```
//!
//! ### Sandboxed Virtual Filesystem
//!
//! ```rust,no_run
//! use assetio::{FileMode, SandboxFs, SeekableStream, Vfs, WavStream};
//!
//! let vfs = Vfs::new(SandboxFs::new("/home/user/.config/game"));
//! vfs.initialize()?;
//!
//! vfs.ensure_directory_exists("save");
//! let mut save = vfs.open_stream("save/autosave.sv6", FileMode::Write)?;
//! save.write(b"SV6")?;
//!
//! let click = WavStream::open_vfs(&vfs, "audio/click.wav");
//! # Ok::<(), assetio::Error>(())
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `deflate` | Yes | Deflate compression for ZIP entries |
//!
//! Without `deflate`, archives are written with stored entries and deflated
//! entries in existing archives read back as empty.
//!
//! ## Error Handling
//!
//! Fallible operations return [`Result<T>`], an alias for
//! `std::result::Result<T, Error>`. Lookups that are expected to miss, such
//! as [`ZipArchive::read_entry`], return empty results instead, and
//! best-effort constructors such as [`ZipArchive::try_open`] and
//! [`WavStream::from_stream`] return `None`. The reason is logged through
//! the [`log`] facade.
//!
//! ## Minimum Supported Rust Version (MSRV)
//!
//! This crate requires **Rust 1.85** or later.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod stream;
pub mod vfs;
pub mod wav;
pub mod zip;

pub use error::{Error, Result};
pub use stream::{FileMode, FileStream, MemoryStream, SeekOrigin, SeekableStream, VfsFileStream};
pub use vfs::{FileType, SandboxFs, VfsStat, Vfs, VirtualFs};
pub use wav::{AudioFormat, PcmSource, SampleEncoding, WavStream};
pub use zip::{ArchiveOptions, EntryMethod, ZipAccess, ZipArchive};

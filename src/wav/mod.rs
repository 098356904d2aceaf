//! Streaming RIFF/WAVE PCM reader.
//!
//! [`WavStream`] parses the container header once, remembers where the
//! `data` chunk starts and how long it is, and afterwards serves positioned
//! reads straight from the underlying stream. Sample data is never buffered.
//!
//! # Container layout
//!
//! ```text
//! "RIFF" <u32 size> "WAVE"
//!   [fact | LIST | bext | JUNK]*  "fmt " <u32 size> <format record>
//!   [fact | LIST | bext | JUNK]*  "data" <u32 size> <samples>
//! ```
//!
//! Only the four chunk types shown are skipped while looking for `fmt ` and
//! `data`. Any other chunk before the one being looked for fails the load.
//!
//! # Error Handling
//!
//! [`WavStream::load`] reports why a container was rejected.
//! [`WavStream::from_stream`], [`WavStream::open_path`] and
//! [`WavStream::open_vfs`] log the reason at debug level and return `None`,
//! so a missing or broken sound is simply absent. [`WavStream::read`] never
//! fails: out-of-range requests are clamped and seek failures read nothing.
//!
//! # Example
//!
//! ```rust,no_run
//! use assetio::WavStream;
//!
//! if let Some(mut wav) = WavStream::open_path("sounds/click.wav") {
//!     let format = wav.format();
//!     println!("{} Hz, {} channels, {} bytes", format.sample_rate, format.channels, wav.length());
//!
//!     let mut buf = [0u8; 4096];
//!     let mut offset = 0;
//!     loop {
//!         let n = wav.read(&mut buf, offset);
//!         if n == 0 {
//!             break;
//!         }
//!         offset += n as u64;
//!     }
//! }
//! ```

pub mod chunk;
mod format;

pub use format::{AudioFormat, SampleEncoding, WAVE_FORMAT_PCM};

use std::path::Path;

use crate::stream::{FileMode, FileStream, SeekableStream, VfsFileStream};
use crate::vfs::Vfs;
use crate::{Error, Result};
use chunk::{find_chunk, fourcc, id};
use format::{FORMAT_RECORD_SIZE, FormatRecord};

/// A source of PCM bytes that a playback engine pulls from.
pub trait PcmSource {
    /// Returns the format of the samples.
    fn format(&self) -> AudioFormat;

    /// Returns the total number of PCM bytes.
    fn length(&self) -> u64;

    /// Copies bytes starting at `offset` into `dst` and returns how many
    /// were copied. Returns 0 at or past the end.
    fn read(&mut self, dst: &mut [u8], offset: u64) -> usize;
}

/// Lazily read PCM data from a RIFF/WAVE container.
#[derive(Debug)]
pub struct WavStream<S> {
    source: Option<S>,
    format: AudioFormat,
    data_begin: u64,
    data_length: u64,
}

impl<S> Default for WavStream<S> {
    fn default() -> Self {
        Self {
            source: None,
            format: AudioFormat::default(),
            data_begin: 0,
            data_length: 0,
        }
    }
}

impl<S: SeekableStream> WavStream<S> {
    /// Creates a reader with nothing loaded.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses `source` and takes ownership of it.
    ///
    /// Any previously loaded source is released first. On failure nothing
    /// stays loaded and `source` is dropped.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidFormat`] if the `RIFF`/`WAVE` magic is wrong, a
    ///   required chunk is missing, or the `data` chunk is empty
    /// - [`Error::CorruptHeader`] if the `fmt ` chunk is too short
    /// - [`Error::UnsupportedEncoding`] for anything but 8 or 16-bit PCM
    /// - [`Error::Io`] if the source cannot be read or seeked
    pub fn load(&mut self, mut source: S) -> Result<()> {
        self.unload();

        if source.read_u32_le()? != id::RIFF {
            return Err(Error::InvalidFormat("not a RIFF container".into()));
        }
        // The declared RIFF size is not checked against the stream length.
        source.read_u32_le()?;
        let form = source.read_u32_le()?;
        if form != id::WAVE {
            return Err(Error::InvalidFormat(format!(
                "RIFF form type is '{}', not 'WAVE'",
                fourcc(form)
            )));
        }

        let fmt_size = find_chunk(&mut source, id::FMT)?;
        let fmt_start = source.position();
        if fmt_size < FORMAT_RECORD_SIZE {
            return Err(Error::CorruptHeader {
                offset: fmt_start,
                reason: format!("'fmt ' chunk is {fmt_size} bytes"),
            });
        }
        let record = FormatRecord::read(&mut source)?;
        // Extension fields and padding are skipped by seeking from the
        // chunk start.
        source.set_position(fmt_start + u64::from(fmt_size))?;
        let format = record.to_audio_format()?;

        let data_length = find_chunk(&mut source, id::DATA)?;
        if data_length == 0 {
            return Err(Error::InvalidFormat("'data' chunk is empty".into()));
        }

        self.data_begin = source.position();
        self.data_length = u64::from(data_length);
        self.format = format;
        self.source = Some(source);
        log::debug!(
            "loaded WAVE: {} Hz, {} channels, {:?}, {} data bytes at {:#x}",
            format.sample_rate,
            format.channels,
            format.encoding,
            self.data_length,
            self.data_begin
        );
        Ok(())
    }

    /// Loads `source`, returning `None` if it is not a usable container.
    pub fn from_stream(source: S) -> Option<Self> {
        let mut wav = Self::new();
        match wav.load(source) {
            Ok(()) => Some(wav),
            Err(e) => {
                log::debug!("unable to load WAVE data: {}", e);
                None
            }
        }
    }

    /// Releases the source and resets offsets. Calling it again is a no-op.
    pub fn unload(&mut self) {
        self.source = None;
        self.format = AudioFormat::default();
        self.data_begin = 0;
        self.data_length = 0;
    }

    /// Returns `true` if a source is loaded.
    pub fn is_loaded(&self) -> bool {
        self.source.is_some()
    }

    /// Returns the format of the loaded data.
    pub fn format(&self) -> AudioFormat {
        self.format
    }

    /// Returns the size of the `data` chunk in bytes.
    pub fn length(&self) -> u64 {
        self.data_length
    }

    /// Returns the absolute offset of the first sample byte in the source.
    pub fn data_offset(&self) -> u64 {
        self.data_begin
    }

    /// Copies PCM bytes starting at `offset` into `dst`.
    ///
    /// The request is clamped to the end of the `data` chunk. The source is
    /// only repositioned when it is not already at the requested byte, so
    /// sequential reads do not seek. Returns 0 if nothing is loaded or the
    /// seek fails.
    pub fn read(&mut self, dst: &mut [u8], offset: u64) -> usize {
        let Some(source) = self.source.as_mut() else {
            return 0;
        };
        if offset >= self.data_length {
            return 0;
        }
        let len = (dst.len() as u64).min(self.data_length - offset) as usize;
        let target = self.data_begin + offset;
        if source.position() != target {
            if let Err(e) = source.set_position(target) {
                log::debug!("WAVE seek to {} failed: {}", target, e);
                return 0;
            }
        }
        source.try_read(&mut dst[..len])
    }

    /// Consumes the reader and returns its source, if one is loaded.
    pub fn into_inner(self) -> Option<S> {
        self.source
    }
}

impl WavStream<FileStream> {
    /// Opens and loads a native file, returning `None` on any failure.
    pub fn open_path(path: impl AsRef<Path>) -> Option<Self> {
        let path = path.as_ref();
        match FileStream::open(path, FileMode::Open) {
            Ok(stream) => Self::from_stream(stream),
            Err(e) => {
                log::debug!("unable to open WAVE file '{}': {}", path.display(), e);
                None
            }
        }
    }
}

impl WavStream<VfsFileStream> {
    /// Opens and loads a file on a virtual filesystem, returning `None` on
    /// any failure.
    pub fn open_vfs(vfs: &Vfs, path: &str) -> Option<Self> {
        match vfs.open_stream(path, FileMode::Open) {
            Ok(stream) => Self::from_stream(stream),
            Err(e) => {
                log::debug!("unable to open WAVE file '{}': {}", path, e);
                None
            }
        }
    }
}

impl<S: SeekableStream> PcmSource for WavStream<S> {
    fn format(&self) -> AudioFormat {
        WavStream::format(self)
    }

    fn length(&self) -> u64 {
        WavStream::length(self)
    }

    fn read(&mut self, dst: &mut [u8], offset: u64) -> usize {
        WavStream::read(self, dst, offset)
    }
}

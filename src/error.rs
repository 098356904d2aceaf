//! Error types for stream, archive and audio operations.
//!
//! This module provides the [`Error`] enum which represents all possible
//! failure modes of the crate, along with a convenient [`Result<T>`] type
//! alias.
//!
//! # Error Handling
//!
//! Opening a stream, reading past its end or writing to a backend that
//! rejects the write are hard failures and are returned as errors. Path based
//! archive lookups that miss are *not* errors: they return an empty result.
//! The WAV loader converts every structural problem into an absent reader
//! when called through [`WavStream::from_stream`], and into one of the
//! variants below when called through [`WavStream::load`].
//!
//! ```rust,no_run
//! use assetio::{Error, FileMode, FileStream};
//!
//! fn open_or_report(path: &str) -> assetio::Result<FileStream> {
//!     match FileStream::open(path, FileMode::Open) {
//!         Ok(stream) => Ok(stream),
//!         Err(e) if e.is_not_found() => {
//!             eprintln!("missing asset: {}", path);
//!             Err(e)
//!         }
//!         Err(e) => Err(e),
//!     }
//! }
//! ```
//!
//! [`WavStream::from_stream`]: crate::wav::WavStream::from_stream
//! [`WavStream::load`]: crate::wav::WavStream::load

use std::io;

use ::zip::result::ZipError;

/// The main error type for this crate.
///
/// # Error Categories
///
/// | Category | Variants | Typical Cause |
/// |----------|----------|---------------|
/// | Open | [`NotFound`][Self::NotFound], [`NotInitialized`][Self::NotInitialized] | Missing path, uninitialized backend |
/// | I/O | [`Io`][Self::Io], [`StreamClosed`][Self::StreamClosed], [`ReadOnly`][Self::ReadOnly] | Backend rejected the operation |
/// | Format | [`InvalidFormat`][Self::InvalidFormat], [`CorruptHeader`][Self::CorruptHeader] | Bad magic or structure |
/// | Compatibility | [`UnsupportedEncoding`][Self::UnsupportedEncoding], [`UnsupportedFeature`][Self::UnsupportedFeature] | Recognized but unsupported data |
/// | Integrity | [`Truncated`][Self::Truncated] | Declared and actual sizes disagree |
/// | Configuration | [`InvalidCompressionLevel`][Self::InvalidCompressionLevel] | Invalid option value |
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A path could not be opened.
    ///
    /// Returned when the path does not exist, is not a regular file, or the
    /// backend refused to open it. The path is carried verbatim.
    #[error("Unable to open '{path}'")]
    NotFound {
        /// The path that could not be opened.
        path: String,
        /// The backend error, when one was reported.
        #[source]
        source: Option<io::Error>,
    },

    /// An I/O error occurred.
    ///
    /// Reads past the end of a stream are reported as
    /// [`io::ErrorKind::UnexpectedEof`]; rejected writes carry the backend
    /// error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The data does not match the expected container structure.
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// A WAVE record is corrupt or truncated at a known offset.
    #[error("Corrupt header at offset {offset:#x}: {reason}")]
    CorruptHeader {
        /// The byte offset where corruption was detected.
        offset: u64,
        /// A description of the corruption.
        reason: String,
    },

    /// The container is recognized but its sample encoding is not supported.
    ///
    /// Only linear PCM (`encoding == 1`) with 8 or 16 bits per sample is
    /// accepted.
    #[error("Unsupported encoding {encoding:#x} with {bits_per_sample} bits per sample")]
    UnsupportedEncoding {
        /// The encoding code from the format record.
        encoding: u16,
        /// The bits-per-sample field from the format record.
        bits_per_sample: u16,
    },

    /// An archive uses a feature this build cannot handle, such as
    /// encryption or a compression method whose cargo feature is disabled.
    #[error("Unsupported feature: {feature}")]
    UnsupportedFeature {
        /// Description reported by the archive library.
        feature: String,
    },

    /// The number of bytes actually read differs from the declared size.
    #[error("Truncated data: expected {expected} bytes, got {actual}")]
    Truncated {
        /// The declared size.
        expected: u64,
        /// The number of bytes actually obtained.
        actual: u64,
    },

    /// The stream has already been closed.
    #[error("Stream is closed")]
    StreamClosed,

    /// A mutation was requested on a read-only stream or archive.
    #[error("Handle is read-only")]
    ReadOnly,

    /// The virtual filesystem was used before it was initialized.
    #[error("Virtual filesystem is not initialized")]
    NotInitialized,

    /// An invalid compression level was provided.
    ///
    /// ```rust
    /// use assetio::{ArchiveOptions, Error};
    ///
    /// assert!(ArchiveOptions::new().level(6).is_ok());
    /// assert!(matches!(
    ///     ArchiveOptions::new().level(15),
    ///     Err(Error::InvalidCompressionLevel { level: 15 })
    /// ));
    /// ```
    #[error("invalid compression level {level}: must be 0-9")]
    InvalidCompressionLevel {
        /// The invalid level that was provided.
        level: u32,
    },
}

impl Error {
    /// Creates a [`Error::NotFound`] for a path without a backend error.
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Error::NotFound {
            path: path.into(),
            source: None,
        }
    }

    /// Creates a [`Error::NotFound`] carrying the backend error.
    pub(crate) fn open_failed(path: impl Into<String>, source: io::Error) -> Self {
        Error::NotFound {
            path: path.into(),
            source: Some(source),
        }
    }

    /// Creates the error returned by a read that runs past the end of a stream.
    pub(crate) fn read_past_end() -> Self {
        Error::Io(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            "Attempted to read past end of file",
        ))
    }

    /// Returns `true` if this error means a path could not be opened.
    ///
    /// This includes I/O errors of kind [`io::ErrorKind::NotFound`].
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::NotFound { .. } => true,
            Error::Io(e) => e.kind() == io::ErrorKind::NotFound,
            _ => false,
        }
    }

    /// Returns `true` if this error indicates malformed or damaged data.
    ///
    /// # Example
    ///
    /// ```rust
    /// use assetio::Error;
    ///
    /// let err = Error::Truncated { expected: 10, actual: 4 };
    /// assert!(err.is_corruption());
    /// assert!(!Error::StreamClosed.is_corruption());
    /// ```
    pub fn is_corruption(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_)
                | Error::CorruptHeader { .. }
                | Error::Truncated { .. }
        )
    }

    /// Returns `true` if the data was recognized but uses an unsupported
    /// encoding or feature.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedEncoding { .. } | Error::UnsupportedFeature { .. }
        )
    }
}

impl From<ZipError> for Error {
    fn from(err: ZipError) -> Self {
        match err {
            ZipError::Io(e) => Error::Io(e),
            e @ ZipError::UnsupportedArchive(_) => Error::UnsupportedFeature {
                feature: e.to_string(),
            },
            other => Error::InvalidFormat(other.to_string()),
        }
    }
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;

//! Options for archives opened in write mode.

use crate::{Error, Result};

/// Compression method used for entries added through
/// [`ZipArchive::set_entry`](super::ZipArchive::set_entry).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryMethod {
    /// Store entries uncompressed.
    Stored,
    /// Compress entries with Deflate.
    #[cfg(feature = "deflate")]
    Deflate,
}

impl Default for EntryMethod {
    fn default() -> Self {
        #[cfg(feature = "deflate")]
        {
            EntryMethod::Deflate
        }
        #[cfg(not(feature = "deflate"))]
        {
            EntryMethod::Stored
        }
    }
}

/// How entries added with [`ZipArchive::set_entry`] are encoded.
///
/// [`ZipArchive::set_entry`]: super::ZipArchive::set_entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveOptions {
    method: EntryMethod,
    level: u32,
}

impl Default for ArchiveOptions {
    fn default() -> Self {
        Self {
            method: EntryMethod::default(),
            level: 6,
        }
    }
}

impl ArchiveOptions {
    /// Creates options with Deflate (when available) at level 6.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the compression method.
    pub fn method(mut self, method: EntryMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the compression level.
    ///
    /// Valid values are 0-9. Level 0 stores entries uncompressed regardless
    /// of the method. Entries copied from an existing container keep their
    /// original encoding.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidCompressionLevel`] if level is greater than 9.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use assetio::ArchiveOptions;
    ///
    /// let options = ArchiveOptions::new().level(9)?;
    /// assert_eq!(options.compression_level(), 9);
    /// # Ok::<(), assetio::Error>(())
    /// ```
    pub fn level(mut self, level: u32) -> Result<Self> {
        if level > 9 {
            return Err(Error::InvalidCompressionLevel { level });
        }
        self.level = level;
        Ok(self)
    }

    /// Returns the configured method.
    pub fn compression_method(&self) -> EntryMethod {
        self.method
    }

    /// Returns the configured level.
    pub fn compression_level(&self) -> u32 {
        self.level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ArchiveOptions::new();
        assert_eq!(options.compression_level(), 6);
        assert_eq!(options.compression_method(), EntryMethod::default());
    }

    #[test]
    fn test_level_validation() {
        assert!(ArchiveOptions::new().level(0).is_ok());
        assert!(matches!(
            ArchiveOptions::new().level(10),
            Err(Error::InvalidCompressionLevel { level: 10 })
        ));
    }

    #[test]
    fn test_method_builder() {
        let options = ArchiveOptions::new().method(EntryMethod::Stored);
        assert_eq!(options.compression_method(), EntryMethod::Stored);
    }
}

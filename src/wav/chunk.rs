//! RIFF chunk identifiers and the forward chunk scan.

use crate::stream::{SeekOrigin, SeekableStream};
use crate::{Error, Result};

/// Chunk identifiers, as little-endian `u32` values of their four-character
/// codes.
pub mod id {
    /// `RIFF` container header.
    pub const RIFF: u32 = 0x4646_4952;
    /// `WAVE` form type.
    pub const WAVE: u32 = 0x4556_4157;
    /// `fmt ` format chunk.
    pub const FMT: u32 = 0x2074_6D66;
    /// `data` sample chunk.
    pub const DATA: u32 = 0x6174_6164;
    /// `fact` chunk.
    pub const FACT: u32 = 0x7463_6166;
    /// `LIST` metadata chunk.
    pub const LIST: u32 = 0x5453_494C;
    /// `bext` broadcast extension chunk.
    pub const BEXT: u32 = 0x7478_6562;
    /// `JUNK` padding chunk.
    pub const JUNK: u32 = 0x4B4E_554A;
}

/// Chunks passed over while looking for another one. Any other chunk ends
/// the scan.
pub const SKIPPABLE: [u32; 4] = [id::FACT, id::LIST, id::BEXT, id::JUNK];

/// Formats a chunk identifier as its four-character code.
pub fn fourcc(chunk_id: u32) -> String {
    chunk_id
        .to_le_bytes()
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '?'
            }
        })
        .collect()
}

/// Scans forward from the current position for the chunk `wanted`.
///
/// On success the source is positioned at the start of the chunk payload
/// and the declared payload size is returned.
///
/// # Errors
///
/// Returns [`Error::InvalidFormat`] if a chunk that is neither `wanted` nor
/// one of [`SKIPPABLE`] is met, or if the stream ends first.
pub fn find_chunk<S: SeekableStream + ?Sized>(source: &mut S, wanted: u32) -> Result<u32> {
    loop {
        let header = source
            .read_u32_le()
            .and_then(|chunk_id| Ok((chunk_id, source.read_u32_le()?)));
        let (chunk_id, size) = header.map_err(|_| {
            Error::InvalidFormat(format!("'{}' chunk not found", fourcc(wanted)))
        })?;

        if chunk_id == wanted {
            return Ok(size);
        }
        if !SKIPPABLE.contains(&chunk_id) {
            return Err(Error::InvalidFormat(format!(
                "unexpected '{}' chunk while looking for '{}'",
                fourcc(chunk_id),
                fourcc(wanted)
            )));
        }
        log::trace!("skipping '{}' chunk of {} bytes", fourcc(chunk_id), size);
        source.seek(i64::from(size), SeekOrigin::Current)?;
    }
}

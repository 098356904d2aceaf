//! Audio format descriptor and the WAVE `fmt ` record.

use crate::stream::SeekableStream;
use crate::{Error, Result};

/// Encoding code for linear PCM.
pub const WAVE_FORMAT_PCM: u16 = 1;

/// Size of the fixed part of a `fmt ` chunk.
pub const FORMAT_RECORD_SIZE: u32 = 16;

/// Sample encoding of decoded PCM data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SampleEncoding {
    /// Unsigned 8-bit samples.
    #[default]
    U8,
    /// Signed 16-bit little-endian samples.
    S16Le,
}

impl SampleEncoding {
    /// Maps a bits-per-sample value to an encoding.
    pub fn from_bits(bits_per_sample: u16) -> Option<Self> {
        match bits_per_sample {
            8 => Some(SampleEncoding::U8),
            16 => Some(SampleEncoding::S16Le),
            _ => None,
        }
    }

    /// Returns the size of one sample in bytes.
    pub fn bytes_per_sample(self) -> u16 {
        match self {
            SampleEncoding::U8 => 1,
            SampleEncoding::S16Le => 2,
        }
    }
}

/// Format of a loaded PCM stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AudioFormat {
    /// Samples per second, per channel.
    pub sample_rate: u32,
    /// Encoding of each sample.
    pub encoding: SampleEncoding,
    /// Number of interleaved channels.
    pub channels: u16,
}

impl AudioFormat {
    /// Returns the size of one frame (one sample for every channel).
    pub fn bytes_per_frame(&self) -> u32 {
        u32::from(self.encoding.bytes_per_sample()) * u32::from(self.channels)
    }

    /// Returns the number of bytes consumed per second of playback.
    pub fn bytes_per_second(&self) -> u64 {
        u64::from(self.bytes_per_frame()) * u64::from(self.sample_rate)
    }
}

/// The fields of the fixed `fmt ` chunk record that decoding depends on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FormatRecord {
    encoding: u16,
    channels: u16,
    sample_rate: u32,
    bits_per_sample: u16,
}

impl FormatRecord {
    /// Reads the record at the current position, leaving the stream just
    /// past it.
    pub(crate) fn read<S: SeekableStream + ?Sized>(source: &mut S) -> Result<Self> {
        let encoding = source.read_u16_le()?;
        let channels = source.read_u16_le()?;
        let sample_rate = source.read_u32_le()?;
        // Byte rate and block alignment follow from the other fields.
        let mut derived = [0u8; 6];
        source.read(&mut derived)?;
        let bits_per_sample = source.read_u16_le()?;
        Ok(Self {
            encoding,
            channels,
            sample_rate,
            bits_per_sample,
        })
    }

    /// Validates the record and converts it to an [`AudioFormat`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedEncoding`] unless the record describes
    /// linear PCM with 8 or 16 bits per sample.
    pub(crate) fn to_audio_format(&self) -> Result<AudioFormat> {
        let unsupported = || Error::UnsupportedEncoding {
            encoding: self.encoding,
            bits_per_sample: self.bits_per_sample,
        };
        if self.encoding != WAVE_FORMAT_PCM {
            return Err(unsupported());
        }
        let encoding = SampleEncoding::from_bits(self.bits_per_sample).ok_or_else(unsupported)?;
        Ok(AudioFormat {
            sample_rate: self.sample_rate,
            encoding,
            channels: self.channels,
        })
    }
}

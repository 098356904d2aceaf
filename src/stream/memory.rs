//! In-memory stream.

use super::SeekableStream;
use crate::{Error, Result};

/// A [`SeekableStream`] over an owned byte buffer.
///
/// The archive store hands entries out as memory streams, which lets the
/// WAV reader consume sounds straight out of an asset pack.
#[derive(Debug, Clone, Default)]
pub struct MemoryStream {
    data: Vec<u8>,
    position: u64,
    writable: bool,
}

impl MemoryStream {
    /// Creates an empty writable stream.
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            position: 0,
            writable: true,
        }
    }

    /// Creates a writable stream over existing bytes, positioned at the start.
    pub fn from_vec(data: Vec<u8>) -> Self {
        Self {
            data,
            position: 0,
            writable: true,
        }
    }

    /// Creates a read-only stream over existing bytes.
    pub fn read_only(data: Vec<u8>) -> Self {
        Self {
            data,
            position: 0,
            writable: false,
        }
    }

    /// Returns the buffered bytes.
    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    /// Consumes the stream and returns its buffer.
    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }

    fn remaining(&self) -> &[u8] {
        let start = usize::try_from(self.position)
            .unwrap_or(usize::MAX)
            .min(self.data.len());
        &self.data[start..]
    }
}

impl SeekableStream for MemoryStream {
    fn can_read(&self) -> bool {
        true
    }

    fn can_write(&self) -> bool {
        self.writable
    }

    fn len(&self) -> u64 {
        self.data.len() as u64
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn set_position(&mut self, position: u64) -> Result<()> {
        self.position = position;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<()> {
        let remaining = self.remaining();
        if buf.len() > remaining.len() {
            return Err(Error::read_past_end());
        }
        buf.copy_from_slice(&remaining[..buf.len()]);
        self.position += buf.len() as u64;
        Ok(())
    }

    fn try_read(&mut self, buf: &mut [u8]) -> usize {
        let remaining = self.remaining();
        let n = buf.len().min(remaining.len());
        buf[..n].copy_from_slice(&remaining[..n]);
        self.position += n as u64;
        n
    }

    fn write(&mut self, buf: &[u8]) -> Result<()> {
        if !self.writable {
            return Err(Error::ReadOnly);
        }
        let out_of_memory = || {
            Error::Io(std::io::Error::new(
                std::io::ErrorKind::OutOfMemory,
                "write extends past addressable memory",
            ))
        };
        let end = usize::try_from(self.position)
            .ok()
            .and_then(|start| start.checked_add(buf.len()))
            .ok_or_else(out_of_memory)?;
        let start = end - buf.len();
        if end > self.data.len() {
            self.data
                .try_reserve(end - self.data.len())
                .map_err(|_| out_of_memory())?;
            // Gaps left by seeking past the end read back as zeros.
            self.data.resize(end, 0);
        }
        self.data[start..end].copy_from_slice(buf);
        self.position = end as u64;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::SeekOrigin;

    #[test]
    fn test_write_extends_and_overwrites() {
        let mut stream = MemoryStream::new();
        stream.write(b"hello").unwrap();
        assert_eq!(stream.len(), 5);
        stream.set_position(1).unwrap();
        stream.write(b"EL").unwrap();
        assert_eq!(stream.len(), 5);
        assert_eq!(stream.position(), 3);
        assert_eq!(stream.as_slice(), b"hELlo");
    }

    #[test]
    fn test_write_past_end_zero_fills() {
        let mut stream = MemoryStream::new();
        stream.seek(3, SeekOrigin::End).unwrap();
        stream.write(b"x").unwrap();
        assert_eq!(stream.into_inner(), vec![0, 0, 0, b'x']);
    }

    #[test]
    fn test_read_past_end_leaves_state() {
        let mut stream = MemoryStream::from_vec(b"abc".to_vec());
        let mut buf = [9u8; 4];
        assert!(stream.read(&mut buf).is_err());
        assert_eq!(buf, [9u8; 4]);
        assert_eq!(stream.position(), 0);
        assert_eq!(stream.try_read(&mut buf), 3);
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(stream.try_read(&mut buf), 0);
    }

    #[test]
    fn test_position_beyond_end_reads_nothing() {
        let mut stream = MemoryStream::from_vec(vec![1, 2]);
        stream.set_position(10).unwrap();
        let mut buf = [0u8; 1];
        assert_eq!(stream.try_read(&mut buf), 0);
        assert!(stream.read(&mut buf).is_err());
    }

    #[test]
    fn test_read_only_rejects_write() {
        let mut stream = MemoryStream::read_only(vec![1, 2, 3]);
        assert!(!stream.can_write());
        assert!(matches!(stream.write(b"x"), Err(Error::ReadOnly)));
        assert_eq!(stream.len(), 3);
    }

    #[test]
    fn test_write_at_max_position_fails() {
        let mut stream = MemoryStream::from_vec(b"abc".to_vec());
        stream.set_position(u64::MAX).unwrap();
        match stream.write(b"x") {
            Err(Error::Io(e)) => assert_eq!(e.kind(), std::io::ErrorKind::OutOfMemory),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(stream.as_slice(), b"abc");
        assert_eq!(stream.position(), u64::MAX);
    }

    #[test]
    fn test_write_with_huge_gap_fails() {
        let mut stream = MemoryStream::new();
        stream.set_position(1 << 60).unwrap();
        assert!(matches!(stream.write(b"x"), Err(Error::Io(_))));
        assert!(stream.is_empty());
    }
}

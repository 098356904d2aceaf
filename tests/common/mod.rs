//! Shared test utilities for integration tests.
//!
//! Note: `#![allow(dead_code)]` is required because each integration test file
//! compiles as a separate crate and may only use a subset of these helpers.

#![allow(dead_code)]

use std::path::{Path, PathBuf};

use assetio::{SandboxFs, Vfs, ZipAccess, ZipArchive};
use tempfile::TempDir;

/// Unwraps the error of a result, panicking on `Ok`.
pub fn expect_err<T, E>(result: Result<T, E>) -> E {
    match result {
        Ok(_) => panic!("Expected error but got Ok"),
        Err(e) => e,
    }
}

/// Creates an initialized sandboxed filesystem rooted in a fresh temp dir.
pub fn sandbox_vfs() -> (TempDir, Vfs) {
    let dir = TempDir::new().unwrap();
    let vfs = Vfs::new(SandboxFs::new(dir.path()));
    vfs.initialize().unwrap();
    (dir, vfs)
}

/// Writes an archive at `dir/name` containing `entries` and returns its path.
pub fn create_archive(dir: &Path, name: &str, entries: &[(&str, &[u8])]) -> PathBuf {
    let path = dir.join(name);
    let mut archive = ZipArchive::open(&path, ZipAccess::Write).unwrap();
    for (entry, data) in entries {
        archive.set_entry(entry, data.to_vec()).unwrap();
    }
    archive.close().unwrap();
    path
}

/// Opens `path` read-only and checks it holds exactly `expected`, in order.
pub fn verify_archive_contents(path: &Path, expected: &[(&str, &[u8])]) {
    let mut archive = ZipArchive::open(path, ZipAccess::Read).unwrap();
    assert_eq!(
        archive.entry_count(),
        expected.len(),
        "entry count mismatch"
    );
    for (i, (name, data)) in expected.iter().enumerate() {
        assert_eq!(archive.entry_name(i), *name, "name mismatch at index {i}");
        assert_eq!(archive.entry_size(i), data.len() as u64, "size mismatch for {name}");
        assert_eq!(archive.read_entry(name), *data, "content mismatch for {name}");
    }
}

/// Builds a stored-only ZIP by hand, independent of the crate's writer.
///
/// When `data_descriptor` is set, local headers carry zero sizes and the
/// real values follow each payload, as streaming zip tools produce.
pub fn handmade_zip(entries: &[(&str, &[u8])], data_descriptor: bool) -> Vec<u8> {
    let mut out = Vec::new();
    let mut central = Vec::new();
    for (name, data) in entries {
        let offset = out.len() as u32;
        let crc = crc32fast::hash(data);
        let size = data.len() as u32;
        let flags: u16 = if data_descriptor { 0x0008 } else { 0 };

        out.extend_from_slice(&0x0403_4b50u32.to_le_bytes());
        out.extend_from_slice(&10u16.to_le_bytes());
        out.extend_from_slice(&flags.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(&0x21u16.to_le_bytes());
        if data_descriptor {
            out.extend_from_slice(&[0u8; 12]);
        } else {
            out.extend_from_slice(&crc.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
        }
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(data);
        if data_descriptor {
            out.extend_from_slice(&0x0807_4b50u32.to_le_bytes());
            out.extend_from_slice(&crc.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
            out.extend_from_slice(&size.to_le_bytes());
        }

        central.extend_from_slice(&0x0201_4b50u32.to_le_bytes());
        central.extend_from_slice(&20u16.to_le_bytes());
        central.extend_from_slice(&10u16.to_le_bytes());
        central.extend_from_slice(&flags.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes());
        central.extend_from_slice(&0x21u16.to_le_bytes());
        central.extend_from_slice(&crc.to_le_bytes());
        central.extend_from_slice(&size.to_le_bytes());
        central.extend_from_slice(&size.to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&[0u8; 8]);
        central.extend_from_slice(&0u32.to_le_bytes());
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
    }
    let directory_offset = out.len() as u32;
    out.extend_from_slice(&central);
    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u16).to_le_bytes());
    out.extend_from_slice(&(central.len() as u32).to_le_bytes());
    out.extend_from_slice(&directory_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

/// Like [`handmade_zip`], but located through a ZIP64 end record with the
/// classic end record saturated, as ZIP64 writers emit.
pub fn handmade_zip64(entries: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = handmade_zip(entries, false);
    let eocd = out.len() - 22;
    let directory_size = u32::from_le_bytes(out[eocd + 12..eocd + 16].try_into().unwrap());
    let directory_offset = u32::from_le_bytes(out[eocd + 16..eocd + 20].try_into().unwrap());
    out.truncate(eocd);

    let record_offset = out.len() as u64;
    out.extend_from_slice(&0x0606_4b50u32.to_le_bytes());
    out.extend_from_slice(&44u64.to_le_bytes());
    out.extend_from_slice(&45u16.to_le_bytes());
    out.extend_from_slice(&45u16.to_le_bytes());
    out.extend_from_slice(&[0u8; 8]);
    out.extend_from_slice(&(entries.len() as u64).to_le_bytes());
    out.extend_from_slice(&(entries.len() as u64).to_le_bytes());
    out.extend_from_slice(&u64::from(directory_size).to_le_bytes());
    out.extend_from_slice(&u64::from(directory_offset).to_le_bytes());

    out.extend_from_slice(&0x0706_4b50u32.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.extend_from_slice(&record_offset.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());

    out.extend_from_slice(&0x0605_4b50u32.to_le_bytes());
    out.extend_from_slice(&[0u8; 4]);
    out.extend_from_slice(&[0xFF; 12]);
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

/// Builder for RIFF/WAVE containers.
#[derive(Debug, Default)]
pub struct WavBuilder {
    chunks: Vec<([u8; 4], Vec<u8>)>,
}

impl WavBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an arbitrary chunk.
    pub fn chunk(mut self, tag: &[u8; 4], payload: impl Into<Vec<u8>>) -> Self {
        self.chunks.push((*tag, payload.into()));
        self
    }

    /// Appends a linear PCM `fmt ` chunk.
    pub fn fmt(self, channels: u16, sample_rate: u32, bits: u16) -> Self {
        self.fmt_with(1, channels, sample_rate, bits)
    }

    /// Appends a `fmt ` chunk with an explicit encoding code.
    pub fn fmt_with(self, encoding: u16, channels: u16, sample_rate: u32, bits: u16) -> Self {
        let block_align = channels * bits / 8;
        let mut payload = Vec::with_capacity(16);
        payload.extend_from_slice(&encoding.to_le_bytes());
        payload.extend_from_slice(&channels.to_le_bytes());
        payload.extend_from_slice(&sample_rate.to_le_bytes());
        payload.extend_from_slice(&(sample_rate * u32::from(block_align)).to_le_bytes());
        payload.extend_from_slice(&block_align.to_le_bytes());
        payload.extend_from_slice(&bits.to_le_bytes());
        self.chunk(b"fmt ", payload)
    }

    /// Appends a `data` chunk.
    pub fn data(self, samples: impl Into<Vec<u8>>) -> Self {
        self.chunk(b"data", samples)
    }

    /// Serializes the container.
    pub fn build(&self) -> Vec<u8> {
        let mut body = b"WAVE".to_vec();
        for (tag, payload) in &self.chunks {
            body.extend_from_slice(tag);
            body.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            body.extend_from_slice(payload);
        }
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&(body.len() as u32).to_le_bytes());
        out.extend_from_slice(&body);
        out
    }
}

/// A mono 8-bit container holding `samples`.
pub fn simple_wav(samples: &[u8]) -> Vec<u8> {
    WavBuilder::new().fmt(1, 22050, 8).data(samples).build()
}

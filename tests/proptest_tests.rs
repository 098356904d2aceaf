//! Property-based tests using proptest.
//!
//! These tests verify stream, archive and WAVE reader invariants using
//! randomly generated inputs.

mod common;

use std::collections::BTreeMap;

use assetio::{MemoryStream, SeekableStream, WavStream, ZipAccess, ZipArchive};
use common::simple_wav;
use proptest::prelude::*;
use tempfile::TempDir;

/// Strategy for archive entry names: 1-3 segments joined by either separator.
fn entry_name_strategy() -> impl Strategy<Value = String> {
    (
        proptest::collection::vec("[a-zA-Z0-9_][a-zA-Z0-9_.-]{0,7}", 1..4),
        any::<bool>(),
    )
        .prop_map(|(parts, backslash)| parts.join(if backslash { "\\" } else { "/" }))
}

/// Normalized form used to keep generated names distinct under lookup.
fn lookup_key(name: &str) -> String {
    name.replace('\\', "/")
}

proptest! {
    /// Whatever is written at a position reads back unchanged.
    #[test]
    fn written_bytes_read_back(
        initial in proptest::collection::vec(any::<u8>(), 0..256),
        offset in 0u64..300,
        patch in proptest::collection::vec(any::<u8>(), 1..64),
    ) {
        let mut stream = MemoryStream::from_vec(initial.clone());
        stream.set_position(offset).unwrap();
        stream.write(&patch).unwrap();

        let expected_len = (initial.len() as u64).max(offset + patch.len() as u64);
        prop_assert_eq!(stream.len(), expected_len);
        prop_assert_eq!(stream.position(), offset + patch.len() as u64);

        stream.set_position(offset).unwrap();
        let mut back = vec![0u8; patch.len()];
        stream.read(&mut back).unwrap();
        prop_assert_eq!(back, patch);
    }

    /// A read that runs past the end fails without touching the buffer or
    /// the position.
    #[test]
    fn overrun_reads_fill_nothing(
        data in proptest::collection::vec(any::<u8>(), 0..128),
        position in 0u64..128,
        extra in 1usize..32,
    ) {
        let mut stream = MemoryStream::from_vec(data.clone());
        let position = position.min(data.len() as u64);
        stream.set_position(position).unwrap();

        let want = (data.len() as u64 - position) as usize + extra;
        let mut buf = vec![0x5Au8; want];
        prop_assert!(stream.read(&mut buf).is_err());
        prop_assert!(buf.iter().all(|&b| b == 0x5A));
        prop_assert_eq!(stream.position(), position);
    }

    /// The WAVE reader never returns more than the data chunk holds.
    #[test]
    fn wav_reads_are_clamped(
        samples in proptest::collection::vec(any::<u8>(), 1..512),
        offset in 0u64..600,
        len in 0usize..600,
    ) {
        let mut wav = WavStream::from_stream(MemoryStream::from_vec(simple_wav(&samples))).unwrap();
        let mut buf = vec![0u8; len];
        let n = wav.read(&mut buf, offset);

        let available = (samples.len() as u64).saturating_sub(offset) as usize;
        prop_assert_eq!(n, len.min(available));
        if n > 0 {
            let start = offset as usize;
            prop_assert_eq!(&buf[..n], &samples[start..start + n]);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Entries written to an archive read back byte for byte, in order.
    #[test]
    fn archive_round_trip(
        entries in proptest::collection::vec(
            (entry_name_strategy(), proptest::collection::vec(any::<u8>(), 0..2048)),
            0..8,
        ),
        compressible in any::<bool>(),
    ) {
        let mut seen = BTreeMap::new();
        let entries: Vec<(String, Vec<u8>)> = entries
            .into_iter()
            .filter(|(name, _)| seen.insert(lookup_key(name), ()).is_none())
            .map(|(name, data)| {
                if compressible {
                    (name, data.iter().map(|b| b & 0x03).collect())
                } else {
                    (name, data)
                }
            })
            .collect();

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prop.zip");
        let mut archive = ZipArchive::open(&path, ZipAccess::Write).unwrap();
        for (name, data) in &entries {
            archive.set_entry(name, data.clone()).unwrap();
        }
        archive.close().unwrap();

        let mut archive = ZipArchive::open(&path, ZipAccess::Read).unwrap();
        prop_assert_eq!(archive.entry_count(), entries.len());
        for (i, (name, data)) in entries.iter().enumerate() {
            prop_assert_eq!(&archive.entry_name(i), name);
            prop_assert_eq!(&archive.read_entry(&lookup_key(name)), data);
        }
    }
}

//! Fuzz target for opening ZIP archives from arbitrary byte input.
//!
//! Opens the archive, then reads every entry it lists, so the entry table
//! and the decoders see adversarial offsets and sizes.
//!
//! Run with: cargo +nightly fuzz run zip_directory

#![no_main]

use assetio::ZipArchive;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(mut archive) = ZipArchive::from_bytes(data.to_vec()) else {
        return;
    };
    for index in 0..archive.entry_count() {
        let name = archive.entry_name(index);
        if let Ok(entry) = archive.read_entry_at(index) {
            assert_eq!(entry.len() as u64, archive.entry_size(index));
        }
        let _ = archive.read_entry(&name);
    }
});

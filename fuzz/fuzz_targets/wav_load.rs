//! Fuzz target for the WAVE header parser.
//!
//! Loads arbitrary bytes from memory and, if they are accepted, issues reads
//! at offsets derived from the input to exercise clamping.
//!
//! Run with: cargo +nightly fuzz run wav_load

#![no_main]

use assetio::{MemoryStream, WavStream};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Some(mut wav) = WavStream::from_stream(MemoryStream::from_vec(data.to_vec())) else {
        return;
    };
    let mut buf = [0u8; 256];
    let length = wav.length();
    for offset in [0, length / 2, length.saturating_sub(1), length, u64::MAX] {
        let n = wav.read(&mut buf, offset);
        assert!(n as u64 <= length.saturating_sub(offset));
    }
});

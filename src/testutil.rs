//! Shared test fixtures.

use std::fs;
use std::path::Path;

/// Write a minimal valid WAV file (44-byte header plus one silent 16-bit
/// mono sample), enough for the tag library to probe and write to.
pub fn write_minimal_wav(path: &Path) {
    let data_size: u32 = 2;
    let file_size = 36 + data_size;
    let mut h = Vec::new();
    h.extend_from_slice(b"RIFF");
    h.extend_from_slice(&file_size.to_le_bytes());
    h.extend_from_slice(b"WAVE");
    h.extend_from_slice(b"fmt ");
    h.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    h.extend_from_slice(&1u16.to_le_bytes()); // PCM
    h.extend_from_slice(&1u16.to_le_bytes()); // mono
    h.extend_from_slice(&44100u32.to_le_bytes()); // sample rate
    h.extend_from_slice(&88200u32.to_le_bytes()); // byte rate
    h.extend_from_slice(&2u16.to_le_bytes()); // block align
    h.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    h.extend_from_slice(b"data");
    h.extend_from_slice(&data_size.to_le_bytes());
    h.extend_from_slice(&[0u8; 2]); // 1 silent sample
    fs::write(path, &h).unwrap();
}

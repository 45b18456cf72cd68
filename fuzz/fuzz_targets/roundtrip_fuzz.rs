#![no_main]
use libfuzzer_sys::fuzz_target;
use nanozip::compress::{self, CompressOptions};

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }

    // First two bytes pick the window, the rest is the payload.
    let window = u16::from_le_bytes([data[0], data[1]]) as usize;
    let payload = &data[2..];

    let packed = compress::compress_to_vec(payload, &CompressOptions::with_window(window)).unwrap();
    assert!(packed.len() <= compress::max_compressed_len(payload.len()));

    let decoded = compress::decompress_to_vec(&packed).unwrap();
    assert_eq!(decoded, payload);
});

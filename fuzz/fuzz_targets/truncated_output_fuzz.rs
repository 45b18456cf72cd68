#![no_main]
use libfuzzer_sys::fuzz_target;
use nanozip::compress::{self, CompressOptions};
use nanozip::format::HEADER_SIZE;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    // First byte picks how much slack the output gets beyond the minimum.
    let slack = data[0] as usize;
    let payload = &data[1..];

    let mut out = vec![0u8; payload.len() + HEADER_SIZE + slack];
    let stats =
        compress::compress_with_stats(payload, &mut out, &CompressOptions::default()).unwrap();

    let result = compress::decompress_to_vec(&out[..stats.written]);
    if stats.is_truncated() {
        assert!(result.is_err());
    } else {
        assert_eq!(result.unwrap(), payload);
    }
});

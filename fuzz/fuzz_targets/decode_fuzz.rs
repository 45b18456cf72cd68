#![no_main]
use libfuzzer_sys::fuzz_target;
use nanozip::compress::decoder;

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must only ever produce errors, never panics.
    let _ = decoder::decompress_to_vec(data);

    // Also with a caller buffer smaller than most declared sizes.
    let mut out = [0u8; 512];
    let _ = decoder::decompress(data, &mut out);
});

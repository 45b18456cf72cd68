// Whole-buffer compression API.
//
// - `encoder`: header + token stream from a single input buffer
// - `decoder`: validated replay back into the original bytes

pub mod decoder;
pub mod encoder;

pub use decoder::{
    DecodeError, decompress, decompress_to_vec, decompress_with_header, max_decompressed_len,
};
#[cfg(feature = "parallel")]
pub use encoder::compress_batch;
pub use encoder::{
    CompressOptions, EncodeError, EncodeStats, compress, compress_to_vec, compress_with_stats,
    max_compressed_len,
};

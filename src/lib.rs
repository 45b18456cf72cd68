//! NanoZip: a small LZ77 compressor with a self-checking stream format.
//!
//! The crate provides:
//! - A hash-chain match finder with SIMD byte comparison (`hash`)
//! - The 14-byte header and escape-based token coding (`format`)
//! - Whole-buffer compress / decompress (`compress`)
//! - CRC32 integrity checking (`checksum`)
//! - File-oriented helpers (`io`)
//! - An optional CLI (`cli` feature)
//!
//! # Quick Start
//!
//! ```
//! use nanozip::compress::{self, CompressOptions};
//!
//! let input = b"abcabcabcabcabcabc";
//! let packed = compress::compress_to_vec(input, &CompressOptions::default()).unwrap();
//! let unpacked = compress::decompress_to_vec(&packed).unwrap();
//! assert_eq!(unpacked, input);
//! ```
//!
//! Caller-provided buffers work the same way:
//!
//! ```
//! let input = b"hello hello hello";
//! let mut buf = vec![0u8; nanozip::max_compressed_len(input.len())];
//! let n = nanozip::compress(input, &mut buf, 0).unwrap();
//!
//! let mut out = vec![0u8; input.len()];
//! let m = nanozip::decompress(&buf[..n], &mut out).unwrap();
//! assert_eq!(&out[..m], input);
//! ```

pub mod checksum;
pub mod compress;
pub mod format;
pub mod hash;

pub mod io;

#[cfg(feature = "cli")]
pub mod cli;

pub use compress::{
    CompressOptions, DecodeError, EncodeError, compress, decompress, max_compressed_len,
};

// File-level helpers for compression/decompression.
//
// Provides `compress_file()` and `decompress_file()`, which read the input
// fully into memory, run the whole-buffer codec and write the result through
// a `BufWriter`. Optionally computes a SHA-256 of the uncompressed side
// (feature-gated behind `file-io`).

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use thiserror::Error;

#[cfg(feature = "file-io")]
use sha2::Digest;

use crate::compress::decoder::{self, DecodeError};
use crate::compress::encoder::{self, CompressOptions, EncodeError};

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// Statistics returned by `compress_file()` and `decompress_file()`.
#[derive(Debug, Clone)]
pub struct FileStats {
    /// Size of the file that was read.
    pub input_size: u64,
    /// Size of the file that was written.
    pub output_size: u64,
    /// Window recorded in (or read from) the stream header.
    pub window_size: usize,
    /// Match tokens emitted; `None` when decompressing.
    pub matches: Option<usize>,
    /// Literal tokens emitted; `None` when decompressing.
    pub literals: Option<usize>,
    /// SHA-256 of the uncompressed data (if `file-io` feature is enabled).
    pub sha256: Option<[u8; 32]>,
}

impl FileStats {
    /// Compressed size over uncompressed size.
    pub fn ratio(&self) -> f64 {
        let (packed, plain) = if self.matches.is_some() {
            (self.output_size, self.input_size)
        } else {
            (self.input_size, self.output_size)
        };
        if plain == 0 {
            0.0
        } else {
            packed as f64 / plain as f64
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Error type for file I/O operations.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("compress error: {0}")]
    Encode(#[from] EncodeError),
    #[error("decompress error: {0}")]
    Decode(#[from] DecodeError),
}

// ---------------------------------------------------------------------------
// Default buffer size
// ---------------------------------------------------------------------------

const BUF_SIZE: usize = 64 * 1024; // 64 KiB

// ---------------------------------------------------------------------------
// compress_file / decompress_file
// ---------------------------------------------------------------------------

/// Compress `input_path` into `output_path`.
pub fn compress_file(
    input_path: &Path,
    output_path: &Path,
    opts: &CompressOptions,
) -> Result<FileStats, IoError> {
    let input = std::fs::read(input_path)?;

    let mut packed = vec![0u8; encoder::max_compressed_len(input.len())];
    let stats = encoder::compress_with_stats(&input, &mut packed, opts)?;
    packed.truncate(stats.written);

    write_file(output_path, &packed)?;

    Ok(FileStats {
        input_size: input.len() as u64,
        output_size: packed.len() as u64,
        window_size: stats.window_size,
        matches: Some(stats.matches),
        literals: Some(stats.literals),
        sha256: sha256_of(&input),
    })
}

/// Decompress `input_path` into `output_path`.
///
/// Nothing is written unless the stream decodes and its checksum matches.
pub fn decompress_file(input_path: &Path, output_path: &Path) -> Result<FileStats, IoError> {
    let packed = std::fs::read(input_path)?;
    let (header, plain) = decoder::decompress_with_header(&packed)?;

    write_file(output_path, &plain)?;

    Ok(FileStats {
        input_size: packed.len() as u64,
        output_size: plain.len() as u64,
        window_size: header.window_size as usize,
        matches: None,
        literals: None,
        sha256: sha256_of(&plain),
    })
}

/// Write `data` to `path` through a 64 KiB buffered writer.
pub(crate) fn write_file(path: &Path, data: &[u8]) -> io::Result<()> {
    let mut writer = BufWriter::with_capacity(BUF_SIZE, File::create(path)?);
    writer.write_all(data)?;
    writer.flush()
}

#[cfg(feature = "file-io")]
fn sha256_of(data: &[u8]) -> Option<[u8; 32]> {
    Some(sha2::Sha256::digest(data).into())
}

#[cfg(not(feature = "file-io"))]
fn sha256_of(_data: &[u8]) -> Option<[u8; 32]> {
    None
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_decompress_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = b"The quick brown fox jumps over the lazy dog. "
            .iter()
            .copied()
            .cycle()
            .take(10_000)
            .collect();

        let input = dir.path().join("input.bin");
        let packed = dir.path().join("input.nz");
        let output = dir.path().join("output.bin");
        std::fs::write(&input, &data).unwrap();

        let enc = compress_file(&input, &packed, &CompressOptions::default()).unwrap();
        assert_eq!(enc.input_size, data.len() as u64);
        assert!(enc.output_size < enc.input_size);
        assert_eq!(enc.window_size, 65535);
        assert!(enc.matches.unwrap() > 0);

        let dec = decompress_file(&packed, &output).unwrap();
        assert_eq!(dec.output_size, data.len() as u64);
        assert_eq!(std::fs::read(&output).unwrap(), data);
        assert!(dec.matches.is_none());
        assert!((dec.ratio() - enc.ratio()).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("empty");
        let packed = dir.path().join("empty.nz");
        let output = dir.path().join("empty.out");
        std::fs::write(&input, b"").unwrap();

        let enc = compress_file(&input, &packed, &CompressOptions::default()).unwrap();
        assert_eq!(enc.output_size, 14);
        decompress_file(&packed, &output).unwrap();
        assert!(std::fs::read(&output).unwrap().is_empty());
    }

    #[test]
    fn decompress_reports_header_window() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        let packed = dir.path().join("input.nz");
        let output = dir.path().join("output.bin");
        std::fs::write(&input, b"windowed windowed windowed").unwrap();

        compress_file(&input, &packed, &CompressOptions::with_window(4096)).unwrap();
        let dec = decompress_file(&packed, &output).unwrap();
        assert_eq!(dec.window_size, 4096);
        assert_eq!(dec.input_size, std::fs::metadata(&packed).unwrap().len());
    }

    #[test]
    fn write_file_replaces_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.bin");
        std::fs::write(&path, b"old contents that are longer").unwrap();

        write_file(&path, b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn corrupt_stream_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        let packed = dir.path().join("input.nz");
        let output = dir.path().join("output.bin");
        std::fs::write(&input, b"some data that will be damaged").unwrap();
        compress_file(&input, &packed, &CompressOptions::default()).unwrap();

        let mut bytes = std::fs::read(&packed).unwrap();
        let last = bytes.len() - 1;
        bytes[last] ^= 0x01;
        std::fs::write(&packed, &bytes).unwrap();

        let err = decompress_file(&packed, &output).unwrap_err();
        assert!(matches!(
            err,
            IoError::Decode(DecodeError::ChecksumMismatch { .. })
        ));
        assert!(!output.exists());
    }

    #[test]
    fn missing_input_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = compress_file(
            &dir.path().join("missing"),
            &dir.path().join("out"),
            &CompressOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, IoError::Io(_)));
    }

    #[cfg(feature = "file-io")]
    #[test]
    fn sha256_matches_on_both_sides() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.bin");
        let packed = dir.path().join("input.nz");
        let output = dir.path().join("output.bin");
        std::fs::write(&input, b"checksum me, checksum me").unwrap();

        let enc = compress_file(&input, &packed, &CompressOptions::default()).unwrap();
        let dec = decompress_file(&packed, &output).unwrap();
        assert!(enc.sha256.is_some());
        assert_eq!(enc.sha256, dec.sha256);
    }
}

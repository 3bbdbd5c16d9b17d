//! Block compression utilities
//!
//! Data-file blocks are stored as raw DEFLATE streams (RFC 1951). Some
//! blocks in the wild still carry a two-byte zlib header, which is
//! detected by byte pattern and skipped before inflating.

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use crate::error::{Error, Result};

/// zlib headers that may prefix a raw stream (default and best compression).
const ZLIB_HEADERS: [[u8; 2]; 2] = [[0x78, 0x9C], [0x78, 0xDA]];

/// Strip a leading zlib header if one is present.
#[must_use]
pub fn strip_zlib_header(data: &[u8]) -> &[u8] {
    match data {
        [a, b, rest @ ..] if ZLIB_HEADERS.contains(&[*a, *b]) => rest,
        _ => data,
    }
}

/// Inflate a raw DEFLATE block.
///
/// Fails with [`Error::CorruptBlock`] if the stream is truncated or
/// malformed, or if it does not inflate to exactly `expected_size` bytes.
pub fn decompress(data: &[u8], expected_size: u32) -> Result<Vec<u8>> {
    let stream = strip_zlib_header(data);
    let expected = expected_size as usize;

    // one byte past the expected size is enough to detect an oversized stream
    let mut decoder = DeflateDecoder::new(stream).take(u64::from(expected_size) + 1);
    let mut decompressed = Vec::with_capacity(expected);
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| Error::CorruptBlock {
            block: 0,
            message: format!("inflate failed: {e}"),
        })?;

    if decompressed.len() != expected {
        return Err(Error::CorruptBlock {
            block: 0,
            message: format!(
                "inflated to {} bytes, expected {expected}",
                decompressed.len()
            ),
        });
    }

    Ok(decompressed)
}

/// Deflate a block with the default compression level.
pub fn compress(data: &[u8]) -> Result<Vec<u8>> {
    compress_with_level(data, Compression::default())
}

/// Deflate a block into a raw DEFLATE stream (no zlib/gzip framing).
pub fn compress_with_level(data: &[u8], level: Compression) -> Result<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::with_capacity(data.len() / 2), level);
    encoder
        .write_all(data)
        .map_err(|e| Error::CompressionError(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| Error::CompressionError(e.to_string()))
}

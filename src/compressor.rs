/*!
 * Gzip compression of the minified document.
 *
 * The firmware serves the bytes as-is with `Content-Encoding: gzip`, so the
 * output is a complete gzip member. The header is written with mtime 0 and
 * no file name, which keeps the output byte-for-byte reproducible.
 */

use flate2::read::GzDecoder;
use flate2::{Compression, GzBuilder};
use log::debug;
use std::io::{Read, Write};

use crate::errors::{BuildError, BuildResult};

/// Gzip `data` at `level` (0 = store, 9 = best)
pub fn compress(data: &[u8], level: u32) -> BuildResult<Vec<u8>> {
    let mut encoder = GzBuilder::new()
        .mtime(0)
        .write(Vec::with_capacity(data.len() / 2), Compression::new(level));

    encoder
        .write_all(data)
        .map_err(|e| BuildError::Resource(e.to_string()))?;
    let compressed = encoder
        .finish()
        .map_err(|e| BuildError::Resource(e.to_string()))?;

    debug!(
        "Compressed {} bytes to {} bytes at level {}",
        data.len(),
        compressed.len(),
        level
    );

    Ok(compressed)
}

/// Inflate a gzip member produced by [`compress`]
pub fn decompress(data: &[u8]) -> BuildResult<Vec<u8>> {
    let mut decoder = GzDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| BuildError::Verification(format!("invalid gzip stream: {}", e)))?;
    Ok(decompressed)
}

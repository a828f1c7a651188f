//! Gzip decompression for band payloads
//!
//! The decompressed size of a band is not stored alongside the payload, so
//! the output buffer is sized from the input and grown at most once.

use std::io::{self, Read};

use flate2::read::GzDecoder;
use tracing::debug;

use crate::error::{Error, Result};

/// Output guess for small payloads: one 256x256 single-byte tile
pub const DEFAULT_TILE_BYTES: usize = 256 * 256;

/// Inputs up to this size use [`DEFAULT_TILE_BYTES`] as the first guess
pub const SMALL_INPUT_BYTES: usize = 100;

/// Expected compression ratio for larger inputs
pub const RATIO_ESTIMATE: usize = 50;

/// Growth applied to the output buffer for the single retry
pub const RETRY_GROWTH: usize = 4;

/// Decompresses a gzip stream.
///
/// Empty input yields empty output. A corrupt or truncated stream, or one
/// that still does not fit after the retry, is a [`Error::DecodeFailure`].
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    decompress_with_estimate(data, initial_estimate(data.len()))
}

/// First output buffer size for an input of `input_len` bytes
pub fn initial_estimate(input_len: usize) -> usize {
    if input_len <= SMALL_INPUT_BYTES {
        DEFAULT_TILE_BYTES
    } else {
        input_len.saturating_mul(RATIO_ESTIMATE)
    }
}

pub(crate) fn decompress_with_estimate(data: &[u8], estimate: usize) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Ok(Vec::new());
    }

    let estimate = estimate.max(1);
    if let Some(output) = inflate_bounded(data, estimate)? {
        return Ok(output);
    }

    let retry = estimate.saturating_mul(RETRY_GROWTH);
    debug!(
        input_bytes = data.len(),
        first_attempt = estimate,
        retry_capacity = retry,
        "gzip output exceeded estimate, retrying"
    );

    inflate_bounded(data, retry)?.ok_or_else(|| {
        Error::DecodeFailure(format!(
            "gzip output exceeds {} bytes for {} byte input",
            retry,
            data.len()
        ))
    })
}

/// Inflates into a buffer of exactly `capacity` bytes.
///
/// Returns `Ok(None)` when the stream has more output than fits.
fn inflate_bounded(data: &[u8], capacity: usize) -> Result<Option<Vec<u8>>> {
    let mut decoder = GzDecoder::new(data);
    let mut output = vec![0u8; capacity];
    let mut filled = 0;

    while filled < output.len() {
        match decoder.read(&mut output[filled..]) {
            Ok(0) => {
                output.truncate(filled);
                return Ok(Some(output));
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(stream_error(e)),
        }
    }

    // Buffer is full; one more byte means the stream did not end.
    let mut probe = [0u8; 1];
    loop {
        match decoder.read(&mut probe) {
            Ok(0) => return Ok(Some(output)),
            Ok(_) => return Ok(None),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(stream_error(e)),
        }
    }
}

fn stream_error(e: io::Error) -> Error {
    Error::DecodeFailure(format!("gzip stream: {}", e))
}

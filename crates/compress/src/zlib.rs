//! # Overview
//!
//! One-shot zlib helpers built on the [`transform`] zlib transformers and the
//! [`transform_io`] adapters, plus the [`CountingWriter`] used to report how
//! many bytes reached a destination.
//!
//! # Examples
//!
//! ```
//! use compress::zlib::{CompressionLevel, compress_to_vec, decompress_to_vec};
//!
//! let data = b"highly compressible payload";
//! let compressed = compress_to_vec(data, CompressionLevel::BEST).unwrap();
//! let decoded = decompress_to_vec(&compressed).unwrap();
//! assert_eq!(decoded, data);
//! ```

use std::io::{self, Read, Write};

use transform::zlib::{ZlibDecoder, ZlibEncoder};
use transform_io::{TransformReader, TransformWriter};

use crate::debug_compress::trace_one_shot;

pub use transform::zlib::{CompressionLevel, CompressionLevelError, WindowBits};

/// Writer adapter that counts the bytes passed to the inner writer.
#[derive(Clone, Debug, Default)]
pub struct CountingWriter<W> {
    inner: W,
    bytes: u64,
}

impl<W> CountingWriter<W> {
    /// Wraps `inner` with a zeroed counter.
    pub const fn new(inner: W) -> Self {
        Self { inner, bytes: 0 }
    }

    /// Returns the number of bytes accepted by the inner writer.
    #[must_use]
    pub const fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Returns the inner writer.
    pub const fn get_ref(&self) -> &W {
        &self.inner
    }

    /// Unwraps the inner writer.
    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Write for CountingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.bytes = self.bytes.saturating_add(written as u64);
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

/// Compresses `input` into a new [`Vec`] with zlib framing.
///
/// # Errors
///
/// Returns an error when the compression engine fails.
pub fn compress_to_vec(input: &[u8], level: CompressionLevel) -> io::Result<Vec<u8>> {
    compress_with_window(input, level, WindowBits::ZLIB)
}

/// Compresses `input` with an explicit window size and framing.
///
/// # Errors
///
/// Returns an error when the window setting is unavailable in this build or
/// the engine fails.
pub fn compress_with_window(
    input: &[u8],
    level: CompressionLevel,
    window: WindowBits,
) -> io::Result<Vec<u8>> {
    let encoder = ZlibEncoder::with_window_bits(level, window);
    let mut writer = TransformWriter::new(encoder, Vec::new())?;
    writer.write_all(input)?;
    writer.finish()?;
    let (_, output) = writer.into_parts();
    trace_one_shot("compress", input.len(), output.len());
    Ok(output)
}

/// Decompresses zlib-framed `input` into a new [`Vec`].
///
/// # Errors
///
/// Returns [`io::ErrorKind::InvalidData`] for corrupt or truncated input.
pub fn decompress_to_vec(input: &[u8]) -> io::Result<Vec<u8>> {
    decompress_with_window(input, WindowBits::ZLIB)
}

/// Decompresses `input` with an explicit window size and framing.
///
/// # Errors
///
/// Returns [`io::ErrorKind::InvalidData`] for corrupt or truncated input, and
/// an error when the window setting is unavailable in this build.
pub fn decompress_with_window(input: &[u8], window: WindowBits) -> io::Result<Vec<u8>> {
    let mut reader = TransformReader::new(ZlibDecoder::with_window_bits(window), input)?;
    let mut output = Vec::new();
    reader.read_to_end(&mut output)?;
    trace_one_shot("decompress", input.len(), output.len());
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counting_writer_tracks_bytes() {
        let mut writer = CountingWriter::new(Vec::new());
        writer.write_all(b"payload").unwrap();
        writer.write_all(b"!").unwrap();
        assert_eq!(writer.bytes(), 8);
        assert_eq!(writer.into_inner(), b"payload!");
    }

    #[test]
    fn helper_functions_round_trip() {
        let payload = b"highly compressible payload".repeat(16);
        let compressed = compress_to_vec(&payload, CompressionLevel::BEST).unwrap();
        assert!(compressed.len() < payload.len());
        assert_eq!(decompress_to_vec(&compressed).unwrap(), payload);
    }

    #[test]
    fn raw_helpers_round_trip() {
        let payload = b"raw deflate payload";
        let compressed =
            compress_with_window(payload, CompressionLevel::DEFAULT, WindowBits::RAW).unwrap();
        assert_eq!(
            decompress_with_window(&compressed, WindowBits::RAW).unwrap(),
            payload
        );
        assert!(decompress_to_vec(&compressed).is_err());
    }
}

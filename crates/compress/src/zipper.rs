//! Reusable one-shot zlib compressor and decompressor.

use std::io::{self, Write};

use transform::zlib::{CompressionLevel, WindowBits, ZlibDecoder, ZlibEncoder};
use transform_io::{TransformReader, TransformWriter};

use crate::debug_compress::{trace_zipper_build, trace_zipper_done, trace_zipper_reuse};
use crate::zlib::CountingWriter;

type ParkedWriter = TransformWriter<ZlibEncoder, io::Sink>;
type ParkedReader = TransformReader<ZlibDecoder, io::Empty>;

/// Reusable one-shot compressor and decompressor.
///
/// The first [`zip`](Self::zip) or [`unzip`](Self::unzip) builds a zlib
/// transformer and its adapter; later calls retarget the same adapter to the
/// caller's destination and reset the transformer afterwards, so engine
/// state and buffers are allocated once. Between calls the adapters are
/// parked on [`io::sink`] and [`io::empty`].
///
/// A call that fails drops its adapter; the next call builds a fresh one.
///
/// ```
/// use compress::Zipper;
///
/// let mut zipper = Zipper::new();
/// let mut packed = Vec::new();
/// let written = zipper.zip(&mut packed, b"payload payload payload").unwrap();
/// assert_eq!(written, packed.len() as u64);
///
/// let mut unpacked = Vec::new();
/// zipper.unzip(&mut unpacked, &packed).unwrap();
/// assert_eq!(unpacked, b"payload payload payload");
/// ```
#[derive(Debug)]
pub struct Zipper {
    level: CompressionLevel,
    window: WindowBits,
    writer: Option<ParkedWriter>,
    reader: Option<ParkedReader>,
}

impl Zipper {
    /// Creates a façade using the default level and zlib framing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_settings(CompressionLevel::DEFAULT, WindowBits::ZLIB)
    }

    /// Creates a façade with an explicit level and window setting.
    #[must_use]
    pub const fn with_settings(level: CompressionLevel, window: WindowBits) -> Self {
        Self {
            level,
            window,
            writer: None,
            reader: None,
        }
    }

    /// Returns the compression level used by [`zip`](Self::zip).
    #[must_use]
    pub const fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Changes the compression level from the next [`zip`](Self::zip) on.
    pub fn set_level(&mut self, level: CompressionLevel) {
        self.level = level;
        if let Some(writer) = self.writer.as_mut() {
            writer.transformer_mut().set_level(level);
            if writer.reset().is_err() {
                self.writer = None;
            }
        }
    }

    /// Compresses `data` into `dest` as one complete stream.
    ///
    /// Returns the number of compressed bytes written to `dest`.
    ///
    /// # Errors
    ///
    /// Returns the first error from the engine or from `dest`.
    pub fn zip<W: Write>(&mut self, dest: W, data: &[u8]) -> io::Result<u64> {
        let parked = match self.writer.take() {
            Some(writer) => {
                trace_zipper_reuse("zip");
                writer
            }
            None => {
                trace_zipper_build("zip");
                let encoder = ZlibEncoder::with_window_bits(self.level, self.window);
                TransformWriter::new(encoder, io::sink())?
            }
        };

        let (mut writer, sink) = parked.retarget(CountingWriter::new(dest));
        writer.write_all(data)?;
        writer.finish()?;

        let (mut parked, counter) = writer.retarget(sink);
        parked.reset()?;
        self.writer = Some(parked);
        trace_zipper_done("zip", data.len(), counter.bytes());
        Ok(counter.bytes())
    }

    /// Decompresses the complete stream in `compressed` into `dest`.
    ///
    /// Returns the number of decompressed bytes written to `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`io::ErrorKind::InvalidData`] for corrupt or truncated input,
    /// or the first error from `dest`.
    pub fn unzip<W: Write>(&mut self, dest: W, compressed: &[u8]) -> io::Result<u64> {
        let parked = match self.reader.take() {
            Some(reader) => {
                trace_zipper_reuse("unzip");
                reader
            }
            None => {
                trace_zipper_build("unzip");
                TransformReader::new(ZlibDecoder::with_window_bits(self.window), io::empty())?
            }
        };

        let (mut reader, empty) = parked.retarget(compressed);
        let mut counter = CountingWriter::new(dest);
        io::copy(&mut reader, &mut counter)?;
        counter.flush()?;

        let (mut parked, _) = reader.retarget(empty);
        parked.reset()?;
        self.reader = Some(parked);
        trace_zipper_done("unzip", compressed.len(), counter.bytes());
        Ok(counter.bytes())
    }
}

impl Default for Zipper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adapters_are_built_lazily_and_kept() {
        let mut zipper = Zipper::new();
        assert!(zipper.writer.is_none() && zipper.reader.is_none());

        let mut packed = Vec::new();
        zipper.zip(&mut packed, b"lazy").unwrap();
        assert!(zipper.writer.is_some());
        assert!(zipper.reader.is_none());

        zipper.unzip(io::sink(), &packed).unwrap();
        assert!(zipper.reader.is_some());
    }

    #[test]
    fn failed_unzip_drops_the_adapter() {
        let mut zipper = Zipper::new();
        assert!(zipper.unzip(io::sink(), b"not zlib at all").is_err());
        assert!(zipper.reader.is_none());

        let mut packed = Vec::new();
        zipper.zip(&mut packed, b"recovered").unwrap();
        let mut unpacked = Vec::new();
        zipper.unzip(&mut unpacked, &packed).unwrap();
        assert_eq!(unpacked, b"recovered");
    }

    #[test]
    fn level_change_reaches_parked_encoder() {
        let mut zipper = Zipper::with_settings(CompressionLevel::NONE, WindowBits::ZLIB);
        let input = b"abcabcabcabc".repeat(100);
        let stored = zipper.zip(io::sink(), &input).unwrap();

        zipper.set_level(CompressionLevel::BEST);
        let packed = zipper.zip(io::sink(), &input).unwrap();
        assert!(packed < stored);
    }
}

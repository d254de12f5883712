//! # Overview
//!
//! Deflate/inflate adapter over [`flate2`]'s low-level [`Compress`] and
//! [`Decompress`] engines. The engines are fed the request's buffers
//! directly; no intermediate copy is made.
//!
//! # Design
//!
//! The encoder maps `flush = true` to [`FlushCompress::Finish`] and keeps
//! reporting output until the engine signals stream end. The decoder never
//! asks the engine to finish: it always runs with [`FlushDecompress::None`]
//! and decides truncation itself, because some backends poison their state
//! when a finishing call runs out of output space.
//!
//! Window sizes other than 15 bits need the `zlib-ng` or `zlib-rs` backend;
//! the default pure-Rust backend reports [`TransformError::Unsupported`] from
//! `open`.
//!
//! # Examples
//!
//! ```
//! use transform::zlib::{CompressionLevel, ZlibDecoder, ZlibEncoder};
//! use transform::{BufferSizes, negotiate_and_open, transform_to_vec};
//!
//! let mut encoder = ZlibEncoder::new(CompressionLevel::BEST);
//! negotiate_and_open(&mut encoder, BufferSizes::default()).unwrap();
//! let packed = transform_to_vec(&mut encoder, b"payload payload payload", 256).unwrap();
//!
//! let mut decoder = ZlibDecoder::new();
//! negotiate_and_open(&mut decoder, BufferSizes::default()).unwrap();
//! let unpacked = transform_to_vec(&mut decoder, &packed, 256).unwrap();
//! assert_eq!(unpacked, b"payload payload payload");
//! ```

use std::fmt;

use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::debug_transform::{trace_close, trace_failure, trace_open, trace_reset, trace_stream_end};
use crate::error::{Result, TransformError};
use crate::transformer::{BufferSizes, Progress, TransformMode, TransformRequest, Transformer};

const KIND: &str = "zlib";

/// Larger side of the asymmetric buffer proposal.
const WIDE_BUFFER: usize = 32 * 1024;
/// Smaller side of the asymmetric buffer proposal.
const NARROW_BUFFER: usize = 16 * 1024;

/// Highest level on the engine's native scale.
const NATIVE_MAX: f32 = 9.0;

/// Compression level on the closed range `[0, 1]`.
///
/// `0` stores data without compression and `1` asks for the best ratio. The
/// value is translated to the engine's `0..=9` scale when the encoder opens
/// or resets.
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct CompressionLevel(f32);

impl CompressionLevel {
    /// Stored blocks only.
    pub const NONE: Self = Self(0.0);
    /// The engine's customary default (native level 6).
    pub const DEFAULT: Self = Self(6.0 / NATIVE_MAX);
    /// Best compression ratio.
    pub const BEST: Self = Self(1.0);

    /// Validates `level` and wraps it.
    ///
    /// # Errors
    ///
    /// Returns [`CompressionLevelError`] when `level` is not finite or lies
    /// outside `[0, 1]`.
    pub fn new(level: f32) -> std::result::Result<Self, CompressionLevelError> {
        if level.is_finite() && (0.0..=1.0).contains(&level) {
            Ok(Self(level))
        } else {
            Err(CompressionLevelError::new(level))
        }
    }

    /// Returns the level on the `[0, 1]` scale.
    #[must_use]
    pub const fn get(self) -> f32 {
        self.0
    }

    /// Returns the level on the engine's `0..=9` scale.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn native(self) -> u32 {
        // Validated to [0, 1] so the product is within 0..=9.
        (self.0 * NATIVE_MAX).round() as u32
    }
}

impl Default for CompressionLevel {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<CompressionLevel> for Compression {
    fn from(level: CompressionLevel) -> Self {
        match level.native() {
            0 => Compression::none(),
            native => Compression::new(native),
        }
    }
}

/// Error returned when a requested compression level falls outside `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressionLevelError {
    level: f32,
}

impl CompressionLevelError {
    const fn new(level: f32) -> Self {
        Self { level }
    }

    /// Returns the rejected level.
    #[must_use]
    pub const fn level(&self) -> f32 {
        self.level
    }
}

impl fmt::Display for CompressionLevelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "compression level {} is outside the supported range 0.0-1.0",
            self.level
        )
    }
}

impl std::error::Error for CompressionLevelError {}

/// Window size and framing of a deflate stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct WindowBits {
    bits: u8,
    zlib_header: bool,
}

impl WindowBits {
    /// Smallest window size accepted by the engines.
    pub const MIN: u8 = 9;
    /// Largest window size, and the only one the default backend supports.
    pub const MAX: u8 = 15;

    /// A 32 KiB window with zlib header and trailer.
    pub const ZLIB: Self = Self {
        bits: Self::MAX,
        zlib_header: true,
    };

    /// A 32 KiB window without framing (raw deflate).
    pub const RAW: Self = Self {
        bits: Self::MAX,
        zlib_header: false,
    };

    /// Creates a window setting.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::Unsupported`] when `bits` is outside
    /// [`MIN`](Self::MIN)`..=`[`MAX`](Self::MAX).
    pub fn new(bits: u8, zlib_header: bool) -> Result<Self> {
        if (Self::MIN..=Self::MAX).contains(&bits) {
            Ok(Self { bits, zlib_header })
        } else {
            Err(TransformError::Unsupported(format!(
                "window bits {bits} outside {}..={}",
                Self::MIN,
                Self::MAX
            )))
        }
    }

    /// Returns the base-two logarithm of the window size.
    #[must_use]
    pub const fn bits(self) -> u8 {
        self.bits
    }

    /// Returns `true` for zlib framing, `false` for raw deflate.
    #[must_use]
    pub const fn has_zlib_header(self) -> bool {
        self.zlib_header
    }
}

impl Default for WindowBits {
    fn default() -> Self {
        Self::ZLIB
    }
}

#[cfg(any(feature = "zlib-ng", feature = "zlib-rs"))]
fn new_compress(level: Compression, window: WindowBits) -> Result<Compress> {
    Ok(Compress::new_with_window_bits(
        level,
        window.zlib_header,
        window.bits,
    ))
}

#[cfg(not(any(feature = "zlib-ng", feature = "zlib-rs")))]
fn new_compress(level: Compression, window: WindowBits) -> Result<Compress> {
    if window.bits == WindowBits::MAX {
        Ok(Compress::new(level, window.zlib_header))
    } else {
        Err(custom_window_unsupported(window))
    }
}

#[cfg(any(feature = "zlib-ng", feature = "zlib-rs"))]
fn new_decompress(window: WindowBits) -> Result<Decompress> {
    Ok(Decompress::new_with_window_bits(
        window.zlib_header,
        window.bits,
    ))
}

#[cfg(not(any(feature = "zlib-ng", feature = "zlib-rs")))]
fn new_decompress(window: WindowBits) -> Result<Decompress> {
    if window.bits == WindowBits::MAX {
        Ok(Decompress::new(window.zlib_header))
    } else {
        Err(custom_window_unsupported(window))
    }
}

#[cfg(not(any(feature = "zlib-ng", feature = "zlib-rs")))]
fn custom_window_unsupported(window: WindowBits) -> TransformError {
    TransformError::Unsupported(format!(
        "window bits {} need the zlib-ng or zlib-rs backend",
        window.bits
    ))
}

fn delta(after: u64, before: u64) -> usize {
    // Bounded by the slice lengths handed to the engine.
    usize::try_from(after - before).unwrap_or(usize::MAX)
}

/// Deflate encoder.
pub struct ZlibEncoder {
    level: CompressionLevel,
    window: WindowBits,
    engine: Option<Compress>,
    engine_level: u32,
    finished: bool,
    sizes: Option<BufferSizes>,
}

impl ZlibEncoder {
    /// Creates a closed encoder producing zlib-framed output.
    #[must_use]
    pub fn new(level: CompressionLevel) -> Self {
        Self::with_window_bits(level, WindowBits::ZLIB)
    }

    /// Creates a closed encoder with explicit window size and framing.
    #[must_use]
    pub fn with_window_bits(level: CompressionLevel, window: WindowBits) -> Self {
        Self {
            level,
            window,
            engine: None,
            engine_level: level.native(),
            finished: false,
            sizes: None,
        }
    }

    /// Returns the configured level.
    #[must_use]
    pub const fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Changes the level. Takes effect at the next `open` or `reset`.
    pub fn set_level(&mut self, level: CompressionLevel) {
        self.level = level;
    }

    /// Returns the window setting.
    #[must_use]
    pub const fn window_bits(&self) -> WindowBits {
        self.window
    }

    /// Returns `true` once the stream trailer has been written.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    fn build_engine(&mut self) -> Result<()> {
        self.engine = Some(new_compress(self.level.into(), self.window)?);
        self.engine_level = self.level.native();
        self.finished = false;
        Ok(())
    }
}

impl fmt::Debug for ZlibEncoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZlibEncoder")
            .field("level", &self.level)
            .field("window", &self.window)
            .field("open", &self.engine.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}

impl Transformer for ZlibEncoder {
    fn mode(&self) -> TransformMode {
        TransformMode::Encode
    }

    fn suggest_buffer_sizes(&self, sizes: &mut BufferSizes) {
        sizes.at_least(WIDE_BUFFER, NARROW_BUFFER);
    }

    fn open(&mut self, sizes: BufferSizes) -> Result<()> {
        self.build_engine()?;
        self.sizes = Some(sizes);
        trace_open(KIND, TransformMode::Encode.name(), sizes.source, sizes.dest);
        Ok(())
    }

    fn transform(&mut self, request: TransformRequest<'_>) -> Result<Progress> {
        let engine = self.engine.as_mut().ok_or(TransformError::NotOpen)?;
        if self.finished {
            if !request.source.is_empty() {
                return Err(TransformError::Engine("stream already finished".to_owned()));
            }
            return Ok(Progress::default());
        }

        let flush = if request.flush {
            FlushCompress::Finish
        } else {
            FlushCompress::None
        };
        let before_in = engine.total_in();
        let before_out = engine.total_out();
        let status = engine
            .compress(request.source, request.dest, flush)
            .map_err(|err| {
                let err = TransformError::Engine(err.to_string());
                trace_failure(KIND, &err);
                err
            })?;

        if status == Status::StreamEnd {
            self.finished = true;
            trace_stream_end(
                TransformMode::Encode.name(),
                engine.total_in(),
                engine.total_out(),
            );
        }

        Ok(Progress::new(
            delta(engine.total_in(), before_in),
            delta(engine.total_out(), before_out),
        ))
    }

    fn close(&mut self) {
        if let Some(engine) = self.engine.take() {
            trace_close(
                KIND,
                TransformMode::Encode.name(),
                engine.total_in(),
                engine.total_out(),
            );
        }
        self.finished = false;
        self.sizes = None;
    }

    fn reset(&mut self) -> Result<()> {
        let rebuilt = self.engine_level != self.level.native();
        match self.engine.as_mut() {
            None => return Err(TransformError::NotOpen),
            Some(_) if rebuilt => self.build_engine()?,
            Some(engine) => {
                engine.reset();
                self.finished = false;
            }
        }
        trace_reset(KIND, TransformMode::Encode.name(), rebuilt);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.engine.is_some()
    }
}

/// Inflate decoder.
pub struct ZlibDecoder {
    window: WindowBits,
    engine: Option<Decompress>,
    finished: bool,
    sizes: Option<BufferSizes>,
}

impl ZlibDecoder {
    /// Creates a closed decoder for zlib-framed input.
    #[must_use]
    pub fn new() -> Self {
        Self::with_window_bits(WindowBits::ZLIB)
    }

    /// Creates a closed decoder with explicit window size and framing.
    #[must_use]
    pub const fn with_window_bits(window: WindowBits) -> Self {
        Self {
            window,
            engine: None,
            finished: false,
            sizes: None,
        }
    }

    /// Returns the window setting.
    #[must_use]
    pub const fn window_bits(&self) -> WindowBits {
        self.window
    }

    /// Returns `true` once the end of the compressed stream has been seen.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Default for ZlibDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ZlibDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ZlibDecoder")
            .field("window", &self.window)
            .field("open", &self.engine.is_some())
            .field("finished", &self.finished)
            .finish()
    }
}

impl Transformer for ZlibDecoder {
    fn mode(&self) -> TransformMode {
        TransformMode::Decode
    }

    fn suggest_buffer_sizes(&self, sizes: &mut BufferSizes) {
        sizes.at_least(NARROW_BUFFER, WIDE_BUFFER);
    }

    fn open(&mut self, sizes: BufferSizes) -> Result<()> {
        self.engine = Some(new_decompress(self.window)?);
        self.finished = false;
        self.sizes = Some(sizes);
        trace_open(KIND, TransformMode::Decode.name(), sizes.source, sizes.dest);
        Ok(())
    }

    fn transform(&mut self, request: TransformRequest<'_>) -> Result<Progress> {
        let engine = self.engine.as_mut().ok_or(TransformError::NotOpen)?;
        if self.finished {
            return Ok(Progress::default());
        }

        let before_in = engine.total_in();
        let before_out = engine.total_out();
        let status = engine
            .decompress(request.source, request.dest, FlushDecompress::None)
            .map_err(|err| {
                let err = TransformError::CorruptData(err.to_string());
                trace_failure(KIND, &err);
                err
            })?;

        let progress = Progress::new(
            delta(engine.total_in(), before_in),
            delta(engine.total_out(), before_out),
        );

        if status == Status::StreamEnd {
            self.finished = true;
            trace_stream_end(
                TransformMode::Decode.name(),
                engine.total_in(),
                engine.total_out(),
            );
        } else if request.flush && progress.is_stalled() && !request.dest.is_empty() {
            let err = TransformError::CorruptData(
                "stream ended before the end of the compressed data".to_owned(),
            );
            trace_failure(KIND, &err);
            return Err(err);
        }

        Ok(progress)
    }

    fn close(&mut self) {
        if let Some(engine) = self.engine.take() {
            trace_close(
                KIND,
                TransformMode::Decode.name(),
                engine.total_in(),
                engine.total_out(),
            );
        }
        self.finished = false;
        self.sizes = None;
    }

    fn reset(&mut self) -> Result<()> {
        let engine = self.engine.as_mut().ok_or(TransformError::NotOpen)?;
        engine.reset(self.window.zlib_header);
        self.finished = false;
        trace_reset(KIND, TransformMode::Decode.name(), false);
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.engine.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transformer::{negotiate_and_open, transform_to_vec};

    fn round_trip(level: CompressionLevel, window: WindowBits, input: &[u8]) -> Vec<u8> {
        let mut encoder = ZlibEncoder::with_window_bits(level, window);
        negotiate_and_open(&mut encoder, BufferSizes::default()).unwrap();
        let packed = transform_to_vec(&mut encoder, input, 64).unwrap();

        let mut decoder = ZlibDecoder::with_window_bits(window);
        negotiate_and_open(&mut decoder, BufferSizes::default()).unwrap();
        transform_to_vec(&mut decoder, &packed, 64).unwrap()
    }

    #[test]
    fn level_maps_to_native_scale() {
        assert_eq!(CompressionLevel::NONE.native(), 0);
        assert_eq!(CompressionLevel::DEFAULT.native(), 6);
        assert_eq!(CompressionLevel::BEST.native(), 9);
        assert_eq!(CompressionLevel::new(0.5).unwrap().native(), 5);
    }

    #[test]
    fn level_rejects_out_of_range() {
        assert_eq!(CompressionLevel::new(1.5).unwrap_err().level(), 1.5);
        assert!(CompressionLevel::new(-0.1).is_err());
        assert!(CompressionLevel::new(f32::NAN).is_err());
        let message = CompressionLevel::new(2.0).unwrap_err().to_string();
        assert!(message.contains("0.0-1.0"));
    }

    #[test]
    fn window_bits_range_is_checked() {
        assert!(WindowBits::new(8, true).is_err());
        assert!(WindowBits::new(16, false).is_err());
        assert_eq!(WindowBits::new(15, false).unwrap(), WindowBits::RAW);
    }

    #[test]
    fn suggested_sizes_are_asymmetric() {
        let mut sizes = BufferSizes::new(1, 1);
        ZlibEncoder::new(CompressionLevel::DEFAULT).suggest_buffer_sizes(&mut sizes);
        assert!(sizes.source > sizes.dest);

        let mut sizes = BufferSizes::new(1, 1);
        ZlibDecoder::new().suggest_buffer_sizes(&mut sizes);
        assert!(sizes.dest > sizes.source);
    }

    #[test]
    fn zlib_and_raw_framing_round_trip() {
        let input = b"abcabcabcabcabcabc the quick brown fox".repeat(40);
        assert_eq!(round_trip(CompressionLevel::DEFAULT, WindowBits::ZLIB, &input), input);
        assert_eq!(round_trip(CompressionLevel::BEST, WindowBits::RAW, &input), input);
    }

    #[test]
    fn zlib_output_is_readable_by_flate2() {
        let input = b"interoperable".repeat(10);
        let mut encoder = ZlibEncoder::new(CompressionLevel::DEFAULT);
        negotiate_and_open(&mut encoder, BufferSizes::default()).unwrap();
        let packed = transform_to_vec(&mut encoder, &input, 64).unwrap();

        let mut decoded = Vec::new();
        std::io::Read::read_to_end(&mut flate2::read::ZlibDecoder::new(&packed[..]), &mut decoded)
            .unwrap();
        assert_eq!(decoded, input);
    }

    #[test]
    fn truncated_stream_is_corrupt() {
        let mut encoder = ZlibEncoder::new(CompressionLevel::DEFAULT);
        negotiate_and_open(&mut encoder, BufferSizes::default()).unwrap();
        let packed = transform_to_vec(&mut encoder, &b"truncate me".repeat(20), 64).unwrap();

        let mut decoder = ZlibDecoder::new();
        negotiate_and_open(&mut decoder, BufferSizes::default()).unwrap();
        let err = transform_to_vec(&mut decoder, &packed[..packed.len() / 2], 64).unwrap_err();
        assert!(matches!(err, TransformError::CorruptData(_)));
    }

    #[test]
    fn garbage_is_corrupt() {
        let mut decoder = ZlibDecoder::new();
        negotiate_and_open(&mut decoder, BufferSizes::default()).unwrap();
        let err = transform_to_vec(&mut decoder, b"definitely not zlib", 64).unwrap_err();
        assert!(err.is_malformed_input());
    }

    #[test]
    fn reset_reuses_engine_and_applies_new_level() {
        let input = b"reset me ".repeat(100);
        let mut encoder = ZlibEncoder::new(CompressionLevel::NONE);
        negotiate_and_open(&mut encoder, BufferSizes::default()).unwrap();
        let stored = transform_to_vec(&mut encoder, &input, 128).unwrap();

        encoder.set_level(CompressionLevel::BEST);
        encoder.reset().unwrap();
        let packed = transform_to_vec(&mut encoder, &input, 128).unwrap();
        assert!(packed.len() < stored.len());

        encoder.reset().unwrap();
        let again = transform_to_vec(&mut encoder, &input, 128).unwrap();
        assert_eq!(again, packed);
    }

    #[test]
    fn finished_encoder_rejects_more_input() {
        let mut encoder = ZlibEncoder::new(CompressionLevel::DEFAULT);
        negotiate_and_open(&mut encoder, BufferSizes::default()).unwrap();
        transform_to_vec(&mut encoder, b"done", 64).unwrap();
        assert!(encoder.is_finished());

        let mut dest = [0u8; 64];
        let idle = encoder
            .transform(TransformRequest::finishing(b"", &mut dest))
            .unwrap();
        assert!(idle.is_stalled());

        let err = encoder
            .transform(TransformRequest::new(b"late", &mut dest))
            .unwrap_err();
        assert!(matches!(err, TransformError::Engine(_)));

        encoder.reset().unwrap();
        assert!(!transform_to_vec(&mut encoder, b"again", 64).unwrap().is_empty());
    }

    #[test]
    fn not_open_is_reported() {
        let mut encoder = ZlibEncoder::new(CompressionLevel::DEFAULT);
        let mut dest = [0u8; 16];
        let err = encoder
            .transform(TransformRequest::new(b"x", &mut dest))
            .unwrap_err();
        assert_eq!(err, TransformError::NotOpen);
        assert_eq!(ZlibDecoder::new().reset().unwrap_err(), TransformError::NotOpen);

        encoder.close();
        encoder.close();
        assert!(!encoder.is_open());
    }

    #[cfg(not(any(feature = "zlib-ng", feature = "zlib-rs")))]
    #[test]
    fn custom_window_needs_zlib_backend() {
        let window = WindowBits::new(12, true).unwrap();
        let mut decoder = ZlibDecoder::with_window_bits(window);
        let err = decoder.open(BufferSizes::default()).unwrap_err();
        assert!(matches!(err, TransformError::Unsupported(_)));
    }
}

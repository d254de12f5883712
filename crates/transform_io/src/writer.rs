use std::fmt;
use std::io::{self, Write};

use transform::{
    BufferSizes, TransformError, TransformRequest, Transformer, negotiate_and_open,
};

use crate::debug_io::{trace_adapter_open, trace_write_backpressure, trace_writer_finish};

/// Pushes written bytes through a transformer into a target writer.
///
/// Every chunk the transformer produces is written to the target
/// immediately; the adapter keeps no carry-over of input. [`Write::flush`]
/// only flushes the target. Call [`finish`](Self::finish) to drain the
/// transformer at end of input.
///
/// ```
/// use std::io::Write;
/// use transform::base_n::{BaseNEncoder, Radix};
/// use transform_io::TransformWriter;
///
/// let mut writer = TransformWriter::new(BaseNEncoder::new(Radix::Base16), Vec::new()).unwrap();
/// writer.write_all(b"hi").unwrap();
/// writer.finish().unwrap();
/// assert_eq!(writer.get_ref(), b"6869");
/// ```
pub struct TransformWriter<T, W> {
    transformer: T,
    target: W,
    sizes: BufferSizes,
    scratch: Vec<u8>,
}

impl<T: Transformer, W: Write> TransformWriter<T, W> {
    /// Opens `transformer` with default buffer sizes and wraps `target`.
    ///
    /// # Errors
    ///
    /// Returns the transformer's `open` failure.
    pub fn new(transformer: T, target: W) -> Result<Self, TransformError> {
        Self::with_buffer_sizes(transformer, target, BufferSizes::default())
    }

    /// Negotiates `proposed` with `transformer`, opens it and wraps `target`.
    ///
    /// # Errors
    ///
    /// Returns the transformer's `open` failure.
    pub fn with_buffer_sizes(
        mut transformer: T,
        target: W,
        proposed: BufferSizes,
    ) -> Result<Self, TransformError> {
        let sizes = negotiate_and_open(&mut transformer, proposed)?;
        trace_adapter_open("writer", sizes.source, sizes.dest);
        Ok(Self {
            transformer,
            target,
            sizes,
            scratch: vec![0; sizes.dest],
        })
    }

    /// Drives the transformer with `flush` until it produces nothing, writes
    /// every chunk, then flushes the target.
    ///
    /// # Errors
    ///
    /// Transformer failures surface as [`io::Error`] wrapping the
    /// [`TransformError`]; target failures are returned unchanged.
    pub fn finish(&mut self) -> io::Result<()> {
        let mut flushed = 0;
        loop {
            let progress = self
                .transformer
                .transform(TransformRequest::finishing(&[], &mut self.scratch))?;
            if progress.produced == 0 {
                break;
            }
            self.target.write_all(&self.scratch[..progress.produced])?;
            flushed += progress.produced;
        }
        trace_writer_finish(flushed);
        self.target.flush()
    }

    /// Returns the transformer to a fresh active state for a new payload.
    ///
    /// # Errors
    ///
    /// Returns the transformer's `reset` failure.
    pub fn reset(&mut self) -> Result<(), TransformError> {
        self.transformer.reset()
    }

    /// Replaces the target, keeping the transformer and its state.
    pub fn retarget<U: Write>(self, target: U) -> (TransformWriter<T, U>, W) {
        let writer = TransformWriter {
            transformer: self.transformer,
            target,
            sizes: self.sizes,
            scratch: self.scratch,
        };
        (writer, self.target)
    }
}

impl<T, W> TransformWriter<T, W> {
    /// Returns the negotiated buffer sizes.
    pub const fn buffer_sizes(&self) -> BufferSizes {
        self.sizes
    }

    /// Returns the target.
    pub const fn get_ref(&self) -> &W {
        &self.target
    }

    /// Returns the target mutably. Writing to it directly interleaves with
    /// transformed output.
    pub fn get_mut(&mut self) -> &mut W {
        &mut self.target
    }

    /// Returns the transformer.
    pub const fn transformer(&self) -> &T {
        &self.transformer
    }

    /// Returns the transformer mutably.
    pub fn transformer_mut(&mut self) -> &mut T {
        &mut self.transformer
    }

    /// Splits the adapter without finishing the transformer.
    pub fn into_parts(self) -> (T, W) {
        (self.transformer, self.target)
    }
}

impl<T: Transformer, W: Write> Write for TransformWriter<T, W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut consumed = 0;
        while consumed < buf.len() {
            let progress = self
                .transformer
                .transform(TransformRequest::new(&buf[consumed..], &mut self.scratch))?;
            if progress.is_stalled() {
                trace_write_backpressure(consumed, buf.len());
                break;
            }
            consumed += progress.consumed;
            if progress.produced > 0 {
                self.target.write_all(&self.scratch[..progress.produced])?;
            }
        }
        Ok(consumed)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.target.flush()
    }
}

impl<T: fmt::Debug, W: fmt::Debug> fmt::Debug for TransformWriter<T, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformWriter")
            .field("transformer", &self.transformer)
            .field("target", &self.target)
            .field("sizes", &self.sizes)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use transform::base_n::{BaseNEncoder, Radix};
    use transform::{Progress, TransformMode};

    /// Accepts nothing and produces nothing.
    struct Stuck;

    impl Transformer for Stuck {
        fn mode(&self) -> TransformMode {
            TransformMode::Encode
        }

        fn open(&mut self, _sizes: BufferSizes) -> transform::Result<()> {
            Ok(())
        }

        fn transform(&mut self, _request: TransformRequest<'_>) -> transform::Result<Progress> {
            Ok(Progress::default())
        }

        fn close(&mut self) {}

        fn reset(&mut self) -> transform::Result<()> {
            Ok(())
        }

        fn is_open(&self) -> bool {
            true
        }
    }

    #[test]
    fn stalled_transformer_shortens_write() {
        let mut writer = TransformWriter::new(Stuck, Vec::new()).unwrap();
        assert_eq!(writer.write(b"abc").unwrap(), 0);
        let err = writer.write_all(b"abc").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::WriteZero);
    }

    #[test]
    fn finish_emits_padding() {
        let mut writer = TransformWriter::new(BaseNEncoder::new(Radix::Base64), Vec::new()).unwrap();
        writer.write_all(b"M").unwrap();
        assert!(writer.get_ref().is_empty());
        writer.finish().unwrap();
        assert_eq!(writer.get_ref(), b"TQ==");
    }

    #[test]
    fn retarget_keeps_state() {
        let mut writer = TransformWriter::new(BaseNEncoder::new(Radix::Base16), Vec::new()).unwrap();
        writer.write_all(b"a").unwrap();
        let (mut writer, first) = writer.retarget(Vec::new());
        writer.write_all(b"b").unwrap();
        writer.finish().unwrap();
        assert_eq!(first, b"61");
        assert_eq!(writer.get_ref(), b"62");
    }
}

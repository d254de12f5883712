//! The transform contract.
//!
//! A transformer converts bytes from one representation to another, one
//! bounded chunk at a time. Callers drive it through a fixed lifecycle:
//!
//! ```text
//! closed --open--> active --transform*--> flushing --close--> closed
//!                    ^                        |
//!                    +---------reset----------+
//! ```
//!
//! Flushing is not a separate call: the caller passes `flush = true` and
//! keeps calling [`Transformer::transform`] with an empty source until a call
//! produces no output.

use crate::error::Result;

/// Direction of a transformer, fixed at construction.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TransformMode {
    /// Convert raw data into the transformer's representation.
    Encode,
    /// Convert the transformer's representation back into raw data.
    Decode,
}

impl TransformMode {
    /// Returns the lowercase name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Decode => "decode",
        }
    }
}

/// Source and destination buffer sizes negotiated between a caller and a
/// transformer.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct BufferSizes {
    /// Bytes offered as input per call.
    pub source: usize,
    /// Bytes of output space offered per call.
    pub dest: usize,
}

impl BufferSizes {
    /// Creates a size pair.
    #[must_use]
    pub const fn new(source: usize, dest: usize) -> Self {
        Self { source, dest }
    }

    /// Raises each size to at least the given minimum.
    pub fn at_least(&mut self, source: usize, dest: usize) {
        self.source = self.source.max(source);
        self.dest = self.dest.max(dest);
    }
}

impl Default for BufferSizes {
    fn default() -> Self {
        Self::new(crate::DEFAULT_BUFFER_SIZE, crate::DEFAULT_BUFFER_SIZE)
    }
}

/// Per-call descriptor handed to [`Transformer::transform`].
///
/// The callee never reads past `source` and never writes past `dest`; it
/// reports how much of each it used through [`Progress`].
#[derive(Debug)]
pub struct TransformRequest<'a> {
    /// Input bytes. May be empty.
    pub source: &'a [u8],
    /// Output space. May be smaller than one unit of output.
    pub dest: &'a mut [u8],
    /// No further input will arrive after `source`.
    pub flush: bool,
}

impl<'a> TransformRequest<'a> {
    /// Creates a request that does not flush.
    #[must_use]
    pub fn new(source: &'a [u8], dest: &'a mut [u8]) -> Self {
        Self {
            source,
            dest,
            flush: false,
        }
    }

    /// Creates a request that signals end of input.
    #[must_use]
    pub fn finishing(source: &'a [u8], dest: &'a mut [u8]) -> Self {
        Self {
            source,
            dest,
            flush: true,
        }
    }
}

/// Amount of input consumed and output produced by one call.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct Progress {
    /// Prefix of the source that was consumed.
    pub consumed: usize,
    /// Prefix of the destination that was written.
    pub produced: usize,
}

impl Progress {
    /// Creates a progress report.
    #[must_use]
    pub const fn new(consumed: usize, produced: usize) -> Self {
        Self { consumed, produced }
    }

    /// Returns `true` when the call neither consumed nor produced anything.
    #[must_use]
    pub const fn is_stalled(&self) -> bool {
        self.consumed == 0 && self.produced == 0
    }
}

/// Stateful chunk converter.
///
/// Implementations never panic on bad input; they report
/// [`TransformError`](crate::TransformError) and expect the caller to stop
/// pumping data until [`reset`](Self::reset).
pub trait Transformer {
    /// Returns the direction fixed at construction.
    fn mode(&self) -> TransformMode;

    /// Raises the caller's proposed buffer sizes to the transformer's minimum
    /// working granularity. Never fails and never shrinks a proposal.
    fn suggest_buffer_sizes(&self, sizes: &mut BufferSizes) {
        let _ = sizes;
    }

    /// Allocates state for the negotiated buffer sizes and moves the
    /// transformer to the active state.
    fn open(&mut self, sizes: BufferSizes) -> Result<()>;

    /// Consumes a prefix of `request.source` and fills a prefix of
    /// `request.dest`.
    ///
    /// Without `flush` the transformer may keep input internally and produce
    /// nothing. With `flush` the caller repeats the call, with an empty source
    /// once all input is consumed, until [`Progress::produced`] is zero.
    fn transform(&mut self, request: TransformRequest<'_>) -> Result<Progress>;

    /// Releases internal state. Calling it on a closed transformer is a no-op.
    fn close(&mut self);

    /// Returns to a fresh active state with the sizes from the last `open`.
    ///
    /// Equivalent to `close` followed by `open`, but implementations keep
    /// whatever allocations they can.
    fn reset(&mut self) -> Result<()>;

    /// Returns `true` between `open` and `close`.
    fn is_open(&self) -> bool;
}

impl<T: Transformer + ?Sized> Transformer for Box<T> {
    fn mode(&self) -> TransformMode {
        (**self).mode()
    }

    fn suggest_buffer_sizes(&self, sizes: &mut BufferSizes) {
        (**self).suggest_buffer_sizes(sizes);
    }

    fn open(&mut self, sizes: BufferSizes) -> Result<()> {
        (**self).open(sizes)
    }

    fn transform(&mut self, request: TransformRequest<'_>) -> Result<Progress> {
        (**self).transform(request)
    }

    fn close(&mut self) {
        (**self).close();
    }

    fn reset(&mut self) -> Result<()> {
        (**self).reset()
    }

    fn is_open(&self) -> bool {
        (**self).is_open()
    }
}

/// Negotiates buffer sizes with `transformer` and opens it.
///
/// Returns the sizes the transformer was opened with.
pub fn negotiate_and_open<T: Transformer + ?Sized>(
    transformer: &mut T,
    proposed: BufferSizes,
) -> Result<BufferSizes> {
    let mut sizes = proposed;
    transformer.suggest_buffer_sizes(&mut sizes);
    transformer.open(sizes)?;
    Ok(sizes)
}

/// Drives `transformer` over `input` and collects all output, flushing at the
/// end. The transformer must already be open.
///
/// `chunk` is the scratch size per call; it is raised to 16 bytes so that
/// every transformer in this crate can emit at least one unit per call.
pub fn transform_to_vec<T: Transformer + ?Sized>(
    transformer: &mut T,
    input: &[u8],
    chunk: usize,
) -> Result<Vec<u8>> {
    let mut output = Vec::new();
    let mut scratch = vec![0u8; chunk.max(16)];
    let mut offset = 0;

    loop {
        let flush = offset == input.len();
        let progress = transformer.transform(TransformRequest {
            source: &input[offset..],
            dest: &mut scratch,
            flush,
        })?;
        offset += progress.consumed;
        output.extend_from_slice(&scratch[..progress.produced]);

        if flush && progress.produced == 0 {
            return Ok(output);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_least_never_shrinks() {
        let mut sizes = BufferSizes::new(100, 10);
        sizes.at_least(50, 40);
        assert_eq!(sizes, BufferSizes::new(100, 40));
    }

    #[test]
    fn stalled_progress_detection() {
        assert!(Progress::default().is_stalled());
        assert!(!Progress::new(1, 0).is_stalled());
        assert!(!Progress::new(0, 1).is_stalled());
    }

    #[test]
    fn request_constructors_set_flush() {
        let mut dest = [0u8; 4];
        assert!(!TransformRequest::new(b"ab", &mut dest).flush);
        assert!(TransformRequest::finishing(b"", &mut dest).flush);
    }
}

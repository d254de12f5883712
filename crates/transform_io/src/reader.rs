use std::fmt;
use std::io::{self, Read};

use transform::{
    BufferSizes, TransformError, TransformRequest, Transformer, negotiate_and_open,
};

use crate::debug_io::{
    trace_adapter_open, trace_preload, trace_reader_end_of_input, trace_reader_stall,
};

/// Pulls bytes from a source reader through a transformer.
///
/// The adapter owns a carry-over buffer of the negotiated source size. Each
/// `read` tops it up from the source, hands the filled prefix to the
/// transformer and shifts whatever was not consumed to the front. The
/// transformer is switched to flush mode once the source returns `Ok(0)`;
/// short reads are not taken as end of input.
///
/// Caller buffers shorter than the negotiated destination size are served
/// from a staging buffer, so a transformer whose output comes in fixed-size
/// units never sees a destination too small to hold one.
///
/// ```
/// use std::io::Read;
/// use transform::base_n::{BaseNDecoder, Radix};
/// use transform_io::TransformReader;
///
/// let mut reader = TransformReader::new(BaseNDecoder::new(Radix::Base64), &b"aGk="[..]).unwrap();
/// let mut decoded = Vec::new();
/// reader.read_to_end(&mut decoded).unwrap();
/// assert_eq!(decoded, b"hi");
/// ```
pub struct TransformReader<T, R> {
    transformer: T,
    source: R,
    sizes: BufferSizes,
    carry: Vec<u8>,
    filled: usize,
    staged: Vec<u8>,
    staged_start: usize,
    staged_end: usize,
    end_of_input: bool,
    finished: bool,
}

impl<T: Transformer, R: Read> TransformReader<T, R> {
    /// Opens `transformer` with default buffer sizes and wraps `source`.
    ///
    /// # Errors
    ///
    /// Returns the transformer's `open` failure.
    pub fn new(transformer: T, source: R) -> Result<Self, TransformError> {
        Self::with_buffer_sizes(transformer, source, BufferSizes::default())
    }

    /// Negotiates `proposed` with `transformer`, opens it and wraps `source`.
    ///
    /// # Errors
    ///
    /// Returns the transformer's `open` failure.
    pub fn with_buffer_sizes(
        mut transformer: T,
        source: R,
        proposed: BufferSizes,
    ) -> Result<Self, TransformError> {
        let sizes = negotiate_and_open(&mut transformer, proposed)?;
        trace_adapter_open("reader", sizes.source, sizes.dest);
        Ok(Self {
            transformer,
            source,
            sizes,
            carry: vec![0; sizes.source.max(1)],
            filled: 0,
            staged: vec![0; sizes.dest.max(1)],
            staged_start: 0,
            staged_end: 0,
            end_of_input: false,
            finished: false,
        })
    }

    /// Injects bytes ahead of anything still to be read from the source.
    ///
    /// Meant for bytes a caller already took from the source, such as a
    /// sniffed prefix. Returns how many bytes fit into the free part of the
    /// carry-over buffer.
    pub fn preload_source_data(&mut self, data: &[u8]) -> usize {
        let accepted = data.len().min(self.carry.len() - self.filled);
        self.carry[self.filled..self.filled + accepted].copy_from_slice(&data[..accepted]);
        self.filled += accepted;
        trace_preload(data.len(), accepted);
        accepted
    }

    /// Returns the transformer and the adapter to a fresh state. Carried and
    /// staged bytes are discarded; the source is left where it is.
    ///
    /// # Errors
    ///
    /// Returns the transformer's `reset` failure.
    pub fn reset(&mut self) -> Result<(), TransformError> {
        self.filled = 0;
        self.staged_start = 0;
        self.staged_end = 0;
        self.end_of_input = false;
        self.finished = false;
        self.transformer.reset()
    }

    /// Replaces the source, keeping the transformer, carried and staged bytes.
    pub fn retarget<U: Read>(self, source: U) -> (TransformReader<T, U>, R) {
        let reader = TransformReader {
            transformer: self.transformer,
            source,
            sizes: self.sizes,
            carry: self.carry,
            filled: self.filled,
            staged: self.staged,
            staged_start: self.staged_start,
            staged_end: self.staged_end,
            end_of_input: self.end_of_input,
            finished: self.finished,
        };
        (reader, self.source)
    }

    fn top_up(&mut self) -> io::Result<()> {
        while !self.end_of_input && self.filled < self.carry.len() {
            match self.source.read(&mut self.carry[self.filled..]) {
                Ok(0) => {
                    self.end_of_input = true;
                    trace_reader_end_of_input(self.filled);
                }
                Ok(count) => {
                    self.filled += count;
                    return Ok(());
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => return Err(err),
            }
        }
        Ok(())
    }

    /// Runs one transform step into `out`, or into the staging buffer when
    /// `out` is shorter than the negotiated destination. Returns the bytes
    /// written to `out`.
    fn step(&mut self, out: &mut [u8]) -> io::Result<usize> {
        self.top_up()?;

        let direct = out.len() >= self.staged.len();
        let dest = if direct { out } else { &mut self.staged[..] };
        let progress = self.transformer.transform(TransformRequest {
            source: &self.carry[..self.filled],
            dest,
            flush: self.end_of_input,
        })?;
        self.carry.copy_within(progress.consumed..self.filled, 0);
        self.filled -= progress.consumed;

        if progress.is_stalled() {
            if self.end_of_input {
                self.finished = true;
            } else if self.filled == self.carry.len() {
                trace_reader_stall(self.filled);
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "transformer made no progress on a full source buffer",
                ));
            }
        }

        if direct {
            Ok(progress.produced)
        } else {
            self.staged_start = 0;
            self.staged_end = progress.produced;
            Ok(0)
        }
    }

    fn drain_staged(&mut self, out: &mut [u8]) -> usize {
        let count = out.len().min(self.staged_end - self.staged_start);
        out[..count].copy_from_slice(&self.staged[self.staged_start..self.staged_start + count]);
        self.staged_start += count;
        count
    }
}

impl<T, R> TransformReader<T, R> {
    /// Returns the negotiated buffer sizes.
    pub const fn buffer_sizes(&self) -> BufferSizes {
        self.sizes
    }

    /// Returns `true` once the transformer has been fully drained.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns the source.
    pub const fn get_ref(&self) -> &R {
        &self.source
    }

    /// Returns the source mutably.
    pub fn get_mut(&mut self) -> &mut R {
        &mut self.source
    }

    /// Returns the transformer.
    pub const fn transformer(&self) -> &T {
        &self.transformer
    }

    /// Splits the adapter. Carried bytes are lost.
    pub fn into_parts(self) -> (T, R) {
        (self.transformer, self.source)
    }
}

impl<T: Transformer, R: Read> Read for TransformReader<T, R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        if out.is_empty() {
            return Ok(0);
        }
        loop {
            if self.staged_start < self.staged_end {
                return Ok(self.drain_staged(out));
            }
            if self.finished {
                return Ok(0);
            }
            let produced = self.step(out)?;
            if produced > 0 {
                return Ok(produced);
            }
        }
    }
}

impl<T: fmt::Debug, R: fmt::Debug> fmt::Debug for TransformReader<T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformReader")
            .field("transformer", &self.transformer)
            .field("source", &self.source)
            .field("sizes", &self.sizes)
            .field("filled", &self.filled)
            .field("staged", &(self.staged_end - self.staged_start))
            .field("end_of_input", &self.end_of_input)
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}

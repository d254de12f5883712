//! Shared test doubles for the xform workspace.
//!
//! - [`ChunkedReader`] hands out data in short reads, optionally interleaved
//!   with [`io::ErrorKind::Interrupted`], to exercise carry-over logic.
//! - [`FlushCountingWriter`] records written bytes and how often it was
//!   flushed.
//! - [`payload`] and [`text_payload`] build deterministic inputs.
//! - [`write_temp_file`] stages input files for binary tests.

use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use tempfile::TempDir;

/// Reader that never returns more than `chunk` bytes per call.
#[derive(Debug)]
pub struct ChunkedReader<R> {
    inner: R,
    chunk: usize,
    interrupt_every: Option<usize>,
    calls: usize,
}

impl<R: Read> ChunkedReader<R> {
    /// Wraps `inner`, limiting each read to `chunk` bytes (at least one).
    pub fn new(inner: R, chunk: usize) -> Self {
        Self {
            inner,
            chunk: chunk.max(1),
            interrupt_every: None,
            calls: 0,
        }
    }

    /// Makes every `n`th call fail with `ErrorKind::Interrupted`.
    #[must_use]
    pub fn interrupting_every(mut self, n: usize) -> Self {
        self.interrupt_every = Some(n.max(2));
        self
    }

    /// Returns the number of `read` calls made so far.
    pub fn calls(&self) -> usize {
        self.calls
    }
}

impl<R: Read> Read for ChunkedReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.calls += 1;
        if let Some(n) = self.interrupt_every {
            if self.calls % n == 0 {
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
        }
        let limit = buf.len().min(self.chunk);
        self.inner.read(&mut buf[..limit])
    }
}

/// Writer collecting bytes in memory and counting flushes.
#[derive(Debug, Default)]
pub struct FlushCountingWriter {
    /// Everything written so far.
    pub data: Vec<u8>,
    /// Number of `flush` calls.
    pub flushes: usize,
    /// Length of `data` at each flush.
    pub flushed_at: Vec<usize>,
}

impl FlushCountingWriter {
    /// Creates an empty writer.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Write for FlushCountingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.data.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.flushes += 1;
        self.flushed_at.push(self.data.len());
        Ok(())
    }
}

/// Deterministic pseudo-random bytes (linear congruential generator).
pub fn payload(len: usize, seed: u64) -> Vec<u8> {
    let mut state = seed;
    (0..len)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            state.to_be_bytes()[0]
        })
        .collect()
}

/// Compressible text mixing ASCII, accented Latin, CJK and astral characters.
pub fn text_payload(len: usize) -> String {
    const WORDS: [&str; 6] = [
        "stream ",
        "caf\u{e9} ",
        "\u{6587}\u{5b57} ",
        "\u{1f600} ",
        "block\n",
        "na\u{ef}ve ",
    ];
    let mut text = String::with_capacity(len + 8);
    let mut index = 0;
    while text.len() < len {
        text.push_str(WORDS[index % WORDS.len()]);
        index += 1;
    }
    text
}

/// Writes `contents` to a file named `name` in a fresh temporary directory.
///
/// The directory is removed when the returned guard is dropped.
pub fn write_temp_file(name: &str, contents: &[u8]) -> io::Result<(TempDir, PathBuf)> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(name);
    fs::write(&path, contents)?;
    Ok((dir, path))
}

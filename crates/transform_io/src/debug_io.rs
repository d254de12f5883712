//! Tracing for stream adapter events.
//!
//! All tracing is conditionally compiled behind the `tracing` feature flag and
//! produces no-op inline functions when disabled.

#[cfg(feature = "tracing")]
const IO_TARGET: &str = "xform::io";

/// Traces an adapter opening its transformer.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_adapter_open(adapter: &str, source: usize, dest: usize) {
    tracing::debug!(
        target: IO_TARGET,
        adapter = %adapter,
        source = source,
        dest = dest,
        "adapter_open"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_adapter_open(_adapter: &str, _source: usize, _dest: usize) {}

/// Traces a write cut short because the transformer made no progress.
///
/// # Arguments
///
/// * `accepted` - Bytes of the caller's buffer consumed before the stall
/// * `offered` - Length of the caller's buffer
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_write_backpressure(accepted: usize, offered: usize) {
    tracing::warn!(
        target: IO_TARGET,
        accepted = accepted,
        offered = offered,
        "write_backpressure"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_write_backpressure(_accepted: usize, _offered: usize) {}

/// Traces the writer draining the transformer at end of input.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_writer_finish(flushed: usize) {
    tracing::debug!(target: IO_TARGET, flushed = flushed, "writer_finish");
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_writer_finish(_flushed: usize) {}

/// Traces the reader's source reporting end of input.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_reader_end_of_input(carried: usize) {
    tracing::debug!(target: IO_TARGET, carried = carried, "reader_end_of_input");
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_reader_end_of_input(_carried: usize) {}

/// Traces a reader stall with a full carry-over buffer.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_reader_stall(carried: usize) {
    tracing::warn!(target: IO_TARGET, carried = carried, "reader_stall");
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_reader_stall(_carried: usize) {}

/// Traces bytes injected into the reader ahead of the source.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_preload(offered: usize, accepted: usize) {
    tracing::trace!(
        target: IO_TARGET,
        offered = offered,
        accepted = accepted,
        "reader_preload"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_preload(_offered: usize, _accepted: usize) {}

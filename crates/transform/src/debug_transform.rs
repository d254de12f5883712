//! Tracing for transformer lifecycle events.
//!
//! All tracing is conditionally compiled behind the `tracing` feature flag and
//! produces no-op inline functions when disabled.

#[cfg(feature = "tracing")]
const TRANSFORM_TARGET: &str = "xform::transform";

// ============================================================================
// Tracing functions (feature-gated)
// ============================================================================

/// Traces a transformer moving from closed to active.
///
/// # Arguments
///
/// * `kind` - Transformer kind (e.g. "zlib", "base64", "UTF-8")
/// * `mode` - "encode" or "decode"
/// * `source` - Negotiated source buffer size
/// * `dest` - Negotiated destination buffer size
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_open(kind: &str, mode: &str, source: usize, dest: usize) {
    tracing::debug!(
        target: TRANSFORM_TARGET,
        kind = %kind,
        mode = %mode,
        source = source,
        dest = dest,
        "transformer_open"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_open(_kind: &str, _mode: &str, _source: usize, _dest: usize) {}

/// Traces a reset back to a fresh active state.
///
/// `rebuilt` is true when the engine had to be recreated rather than reset in
/// place (a compression level change, for instance).
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_reset(kind: &str, mode: &str, rebuilt: bool) {
    tracing::debug!(
        target: TRANSFORM_TARGET,
        kind = %kind,
        mode = %mode,
        rebuilt = rebuilt,
        "transformer_reset"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_reset(_kind: &str, _mode: &str, _rebuilt: bool) {}

/// Traces a transformer being closed, with its lifetime byte totals.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_close(kind: &str, mode: &str, total_in: u64, total_out: u64) {
    tracing::debug!(
        target: TRANSFORM_TARGET,
        kind = %kind,
        mode = %mode,
        total_in = total_in,
        total_out = total_out,
        "transformer_close"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_close(_kind: &str, _mode: &str, _total_in: u64, _total_out: u64) {}

/// Traces the compressed stream reaching its end marker.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_stream_end(mode: &str, total_in: u64, total_out: u64) {
    tracing::trace!(
        target: TRANSFORM_TARGET,
        mode = %mode,
        total_in = total_in,
        total_out = total_out,
        "zlib_stream_end"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_stream_end(_mode: &str, _total_in: u64, _total_out: u64) {}

/// Traces a transform failure before it is handed back to the caller.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_failure(kind: &str, error: &crate::TransformError) {
    tracing::debug!(
        target: TRANSFORM_TARGET,
        kind = %kind,
        error = %error,
        "transform_failed"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_failure(_kind: &str, _error: &crate::TransformError) {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_functions_are_callable_without_subscriber() {
        trace_open("zlib", "encode", 32 * 1024, 16 * 1024);
        trace_reset("zlib", "encode", false);
        trace_close("zlib", "encode", 10, 4);
        trace_stream_end("decode", 4, 10);
        trace_failure("base64", &crate::TransformError::NotOpen);
    }
}

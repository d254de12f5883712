//! Tracing for the text streamer.
//!
//! All tracing is conditionally compiled behind the `tracing` feature flag and
//! produces no-op inline functions when disabled.

#[cfg(feature = "tracing")]
const TEXT_TARGET: &str = "xform::text";

/// Traces the encoding chosen when a streamer starts reading.
///
/// # Arguments
///
/// * `encoding` - Label of the encoding now in use
/// * `mark_len` - Length of the detected byte-order mark, 0 when none matched
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_encoding_detected(encoding: &str, mark_len: usize) {
    tracing::debug!(
        target: TEXT_TARGET,
        encoding = %encoding,
        mark_len = mark_len,
        "encoding_detected"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_encoding_detected(_encoding: &str, _mark_len: usize) {}

/// Traces the line terminator style seen by `read_line`.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_line_ending(style: &str) {
    tracing::trace!(target: TEXT_TARGET, style = %style, "line_ending");
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_line_ending(_style: &str) {}

/// Traces a streamer committing to a direction.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_direction(direction: &str, encoding: &str) {
    tracing::debug!(
        target: TEXT_TARGET,
        direction = %direction,
        encoding = %encoding,
        "direction"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_direction(_direction: &str, _encoding: &str) {}

/// Traces buffered characters handed to the encoder.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_char_flush(chars: usize, forced: bool) {
    tracing::trace!(target: TEXT_TARGET, chars = chars, forced = forced, "char_flush");
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_char_flush(_chars: usize, _forced: bool) {}

//! Tracing for the compression façade.
//!
//! All tracing is conditionally compiled behind the `tracing` feature flag and
//! produces no-op inline functions when disabled.

#[cfg(feature = "tracing")]
const COMPRESS_TARGET: &str = "xform::compress";

/// Traces the façade building a transformer and adapter for `op`.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_zipper_build(op: &str) {
    tracing::debug!(target: COMPRESS_TARGET, op = %op, "zipper_build");
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_zipper_build(_op: &str) {}

/// Traces the façade reusing a parked adapter for `op`.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_zipper_reuse(op: &str) {
    tracing::trace!(target: COMPRESS_TARGET, op = %op, "zipper_reuse");
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_zipper_reuse(_op: &str) {}

/// Traces a completed façade call.
///
/// # Arguments
///
/// * `op` - "zip" or "unzip"
/// * `input` - Bytes handed to the call
/// * `output` - Bytes written to the destination
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_zipper_done(op: &str, input: usize, output: u64) {
    tracing::debug!(
        target: COMPRESS_TARGET,
        op = %op,
        input = input,
        output = output,
        "zipper_done"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_zipper_done(_op: &str, _input: usize, _output: u64) {}

/// Traces a one-shot helper call.
#[cfg(feature = "tracing")]
#[inline]
pub fn trace_one_shot(op: &str, input: usize, output: usize) {
    tracing::trace!(
        target: COMPRESS_TARGET,
        op = %op,
        input = input,
        output = output,
        "one_shot"
    );
}

/// No-op when tracing is disabled.
#[cfg(not(feature = "tracing"))]
#[inline]
pub fn trace_one_shot(_op: &str, _input: usize, _output: usize) {}

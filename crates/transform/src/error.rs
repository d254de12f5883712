//! Error taxonomy shared by every transformer.
//!
//! Transformers report a single pass/fail result per call. Destination
//! buffers that are too small are *not* errors: they surface as
//! [`Progress`](crate::Progress) counts smaller than the offered buffers and
//! the caller simply calls again after draining output. What remains here is
//! malformed input, protocol misuse, and failures inside the compression
//! engine.

use std::io;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TransformError>;

/// Broad classification of a [`TransformError`].
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ErrorCategory {
    /// The input violates the encoding. The transformer is usable again after
    /// [`reset`](crate::Transformer::reset).
    Malformed,
    /// The caller broke the lifecycle contract (for example transforming
    /// before `open`).
    Misuse,
    /// The underlying engine failed or lacks a requested capability.
    Engine,
}

/// Failure reported by a transformer.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TransformError {
    /// `transform` or `reset` was called while the transformer was closed.
    #[error("transformer is not open")]
    NotOpen,

    /// A decoder met a byte sequence that is not valid for its encoding.
    #[error("illegal {encoding} sequence at offset {offset}")]
    IllegalSequence {
        /// Name of the encoding being decoded.
        encoding: &'static str,
        /// Offset of the offending byte within the source passed to the call.
        offset: usize,
    },

    /// The input ended in the middle of a multi-byte unit.
    #[error("truncated {encoding} sequence at end of input")]
    Truncated {
        /// Name of the encoding being decoded.
        encoding: &'static str,
    },

    /// A Base-N decoder met a character outside of its alphabet.
    #[error("invalid {alphabet} character 0x{byte:02x}")]
    InvalidCharacter {
        /// Name of the alphabet (`base16`, `base32` or `base64`).
        alphabet: &'static str,
        /// The rejected input byte.
        byte: u8,
    },

    /// The compressed stream is corrupt or ends prematurely.
    #[error("corrupt compressed data: {0}")]
    CorruptData(String),

    /// The requested configuration is not available in this build.
    #[error("unsupported: {0}")]
    Unsupported(String),

    /// The compression engine rejected a call for a reason unrelated to the
    /// input data.
    #[error("compression engine failure: {0}")]
    Engine(String),
}

impl TransformError {
    /// Returns the broad category of this error.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::NotOpen => ErrorCategory::Misuse,
            Self::IllegalSequence { .. }
            | Self::Truncated { .. }
            | Self::InvalidCharacter { .. }
            | Self::CorruptData(_) => ErrorCategory::Malformed,
            Self::Unsupported(_) | Self::Engine(_) => ErrorCategory::Engine,
        }
    }

    /// Returns `true` when the input, not the caller, is at fault.
    #[must_use]
    pub const fn is_malformed_input(&self) -> bool {
        matches!(self.category(), ErrorCategory::Malformed)
    }
}

impl From<TransformError> for io::Error {
    fn from(err: TransformError) -> Self {
        let kind = match err.category() {
            ErrorCategory::Malformed => io::ErrorKind::InvalidData,
            ErrorCategory::Misuse | ErrorCategory::Engine => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

//! Errors raised by the text layer.

use std::io;

use transform::TransformError;

/// Failure reported by a [`TextStreamer`](crate::TextStreamer) or by label
/// parsing.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum TextError {
    /// The label does not name a supported text encoding.
    #[error("unknown text encoding: {0}")]
    UnknownEncoding(String),

    /// The label does not name a supported line format.
    #[error("unknown line format: {0}")]
    UnknownLineFormat(String),

    /// The streamer was used in the direction it is not committed to.
    #[error("text streamer is {active}; cannot start {attempted}")]
    WrongDirection {
        /// Direction the streamer already serves.
        active: &'static str,
        /// Direction the caller asked for.
        attempted: &'static str,
    },

    /// The format was changed after the first character was read or written.
    #[error("text format is fixed once the first character has been transferred")]
    FormatLocked,

    /// The decoder produced a value that is not a Unicode scalar value.
    #[error("decoded value {0:#x} is not a valid code point")]
    InvalidCodePoint(u32),

    /// The streamer no longer owns its byte stream.
    #[error("text streamer has been detached from its stream")]
    Detached,

    /// The underlying transformer failed.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl From<TextError> for io::Error {
    fn from(err: TextError) -> Self {
        let kind = match &err {
            TextError::UnknownEncoding(_) | TextError::UnknownLineFormat(_) => {
                io::ErrorKind::InvalidInput
            }
            TextError::InvalidCodePoint(_) => io::ErrorKind::InvalidData,
            TextError::Transform(inner) if inner.is_malformed_input() => {
                io::ErrorKind::InvalidData
            }
            _ => io::ErrorKind::Other,
        };
        Self::new(kind, err)
    }
}

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `text` layers character and line oriented I/O over the byte transformers.
//! A [`TextStreamer`] wraps any byte stream and reads or writes characters
//! in one of the supported [`TextEncoding`]s with a chosen [`LineFormat`].
//!
//! # Design
//!
//! The streamer composes a Unicode transcoder from `transform` with one of
//! the stream adapters from `transform_io`. The transcoder works on the
//! internal four-byte code point form; the streamer converts between that
//! form and `char`.
//!
//! Reading starts by sniffing up to three bytes for a byte-order mark
//! (`EF BB BF`, `FE FF`, `FF FE`). A mark selects the encoding and is
//! dropped; any other sniffed bytes are handed back to the decoder through
//! [`TransformReader::preload_source_data`](transform_io::TransformReader::preload_source_data).
//! Without a mark the configured encoding is kept, and
//! [`TextEncoding::Unknown`] falls back to UTF-8.
//!
//! # Invariants
//!
//! - A streamer either reads or writes, never both.
//! - The format may only be replaced before the first character moves.
//! - A byte-order mark is written at most once, before any character.
//!
//! # Errors
//!
//! Streamer operations return [`std::io::Result`]. Failures specific to
//! this crate are carried as a [`TextError`] inside the [`std::io::Error`].
//!
//! # Examples
//!
//! ```
//! use text::{LineFormat, StreamerOptions, TextEncoding, TextFormat, TextStreamer};
//!
//! # fn main() -> std::io::Result<()> {
//! let format = TextFormat::new(TextEncoding::Utf16Le, LineFormat::CrLf);
//! let mut writer = TextStreamer::with_options(Vec::new(), format, StreamerOptions::default());
//! writer.write_line("h\u{e9}")?;
//! writer.finish()?;
//! let bytes = writer.into_inner().unwrap_or_default();
//! assert_eq!(bytes, b"\xFF\xFEh\x00\xE9\x00\r\x00\n\x00");
//!
//! let mut reader = TextStreamer::new(&bytes[..]);
//! assert_eq!(reader.read_line()?.as_deref(), Some("h\u{e9}"));
//! assert_eq!(reader.format(), format);
//! # Ok(())
//! # }
//! ```

pub mod debug_text;
mod error;
mod format;
mod streamer;
mod transcode;

pub use error::TextError;
pub use format::{LineFormat, TextEncoding, TextFormat};
pub use streamer::{DEFAULT_CHAR_BUFFER, StreamerOptions, TextStreamer};
pub use transcode::{TranscodeSummary, transcode};
#[doc(no_inline)]
pub use transform::unicode::MalformedPolicy;

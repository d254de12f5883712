#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! Stream adapters that turn the pull/push [`Transformer`] contract into
//! ordinary [`std::io::Read`] and [`std::io::Write`] implementations.
//!
//! # Design
//!
//! Both adapters own their transformer exclusively and hold the underlying
//! stream by value; pass `&mut stream` to keep ownership with the caller.
//! Buffer sizes are negotiated once at construction.
//!
//! - [`TransformWriter`] writes every produced chunk straight to its target
//!   and reports a short write when the transformer stops making progress.
//! - [`TransformReader`] keeps a carry-over buffer holding the unconsumed
//!   remainder of what it read, and can be preloaded with bytes the caller
//!   already took from the source.
//!
//! # Errors
//!
//! Transformer failures cross the [`std::io`] boundary as
//! [`std::io::Error`] values wrapping the original
//! [`TransformError`](transform::TransformError): malformed input becomes
//! [`std::io::ErrorKind::InvalidData`], everything else
//! [`std::io::ErrorKind::Other`]. The typed error is recoverable with
//! `err.get_ref().and_then(|e| e.downcast_ref::<TransformError>())`.
//!
//! # Examples
//!
//! ```
//! use std::io::{Read, Write};
//! use transform::zlib::{CompressionLevel, ZlibDecoder, ZlibEncoder};
//! use transform_io::{TransformReader, TransformWriter};
//!
//! # fn main() -> std::io::Result<()> {
//! let mut writer = TransformWriter::new(ZlibEncoder::new(CompressionLevel::BEST), Vec::new())?;
//! writer.write_all(b"round trip through both adapters")?;
//! writer.finish()?;
//! let (_, packed) = writer.into_parts();
//!
//! let mut reader = TransformReader::new(ZlibDecoder::new(), &packed[..])?;
//! let mut unpacked = Vec::new();
//! reader.read_to_end(&mut unpacked)?;
//! assert_eq!(unpacked, b"round trip through both adapters");
//! # Ok(())
//! # }
//! ```

pub mod debug_io;
mod reader;
mod writer;

pub use reader::TransformReader;
pub use writer::TransformWriter;

#[doc(no_inline)]
pub use transform::Transformer;

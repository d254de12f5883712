#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `compress` is the convenience layer over the zlib transformer pair. It
//! offers a reusable [`Zipper`] for repeated one-shot zip/unzip calls and
//! free functions in [`zlib`] for buffer-to-buffer work.
//!
//! # Design
//!
//! Nothing here talks to flate2 directly. Compression goes through
//! [`transform::zlib::ZlibEncoder`] behind a
//! [`transform_io::TransformWriter`]; decompression through
//! [`transform::zlib::ZlibDecoder`] behind a
//! [`transform_io::TransformReader`].
//!
//! # Invariants
//!
//! - Every [`Zipper::zip`] call writes one complete zlib stream.
//! - After a successful call the façade's transformer is reset, so the next
//!   call never sees state from the previous payload.
//!
//! # Errors
//!
//! All operations return [`std::io::Result`]. Corrupt input surfaces as
//! [`std::io::ErrorKind::InvalidData`] wrapping a
//! [`transform::TransformError`]. Invalid levels are rejected up front by
//! [`CompressionLevel::new`](zlib::CompressionLevel::new) with a
//! [`CompressionLevelError`](zlib::CompressionLevelError).
//!
//! # Examples
//!
//! ```
//! use compress::Zipper;
//! use compress::zlib::CompressionLevel;
//!
//! # fn main() -> std::io::Result<()> {
//! let mut zipper = Zipper::new();
//! zipper.set_level(CompressionLevel::BEST);
//!
//! let mut first = Vec::new();
//! let mut second = Vec::new();
//! zipper.zip(&mut first, b"first payload")?;
//! zipper.zip(&mut second, b"second payload")?;
//!
//! let mut restored = Vec::new();
//! zipper.unzip(&mut restored, &second)?;
//! assert_eq!(restored, b"second payload");
//! # Ok(())
//! # }
//! ```

pub mod debug_compress;
pub mod zipper;
pub mod zlib;

pub use zipper::Zipper;
pub use zlib::{CompressionLevel, CompressionLevelError, CountingWriter};

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `transform` defines the chunked transformation contract used by every
//! stage of the `xform` pipeline and ships the concrete transformers: Base-N
//! text encodings, Unicode transcoding to and from an internal 32-bit code
//! point form, and a zlib adapter.
//!
//! # Design
//!
//! A [`Transformer`] is a stateful converter driven one
//! [`TransformRequest`] at a time. It consumes a prefix of the request's
//! source, fills a prefix of its destination and reports both counts through
//! [`Progress`]. Buffer sizes are negotiated up front with
//! [`Transformer::suggest_buffer_sizes`] so callers can size their scratch
//! space to the transformer's working granularity.
//!
//! Transformers never touch streams. The `transform_io` crate wraps them in
//! [`std::io::Read`] and [`std::io::Write`] adapters.
//!
//! [`AnyTransformer`] collects every transformer of this crate into a closed
//! enum, selectable by a kind tag through [`create_transformer`].
//!
//! # Invariants
//!
//! - A transformer never reads past the request's source and never writes
//!   past its destination.
//! - A destination too small for the next unit of output is not an error. The
//!   call reports less progress and the caller drains and retries.
//! - After `flush`, the caller repeats the call until it produces nothing;
//!   only then has all buffered output been emitted.
//!
//! # Errors
//!
//! Every fallible operation returns [`TransformError`]. Malformed input,
//! lifecycle misuse and engine failures are told apart by
//! [`TransformError::category`].
//!
//! # Examples
//!
//! ```
//! use transform::base_n::{BaseNEncoder, Radix};
//! use transform::{BufferSizes, negotiate_and_open, transform_to_vec};
//!
//! let mut encoder = BaseNEncoder::new(Radix::Base64);
//! negotiate_and_open(&mut encoder, BufferSizes::default()).unwrap();
//! let encoded = transform_to_vec(&mut encoder, b"Man", 64).unwrap();
//! assert_eq!(encoded, b"TWFu");
//! ```

pub mod base_n;
mod bits;
pub mod debug_transform;
pub mod error;
pub mod registry;
pub mod transformer;
pub mod unicode;
pub mod zlib;

/// Source and destination size proposed when a caller has no preference.
pub const DEFAULT_BUFFER_SIZE: usize = 8 * 1024;

pub use error::{ErrorCategory, Result, TransformError};
pub use registry::{AnyTransformer, TransformKind, UnknownKind, create_transformer};
pub use transformer::{
    BufferSizes, Progress, TransformMode, TransformRequest, Transformer, negotiate_and_open,
    transform_to_vec,
};

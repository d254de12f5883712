//! Transformer selection by kind tag.
//!
//! [`AnyTransformer`] is the closed set of transformers this crate ships,
//! dispatched with a `match` so a single pipeline type can carry any of them.

use core::fmt;
use core::str::FromStr;

use crate::base_n::{BaseNDecoder, BaseNEncoder, Radix};
use crate::error::Result;
use crate::transformer::{BufferSizes, Progress, TransformMode, TransformRequest, Transformer};
use crate::unicode::{UnicodeDecoder, UnicodeEncoder};
use crate::zlib::{CompressionLevel, ZlibDecoder, ZlibEncoder};

/// Byte representations selectable by tag.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum TransformKind {
    /// zlib-framed deflate.
    Zlib,
    /// Hexadecimal.
    Base16,
    /// RFC 4648 Base32.
    Base32,
    /// RFC 4648 Base64.
    Base64,
}

impl TransformKind {
    /// Every kind, in tag order.
    pub const ALL: [Self; 4] = [Self::Zlib, Self::Base16, Self::Base32, Self::Base64];

    /// Returns the canonical tag.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Zlib => "zlib",
            Self::Base16 => "base16",
            Self::Base32 => "base32",
            Self::Base64 => "base64",
        }
    }

    /// Creates a closed transformer of this kind.
    #[must_use]
    pub fn create(self, mode: TransformMode) -> AnyTransformer {
        let radix = match self {
            Self::Zlib => {
                return match mode {
                    TransformMode::Encode => {
                        AnyTransformer::ZlibEncoder(ZlibEncoder::new(CompressionLevel::DEFAULT))
                    }
                    TransformMode::Decode => AnyTransformer::ZlibDecoder(ZlibDecoder::new()),
                };
            }
            Self::Base16 => Radix::Base16,
            Self::Base32 => Radix::Base32,
            Self::Base64 => Radix::Base64,
        };
        match mode {
            TransformMode::Encode => AnyTransformer::BaseNEncoder(BaseNEncoder::new(radix)),
            TransformMode::Decode => AnyTransformer::BaseNDecoder(BaseNDecoder::new(radix)),
        }
    }
}

impl fmt::Display for TransformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TransformKind {
    type Err = UnknownKind;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "zlib" | "deflate" => Ok(Self::Zlib),
            "base16" | "hex" => Ok(Self::Base16),
            "base32" => Ok(Self::Base32),
            "base64" => Ok(Self::Base64),
            other => Err(UnknownKind::new(other)),
        }
    }
}

/// Error returned when parsing an unrecognised kind tag.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UnknownKind {
    input: String,
}

impl UnknownKind {
    /// Creates a parse error capturing the original input.
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// Returns the rejected input.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }
}

impl fmt::Display for UnknownKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown transformer kind: {}", self.input)
    }
}

impl std::error::Error for UnknownKind {}

/// Creates a closed transformer for `tag` and `mode`.
///
/// Returns `None` for unknown tags; callers typically pass data through
/// unchanged in that case.
#[must_use]
pub fn create_transformer(tag: &str, mode: TransformMode) -> Option<AnyTransformer> {
    tag.parse::<TransformKind>()
        .ok()
        .map(|kind| kind.create(mode))
}

/// Any transformer shipped by this crate.
#[derive(Debug)]
pub enum AnyTransformer {
    /// Base-N encoder.
    BaseNEncoder(BaseNEncoder),
    /// Base-N decoder.
    BaseNDecoder(BaseNDecoder),
    /// Deflate encoder.
    ZlibEncoder(ZlibEncoder),
    /// Inflate decoder.
    ZlibDecoder(ZlibDecoder),
    /// Decoder into internal code points.
    UnicodeDecoder(UnicodeDecoder),
    /// Encoder from internal code points.
    UnicodeEncoder(UnicodeEncoder),
}

macro_rules! dispatch {
    ($self:expr, $inner:ident => $call:expr) => {
        match $self {
            AnyTransformer::BaseNEncoder($inner) => $call,
            AnyTransformer::BaseNDecoder($inner) => $call,
            AnyTransformer::ZlibEncoder($inner) => $call,
            AnyTransformer::ZlibDecoder($inner) => $call,
            AnyTransformer::UnicodeDecoder($inner) => $call,
            AnyTransformer::UnicodeEncoder($inner) => $call,
        }
    };
}

impl Transformer for AnyTransformer {
    fn mode(&self) -> TransformMode {
        dispatch!(self, inner => inner.mode())
    }

    fn suggest_buffer_sizes(&self, sizes: &mut BufferSizes) {
        dispatch!(self, inner => inner.suggest_buffer_sizes(sizes));
    }

    fn open(&mut self, sizes: BufferSizes) -> Result<()> {
        dispatch!(self, inner => inner.open(sizes))
    }

    fn transform(&mut self, request: TransformRequest<'_>) -> Result<Progress> {
        dispatch!(self, inner => inner.transform(request))
    }

    fn close(&mut self) {
        dispatch!(self, inner => inner.close());
    }

    fn reset(&mut self) -> Result<()> {
        dispatch!(self, inner => inner.reset())
    }

    fn is_open(&self) -> bool {
        dispatch!(self, inner => inner.is_open())
    }
}

impl From<BaseNEncoder> for AnyTransformer {
    fn from(inner: BaseNEncoder) -> Self {
        Self::BaseNEncoder(inner)
    }
}

impl From<BaseNDecoder> for AnyTransformer {
    fn from(inner: BaseNDecoder) -> Self {
        Self::BaseNDecoder(inner)
    }
}

impl From<ZlibEncoder> for AnyTransformer {
    fn from(inner: ZlibEncoder) -> Self {
        Self::ZlibEncoder(inner)
    }
}

impl From<ZlibDecoder> for AnyTransformer {
    fn from(inner: ZlibDecoder) -> Self {
        Self::ZlibDecoder(inner)
    }
}

impl From<UnicodeDecoder> for AnyTransformer {
    fn from(inner: UnicodeDecoder) -> Self {
        Self::UnicodeDecoder(inner)
    }
}

impl From<UnicodeEncoder> for AnyTransformer {
    fn from(inner: UnicodeEncoder) -> Self {
        Self::UnicodeEncoder(inner)
    }
}

//! Encoding and line-ending tags.

use std::fmt;
use std::str::FromStr;

use transform::unicode::{ByteOrder, Charset};

use crate::TextError;

/// Encoding of a text stream.
///
/// [`Unknown`](Self::Unknown) asks the reader to rely on byte-order-mark
/// detection and falls back to UTF-8; writers treat it as UTF-8.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum TextEncoding {
    /// 7-bit US-ASCII.
    Ascii,
    /// ISO-8859-1.
    Latin1,
    /// UTF-8.
    Utf8,
    /// UTF-16, little endian.
    Utf16Le,
    /// UTF-16, big endian.
    Utf16Be,
    /// Not decided yet.
    #[default]
    Unknown,
}

impl TextEncoding {
    /// Every encoding with a concrete byte form.
    pub const CONCRETE: [Self; 5] = [
        Self::Ascii,
        Self::Latin1,
        Self::Utf8,
        Self::Utf16Le,
        Self::Utf16Be,
    ];

    /// Canonical label, accepted back by [`FromStr`].
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ascii => "us-ascii",
            Self::Latin1 => "iso-8859-1",
            Self::Utf8 => "utf-8",
            Self::Utf16Le => "utf-16le",
            Self::Utf16Be => "utf-16be",
            Self::Unknown => "unknown",
        }
    }

    /// The transcoder charset, with [`Unknown`](Self::Unknown) resolved to
    /// UTF-8.
    #[must_use]
    pub const fn charset(self) -> Charset {
        match self {
            Self::Ascii => Charset::Ascii,
            Self::Latin1 => Charset::Latin1,
            Self::Utf8 | Self::Unknown => Charset::Utf8,
            Self::Utf16Le => Charset::Utf16(ByteOrder::Little),
            Self::Utf16Be => Charset::Utf16(ByteOrder::Big),
        }
    }

    /// Returns the encoding itself, or UTF-8 for [`Unknown`](Self::Unknown).
    #[must_use]
    pub const fn resolved(self) -> Self {
        match self {
            Self::Unknown => Self::Utf8,
            other => other,
        }
    }

    /// Whether a leading byte-order mark is looked for when reading. Single
    /// byte charsets take every byte as text.
    #[must_use]
    pub const fn sniffs_byte_order_mark(self) -> bool {
        !matches!(self, Self::Ascii | Self::Latin1)
    }

    /// Matches a byte-order mark at the start of `prefix`.
    ///
    /// Returns the encoding and the length of the mark.
    #[must_use]
    pub fn detect(prefix: &[u8]) -> Option<(Self, usize)> {
        [Self::Utf8, Self::Utf16Be, Self::Utf16Le]
            .into_iter()
            .map(|encoding| (encoding, encoding.charset().byte_order_mark()))
            .find(|(_, mark)| prefix.starts_with(mark))
            .map(|(encoding, mark)| (encoding, mark.len()))
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for TextEncoding {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ascii" | "us-ascii" => Ok(Self::Ascii),
            "latin1" | "latin-1" | "iso-8859-1" => Ok(Self::Latin1),
            "utf8" | "utf-8" => Ok(Self::Utf8),
            "utf16le" | "utf-16le" => Ok(Self::Utf16Le),
            "utf16be" | "utf-16be" => Ok(Self::Utf16Be),
            "unknown" | "auto" => Ok(Self::Unknown),
            _ => Err(TextError::UnknownEncoding(s.to_owned())),
        }
    }
}

/// Line terminator convention.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum LineFormat {
    /// `CR`.
    Cr,
    /// `LF`.
    Lf,
    /// `CR LF`.
    CrLf,
    /// The host convention.
    SystemDefault,
    /// Not decided yet; readers detect it, writers use the host convention.
    #[default]
    Unknown,
}

impl LineFormat {
    /// Canonical label, accepted back by [`FromStr`].
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Cr => "cr",
            Self::Lf => "lf",
            Self::CrLf => "crlf",
            Self::SystemDefault => "system",
            Self::Unknown => "unknown",
        }
    }

    /// Terminator written for this format.
    #[must_use]
    pub const fn sequence(self) -> &'static str {
        match self {
            Self::Cr => "\r",
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::SystemDefault | Self::Unknown => {
                if cfg!(windows) {
                    "\r\n"
                } else {
                    "\n"
                }
            }
        }
    }
}

impl fmt::Display for LineFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for LineFormat {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cr" | "mac" => Ok(Self::Cr),
            "lf" | "unix" => Ok(Self::Lf),
            "crlf" | "dos" => Ok(Self::CrLf),
            "system" | "native" => Ok(Self::SystemDefault),
            "unknown" | "auto" => Ok(Self::Unknown),
            _ => Err(TextError::UnknownLineFormat(s.to_owned())),
        }
    }
}

/// Encoding and line format of one stream.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct TextFormat {
    /// Byte encoding.
    pub encoding: TextEncoding,
    /// Line terminator convention.
    pub line_format: LineFormat,
}

impl TextFormat {
    /// Creates a format from its two tags.
    #[must_use]
    pub const fn new(encoding: TextEncoding, line_format: LineFormat) -> Self {
        Self {
            encoding,
            line_format,
        }
    }
}

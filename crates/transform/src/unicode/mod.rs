//! Unicode transcoders between external byte encodings and the internal
//! 32-bit code point form.
//!
//! The internal form is a sequence of native-endian `u32` values, four bytes
//! per code point. [`UnicodeDecoder`] turns encoded bytes into that form,
//! [`UnicodeEncoder`] turns it back into encoded bytes.
//!
//! Byte order for UTF-16 is fixed at construction; sniffing a byte-order
//! mark is the job of the text layer, not of these transformers.

mod decoder;
mod encoder;
mod single_byte;
mod utf16;
mod utf8;

pub use decoder::UnicodeDecoder;
pub use encoder::UnicodeEncoder;

/// Size in bytes of one code point in the internal form.
pub const CODE_POINT_SIZE: usize = 4;

/// The Unicode replacement character.
pub const REPLACEMENT_CHARACTER: char = char::REPLACEMENT_CHARACTER;

/// Byte order of a UTF-16 stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

/// What a decoder does with input that violates its encoding.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum MalformedPolicy {
    /// Fail the transform with
    /// [`TransformError::IllegalSequence`](crate::TransformError::IllegalSequence)
    /// or [`TransformError::Truncated`](crate::TransformError::Truncated).
    #[default]
    Fail,
    /// Emit U+FFFD in place of the offending bytes and continue.
    Replace,
}

/// Concrete byte encodings handled by the transcoders.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Charset {
    /// 7-bit US-ASCII.
    Ascii,
    /// ISO-8859-1; every byte maps to the code point of the same value.
    Latin1,
    /// UTF-8.
    Utf8,
    /// UTF-16 in the given byte order.
    Utf16(ByteOrder),
}

impl Charset {
    /// Name used in diagnostics.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ascii => "US-ASCII",
            Self::Latin1 => "ISO-8859-1",
            Self::Utf8 => "UTF-8",
            Self::Utf16(ByteOrder::Little) => "UTF-16LE",
            Self::Utf16(ByteOrder::Big) => "UTF-16BE",
        }
    }

    /// Longest encoding of a single code point, in bytes.
    #[must_use]
    pub const fn max_char_len(self) -> usize {
        match self {
            Self::Ascii | Self::Latin1 => 1,
            Self::Utf8 | Self::Utf16(_) => 4,
        }
    }

    /// The byte-order mark of this encoding, empty when it has none.
    #[must_use]
    pub const fn byte_order_mark(self) -> &'static [u8] {
        match self {
            Self::Ascii | Self::Latin1 => &[],
            Self::Utf8 => &[0xEF, 0xBB, 0xBF],
            Self::Utf16(ByteOrder::Little) => &[0xFF, 0xFE],
            Self::Utf16(ByteOrder::Big) => &[0xFE, 0xFF],
        }
    }

    fn decode(self, bytes: &[u8]) -> Decoded {
        match self {
            Self::Ascii => single_byte::decode_ascii(bytes),
            Self::Latin1 => single_byte::decode_latin1(bytes),
            Self::Utf8 => utf8::decode(bytes),
            Self::Utf16(order) => utf16::decode(bytes, order),
        }
    }

    fn encode(self, c: char, out: &mut [u8; 4]) -> usize {
        match self {
            Self::Ascii => single_byte::encode_ascii(c, out),
            Self::Latin1 => single_byte::encode_latin1(c, out),
            Self::Utf8 => c.encode_utf8(out).len(),
            Self::Utf16(order) => utf16::encode(c, order, out),
        }
    }
}

/// Outcome of decoding the character at the start of a byte slice.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum Decoded {
    /// A complete character of `len` bytes.
    Char { code_point: u32, len: usize },
    /// The slice ends inside a character; retry with more bytes.
    Incomplete,
    /// The first `len` bytes cannot start a valid character.
    Illegal { len: usize },
}

/// Converts a character into its internal four-byte form.
#[must_use]
pub fn to_internal(c: char) -> [u8; CODE_POINT_SIZE] {
    u32::from(c).to_ne_bytes()
}

/// Reads a code point from its internal four-byte form.
#[must_use]
pub fn from_internal(bytes: [u8; CODE_POINT_SIZE]) -> u32 {
    u32::from_ne_bytes(bytes)
}

/// Converts a string into the internal form.
#[must_use]
pub fn str_to_internal(text: &str) -> Vec<u8> {
    text.chars().flat_map(to_internal).collect()
}

/// Converts internal-form bytes back into a string.
///
/// Invalid code points become U+FFFD; a trailing partial unit is ignored.
#[must_use]
pub fn internal_to_string(bytes: &[u8]) -> String {
    bytes
        .chunks_exact(CODE_POINT_SIZE)
        .map(|unit| {
            let code_point = from_internal([unit[0], unit[1], unit[2], unit[3]]);
            char::from_u32(code_point).unwrap_or(REPLACEMENT_CHARACTER)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_form_round_trip() {
        let text = "a\u{e9}\u{20ac}\u{1f600}";
        let internal = str_to_internal(text);
        assert_eq!(internal.len(), 4 * CODE_POINT_SIZE);
        assert_eq!(internal_to_string(&internal), text);
    }

    #[test]
    fn byte_order_marks() {
        assert_eq!(Charset::Utf8.byte_order_mark(), b"\xEF\xBB\xBF");
        assert_eq!(Charset::Utf16(ByteOrder::Little).byte_order_mark(), b"\xFF\xFE");
        assert_eq!(Charset::Utf16(ByteOrder::Big).byte_order_mark(), b"\xFE\xFF");
        assert!(Charset::Latin1.byte_order_mark().is_empty());
        assert!(Charset::Ascii.byte_order_mark().is_empty());
    }
}

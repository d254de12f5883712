//! ASCII and ISO-8859-1. Neither can represent U+FFFD, so unrepresentable
//! characters are written as `?`.

use super::Decoded;

const SUBSTITUTE: u8 = b'?';

pub(super) fn decode_ascii(bytes: &[u8]) -> Decoded {
    match bytes.first() {
        None => Decoded::Incomplete,
        Some(&byte) if byte.is_ascii() => Decoded::Char {
            code_point: u32::from(byte),
            len: 1,
        },
        Some(_) => Decoded::Illegal { len: 1 },
    }
}

pub(super) fn decode_latin1(bytes: &[u8]) -> Decoded {
    match bytes.first() {
        None => Decoded::Incomplete,
        Some(&byte) => Decoded::Char {
            code_point: u32::from(byte),
            len: 1,
        },
    }
}

pub(super) fn encode_ascii(c: char, out: &mut [u8; 4]) -> usize {
    out[0] = if c.is_ascii() { c as u8 } else { SUBSTITUTE };
    1
}

pub(super) fn encode_latin1(c: char, out: &mut [u8; 4]) -> usize {
    out[0] = u8::try_from(u32::from(c)).unwrap_or(SUBSTITUTE);
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latin1_covers_all_bytes() {
        assert_eq!(
            decode_latin1(&[0xE9]),
            Decoded::Char {
                code_point: 0xE9,
                len: 1
            }
        );
        let mut out = [0u8; 4];
        encode_latin1('\u{e9}', &mut out);
        assert_eq!(out[0], 0xE9);
        encode_latin1('\u{20ac}', &mut out);
        assert_eq!(out[0], b'?');
    }

    #[test]
    fn ascii_rejects_high_bytes() {
        assert_eq!(decode_ascii(&[0x80]), Decoded::Illegal { len: 1 });
        let mut out = [0u8; 4];
        encode_ascii('\u{e9}', &mut out);
        assert_eq!(out[0], b'?');
    }
}

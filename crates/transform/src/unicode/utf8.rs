use super::Decoded;

/// Decodes one UTF-8 character from the start of `bytes`.
///
/// Overlong forms, surrogate code points and values above U+10FFFF are
/// rejected at the second byte, so an illegal run never extends past the
/// maximal valid prefix. `Incomplete` is only returned for a valid prefix.
pub(super) fn decode(bytes: &[u8]) -> Decoded {
    let Some(&lead) = bytes.first() else {
        return Decoded::Incomplete;
    };

    let (len, bits) = match lead {
        0x00..=0x7F => {
            return Decoded::Char {
                code_point: u32::from(lead),
                len: 1,
            };
        }
        0xC2..=0xDF => (2, lead & 0x1F),
        0xE0..=0xEF => (3, lead & 0x0F),
        0xF0..=0xF4 => (4, lead & 0x07),
        _ => return Decoded::Illegal { len: 1 },
    };
    let second = match lead {
        0xE0 => 0xA0..=0xBF,
        0xED => 0x80..=0x9F,
        0xF0 => 0x90..=0xBF,
        0xF4 => 0x80..=0x8F,
        _ => 0x80..=0xBF,
    };

    let mut code_point = u32::from(bits);
    for index in 1..len {
        let Some(&byte) = bytes.get(index) else {
            return Decoded::Incomplete;
        };
        let valid = if index == 1 {
            second.contains(&byte)
        } else {
            byte & 0xC0 == 0x80
        };
        if !valid {
            return Decoded::Illegal { len: index };
        }
        code_point = (code_point << 6) | u32::from(byte & 0x3F);
    }

    Decoded::Char { code_point, len }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_each_length_class() {
        for c in ['A', '\u{e9}', '\u{20ac}', '\u{1f600}'] {
            let mut buf = [0u8; 4];
            let encoded = c.encode_utf8(&mut buf);
            assert_eq!(
                decode(encoded.as_bytes()),
                Decoded::Char {
                    code_point: u32::from(c),
                    len: encoded.len()
                }
            );
        }
    }

    #[test]
    fn partial_sequence_is_incomplete() {
        assert_eq!(decode(&[0xE2, 0x82]), Decoded::Incomplete);
        assert_eq!(decode(&[0xF0]), Decoded::Incomplete);
        assert_eq!(decode(&[]), Decoded::Incomplete);
    }

    #[test]
    fn rejects_malformed_sequences() {
        // stray continuation byte
        assert_eq!(decode(&[0x80]), Decoded::Illegal { len: 1 });
        // overlong '/'
        assert_eq!(decode(&[0xC0, 0xAF]), Decoded::Illegal { len: 1 });
        assert_eq!(decode(&[0xE0, 0x80, 0xAF]), Decoded::Illegal { len: 1 });
        // encoded surrogate
        assert_eq!(decode(&[0xED, 0xA0, 0x80]), Decoded::Illegal { len: 1 });
        // above U+10FFFF
        assert_eq!(decode(&[0xF4, 0x90, 0x80, 0x80]), Decoded::Illegal { len: 1 });
        // continuation replaced by ASCII
        assert_eq!(decode(&[0xE2, 0x41, 0x41]), Decoded::Illegal { len: 1 });
        assert_eq!(decode(&[0xE2, 0x82, 0x41]), Decoded::Illegal { len: 2 });
    }

    #[test]
    fn out_of_range_second_byte_is_illegal_even_when_short() {
        assert_eq!(decode(&[0xE0, 0x80]), Decoded::Illegal { len: 1 });
        assert_eq!(decode(&[0xED, 0xA0]), Decoded::Illegal { len: 1 });
        assert_eq!(decode(&[0xF0, 0x8F]), Decoded::Illegal { len: 1 });
        assert_eq!(decode(&[0xF4, 0x90]), Decoded::Illegal { len: 1 });
        assert_eq!(decode(&[0xF0, 0x90, 0x80]), Decoded::Incomplete);
        assert_eq!(decode(&[0xED, 0x9F]), Decoded::Incomplete);
    }
}

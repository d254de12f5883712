use super::{ByteOrder, Decoded};

fn read_unit(bytes: [u8; 2], order: ByteOrder) -> u16 {
    match order {
        ByteOrder::Little => u16::from_le_bytes(bytes),
        ByteOrder::Big => u16::from_be_bytes(bytes),
    }
}

fn write_unit(unit: u16, order: ByteOrder) -> [u8; 2] {
    match order {
        ByteOrder::Little => unit.to_le_bytes(),
        ByteOrder::Big => unit.to_be_bytes(),
    }
}

/// Decodes one UTF-16 code unit or surrogate pair from the start of `bytes`.
pub(super) fn decode(bytes: &[u8], order: ByteOrder) -> Decoded {
    if bytes.len() < 2 {
        return Decoded::Incomplete;
    }

    let unit = read_unit([bytes[0], bytes[1]], order);
    match unit {
        0xD800..=0xDBFF => {
            if bytes.len() < 4 {
                return Decoded::Incomplete;
            }
            let low = read_unit([bytes[2], bytes[3]], order);
            if (0xDC00..=0xDFFF).contains(&low) {
                let high_bits = u32::from(unit - 0xD800) << 10;
                let low_bits = u32::from(low - 0xDC00);
                Decoded::Char {
                    code_point: 0x1_0000 + (high_bits | low_bits),
                    len: 4,
                }
            } else {
                Decoded::Illegal { len: 2 }
            }
        }
        0xDC00..=0xDFFF => Decoded::Illegal { len: 2 },
        _ => Decoded::Char {
            code_point: u32::from(unit),
            len: 2,
        },
    }
}

/// Encodes `c` as one or two UTF-16 code units; returns the byte count.
pub(super) fn encode(c: char, order: ByteOrder, out: &mut [u8; 4]) -> usize {
    let mut units = [0u16; 2];
    let units = c.encode_utf16(&mut units);
    for (index, unit) in units.iter().enumerate() {
        out[index * 2..index * 2 + 2].copy_from_slice(&write_unit(*unit, order));
    }
    units.len() * 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn surrogate_pair_round_trip() {
        let mut out = [0u8; 4];
        let len = encode('\u{1f600}', ByteOrder::Big, &mut out);
        assert_eq!(len, 4);
        assert_eq!(out, [0xD8, 0x3D, 0xDE, 0x00]);
        assert_eq!(
            decode(&out, ByteOrder::Big),
            Decoded::Char {
                code_point: 0x1F600,
                len: 4
            }
        );
    }

    #[test]
    fn byte_order_is_respected() {
        let mut out = [0u8; 4];
        assert_eq!(encode('A', ByteOrder::Little, &mut out), 2);
        assert_eq!(&out[..2], &[0x41, 0x00]);
        assert_eq!(encode('A', ByteOrder::Big, &mut out), 2);
        assert_eq!(&out[..2], &[0x00, 0x41]);
    }

    #[test]
    fn lone_surrogates_are_illegal() {
        assert_eq!(
            decode(&[0x00, 0xDC], ByteOrder::Little),
            Decoded::Illegal { len: 2 }
        );
        assert_eq!(
            decode(&[0x3D, 0xD8, 0x41, 0x00], ByteOrder::Little),
            Decoded::Illegal { len: 2 }
        );
        assert_eq!(decode(&[0x3D, 0xD8], ByteOrder::Little), Decoded::Incomplete);
        assert_eq!(decode(&[0x3D], ByteOrder::Little), Decoded::Incomplete);
    }
}

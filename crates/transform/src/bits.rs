//! Bit addressing over byte blocks.
//!
//! Bit `0` is the most significant bit of byte `0`, bit `8` the most
//! significant bit of byte `1`, and so on. Base-N packing reads and writes
//! `bits_per_char`-wide windows through these helpers so the layout never
//! depends on host endianness.

/// Returns the bit at `index`.
#[inline]
pub(crate) fn get_bit(bytes: &[u8], index: usize) -> bool {
    bytes[index / 8] & (0x80 >> (index % 8)) != 0
}

/// Sets or clears the bit at `index`.
#[inline]
pub(crate) fn set_bit(bytes: &mut [u8], index: usize, value: bool) {
    let mask = 0x80 >> (index % 8);
    if value {
        bytes[index / 8] |= mask;
    } else {
        bytes[index / 8] &= !mask;
    }
}

/// Reads `width` bits starting at `start` as an unsigned value, first bit
/// most significant.
#[inline]
pub(crate) fn read_bits(bytes: &[u8], start: usize, width: usize) -> usize {
    (start..start + width).fold(0, |value, index| {
        (value << 1) | usize::from(get_bit(bytes, index))
    })
}

/// Writes the low `width` bits of `value` starting at `start`, most
/// significant bit first.
#[inline]
pub(crate) fn write_bits(bytes: &mut [u8], start: usize, width: usize, value: usize) {
    for offset in 0..width {
        let bit = (value >> (width - 1 - offset)) & 1 == 1;
        set_bit(bytes, start + offset, bit);
    }
}

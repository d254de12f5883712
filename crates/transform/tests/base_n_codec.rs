//! Integration tests for the Base16/32/64 transformers.
//!
//! Covers round trips at block boundaries, padding shape, case handling,
//! agreement with the `base64` crate, and independence from how input and
//! output are chunked.

use base64::Engine as _;
use base64::engine::general_purpose::{STANDARD, STANDARD_NO_PAD};
use proptest::prelude::*;
use transform::base_n::{BaseNDecoder, BaseNEncoder, Radix};
use transform::{
    BufferSizes, TransformError, TransformRequest, Transformer, negotiate_and_open,
    transform_to_vec,
};

const RADICES: [Radix; 3] = [Radix::Base16, Radix::Base32, Radix::Base64];

fn encode(radix: Radix, input: &[u8]) -> Vec<u8> {
    let mut encoder = BaseNEncoder::new(radix);
    negotiate_and_open(&mut encoder, BufferSizes::default()).unwrap();
    transform_to_vec(&mut encoder, input, 64).unwrap()
}

fn decode(radix: Radix, input: &[u8]) -> Result<Vec<u8>, TransformError> {
    let mut decoder = BaseNDecoder::new(radix);
    negotiate_and_open(&mut decoder, BufferSizes::default())?;
    transform_to_vec(&mut decoder, input, 64)
}

/// Feeds `input` in `source_chunk` pieces into a `dest_chunk` sized buffer.
fn pump<T: Transformer>(
    transformer: &mut T,
    input: &[u8],
    source_chunk: usize,
    dest_chunk: usize,
) -> Result<Vec<u8>, TransformError> {
    let mut output = Vec::new();
    let mut dest = vec![0u8; dest_chunk];
    let mut offset = 0;
    let mut stalls = 0;

    loop {
        let end = (offset + source_chunk).min(input.len());
        let flush = end == input.len();
        let progress = transformer.transform(TransformRequest {
            source: &input[offset..end],
            dest: &mut dest,
            flush,
        })?;
        offset += progress.consumed;
        output.extend_from_slice(&dest[..progress.produced]);

        if flush && offset == input.len() && progress.produced == 0 {
            return Ok(output);
        }
        if progress.is_stalled() {
            stalls += 1;
            assert!(stalls < 1_000, "transformer stalled");
        }
    }
}

// ============================================================================
// Round trips at block boundaries
// ============================================================================

#[test]
fn round_trip_at_block_boundaries() {
    for radix in RADICES {
        let block = radix.block_size();
        let mut lengths = vec![0, 1, block.saturating_sub(1), block, block + 1];
        lengths.extend([2 * block, 7 * block, 7 * block + 1, 100 * block + 2]);

        for len in lengths {
            let input = test_support::payload(len, len as u64);
            let encoded = encode(radix, &input);
            assert_eq!(decode(radix, &encoded).unwrap(), input, "{radix:?} len {len}");
        }
    }
}

#[test]
fn empty_input_produces_empty_output() {
    for radix in RADICES {
        assert!(encode(radix, b"").is_empty());
        assert!(decode(radix, b"").unwrap().is_empty());
    }
}

// ============================================================================
// Padding shape
// ============================================================================

#[test]
fn padding_shape_depends_only_on_remainder() {
    for radix in RADICES {
        let block = radix.block_size();
        for len in 0..4 * block + 1 {
            let encoded = encode(radix, &vec![0xA5; len]);
            assert_eq!(encoded.len(), radix.encoded_len(len));
            assert_eq!(encoded.len() % radix.chars_per_block(), 0);

            let padding = encoded.iter().filter(|&&c| c == radix.padding()).count();
            let first_pad = encoded.iter().position(|&c| c == radix.padding());
            if len % block == 0 {
                assert_eq!(padding, 0, "{radix:?} len {len}");
            } else {
                let tail_start = encoded.len() - radix.chars_per_block();
                assert!(first_pad.unwrap_or(encoded.len()) >= tail_start);
                let data_chars = ((len % block) * 8).div_ceil(radix.bits_per_char());
                assert_eq!(padding, radix.chars_per_block() - data_chars);
            }
        }
    }
}

#[test]
fn rfc4648_base32_and_base16_vectors() {
    let cases: [(&[u8], &[u8], &[u8]); 4] = [
        (b"f", b"MY======", b"66"),
        (b"fo", b"MZXQ====", b"666F"),
        (b"foob", b"MZXW6YQ=", b"666F6F62"),
        (b"foobar", b"MZXW6YTBOI======", b"666F6F626172"),
    ];
    for (plain, base32, base16) in cases {
        assert_eq!(encode(Radix::Base32, plain), base32);
        assert_eq!(encode(Radix::Base16, plain), base16);
        assert_eq!(decode(Radix::Base32, base32).unwrap(), plain);
        assert_eq!(decode(Radix::Base16, base16).unwrap(), plain);
    }
}

// ============================================================================
// Case handling
// ============================================================================

#[test]
fn base16_and_base32_fold_case() {
    let input = b"Mixed Case Payload";
    for radix in [Radix::Base16, Radix::Base32] {
        let canonical = encode(radix, input);
        let lower = canonical.to_ascii_lowercase();
        let mixed: Vec<u8> = canonical
            .iter()
            .enumerate()
            .map(|(i, c)| if i % 2 == 0 { c.to_ascii_lowercase() } else { *c })
            .collect();
        assert_eq!(decode(radix, &lower).unwrap(), input);
        assert_eq!(decode(radix, &mixed).unwrap(), input);
    }
}

#[test]
fn base64_is_case_sensitive() {
    let upper = decode(Radix::Base64, b"QUJD").unwrap();
    let lower = decode(Radix::Base64, b"qujd").unwrap();
    assert_eq!(upper, b"ABC");
    assert_ne!(upper, lower);
}

#[test]
fn characters_outside_alphabet_are_rejected() {
    let err = decode(Radix::Base32, b"MY1=====").unwrap_err();
    assert_eq!(
        err,
        TransformError::InvalidCharacter {
            alphabet: "base32",
            byte: b'1'
        }
    );
    assert!(err.is_malformed_input());

    let err = decode(Radix::Base16, b"6G").unwrap_err();
    assert!(matches!(err, TransformError::InvalidCharacter { byte: b'G', .. }));
}

#[test]
fn decoder_is_usable_after_reset() {
    let mut decoder = BaseNDecoder::new(Radix::Base64);
    negotiate_and_open(&mut decoder, BufferSizes::default()).unwrap();
    assert!(transform_to_vec(&mut decoder, b"QU*D", 16).is_err());
    decoder.reset().unwrap();
    assert_eq!(transform_to_vec(&mut decoder, b"QUJD", 16).unwrap(), b"ABC");
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    #[test]
    fn base64_matches_reference(data in prop::collection::vec(any::<u8>(), 0..512)) {
        let encoded = encode(Radix::Base64, &data);
        prop_assert_eq!(encoded, STANDARD.encode(&data).into_bytes());
    }

    #[test]
    fn base64_decodes_unpadded_reference(data in prop::collection::vec(any::<u8>(), 0..256)) {
        let unpadded = STANDARD_NO_PAD.encode(&data);
        prop_assert_eq!(decode(Radix::Base64, unpadded.as_bytes()).unwrap(), data);
    }

    #[test]
    fn round_trip_is_chunking_independent(
        data in prop::collection::vec(any::<u8>(), 0..600),
        radix_index in 0usize..3,
        source_chunk in 1usize..40,
        dest_chunk in 1usize..40,
    ) {
        let radix = RADICES[radix_index];
        let mut encoder = BaseNEncoder::new(radix);
        negotiate_and_open(&mut encoder, BufferSizes::new(1, 1)).unwrap();
        let encoded = pump(&mut encoder, &data, source_chunk, dest_chunk).unwrap();
        prop_assert_eq!(&encoded, &encode(radix, &data));

        let mut decoder = BaseNDecoder::new(radix);
        negotiate_and_open(&mut decoder, BufferSizes::new(1, 1)).unwrap();
        let decoded = pump(&mut decoder, &encoded, dest_chunk, source_chunk).unwrap();
        prop_assert_eq!(decoded, data);
    }
}

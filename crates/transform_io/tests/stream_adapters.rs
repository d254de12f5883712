//! Integration tests for the stream adapters.
//!
//! The reader is driven by sources that return data in short and
//! interrupted reads; the writer is fed in arbitrary slices. Output must not
//! depend on either.

use std::io::{self, Read, Write};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use proptest::prelude::*;
use test_support::{ChunkedReader, FlushCountingWriter};
use transform::base_n::{BaseNDecoder, BaseNEncoder, Radix};
use transform::zlib::{CompressionLevel, ZlibDecoder, ZlibEncoder};
use transform::{BufferSizes, TransformError, TransformKind, TransformMode};
use transform_io::{TransformReader, TransformWriter};

fn deflate(input: &[u8]) -> Vec<u8> {
    let mut writer =
        TransformWriter::new(ZlibEncoder::new(CompressionLevel::DEFAULT), Vec::new()).unwrap();
    writer.write_all(input).unwrap();
    writer.finish().unwrap();
    writer.into_parts().1
}

fn read_all<R: Read>(mut reader: R) -> io::Result<Vec<u8>> {
    let mut out = Vec::new();
    reader.read_to_end(&mut out)?;
    Ok(out)
}

// ============================================================================
// Reader short-read resilience
// ============================================================================

#[test]
fn short_reads_match_single_shot_inflate() {
    let input = test_support::text_payload(300 * 1024).into_bytes();
    let packed = deflate(&input);

    let single = read_all(TransformReader::new(ZlibDecoder::new(), &packed[..]).unwrap()).unwrap();
    assert_eq!(single, input);

    for chunk in [1, 3, 512, 4095] {
        let source = ChunkedReader::new(&packed[..], chunk).interrupting_every(5);
        let reader = TransformReader::new(ZlibDecoder::new(), source).unwrap();
        assert_eq!(read_all(reader).unwrap(), single, "chunk {chunk}");
    }
}

#[test]
fn writer_output_inflates_with_flate2() {
    let input = test_support::text_payload(64 * 1024).into_bytes();
    let packed = deflate(&input);

    let mut inflated = Vec::new();
    flate2::read::ZlibDecoder::new(&packed[..])
        .read_to_end(&mut inflated)
        .unwrap();
    assert_eq!(inflated, input);
}

#[test]
fn reader_inflates_flate2_output_byte_by_byte() {
    let input = test_support::payload(20_000, 3);
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::best());
    encoder.write_all(&input).unwrap();
    let packed = encoder.finish().unwrap();

    let reader = TransformReader::new(ZlibDecoder::new(), &packed[..]).unwrap();
    let inflated: Vec<u8> = reader.bytes().collect::<io::Result<_>>().unwrap();
    assert_eq!(inflated, input);
}

#[test]
fn small_negotiated_buffers_still_stream() {
    let encoded = STANDARD.encode(test_support::payload(5_000, 9));
    let reader = TransformReader::with_buffer_sizes(
        BaseNDecoder::new(Radix::Base64),
        ChunkedReader::new(encoded.as_bytes(), 3),
        BufferSizes::new(1, 1),
    )
    .unwrap();
    assert_eq!(reader.buffer_sizes(), BufferSizes::new(4, 3));
    assert_eq!(read_all(reader).unwrap(), test_support::payload(5_000, 9));
}

#[test]
fn malformed_input_surfaces_as_invalid_data() {
    let reader = TransformReader::new(BaseNDecoder::new(Radix::Base64), &b"QU!D"[..]).unwrap();
    let err = read_all(reader).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    let inner = err
        .get_ref()
        .and_then(|inner| inner.downcast_ref::<TransformError>())
        .unwrap();
    assert_eq!(
        inner,
        &TransformError::InvalidCharacter {
            alphabet: "base64",
            byte: b'!'
        }
    );
}

#[test]
fn truncated_compressed_stream_is_an_error() {
    let packed = deflate(&test_support::payload(50_000, 1));
    let reader = TransformReader::new(ZlibDecoder::new(), &packed[..packed.len() - 10]).unwrap();
    let err = read_all(reader).unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::InvalidData);
}

// ============================================================================
// Writer
// ============================================================================

#[test]
fn finish_flushes_target_once_after_all_output() {
    let mut writer =
        TransformWriter::new(BaseNEncoder::new(Radix::Base32), FlushCountingWriter::new())
            .unwrap();
    writer.write_all(b"foobar").unwrap();
    writer.flush().unwrap();
    assert_eq!(writer.get_ref().flushes, 1);
    assert_eq!(writer.get_ref().data, b"MZXW6YTB");

    writer.finish().unwrap();
    let target = writer.get_ref();
    assert_eq!(target.data, b"MZXW6YTBOI======");
    assert_eq!(target.flushes, 2);
    assert_eq!(target.flushed_at, vec![8, 16]);
}

#[test]
fn writer_accepts_any_registry_kind() {
    for kind in TransformKind::ALL {
        let mut encoder =
            TransformWriter::new(kind.create(TransformMode::Encode), Vec::new()).unwrap();
        encoder.write_all(b"registry payload").unwrap();
        encoder.finish().unwrap();
        let (_, encoded) = encoder.into_parts();

        let decoder = TransformReader::new(kind.create(TransformMode::Decode), &encoded[..]).unwrap();
        assert_eq!(read_all(decoder).unwrap(), b"registry payload", "{kind}");
    }
}

#[test]
fn writer_borrows_caller_stream() {
    let mut sink = Vec::new();
    {
        let mut writer = TransformWriter::new(BaseNEncoder::new(Radix::Base16), &mut sink).unwrap();
        writer.write_all(&[0xDE, 0xAD]).unwrap();
        writer.finish().unwrap();
    }
    assert_eq!(sink, b"DEAD");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn chunked_pipeline_is_lossless(
        data in prop::collection::vec(any::<u8>(), 0..8192),
        write_chunk in 1usize..700,
        read_chunk in 1usize..700,
    ) {
        let mut writer =
            TransformWriter::new(ZlibEncoder::new(CompressionLevel::BEST), Vec::new()).unwrap();
        for piece in data.chunks(write_chunk) {
            writer.write_all(piece).unwrap();
        }
        writer.finish().unwrap();
        let (_, packed) = writer.into_parts();

        let source = ChunkedReader::new(&packed[..], read_chunk);
        let reader = TransformReader::new(ZlibDecoder::new(), source).unwrap();
        prop_assert_eq!(read_all(reader).unwrap(), data);
    }
}

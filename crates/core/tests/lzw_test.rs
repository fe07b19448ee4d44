//! LZW decoding through the codec module and the default decompressor.

use pdfcarve_core::codec::lzwdecode_with_earlychange;
use pdfcarve_core::{CompressMethod, Decompressor, FilterDecoder};

fn sample() -> Vec<u8> {
    hex::decode("800b6050220c0c8501").unwrap()
}

#[test]
fn test_lzwdecode() {
    let expected = hex::decode("2d2d2d2d2d412d2d2d42").unwrap();
    assert_eq!(lzwdecode_with_earlychange(&sample(), 1).unwrap(), expected);
}

#[test]
fn test_filter_decoder_uses_early_change() {
    let out = FilterDecoder::new()
        .decompress(CompressMethod::LzwPdf, &sample())
        .unwrap();
    assert_eq!(out, b"-----A---B");
}

#[test]
fn test_truncated_input_keeps_prefix() {
    let data = sample();
    let out = lzwdecode_with_earlychange(&data[..5], 1).unwrap();
    assert!(!out.is_empty());
    assert!(b"-----A---B".starts_with(&out));
}

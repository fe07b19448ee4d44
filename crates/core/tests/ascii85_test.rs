//! ASCII85 decoding, including the PDF `<~ ~>` framing quirks.

use pdfcarve_core::codec::ascii85decode;
use pdfcarve_core::{CompressMethod, DecompressError};

#[test]
fn test_ascii85decode_wikipedia() {
    assert_eq!(
        ascii85decode(b"9jqo^BlbD-BleB1DJ+*+F(f,q").unwrap(),
        b"Man is distinguished"
    );
}

#[test]
fn test_ascii85decode_with_eod() {
    assert_eq!(ascii85decode(b"E,9)oF*2M7/c~>").unwrap(), b"pleasure.");
}

#[test]
fn test_ascii85decode_z_encoding() {
    let out = ascii85decode(b"zE,9)oF*2M7/c~>").unwrap();
    assert_eq!(hex::encode(&out[..4]), "00000000");
    assert_eq!(&out[4..], b"pleasure.");
}

#[test]
fn test_ascii85decode_no_eod() {
    assert_eq!(ascii85decode(b"E,9)oF*2M7/c").unwrap(), b"pleasure.");
}

#[test]
fn test_ascii85decode_partial_eod() {
    assert_eq!(ascii85decode(b"E,9)oF*2M7/c~").unwrap(), b"pleasure.");
}

#[test]
fn test_ascii85decode_with_prefix_and_newline() {
    assert_eq!(ascii85decode(b"<~E,9)oF*2M7/c~\n>").unwrap(), b"pleasure.");
}

#[test]
fn test_ascii85decode_whitespace_inside_groups() {
    assert_eq!(
        ascii85decode(b"<~<^BVT:K:=9<E)pd;\r\nBS_1:/aSV;ag~>").unwrap(),
        b"VARIOUS UTTER NONSENSE"
    );
}

#[test]
fn test_ascii85decode_rejects_invalid_byte() {
    let err = ascii85decode(b"E,9{oF").unwrap_err();
    assert!(matches!(
        err,
        DecompressError::Corrupt {
            method: CompressMethod::Ascii85,
            ..
        }
    ));
}

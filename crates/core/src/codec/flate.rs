//! zlib/Flate decoding via flate2.

use super::{CompressMethod, DecompressError};
use flate2::{Decompress, FlushDecompress, Status};
use std::io::Read;

/// Strict zlib decode: any stream error fails.
pub fn zlib_decode(data: &[u8]) -> Result<Vec<u8>, DecompressError> {
    let mut decoder = flate2::read::ZlibDecoder::new(data);
    let mut out = Vec::new();
    decoder
        .read_to_end(&mut out)
        .map_err(|e| DecompressError::Corrupt {
            method: CompressMethod::Zlib,
            reason: e.to_string(),
        })?;
    Ok(out)
}

/// zlib decode that keeps whatever output precedes the first error.
///
/// Streams cut short by a wrong `/Length` or damaged near the end (bad
/// Adler-32, missing final block) still yield their leading content.
pub fn zlib_decode_lenient(data: &[u8]) -> Result<Vec<u8>, DecompressError> {
    match zlib_decode(data) {
        Ok(out) => Ok(out),
        Err(err) => {
            let out = decompress_corrupted(data);
            if out.is_empty() {
                Err(err)
            } else {
                tracing::debug!(
                    input = data.len(),
                    output = out.len(),
                    "recovered partial zlib stream"
                );
                Ok(out)
            }
        }
    }
}

/// Feeds the decoder one byte at a time so output produced before an
/// error is not lost.
fn decompress_corrupted(data: &[u8]) -> Vec<u8> {
    let mut decoder = Decompress::new(true);
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut buf = [0u8; 4096];
    let mut i = 0usize;
    while i < data.len() {
        let before_out = decoder.total_out();
        let before_in = decoder.total_in();
        let res = decoder.decompress(&data[i..i + 1], &mut buf, FlushDecompress::None);
        let produced = (decoder.total_out() - before_out) as usize;
        out.extend_from_slice(&buf[..produced]);
        let consumed = (decoder.total_in() - before_in) as usize;
        i += consumed.max(1);
        match res {
            Ok(Status::StreamEnd) | Err(_) => break,
            Ok(_) => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::ZlibEncoder;
    use std::io::Write;

    fn compress(data: &[u8]) -> Vec<u8> {
        let mut enc = ZlibEncoder::new(Vec::new(), Compression::default());
        enc.write_all(data).unwrap();
        enc.finish().unwrap()
    }

    #[test]
    fn test_round_trip() {
        let packed = compress(b"BT /F1 12 Tf (Hello) Tj ET");
        assert_eq!(zlib_decode(&packed).unwrap(), b"BT /F1 12 Tf (Hello) Tj ET");
    }

    #[test]
    fn test_truncated_stream_recovers_prefix() {
        let text = b"0123456789".repeat(50);
        let packed = compress(&text);
        let cut = &packed[..packed.len() - 4];
        let out = zlib_decode_lenient(cut).unwrap();
        assert!(!out.is_empty());
        assert!(text.starts_with(&out));
    }

    #[test]
    fn test_garbage_fails() {
        assert!(zlib_decode_lenient(b"not zlib at all").is_err());
    }
}

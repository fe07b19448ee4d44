//! LZW stream decoder using the weezl crate.

use super::{CompressMethod, DecompressError};
use weezl::{BitOrder, decode::Decoder};

/// Decode LZW-encoded data with the given EarlyChange setting.
///
/// EarlyChange=1 is the PDF default; EarlyChange=0 uses TIFF size switching.
/// Corrupt input yields the output decoded so far; only input that decodes
/// to nothing at all is an error.
pub fn lzwdecode_with_earlychange(
    data: &[u8],
    early_change: i32,
) -> Result<Vec<u8>, DecompressError> {
    let mut decoder = if early_change == 0 {
        Decoder::with_tiff_size_switch(BitOrder::Msb, 8)
    } else {
        Decoder::new(BitOrder::Msb, 8)
    };
    let mut output = Vec::new();
    let result = decoder.into_vec(&mut output).decode(data);
    match result.status {
        Ok(_) => Ok(output),
        Err(err) if output.is_empty() => Err(DecompressError::Corrupt {
            method: CompressMethod::LzwPdf,
            reason: err.to_string(),
        }),
        Err(err) => {
            tracing::debug!(error = %err, output = output.len(), "partial LZW stream");
            Ok(output)
        }
    }
}

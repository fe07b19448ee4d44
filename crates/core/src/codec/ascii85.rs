//! ASCII85 stream decoder (PDF variant).

use super::{CompressMethod, DecompressError};

/// Decode ASCII85-encoded data.
/// Handles: z-encoding, <~ ~> markers, whitespace, missing EOD.
pub fn ascii85decode(data: &[u8]) -> Result<Vec<u8>, DecompressError> {
    let data = data.strip_prefix(b"<~").unwrap_or(data);
    let data = match data.iter().position(|&b| b == b'~') {
        Some(pos) => &data[..pos],
        None => data,
    };

    let mut filtered = Vec::with_capacity(data.len());
    for &byte in data {
        match byte {
            b' ' | b'\t' | b'\n' | b'\r' | b'\x0c' | b'\x00' => {}
            b'z' if filtered.len() % 5 == 0 => filtered.extend_from_slice(b"!!!!!"),
            b'!'..=b'u' => filtered.push(byte),
            other => {
                return Err(DecompressError::Corrupt {
                    method: CompressMethod::Ascii85,
                    reason: format!("invalid byte 0x{other:02x}"),
                });
            }
        }
    }

    let mut out = Vec::with_capacity(filtered.len() / 5 * 4 + 4);
    for chunk in filtered.chunks(5) {
        if chunk.len() == 1 {
            // A lone trailing digit carries no data.
            break;
        }
        let mut padded = [b'u'; 5];
        padded[..chunk.len()].copy_from_slice(chunk);
        let value = padded
            .iter()
            .fold(0u64, |acc, &b| acc * 85 + u64::from(b - b'!'));
        let value = u32::try_from(value).map_err(|_| DecompressError::Corrupt {
            method: CompressMethod::Ascii85,
            reason: "group value exceeds 32 bits".to_string(),
        })?;
        out.extend_from_slice(&value.to_be_bytes()[..chunk.len() - 1]);
    }
    Ok(out)
}

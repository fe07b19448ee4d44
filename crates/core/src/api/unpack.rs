//! Stream unpacking.
//!
//! Decodes every Stream part through a [`Decompressor`]. A stream that
//! fails to decode is returned raw; one bad stream never stops the batch.

use crate::codec::{CompressMethod, Decompressor};
use crate::context::ScanContext;
use crate::model::{FilePart, FilePartKind};
use crate::source::Window;
use std::collections::HashSet;
use tracing::warn;

/// One extracted stream payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnpackedStream {
    /// Path-safe base name.
    pub name: String,
    pub extension: String,
    pub data: Vec<u8>,
    /// Method the payload was encoded with in the file.
    pub method: CompressMethod,
    /// False when decoding failed and `data` holds the raw bytes.
    pub decoded: bool,
    pub offset: u64,
}

impl UnpackedStream {
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.name, self.extension)
    }
}

/// Replaces characters that are unsafe in file names with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() || c.is_whitespace() => '_',
            c => c,
        })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        trimmed => trimmed.to_string(),
    }
}

/// Decodes the Stream parts among `parts`.
///
/// Names are unique within one call. A stream whose name was already taken,
/// such as an object rewritten by a later revision, gets its file offset
/// appended.
pub fn unpack_streams(
    window: Window<'_>,
    parts: &[FilePart],
    decompressor: &dyn Decompressor,
    ctx: &ScanContext<'_>,
) -> Vec<UnpackedStream> {
    let mut out = Vec::new();
    let mut taken = HashSet::new();
    for part in parts.iter().filter(|p| p.kind == FilePartKind::Stream) {
        if ctx.is_cancelled() {
            break;
        }
        let raw = window.read_bytes(part.offset, part.size);
        let method = part.compress_method();
        let extension = part
            .properties
            .extension
            .clone()
            .unwrap_or_else(|| "bin".to_string());

        let (data, extension, decoded) = if method == CompressMethod::Store {
            (raw.to_vec(), extension, true)
        } else {
            match decompressor.decompress(method, raw) {
                Ok(data) => (data, extension, true),
                Err(err) => {
                    warn!(offset = part.offset, name = %part.name, error = %err, "keeping raw stream");
                    (raw.to_vec(), method.raw_extension().to_string(), false)
                }
            }
        };
        let mut name = sanitize_file_name(&part.name);
        if !taken.insert(name.clone()) {
            name = format!("{name}_{}", part.offset);
            taken.insert(name.clone());
        }
        out.push(UnpackedStream {
            name,
            extension,
            data,
            method,
            decoded,
            offset: part.offset,
        });
        ctx.step();
    }
    out
}

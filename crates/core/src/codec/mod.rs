//! Stream decompression used by the unpack façade.
//!
//! This module contains:
//! - `flate`: zlib/Flate with a lenient fallback for damaged streams
//! - `lzw`: LZW decompression (PDF variant)
//! - `ascii85`: ASCII85 decoding
//!
//! The recovery engine only classifies streams; decoding is reached through
//! the [`Decompressor`] trait so callers can plug in their own codecs.

pub mod ascii85;
pub mod flate;
pub mod lzw;

pub use ascii85::ascii85decode;
pub use flate::{zlib_decode, zlib_decode_lenient};
pub use lzw::lzwdecode_with_earlychange;

use std::fmt;
use thiserror::Error;

/// Compression method of a stream payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CompressMethod {
    /// Stored as-is (also used for opaque image codecs such as DCT and CCITT).
    #[default]
    Store,
    Zlib,
    LzwPdf,
    Ascii85,
}

impl CompressMethod {
    /// Classifies a `/Filter` name. Returns `None` for filters the engine
    /// does not recognize.
    pub fn from_filter(name: &str) -> Option<Self> {
        match name.trim_start_matches('/') {
            "FlateDecode" | "Fl" => Some(Self::Zlib),
            "LZWDecode" | "LZW" => Some(Self::LzwPdf),
            "ASCII85Decode" | "A85" => Some(Self::Ascii85),
            "DCTDecode" | "DCT" | "CCITTFaxDecode" | "CCF" => Some(Self::Store),
            _ => None,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Store => "store",
            Self::Zlib => "zlib",
            Self::LzwPdf => "lzw-pdf",
            Self::Ascii85 => "ascii85",
        }
    }

    /// File extension for payloads still encoded with this method.
    pub const fn raw_extension(self) -> &'static str {
        match self {
            Self::Store => "bin",
            Self::Zlib => "zlib",
            Self::LzwPdf => "lzw",
            Self::Ascii85 => "a85",
        }
    }
}

impl fmt::Display for CompressMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Failure to decode one stream.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecompressError {
    #[error("{method} data is corrupt: {reason}")]
    Corrupt {
        method: CompressMethod,
        reason: String,
    },
}

/// Decompression capability consumed by the unpack façade.
pub trait Decompressor {
    fn decompress(&self, method: CompressMethod, data: &[u8]) -> Result<Vec<u8>, DecompressError>;
}

/// Default decoder backed by flate2, weezl and the built-in ASCII85 decoder.
#[derive(Debug, Clone, Copy)]
pub struct FilterDecoder {
    /// Accept truncated or checksum-damaged zlib data when it still yields output.
    pub lenient: bool,
}

impl FilterDecoder {
    pub fn new() -> Self {
        Self { lenient: true }
    }

    pub fn strict() -> Self {
        Self { lenient: false }
    }
}

impl Default for FilterDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decompressor for FilterDecoder {
    fn decompress(&self, method: CompressMethod, data: &[u8]) -> Result<Vec<u8>, DecompressError> {
        match method {
            CompressMethod::Store => Ok(data.to_vec()),
            CompressMethod::Zlib if self.lenient => zlib_decode_lenient(data),
            CompressMethod::Zlib => zlib_decode(data),
            CompressMethod::LzwPdf => lzwdecode_with_earlychange(data, 1),
            CompressMethod::Ascii85 => ascii85decode(data),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_names() {
        assert_eq!(CompressMethod::from_filter("/FlateDecode"), Some(CompressMethod::Zlib));
        assert_eq!(CompressMethod::from_filter("/LZWDecode"), Some(CompressMethod::LzwPdf));
        assert_eq!(CompressMethod::from_filter("/ASCII85Decode"), Some(CompressMethod::Ascii85));
        assert_eq!(CompressMethod::from_filter("/DCTDecode"), Some(CompressMethod::Store));
        assert_eq!(CompressMethod::from_filter("/CCITTFaxDecode"), Some(CompressMethod::Store));
        assert_eq!(CompressMethod::from_filter("/JBIG2Decode"), None);
    }

    #[test]
    fn test_store_is_identity() {
        let out = FilterDecoder::new().decompress(CompressMethod::Store, b"abc").unwrap();
        assert_eq!(out, b"abc");
    }

    #[test]
    fn test_default_is_lenient() {
        assert!(FilterDecoder::default().lenient);
        assert!(!FilterDecoder::strict().lenient);
    }
}

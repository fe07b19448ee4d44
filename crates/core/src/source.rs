//! Read-only byte source and the bounded window every scanner reads through.
//!
//! All offset arithmetic is concentrated here: reads are clamped to the file
//! length and never panic. An out-of-range read yields `None` or an empty
//! slice, which callers treat as "no more input".

use byteorder::{BigEndian, ByteOrder, LittleEndian};
use bytes::Bytes;
use memchr::memmem;
use memmap2::Mmap;
use std::sync::Arc;

/// Backing storage for a PDF file.
///
/// Owned data is held in `Bytes` so clones are cheap; mapped files keep the
/// mapping alive for as long as any clone exists.
#[derive(Clone)]
pub enum PdfBytes {
    Owned(Bytes),
    Mapped(Arc<Mmap>),
}

impl PdfBytes {
    pub fn as_slice(&self) -> &[u8] {
        match self {
            Self::Owned(data) => data.as_ref(),
            Self::Mapped(map) => map.as_ref(),
        }
    }

    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    pub fn is_empty(&self) -> bool {
        self.as_slice().is_empty()
    }

    /// Borrow the whole source as a bounded window.
    pub fn window(&self) -> Window<'_> {
        Window::new(self.as_slice())
    }
}

impl std::fmt::Debug for PdfBytes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Owned(data) => write!(f, "PdfBytes::Owned({} bytes)", data.len()),
            Self::Mapped(map) => write!(f, "PdfBytes::Mapped({} bytes)", map.len()),
        }
    }
}

/// PDF whitespace as used by the token rules (space, tab, CR, LF, FF, NUL).
#[inline]
pub fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n' | b'\x0c' | b'\x00')
}

/// Random-access, clamped view over the file bytes.
#[derive(Clone, Copy, Debug)]
pub struct Window<'a> {
    data: &'a [u8],
}

impl<'a> Window<'a> {
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// File length in bytes.
    #[inline]
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    #[inline]
    pub fn as_slice(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn read_u8(&self, offset: u64) -> Option<u8> {
        usize::try_from(offset)
            .ok()
            .and_then(|pos| self.data.get(pos).copied())
    }

    pub fn read_u16(&self, offset: u64, big_endian: bool) -> Option<u16> {
        let bytes = self.read_bytes(offset, 2);
        if bytes.len() < 2 {
            return None;
        }
        Some(if big_endian {
            BigEndian::read_u16(bytes)
        } else {
            LittleEndian::read_u16(bytes)
        })
    }

    pub fn read_u32(&self, offset: u64, big_endian: bool) -> Option<u32> {
        let bytes = self.read_bytes(offset, 4);
        if bytes.len() < 4 {
            return None;
        }
        Some(if big_endian {
            BigEndian::read_u32(bytes)
        } else {
            LittleEndian::read_u32(bytes)
        })
    }

    /// Up to `len` bytes starting at `offset`, clamped to the end of file.
    pub fn read_bytes(&self, offset: u64, len: u64) -> &'a [u8] {
        let size = self.size();
        if offset >= size {
            return &[];
        }
        let end = offset.saturating_add(len).min(size);
        &self.data[offset as usize..end as usize]
    }

    /// Bytes from `offset` to end of file.
    pub fn tail(&self, offset: u64) -> &'a [u8] {
        self.read_bytes(offset, u64::MAX)
    }

    /// Position of the first occurrence of `pattern` in `[from, to)`.
    pub fn find(&self, pattern: &[u8], from: u64, to: u64) -> Option<u64> {
        let to = to.min(self.size());
        if from >= to || pattern.is_empty() {
            return None;
        }
        let hay = &self.data[from as usize..to as usize];
        memmem::find(hay, pattern).map(|pos| from + pos as u64)
    }

    /// Position of the last occurrence of `pattern` in `[from, to)`.
    pub fn rfind(&self, pattern: &[u8], from: u64, to: u64) -> Option<u64> {
        let to = to.min(self.size());
        if from >= to || pattern.is_empty() {
            return None;
        }
        let hay = &self.data[from as usize..to as usize];
        memmem::rfind(hay, pattern).map(|pos| from + pos as u64)
    }

    /// First offset at or after `offset` that is not PDF whitespace.
    pub fn skip_whitespace(&self, mut offset: u64) -> u64 {
        while let Some(b) = self.read_u8(offset) {
            if !is_whitespace(b) {
                break;
            }
            offset += 1;
        }
        offset
    }

    /// Skips spaces and tabs only (never crosses a line ending).
    pub fn skip_spaces(&self, mut offset: u64) -> u64 {
        while let Some(b' ' | b'\t') = self.read_u8(offset) {
            offset += 1;
        }
        offset
    }

    /// Length of the line ending at `offset`: 2 for CRLF, 1 for CR or LF, else 0.
    pub fn line_ending_len(&self, offset: u64) -> u64 {
        match self.read_u8(offset) {
            Some(b'\r') if self.read_u8(offset + 1) == Some(b'\n') => 2,
            Some(b'\r' | b'\n') => 1,
            _ => 0,
        }
    }
}
